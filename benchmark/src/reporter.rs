// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! JSON report files.
//!
//! Reports are written as `<category>_<timestamp>.json` under one output
//! directory, the timestamp being the report's own start time.

use crate::metrics::BenchmarkReport;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Report IO failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Writes and reads benchmark reports in one directory.
pub struct JsonReporter {
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a reporter, creating `output_dir` if needed.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir).map_err(|source| ReporterError::Io {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name a report is saved under.
    pub fn file_name(report: &BenchmarkReport) -> String {
        let category = report
            .category()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "mixed".to_string());
        format!(
            "{}_{}.json",
            category,
            report.timestamp.format("%Y-%m-%dT%H-%M-%S%.3fZ")
        )
    }

    /// Save a report and return the path of the created file.
    pub fn save(&self, report: &BenchmarkReport) -> Result<PathBuf, ReporterError> {
        let path = self.output_dir.join(Self::file_name(report));
        let file = File::create(&path).map_err(|source| ReporterError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), report)?;

        tracing::info!(path = %path.display(), results = report.results.len(), "Saved report");
        Ok(path)
    }

    /// All report files in the output directory, sorted by name.
    pub fn list_reports(&self) -> Result<Vec<PathBuf>, ReporterError> {
        let io_err = |source| ReporterError::Io {
            path: self.output_dir.clone(),
            source,
        };

        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.output_dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                reports.push(path);
            }
        }
        reports.sort();
        Ok(reports)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<BenchmarkReport, ReporterError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ReporterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{BenchmarkCategory, BenchmarkResult};
    use kcpbench_core::{BenchmarkHarness, SerializerBenchmark, SerializerRegistry};
    use tempfile::TempDir;

    fn report() -> BenchmarkReport {
        let stats = SerializerBenchmark::new(
            SerializerRegistry::strict(),
            BenchmarkHarness::new().warmup(0).iterations(3),
        )
        .run();
        let mut report = BenchmarkReport::new();
        report.add_serializer_stats(&stats);
        report
    }

    #[test]
    fn test_reporter_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path()).unwrap();

        let path = reporter.save(&report()).unwrap();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("serialization_"));

        let loaded = JsonReporter::load(&path).unwrap();
        assert_eq!(loaded.results.len(), 4);
        assert_eq!(loaded.results[0].category, BenchmarkCategory::Serialization);
    }

    #[test]
    fn test_mixed_report_name() {
        let mut report = report();
        let mut lifecycle = BenchmarkResult::from_serializer_stats(
            &SerializerBenchmark::new(
                SerializerRegistry::strict(),
                BenchmarkHarness::new().warmup(0).iterations(1),
            )
            .run()[0],
        );
        lifecycle.category = BenchmarkCategory::Lifecycle;
        report.add_result(lifecycle);
        assert!(JsonReporter::file_name(&report).starts_with("mixed_"));
    }

    #[test]
    fn test_list_reports() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path().join("nested")).unwrap();
        std::fs::write(reporter.output_dir().join("notes.txt"), "x").unwrap();

        let mut first = report();
        reporter.save(&first).unwrap();
        first.timestamp = first.timestamp + chrono::Duration::seconds(1);
        reporter.save(&first).unwrap();

        let reports = reporter.list_reports().unwrap();
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            JsonReporter::load("/nonexistent/report.json"),
            Err(ReporterError::Io { .. })
        ));
    }
}
