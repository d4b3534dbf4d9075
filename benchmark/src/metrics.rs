// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Report types for benchmark results.
//!
//! A report bundles the machine it ran on with one result per measured
//! operation. Lifecycle results come from the driver's `FormatStats`,
//! serializer results from `SerializerStats`.

use chrono::{DateTime, Utc};
use kcpbench_core::{FormatStats, LatencyMetrics, SerializerStats, ThroughputMetrics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use sysinfo::System;

/// Categories of benchmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkCategory {
    /// Create/get/delete round trips against a server
    Lifecycle,
    /// Encode-then-decode of the sample object
    Serialization,
}

impl std::fmt::Display for BenchmarkCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BenchmarkCategory::Lifecycle => write!(f, "lifecycle"),
            BenchmarkCategory::Serialization => write!(f, "serialization"),
        }
    }
}

/// System information captured at benchmark time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of logical CPUs
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// A single benchmark result with all associated metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Run identifier, e.g. `clusterrole-lifecycle/application/json`
    pub name: String,
    pub category: BenchmarkCategory,
    /// Format short name
    pub content_type: String,
    pub latency: LatencyMetrics,
    pub throughput: ThroughputMetrics,
    /// Invocations that ran to an outcome
    pub iterations: u64,
    pub errors: u64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl BenchmarkResult {
    pub fn from_format_stats(stats: &FormatStats) -> Self {
        let result = Self {
            name: stats.run_id.clone(),
            category: BenchmarkCategory::Lifecycle,
            content_type: stats.content_type.name().to_string(),
            latency: stats.latency.clone(),
            throughput: stats.throughput.clone(),
            iterations: stats.completed,
            errors: stats.failed,
            metadata: BTreeMap::new(),
        }
        .with_metadata("workload", stats.workload.name())
        .with_metadata("concurrency", stats.concurrency)
        .with_metadata("cancelled", stats.cancelled);

        match &stats.configuration_error {
            Some(message) => result.with_metadata("configuration_error", message),
            None => result,
        }
    }

    pub fn from_serializer_stats(stats: &SerializerStats) -> Self {
        let result = Self {
            name: format!("serialization/{}", stats.mime),
            category: BenchmarkCategory::Serialization,
            content_type: stats.name.clone(),
            latency: stats.latency.clone(),
            throughput: stats.throughput.clone(),
            iterations: stats.iterations,
            errors: stats.errors,
            metadata: BTreeMap::new(),
        }
        .with_metadata("encoded_bytes", stats.encoded_bytes);

        match &stats.first_error {
            Some(message) => result.with_metadata("first_error", message),
            None => result,
        }
    }

    /// Add metadata to the result. Values that fail to serialize are skipped.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), value);
        }
        self
    }
}

/// Complete benchmark suite report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Suite identifier
    pub benchmark_suite: String,
    /// Tool version
    pub version: String,
    /// Timestamp when benchmarks were run
    pub timestamp: DateTime<Utc>,
    pub system_info: SystemInfo,
    /// Server the lifecycle results were measured against, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    pub results: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self {
            benchmark_suite: "kcpbench".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            server: None,
            results: Vec::new(),
        }
    }

    pub fn add_result(&mut self, result: BenchmarkResult) {
        self.results.push(result);
    }

    pub fn add_format_stats<'a>(&mut self, stats: impl IntoIterator<Item = &'a FormatStats>) {
        self.results
            .extend(stats.into_iter().map(BenchmarkResult::from_format_stats));
    }

    pub fn add_serializer_stats<'a>(&mut self, stats: impl IntoIterator<Item = &'a SerializerStats>) {
        self.results
            .extend(stats.into_iter().map(BenchmarkResult::from_serializer_stats));
    }

    /// The single category of all results, if they share one.
    pub fn category(&self) -> Option<BenchmarkCategory> {
        let first = self.results.first()?.category;
        self.results
            .iter()
            .all(|r| r.category == first)
            .then_some(first)
    }
}

impl Default for BenchmarkReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcpbench_core::{BenchmarkHarness, SerializerBenchmark, SerializerRegistry};

    fn serializer_stats() -> Vec<SerializerStats> {
        SerializerBenchmark::new(
            SerializerRegistry::strict(),
            BenchmarkHarness::new().warmup(0).iterations(5),
        )
        .run()
    }

    #[test]
    fn test_system_info_collect() {
        let info = SystemInfo::collect();
        assert!(!info.os.is_empty());
        assert!(info.cpu_cores > 0);
        assert!(info.memory_bytes > 0);
    }

    #[test]
    fn test_serializer_results() {
        let mut report = BenchmarkReport::new();
        report.add_serializer_stats(&serializer_stats());

        assert_eq!(report.results.len(), 4);
        assert_eq!(report.category(), Some(BenchmarkCategory::Serialization));
        assert_eq!(report.results[2].name, "serialization/application/vnd.kubernetes.protobuf");
        assert!(report.results[0].metadata.contains_key("encoded_bytes"));
    }

    #[test]
    fn test_benchmark_result_serialization() {
        let result = BenchmarkResult::from_serializer_stats(&serializer_stats()[0])
            .with_metadata("note", "warm cache");

        let json = serde_json::to_string_pretty(&result).unwrap();
        assert!(json.contains("serialization/application/json"));
        assert!(json.contains("\"category\": \"serialization\""));
        assert!(json.contains("warm cache"));
    }
}
