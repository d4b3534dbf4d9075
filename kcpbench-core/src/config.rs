// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML benchmark configuration with strict schema validation.
//!
//! Unknown keys and out-of-range values are rejected at load time with
//! `ConfigurationError::InvalidFieldValue`, before any client is built.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::content_type::ContentType;
use crate::driver::BenchOptions;
use crate::error::ConfigurationError;
use crate::harness::BenchmarkHarness;
use crate::kubeconfig::DEFAULT_KUBECONFIG;
use crate::transport::ClusterPath;

/// Configuration file looked up when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "kcpbench.yaml";

pub const MAX_CONCURRENCY: usize = 10_000;
pub const MAX_SERIALIZER_ITERATIONS: u64 = 100_000_000;
const MAX_TIMEOUT_MS: u64 = 3_600_000;

/// Raw configuration as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBenchConfig {
    #[serde(default = "default_kubeconfig")]
    kubeconfig: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default = "default_cluster")]
    cluster: String,
    #[serde(default = "default_content_types")]
    content_types: Vec<String>,
    #[serde(default)]
    concurrency: Option<usize>,
    #[serde(default = "default_iteration_budget")]
    iteration_budget: u64,
    #[serde(default)]
    timeout_ms: Option<u64>,
    #[serde(default = "default_warmup_iterations")]
    warmup_iterations: u64,
    #[serde(default = "default_serializer_iterations")]
    serializer_iterations: u64,
    #[serde(default = "default_output_dir")]
    output_dir: String,
}

fn default_kubeconfig() -> String {
    DEFAULT_KUBECONFIG.to_string()
}

fn default_cluster() -> String {
    ClusterPath::root().to_string()
}

fn default_content_types() -> Vec<String> {
    ContentType::ALL.iter().map(|ct| ct.name().to_string()).collect()
}

fn default_iteration_budget() -> u64 {
    100
}

fn default_warmup_iterations() -> u64 {
    10
}

fn default_serializer_iterations() -> u64 {
    1000
}

fn default_output_dir() -> String {
    "benchmark-results".to_string()
}

/// Validated benchmark configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub kubeconfig: PathBuf,
    pub context: Option<String>,
    pub cluster: ClusterPath,
    pub content_types: Vec<ContentType>,
    pub concurrency: usize,
    pub iteration_budget: u64,
    pub timeout: Option<Duration>,
    pub warmup_iterations: u64,
    pub serializer_iterations: u64,
    pub output_dir: PathBuf,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            kubeconfig: PathBuf::from(DEFAULT_KUBECONFIG),
            context: None,
            cluster: ClusterPath::root(),
            content_types: ContentType::ALL.to_vec(),
            concurrency: num_cpus::get(),
            iteration_budget: default_iteration_budget(),
            timeout: None,
            warmup_iterations: default_warmup_iterations(),
            serializer_iterations: default_serializer_iterations(),
            output_dir: PathBuf::from(default_output_dir()),
        }
    }
}

impl BenchConfig {
    /// Driver options for this configuration.
    pub fn bench_options(&self) -> BenchOptions {
        BenchOptions {
            content_types: self.content_types.clone(),
            concurrency: self.concurrency,
            iteration_budget: self.iteration_budget,
            cluster: self.cluster.clone(),
            keep_samples: false,
        }
    }

    /// Harness for the serializer micro-benchmark.
    pub fn serializer_harness(&self) -> BenchmarkHarness {
        BenchmarkHarness::new()
            .warmup(self.warmup_iterations)
            .iterations(self.serializer_iterations)
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<BenchConfig, ConfigurationError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigurationError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load `path` when it exists, else the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<BenchConfig, ConfigurationError> {
        match Self::load_file(path) {
            Err(ConfigurationError::ConfigNotFound { .. }) => Ok(BenchConfig::default()),
            other => other,
        }
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> Result<BenchConfig, ConfigurationError> {
        // An empty document means "all defaults".
        let raw: RawBenchConfig = if content.trim().is_empty() {
            serde_yaml::from_str("{}")
        } else {
            serde_yaml::from_str(content)
        }
        .map_err(|e| ConfigurationError::ConfigParse {
            message: format!("YAML parse error: {}", e),
        })?;

        Self::validate(raw)
    }

    fn validate(raw: RawBenchConfig) -> Result<BenchConfig, ConfigurationError> {
        if raw.kubeconfig.trim().is_empty() {
            return Err(ConfigurationError::InvalidFieldValue {
                field: "kubeconfig",
                value: raw.kubeconfig,
                reason: "Path cannot be empty".to_string(),
            });
        }

        let cluster = Self::validate_cluster(&raw.cluster)?;
        let content_types = Self::validate_content_types(&raw.content_types)?;

        let concurrency = raw.concurrency.unwrap_or_else(num_cpus::get);
        if concurrency == 0 || concurrency > MAX_CONCURRENCY {
            return Err(ConfigurationError::InvalidFieldValue {
                field: "concurrency",
                value: concurrency.to_string(),
                reason: format!("Must be between 1 and {}", MAX_CONCURRENCY),
            });
        }

        if raw.iteration_budget == 0 {
            return Err(ConfigurationError::InvalidFieldValue {
                field: "iteration_budget",
                value: "0".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if raw.serializer_iterations == 0 || raw.serializer_iterations > MAX_SERIALIZER_ITERATIONS {
            return Err(ConfigurationError::InvalidFieldValue {
                field: "serializer_iterations",
                value: raw.serializer_iterations.to_string(),
                reason: format!("Must be between 1 and {}", MAX_SERIALIZER_ITERATIONS),
            });
        }

        let timeout = match raw.timeout_ms {
            None => None,
            Some(0) => {
                return Err(ConfigurationError::InvalidFieldValue {
                    field: "timeout_ms",
                    value: "0".to_string(),
                    reason: "Timeout must be greater than 0; omit it to disable".to_string(),
                });
            }
            Some(ms) if ms > MAX_TIMEOUT_MS => {
                return Err(ConfigurationError::InvalidFieldValue {
                    field: "timeout_ms",
                    value: ms.to_string(),
                    reason: format!("Timeout must not exceed {}ms", MAX_TIMEOUT_MS),
                });
            }
            Some(ms) => Some(Duration::from_millis(ms)),
        };

        Ok(BenchConfig {
            kubeconfig: PathBuf::from(raw.kubeconfig),
            context: raw.context,
            cluster,
            content_types,
            concurrency,
            iteration_budget: raw.iteration_budget,
            timeout,
            warmup_iterations: raw.warmup_iterations,
            serializer_iterations: raw.serializer_iterations,
            output_dir: PathBuf::from(raw.output_dir),
        })
    }

    /// Logical cluster paths are `:`-separated lowercase segments.
    pub fn validate_cluster(path: &str) -> Result<ClusterPath, ConfigurationError> {
        let valid = !path.is_empty()
            && path.split(':').all(|segment| {
                !segment.is_empty()
                    && segment
                        .bytes()
                        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
            });
        if !valid {
            return Err(ConfigurationError::InvalidFieldValue {
                field: "cluster",
                value: path.to_string(),
                reason: "Expected ':'-separated segments of [a-z0-9-]".to_string(),
            });
        }
        Ok(ClusterPath::new(path))
    }

    fn validate_content_types(raw: &[String]) -> Result<Vec<ContentType>, ConfigurationError> {
        if raw.is_empty() {
            return Err(ConfigurationError::InvalidFieldValue {
                field: "content_types",
                value: "[]".to_string(),
                reason: "At least one content type must be listed".to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut content_types = Vec::with_capacity(raw.len());
        for value in raw {
            let ct: ContentType = value.parse()?;
            if !seen.insert(ct) {
                return Err(ConfigurationError::InvalidFieldValue {
                    field: "content_types",
                    value: value.clone(),
                    reason: format!("{} is listed more than once", ct),
                });
            }
            content_types.push(ct);
        }
        Ok(content_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID_CONFIG: &str = r#"
kubeconfig: /tmp/admin.kubeconfig
cluster: root:org
content_types: [protobuf, application/json]
concurrency: 10
iteration_budget: 5
timeout_ms: 30000
warmup_iterations: 3
serializer_iterations: 500
"#;

    #[test]
    fn test_valid_config() {
        let config = ConfigLoader::load_string(VALID_CONFIG).unwrap();
        assert_eq!(config.cluster.as_str(), "root:org");
        assert_eq!(
            config.content_types,
            vec![ContentType::Protobuf, ContentType::Json]
        );
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));

        let options = config.bench_options();
        assert_eq!(options.total_invocations(), 50);
        assert_eq!(config.serializer_harness().measurement_iterations(), 500);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ConfigLoader::load_string("").unwrap();
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ConfigLoader::load_string("concurency: 4\n");
        assert!(matches!(result, Err(ConfigurationError::ConfigParse { .. })));
    }

    #[test]
    fn test_unknown_content_type() {
        let result = ConfigLoader::load_string("content_types: [json, xml]\n");
        assert!(matches!(
            result,
            Err(ConfigurationError::UnknownContentType { .. })
        ));
    }

    #[test]
    fn test_duplicate_content_type() {
        let result = ConfigLoader::load_string("content_types: [json, application/json]\n");
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidFieldValue {
                field: "content_types",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_concurrency() {
        let result = ConfigLoader::load_string("concurrency: 0\n");
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidFieldValue {
                field: "concurrency",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_budget_and_timeout() {
        assert!(ConfigLoader::load_string("iteration_budget: 0\n").is_err());
        assert!(ConfigLoader::load_string("timeout_ms: 0\n").is_err());
        assert!(ConfigLoader::load_string("timeout_ms: 99999999\n").is_err());
    }

    #[test]
    fn test_serializer_iterations_bounded() {
        assert!(ConfigLoader::load_string("serializer_iterations: 0\n").is_err());
        let too_many = format!("serializer_iterations: {}\n", u64::MAX);
        assert!(matches!(
            ConfigLoader::load_string(&too_many),
            Err(ConfigurationError::InvalidFieldValue {
                field: "serializer_iterations",
                ..
            })
        ));
        let at_limit = format!("serializer_iterations: {}\n", MAX_SERIALIZER_ITERATIONS);
        assert!(ConfigLoader::load_string(&at_limit).is_ok());
    }

    #[test]
    fn test_invalid_cluster_path() {
        for bad in ["", "Root", "root::org", "root/org"] {
            assert!(
                ConfigLoader::validate_cluster(bad).is_err(),
                "{:?} accepted",
                bad
            );
        }
        assert!(ConfigLoader::validate_cluster("root:my-org:team1").is_ok());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::load_or_default(temp_dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.iteration_budget, 100);
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kcpbench.yaml");
        std::fs::write(&path, VALID_CONFIG).unwrap();
        let config = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(config.iteration_budget, 5);
    }
}
