// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

pub mod namespaces;
pub mod run;
pub mod serialize;
pub mod validate;

use kcpbench_core::{BenchConfig, ConfigLoader, ConfigurationError, Credentials, KubeconfigLoader};

/// Load the global configuration file, falling back to defaults when it is absent.
pub fn load_config(path: &str) -> Result<BenchConfig, ConfigurationError> {
    let config = ConfigLoader::load_or_default(path)?;
    tracing::debug!(file = %path, config = ?config, "Loaded configuration");
    Ok(config)
}

/// Apply the kubeconfig/context/cluster flags shared by several commands.
pub fn apply_connection_overrides(
    config: &mut BenchConfig,
    kubeconfig: Option<String>,
    context: Option<String>,
    cluster: Option<String>,
) -> Result<(), ConfigurationError> {
    if let Some(path) = kubeconfig {
        config.kubeconfig = path.into();
    }
    if context.is_some() {
        config.context = context;
    }
    if let Some(cluster) = cluster {
        config.cluster = ConfigLoader::validate_cluster(&cluster)?;
    }
    Ok(())
}

pub fn load_credentials(config: &BenchConfig) -> Result<Credentials, ConfigurationError> {
    let credentials =
        KubeconfigLoader::load_file_with_context(&config.kubeconfig, config.context.as_deref())?;
    tracing::info!(
        kubeconfig = %config.kubeconfig.display(),
        server = %credentials.server,
        "Loaded credentials"
    );
    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_overrides_replace_file_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "cluster: root:org\nconcurrency: 2").unwrap();

        let mut config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.cluster.as_str(), "root:org");

        apply_connection_overrides(
            &mut config,
            Some("/tmp/other.kubeconfig".to_string()),
            Some("admin".to_string()),
            Some("root:org:team".to_string()),
        )
        .unwrap();
        assert_eq!(config.kubeconfig.to_str(), Some("/tmp/other.kubeconfig"));
        assert_eq!(config.context.as_deref(), Some("admin"));
        assert_eq!(config.cluster.as_str(), "root:org:team");
        assert_eq!(config.concurrency, 2);
    }

    #[test]
    fn test_invalid_cluster_override_rejected() {
        let mut config = BenchConfig::default();
        let result = apply_connection_overrides(&mut config, None, None, Some("Root Org".into()));
        assert!(result.is_err());
        assert_eq!(config.cluster.as_str(), "root");
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config, BenchConfig::default());
    }
}
