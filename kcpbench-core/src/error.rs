//! Custom error types for kcpbench.
//!
//! Explicit enum error types, no `Box<dyn Error>` and no `anyhow::Result`.
//! Errors are grouped by the component that produces them so the driver can
//! decide which ones are fatal to a sub-benchmark and which are only recorded.

use std::path::PathBuf;

use thiserror::Error;

use crate::workload::{ResourceKind, Step};

/// Top-level error type.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Workload error: {0}")]
    Workload(#[from] WorkloadError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
}

/// Client construction or configuration failures.
///
/// Fatal to the affected sub-benchmark only.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Unknown content type: {value}")]
    UnknownContentType { value: String },

    #[error("Kubeconfig not found: {path}")]
    KubeconfigNotFound { path: PathBuf },

    #[error("Kubeconfig parse error: {message}")]
    KubeconfigParse { message: String },

    #[error("Context '{name}' not found in kubeconfig")]
    MissingContext { name: String },

    #[error("Cluster '{name}' not found in kubeconfig")]
    MissingCluster { name: String },

    #[error("User '{name}' not found in kubeconfig")]
    MissingUser { name: String },

    #[error("Invalid server URL '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },

    #[error("Invalid credential data in {field}: {reason}")]
    InvalidCredential { field: &'static str, reason: String },

    #[error("Failed to build client: {reason}")]
    ClientBuild { reason: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of a single create/get/delete/list call.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server responded {code} {reason}: {message}")]
    Status {
        code: u16,
        reason: String,
        message: String,
    },

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] SerializationError),

    #[error("Failed to decode response body: {0}")]
    Decode(#[source] SerializationError),

    #[error("Unsupported response content type: {content_type}")]
    UnsupportedContentType { content_type: String },

    #[error("Kind {kind} is namespaced but no namespace was given")]
    MissingNamespace { kind: &'static str },
}

impl TransportError {
    /// HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Status { code, .. } => Some(*code),
            TransportError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the error is a 404 from the server.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Failure of one workload invocation.
///
/// Recorded per invocation by the driver, never fatal to a sub-benchmark.
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("failed to {step} {kind}: {source}")]
    Failed {
        step: Step,
        kind: ResourceKind,
        #[source]
        source: TransportError,
    },

    #[error("cancelled during {step} of {kind}")]
    Cancelled { step: Step, kind: ResourceKind },
}

impl WorkloadError {
    /// The lifecycle step that failed.
    pub fn step(&self) -> Step {
        match self {
            WorkloadError::Failed { step, .. } | WorkloadError::Cancelled { step, .. } => *step,
        }
    }
}

/// Encode/decode failures. Strict decoding never coerces: it fails instead.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("{format}: malformed input - {reason}")]
    Malformed {
        format: &'static str,
        reason: String,
    },

    #[error("{format}: unknown field '{path}'")]
    UnknownField { format: &'static str, path: String },

    #[error("duplicate map key '{key}'")]
    DuplicateKey { key: String },

    #[error("{format}: missing magic prefix")]
    MissingPrefix { format: &'static str },

    #[error("Kind mismatch: expected {expected}, got {actual}")]
    KindMismatch { expected: String, actual: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("{format}: encode failed - {reason}")]
    EncodeFailed {
        format: &'static str,
        reason: String,
    },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_error_display() {
        let err = WorkloadError::Failed {
            step: Step::Create,
            kind: ResourceKind::ConfigMap,
            source: TransportError::Status {
                code: 409,
                reason: "AlreadyExists".to_string(),
                message: "configmaps \"x\" already exists".to_string(),
            },
        };
        let text = err.to_string();
        assert!(text.starts_with("failed to create configmap"));
        assert!(text.contains("409"));
        assert_eq!(err.step(), Step::Create);
    }

    #[test]
    fn test_error_chain() {
        let config_err = ConfigurationError::UnknownContentType {
            value: "application/xml".to_string(),
        };
        let err: BenchError = config_err.into();
        assert!(matches!(err, BenchError::Configuration(_)));
    }

    #[test]
    fn test_not_found_detection() {
        let err = TransportError::Status {
            code: 404,
            reason: "NotFound".to_string(),
            message: String::new(),
        };
        assert!(err.is_not_found());
        assert!(!TransportError::MissingNamespace { kind: "ConfigMap" }.is_not_found());
    }
}
