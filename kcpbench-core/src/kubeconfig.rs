// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Kubeconfig parsing.
//!
//! Only the parts needed to reach one server are understood: the current
//! context, its cluster (server URL and CA) and its user (bearer token or
//! client certificate). Inline `*-data` fields take precedence over file paths.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::error::ConfigurationError;

/// Default kubeconfig written by a local kcp server.
pub const DEFAULT_KUBECONFIG: &str = ".kcp/admin.kubeconfig";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawKubeconfig {
    #[serde(default)]
    current_context: Option<String>,
    #[serde(default)]
    clusters: Vec<NamedCluster>,
    #[serde(default)]
    users: Vec<NamedUser>,
    #[serde(default)]
    contexts: Vec<NamedContext>,
}

#[derive(Debug, Deserialize)]
struct NamedCluster {
    name: String,
    cluster: RawCluster,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawCluster {
    server: String,
    #[serde(default)]
    certificate_authority: Option<String>,
    #[serde(default)]
    certificate_authority_data: Option<String>,
    #[serde(default)]
    insecure_skip_tls_verify: bool,
}

#[derive(Debug, Deserialize)]
struct NamedUser {
    name: String,
    #[serde(default)]
    user: RawUser,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawUser {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "tokenFile")]
    token_file: Option<String>,
    #[serde(default)]
    client_certificate: Option<String>,
    #[serde(default)]
    client_certificate_data: Option<String>,
    #[serde(default)]
    client_key: Option<String>,
    #[serde(default)]
    client_key_data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedContext {
    name: String,
    context: RawContext,
}

#[derive(Debug, Deserialize)]
struct RawContext {
    cluster: String,
    #[serde(default)]
    user: Option<String>,
}

/// How requests authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    BearerToken(String),
    /// PEM of the client certificate followed by its private key.
    ClientCertificate { identity_pem: Vec<u8> },
}

/// An already-loaded credential set for one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Server URL as written in the kubeconfig.
    pub server: String,
    /// PEM bundle of trusted CAs.
    pub ca_pem: Option<Vec<u8>>,
    pub insecure_skip_tls_verify: bool,
    pub auth: Auth,
}

impl Credentials {
    /// Credentials for an unauthenticated plain-HTTP server (tests, proxies).
    pub fn insecure(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ca_pem: None,
            insecure_skip_tls_verify: true,
            auth: Auth::None,
        }
    }
}

/// Loads kubeconfig files into [`Credentials`].
pub struct KubeconfigLoader;

impl KubeconfigLoader {
    /// Load the current context of a kubeconfig file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Credentials, ConfigurationError> {
        Self::load_file_with_context(path, None)
    }

    /// Load a named context (or the current one) of a kubeconfig file.
    pub fn load_file_with_context(
        path: impl AsRef<Path>,
        context: Option<&str>,
    ) -> Result<Credentials, ConfigurationError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigurationError::KubeconfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Io {
            context: "reading kubeconfig",
            source: e,
        })?;

        Self::load_string(&content, context, path.parent())
    }

    /// Parse kubeconfig YAML. Relative file references resolve against `base_dir`.
    pub fn load_string(
        content: &str,
        context: Option<&str>,
        base_dir: Option<&Path>,
    ) -> Result<Credentials, ConfigurationError> {
        let raw: RawKubeconfig =
            serde_yaml::from_str(content).map_err(|e| ConfigurationError::KubeconfigParse {
                message: e.to_string(),
            })?;

        let context_name = context
            .map(str::to_string)
            .or(raw.current_context.clone())
            .ok_or_else(|| ConfigurationError::MissingContext {
                name: "<current-context>".to_string(),
            })?;

        let ctx = raw
            .contexts
            .iter()
            .find(|c| c.name == context_name)
            .map(|c| &c.context)
            .ok_or_else(|| ConfigurationError::MissingContext {
                name: context_name.clone(),
            })?;

        let cluster = raw
            .clusters
            .iter()
            .find(|c| c.name == ctx.cluster)
            .map(|c| &c.cluster)
            .ok_or_else(|| ConfigurationError::MissingCluster {
                name: ctx.cluster.clone(),
            })?;

        let user = match &ctx.user {
            Some(name) => Some(
                raw.users
                    .iter()
                    .find(|u| &u.name == name)
                    .map(|u| &u.user)
                    .ok_or_else(|| ConfigurationError::MissingUser { name: name.clone() })?,
            ),
            None => None,
        };

        let ca_pem = read_data_or_file(
            "certificate-authority-data",
            cluster.certificate_authority_data.as_deref(),
            cluster.certificate_authority.as_deref(),
            base_dir,
        )?;

        let auth = match user {
            Some(user) => resolve_auth(user, base_dir)?,
            None => Auth::None,
        };

        Ok(Credentials {
            server: cluster.server.clone(),
            ca_pem,
            insecure_skip_tls_verify: cluster.insecure_skip_tls_verify,
            auth,
        })
    }
}

fn resolve_auth(user: &RawUser, base_dir: Option<&Path>) -> Result<Auth, ConfigurationError> {
    if let Some(token) = &user.token {
        return Ok(Auth::BearerToken(token.trim().to_string()));
    }
    if let Some(token_file) = &user.token_file {
        let path = resolve_path(token_file, base_dir);
        let token = std::fs::read_to_string(&path).map_err(|e| ConfigurationError::Io {
            context: "reading token file",
            source: e,
        })?;
        return Ok(Auth::BearerToken(token.trim().to_string()));
    }

    let cert = read_data_or_file(
        "client-certificate-data",
        user.client_certificate_data.as_deref(),
        user.client_certificate.as_deref(),
        base_dir,
    )?;
    let key = read_data_or_file(
        "client-key-data",
        user.client_key_data.as_deref(),
        user.client_key.as_deref(),
        base_dir,
    )?;

    match (cert, key) {
        (Some(mut identity_pem), Some(key)) => {
            if !identity_pem.ends_with(b"\n") {
                identity_pem.push(b'\n');
            }
            identity_pem.extend_from_slice(&key);
            Ok(Auth::ClientCertificate { identity_pem })
        }
        (None, None) => Ok(Auth::None),
        (Some(_), None) => Err(ConfigurationError::InvalidCredential {
            field: "client-key-data",
            reason: "client certificate given without a key".to_string(),
        }),
        (None, Some(_)) => Err(ConfigurationError::InvalidCredential {
            field: "client-certificate-data",
            reason: "client key given without a certificate".to_string(),
        }),
    }
}

fn read_data_or_file(
    field: &'static str,
    data: Option<&str>,
    file: Option<&str>,
    base_dir: Option<&Path>,
) -> Result<Option<Vec<u8>>, ConfigurationError> {
    if let Some(data) = data {
        return STANDARD
            .decode(data.trim())
            .map(Some)
            .map_err(|e| ConfigurationError::InvalidCredential {
                field,
                reason: e.to_string(),
            });
    }
    match file {
        Some(file) => std::fs::read(resolve_path(file, base_dir))
            .map(Some)
            .map_err(|e| ConfigurationError::Io {
                context: "reading credential file",
                source: e,
            }),
        None => Ok(None),
    }
}

fn resolve_path(file: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = PathBuf::from(file);
    match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const KCP_ADMIN: &str = r#"
apiVersion: v1
kind: Config
current-context: root
clusters:
  - name: root
    cluster:
      server: https://127.0.0.1:6443/clusters/root
      certificate-authority-data: LS0tLS1CRUdJTiBDRVJUSUZJQ0FURS0tLS0tCg==
  - name: base
    cluster:
      server: https://127.0.0.1:6443
      insecure-skip-tls-verify: true
contexts:
  - name: root
    context:
      cluster: root
      user: kcp-admin
  - name: base
    context:
      cluster: base
      user: kcp-admin
      namespace: bench
users:
  - name: kcp-admin
    user:
      token: "abc123"
"#;

    #[test]
    fn test_current_context() {
        let creds = KubeconfigLoader::load_string(KCP_ADMIN, None, None).unwrap();
        assert_eq!(creds.server, "https://127.0.0.1:6443/clusters/root");
        assert_eq!(creds.auth, Auth::BearerToken("abc123".to_string()));
        assert_eq!(
            creds.ca_pem.as_deref(),
            Some(&b"-----BEGIN CERTIFICATE-----\n"[..])
        );
        assert!(!creds.insecure_skip_tls_verify);
    }

    #[test]
    fn test_named_context() {
        let creds = KubeconfigLoader::load_string(KCP_ADMIN, Some("base"), None).unwrap();
        assert!(creds.insecure_skip_tls_verify);
        assert_eq!(creds.server, "https://127.0.0.1:6443");
    }

    #[test]
    fn test_missing_context() {
        let result = KubeconfigLoader::load_string(KCP_ADMIN, Some("nope"), None);
        assert!(matches!(
            result,
            Err(ConfigurationError::MissingContext { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = KubeconfigLoader::load_file("/nonexistent/admin.kubeconfig");
        assert!(matches!(
            result,
            Err(ConfigurationError::KubeconfigNotFound { .. })
        ));
    }

    #[test]
    fn test_relative_token_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("token"), "from-file\n").unwrap();
        let config = r#"
current-context: c
clusters:
  - name: c
    cluster:
      server: http://localhost:8080
contexts:
  - name: c
    context:
      cluster: c
      user: u
users:
  - name: u
    user:
      tokenFile: token
"#;
        let path = temp_dir.path().join("config");
        std::fs::write(&path, config).unwrap();

        let creds = KubeconfigLoader::load_file(&path).unwrap();
        assert_eq!(creds.auth, Auth::BearerToken("from-file".to_string()));
    }
}
