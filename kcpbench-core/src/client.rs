// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! HTTP client for a kcp server and the factory that configures it per format.
//!
//! A [`ClusterClient`] is bound to one [`ContentType`] at construction and is
//! never mutated afterwards, so one instance is shared read-only by every
//! worker of a sub-benchmark. Requests are routed to a logical cluster by
//! prefixing the API path with `/clusters/{path}`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Certificate, Identity, RequestBuilder, StatusCode, Url};

use crate::codec::Serializer;
use crate::content_type::{ContentType, MimePair};
use crate::error::{ConfigurationError, TransportError};
use crate::kubeconfig::{Auth, Credentials};
use crate::ratelimit::{RateLimit, RateLimiter};
use crate::resources::{Listable, Object, Resource, Status};
use crate::transport::{Scope, Transport};

/// Connection settings of one client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub credentials: Credentials,
    /// Format used for both request and response bodies.
    pub content_type: ContentType,
    pub qps: f32,
    pub burst: i64,
    /// Effective throttling policy. When set it takes precedence over `qps`/`burst`.
    pub rate_limit: RateLimit,
    pub max_idle_per_host: usize,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl ClientConfig {
    /// Settings of a stock client: JSON, token bucket with QPS 5 and burst 10.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            content_type: ContentType::Json,
            qps: 5.0,
            burst: 10,
            rate_limit: RateLimit::TokenBucket { qps: 5.0, burst: 10 },
            max_idle_per_host: 100,
            timeout: None,
            user_agent: format!("kcpbench/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn negotiation(&self) -> MimePair {
        self.content_type.negotiation()
    }
}

/// A cluster-aware API client for one wire format.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct ClusterClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    /// Server URL without a trailing slash or `/clusters/...` suffix.
    root: String,
    serializer: Serializer,
    limiter: RateLimiter,
    config: ClientConfig,
}

impl ClusterClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigurationError> {
        let root = server_root(&config.credentials.server)?;
        let http = build_http(&config)?;

        tracing::debug!(
            server = %root,
            content_type = %config.content_type,
            rate_limit = ?config.rate_limit,
            "Built cluster client"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                root,
                serializer: Serializer::new(config.content_type),
                limiter: RateLimiter::new(config.rate_limit),
                config,
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn content_type(&self) -> ContentType {
        self.inner.config.content_type
    }

    pub fn server_root(&self) -> &str {
        &self.inner.root
    }

    /// Request URL of a collection, or of one object when `name` is given.
    pub fn resource_url<K: Resource>(
        &self,
        scope: &Scope,
        name: Option<&str>,
    ) -> Result<String, TransportError> {
        let mut url = format!("{}/clusters/{}", self.inner.root, scope.cluster);
        if K::GROUP.is_empty() {
            url.push_str(&format!("/api/{}", K::VERSION));
        } else {
            url.push_str(&format!("/apis/{}/{}", K::GROUP, K::VERSION));
        }
        if let Some(namespace) = scope.namespace_for::<K>()? {
            url.push_str(&format!("/namespaces/{}", namespace));
        }
        url.push('/');
        url.push_str(K::PLURAL);
        if let Some(name) = name {
            url.push('/');
            url.push_str(name);
        }
        Ok(url)
    }

    fn with_negotiation(&self, request: RequestBuilder) -> RequestBuilder {
        let mime = self.inner.config.negotiation();
        request.header(ACCEPT, mime.accept)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        self.inner.limiter.acquire().await;
        let response = request.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;
        Ok(Response {
            status,
            content_type,
            body: body.to_vec(),
        })
    }

    /// The serializer matching a response, or the negotiated one when the header is absent.
    fn response_serializer(&self, content_type: Option<&str>) -> Result<Serializer, TransportError> {
        match content_type {
            None => Ok(self.inner.serializer),
            Some(header) => ContentType::from_mime(header).map(Serializer::new).ok_or_else(|| {
                TransportError::UnsupportedContentType {
                    content_type: header.to_string(),
                }
            }),
        }
    }

    fn decode<T: Object>(&self, response: Response) -> Result<T, TransportError> {
        if !response.status.is_success() {
            return Err(self.status_error(&response));
        }
        self.response_serializer(response.content_type.as_deref())?
            .decode(&response.body)
            .map_err(TransportError::Decode)
    }

    fn status_error(&self, response: &Response) -> TransportError {
        let code = response.status.as_u16();
        let canonical = response
            .status
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let decoded = self
            .response_serializer(response.content_type.as_deref())
            .ok()
            .and_then(|s| s.decode::<Status>(&response.body).ok());

        match decoded {
            Some(status) => TransportError::Status {
                code,
                reason: status.reason.unwrap_or(canonical),
                message: status.message.unwrap_or_default(),
            },
            None => TransportError::Status {
                code,
                reason: canonical,
                message: String::from_utf8_lossy(&response.body).trim().to_string(),
            },
        }
    }
}

struct Response {
    status: StatusCode,
    content_type: Option<String>,
    body: Vec<u8>,
}

#[async_trait]
impl Transport for ClusterClient {
    async fn create<K: Resource>(&self, scope: &Scope, obj: &K) -> Result<K, TransportError> {
        let url = self.resource_url::<K>(scope, None)?;
        let body = self.inner.serializer.encode(obj).map_err(TransportError::Encode)?;
        let request = self
            .with_negotiation(self.inner.http.post(url))
            .header(CONTENT_TYPE, self.inner.config.negotiation().content)
            .body(body);
        let response = self.execute(request).await?;
        self.decode(response)
    }

    async fn get<K: Resource>(&self, scope: &Scope, name: &str) -> Result<K, TransportError> {
        let url = self.resource_url::<K>(scope, Some(name))?;
        let response = self
            .execute(self.with_negotiation(self.inner.http.get(url)))
            .await?;
        self.decode(response)
    }

    async fn delete<K: Resource>(&self, scope: &Scope, name: &str) -> Result<(), TransportError> {
        let url = self.resource_url::<K>(scope, Some(name))?;
        let response = self
            .execute(self.with_negotiation(self.inner.http.delete(url)))
            .await?;
        if response.status.is_success() {
            Ok(())
        } else {
            Err(self.status_error(&response))
        }
    }

    async fn list<K: Listable>(
        &self,
        scope: &Scope,
        label_selector: Option<&str>,
    ) -> Result<Vec<K>, TransportError> {
        let url = self.resource_url::<K>(scope, None)?;
        let mut request = self.with_negotiation(self.inner.http.get(url));
        if let Some(selector) = label_selector {
            request = request.query(&[("labelSelector", selector)]);
        }
        let response = self.execute(request).await?;
        let list: K::List = self.decode(response)?;
        Ok(K::items(list))
    }
}

/// Normalize a kubeconfig server URL to the server root.
fn server_root(server: &str) -> Result<String, ConfigurationError> {
    let url = Url::parse(server).map_err(|e| ConfigurationError::InvalidServerUrl {
        url: server.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigurationError::InvalidServerUrl {
            url: server.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if url.host_str().is_none() {
        return Err(ConfigurationError::InvalidServerUrl {
            url: server.to_string(),
            reason: "missing host".to_string(),
        });
    }

    let path = url.path();
    let base = match path.find("/clusters/") {
        Some(idx) => &path[..idx],
        None => path.trim_end_matches('/'),
    };
    let origin = url.origin().ascii_serialization();
    Ok(format!("{}{}", origin, base.trim_end_matches('/')))
}

fn build_http(config: &ClientConfig) -> Result<reqwest::Client, ConfigurationError> {
    let creds = &config.credentials;
    let mut builder = reqwest::Client::builder()
        .pool_max_idle_per_host(config.max_idle_per_host)
        .user_agent(config.user_agent.clone());

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(ca_pem) = &creds.ca_pem {
        let certs =
            Certificate::from_pem_bundle(ca_pem).map_err(|e| ConfigurationError::InvalidCredential {
                field: "certificate-authority-data",
                reason: e.to_string(),
            })?;
        for cert in certs {
            builder = builder.add_root_certificate(cert);
        }
    }
    if creds.insecure_skip_tls_verify {
        builder = builder.danger_accept_invalid_certs(true);
    }

    match &creds.auth {
        Auth::None => {}
        Auth::BearerToken(token) => {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                ConfigurationError::InvalidCredential {
                    field: "token",
                    reason: e.to_string(),
                }
            })?;
            value.set_sensitive(true);
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }
        Auth::ClientCertificate { identity_pem } => {
            let identity =
                Identity::from_pem(identity_pem).map_err(|e| ConfigurationError::InvalidCredential {
                    field: "client-certificate-data",
                    reason: e.to_string(),
                })?;
            builder = builder.identity(identity);
        }
    }

    builder.build().map_err(|e| ConfigurationError::ClientBuild {
        reason: e.to_string(),
    })
}

/// Builds one client per format identifier.
pub trait ClientFactory: Send + Sync {
    type Client: Transport;

    /// Build a client for `format`. Unknown formats fail before any network work.
    fn build(&self, format: &str) -> Result<Self::Client, ConfigurationError>;
}

/// Factory of unthrottled HTTP clients for one set of credentials.
#[derive(Debug, Clone)]
pub struct KubeClientFactory {
    credentials: Credentials,
    timeout: Option<Duration>,
}

impl KubeClientFactory {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configuration `build` would use for `format`.
    pub fn config_for(&self, format: &str) -> Result<ClientConfig, ConfigurationError> {
        let content_type: ContentType = format.parse()?;

        let mut config = ClientConfig::new(self.credentials.clone());
        config.content_type = content_type;
        config.rate_limit = RateLimit::AlwaysAllow;
        config.qps = f32::MAX;
        config.burst = i64::MAX;
        config.max_idle_per_host = usize::MAX;
        config.timeout = self.timeout;
        Ok(config)
    }
}

impl ClientFactory for KubeClientFactory {
    type Client = ClusterClient;

    fn build(&self, format: &str) -> Result<ClusterClient, ConfigurationError> {
        ClusterClient::new(self.config_for(format)?)
    }
}
