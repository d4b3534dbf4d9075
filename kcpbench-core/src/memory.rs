// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! In-process emulation of the server's CRUD semantics.
//!
//! [`InMemoryCluster`] stores objects per logical cluster, assigns names for
//! `generateName` requests and enforces name uniqueness atomically, so
//! hundreds of concurrent workers sharing one base name can be checked for
//! collisions without a live server. [`InMemoryTransport`] still encodes every
//! request and response with the negotiated serializer, which makes a dry run
//! a codec-only baseline of the lifecycle workloads.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::client::ClientFactory;
use crate::codec::Serializer;
use crate::content_type::ContentType;
use crate::error::{ConfigurationError, TransportError};
use crate::resources::{Listable, Resource};
use crate::transport::{ClusterPath, Scope, Transport};

/// Characters the server draws generated name suffixes from (no vowels, no
/// look-alike digits).
const SUFFIX_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";
const SUFFIX_LEN: usize = 5;
const MAX_GENERATED_BASE: usize = 63 - SUFFIX_LEN;
const MAX_NAME_LEN: usize = 253;
const GENERATE_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ObjectKey {
    cluster: String,
    group: &'static str,
    plural: &'static str,
    namespace: Option<String>,
    name: String,
}

#[derive(Debug, Clone)]
struct StoredObject {
    value: serde_json::Value,
    labels: BTreeMap<String, String>,
}

/// Snapshot of how many operations a cluster has served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationCounts {
    pub creates: u64,
    pub gets: u64,
    pub deletes: u64,
    pub lists: u64,
}

#[derive(Debug, Default)]
struct Counters {
    creates: AtomicU64,
    gets: AtomicU64,
    deletes: AtomicU64,
    lists: AtomicU64,
}

/// Object store shared by every transport of one dry run.
#[derive(Debug, Default)]
pub struct InMemoryCluster {
    objects: DashMap<ObjectKey, StoredObject>,
    resource_version: AtomicU64,
    counters: Counters,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new object and return it as the server would.
    pub fn create<K: Resource>(&self, scope: &Scope, mut obj: K) -> Result<K, TransportError> {
        self.counters.creates.fetch_add(1, Ordering::Relaxed);
        let namespace = scope.namespace_for::<K>()?.map(str::to_string);

        {
            let meta = obj.metadata_mut();
            if K::NAMESPACED {
                match (&meta.namespace, &namespace) {
                    (Some(given), Some(expected)) if given != expected => {
                        return Err(bad_request(format!(
                            "the namespace of the provided object ({}) does not match the namespace sent on the request ({})",
                            given, expected
                        )));
                    }
                    _ => meta.namespace = namespace.clone(),
                }
            } else {
                meta.namespace = None;
            }
            meta.uid = Some(Uuid::new_v4().to_string());
            meta.resource_version = Some(
                (self.resource_version.fetch_add(1, Ordering::Relaxed) + 1).to_string(),
            );
            meta.creation_timestamp = Some(Utc::now().trunc_subsecs(0));
        }

        let explicit = obj.metadata().name.clone();
        let prefix = obj.metadata().generate_name.clone();

        let attempts = if explicit.is_some() { 1 } else { GENERATE_ATTEMPTS };
        for _ in 0..attempts {
            let name = match (&explicit, &prefix) {
                (Some(name), _) => name.clone(),
                (None, Some(prefix)) => generate_name(prefix),
                (None, None) => {
                    return Err(invalid::<K>("", "name or generateName is required"));
                }
            };
            validate_name::<K>(&name)?;
            obj.metadata_mut().name = Some(name.clone());

            let key = ObjectKey {
                cluster: scope.cluster.as_str().to_string(),
                group: K::GROUP,
                plural: K::PLURAL,
                namespace: namespace.clone(),
                name: name.clone(),
            };

            match self.objects.entry(key) {
                Entry::Vacant(slot) => {
                    let value = serde_json::to_value(&obj).map_err(internal)?;
                    slot.insert(StoredObject {
                        value,
                        labels: obj.metadata().labels.clone(),
                    });
                    return Ok(obj);
                }
                Entry::Occupied(_) if explicit.is_some() => {
                    return Err(TransportError::Status {
                        code: 409,
                        reason: "AlreadyExists".to_string(),
                        message: format!("{} \"{}\" already exists", K::PLURAL, name),
                    });
                }
                Entry::Occupied(_) => {
                    tracing::debug!(name = %name, "Generated name collided, retrying");
                }
            }
        }

        Err(TransportError::Status {
            code: 409,
            reason: "AlreadyExists".to_string(),
            message: format!(
                "{} could not generate a unique name after {} attempts",
                K::PLURAL,
                GENERATE_ATTEMPTS
            ),
        })
    }

    pub fn get<K: Resource>(&self, scope: &Scope, name: &str) -> Result<K, TransportError> {
        self.counters.gets.fetch_add(1, Ordering::Relaxed);
        let key = key_for::<K>(scope, name)?;
        let stored = self
            .objects
            .get(&key)
            .map(|entry| entry.value.clone())
            .ok_or_else(|| not_found::<K>(name))?;
        serde_json::from_value(stored).map_err(internal)
    }

    pub fn delete<K: Resource>(&self, scope: &Scope, name: &str) -> Result<(), TransportError> {
        self.counters.deletes.fetch_add(1, Ordering::Relaxed);
        let key = key_for::<K>(scope, name)?;
        self.objects
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| not_found::<K>(name))
    }

    pub fn list<K: Listable>(
        &self,
        scope: &Scope,
        label_selector: Option<&str>,
    ) -> Result<Vec<K>, TransportError> {
        self.counters.lists.fetch_add(1, Ordering::Relaxed);
        let namespace = scope.namespace_for::<K>()?;
        let selector = label_selector.map(LabelSelector::parse).transpose()?;

        let mut matched: Vec<(String, serde_json::Value)> = self
            .objects
            .iter()
            .filter(|entry| {
                let key = entry.key();
                key.cluster == scope.cluster.as_str()
                    && key.group == K::GROUP
                    && key.plural == K::PLURAL
                    && (namespace.is_none() || key.namespace.as_deref() == namespace)
                    && selector
                        .as_ref()
                        .map_or(true, |s| s.matches(&entry.value().labels))
            })
            .map(|entry| (entry.key().name.clone(), entry.value().value.clone()))
            .collect();
        matched.sort_by(|a, b| a.0.cmp(&b.0));

        matched
            .into_iter()
            .map(|(_, value)| serde_json::from_value(value).map_err(internal))
            .collect()
    }

    /// Number of stored objects of kind `K` in `cluster`.
    pub fn count<K: Resource>(&self, cluster: &ClusterPath) -> usize {
        self.objects
            .iter()
            .filter(|entry| {
                let key = entry.key();
                key.cluster == cluster.as_str() && key.group == K::GROUP && key.plural == K::PLURAL
            })
            .count()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn operations(&self) -> OperationCounts {
        OperationCounts {
            creates: self.counters.creates.load(Ordering::Relaxed),
            gets: self.counters.gets.load(Ordering::Relaxed),
            deletes: self.counters.deletes.load(Ordering::Relaxed),
            lists: self.counters.lists.load(Ordering::Relaxed),
        }
    }
}

fn key_for<K: Resource>(scope: &Scope, name: &str) -> Result<ObjectKey, TransportError> {
    Ok(ObjectKey {
        cluster: scope.cluster.as_str().to_string(),
        group: K::GROUP,
        plural: K::PLURAL,
        namespace: scope.namespace_for::<K>()?.map(str::to_string),
        name: name.to_string(),
    })
}

fn generate_name(prefix: &str) -> String {
    let base: String = prefix.chars().take(MAX_GENERATED_BASE).collect();
    let bytes = Uuid::new_v4().into_bytes();
    let suffix: String = bytes[..SUFFIX_LEN]
        .iter()
        .map(|b| SUFFIX_ALPHABET[usize::from(*b) % SUFFIX_ALPHABET.len()] as char)
        .collect();
    base + &suffix
}

/// DNS-1123 subdomain check applied to every stored name.
fn validate_name<K: Resource>(name: &str) -> Result<(), TransportError> {
    let valid_chars = name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.');
    let valid_edges = name
        .bytes()
        .next()
        .zip(name.bytes().last())
        .map_or(false, |(first, last)| {
            first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric()
        });

    if name.len() > MAX_NAME_LEN || !valid_chars || !valid_edges {
        return Err(invalid::<K>(
            name,
            "a lowercase RFC 1123 subdomain must consist of lower case alphanumeric characters, '-' or '.'",
        ));
    }
    Ok(())
}

fn not_found<K: Resource>(name: &str) -> TransportError {
    TransportError::Status {
        code: 404,
        reason: "NotFound".to_string(),
        message: format!("{} \"{}\" not found", K::PLURAL, name),
    }
}

fn invalid<K: Resource>(name: &str, reason: &str) -> TransportError {
    TransportError::Status {
        code: 422,
        reason: "Invalid".to_string(),
        message: format!("{} \"{}\" is invalid: metadata.name: {}", K::KIND, name, reason),
    }
}

fn bad_request(message: String) -> TransportError {
    TransportError::Status {
        code: 400,
        reason: "BadRequest".to_string(),
        message,
    }
}

fn internal(e: serde_json::Error) -> TransportError {
    TransportError::Status {
        code: 500,
        reason: "InternalError".to_string(),
        message: e.to_string(),
    }
}

/// Equality-based label selector: `a=b`, `a==b`, `a!=b`, `a`, `!a`, comma separated.
#[derive(Debug, PartialEq, Eq)]
struct LabelSelector {
    terms: Vec<Requirement>,
}

#[derive(Debug, PartialEq, Eq)]
enum Requirement {
    Equals(String, String),
    NotEquals(String, String),
    Exists(String),
    NotExists(String),
}

impl LabelSelector {
    fn parse(selector: &str) -> Result<Self, TransportError> {
        let mut terms = Vec::new();
        for raw in selector.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let term = if let Some((key, value)) = raw.split_once("!=") {
                Requirement::NotEquals(key.trim().to_string(), value.trim().to_string())
            } else if let Some((key, value)) = raw.split_once("==").or_else(|| raw.split_once('=')) {
                Requirement::Equals(key.trim().to_string(), value.trim().to_string())
            } else if let Some(key) = raw.strip_prefix('!') {
                Requirement::NotExists(key.trim().to_string())
            } else {
                Requirement::Exists(raw.to_string())
            };

            let key = match &term {
                Requirement::Equals(k, _)
                | Requirement::NotEquals(k, _)
                | Requirement::Exists(k)
                | Requirement::NotExists(k) => k,
            };
            if key.is_empty() {
                return Err(bad_request(format!(
                    "unable to parse requirement: invalid label selector term '{}'",
                    raw
                )));
            }
            terms.push(term);
        }
        Ok(Self { terms })
    }

    fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.terms.iter().all(|term| match term {
            Requirement::Equals(k, v) => labels.get(k) == Some(v),
            Requirement::NotEquals(k, v) => labels.get(k) != Some(v),
            Requirement::Exists(k) => labels.contains_key(k),
            Requirement::NotExists(k) => !labels.contains_key(k),
        })
    }
}

/// A [`Transport`] over an [`InMemoryCluster`] speaking one wire format.
#[derive(Debug, Clone)]
pub struct InMemoryTransport {
    cluster: Arc<InMemoryCluster>,
    serializer: Serializer,
    latency: Option<Duration>,
}

impl InMemoryTransport {
    pub fn new(cluster: Arc<InMemoryCluster>, content_type: ContentType) -> Self {
        Self {
            cluster,
            serializer: Serializer::new(content_type),
            latency: None,
        }
    }

    /// Add a fixed delay to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn cluster(&self) -> &Arc<InMemoryCluster> {
        &self.cluster
    }

    pub fn content_type(&self) -> ContentType {
        self.serializer.content_type()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn wire<K: Resource>(&self, obj: &K) -> Result<K, TransportError> {
        let bytes = self.serializer.encode(obj).map_err(TransportError::Encode)?;
        self.serializer.decode(&bytes).map_err(TransportError::Decode)
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn create<K: Resource>(&self, scope: &Scope, obj: &K) -> Result<K, TransportError> {
        self.simulate_latency().await;
        let request = self.wire(obj)?;
        let created = self.cluster.create(scope, request)?;
        self.wire(&created)
    }

    async fn get<K: Resource>(&self, scope: &Scope, name: &str) -> Result<K, TransportError> {
        self.simulate_latency().await;
        let found: K = self.cluster.get(scope, name)?;
        self.wire(&found)
    }

    async fn delete<K: Resource>(&self, scope: &Scope, name: &str) -> Result<(), TransportError> {
        self.simulate_latency().await;
        self.cluster.delete::<K>(scope, name)
    }

    async fn list<K: Listable>(
        &self,
        scope: &Scope,
        label_selector: Option<&str>,
    ) -> Result<Vec<K>, TransportError> {
        self.simulate_latency().await;
        let items: Vec<K> = self.cluster.list(scope, label_selector)?;
        let list = K::list_of(items);
        let bytes = self.serializer.encode(&list).map_err(TransportError::Encode)?;
        let decoded: K::List = self.serializer.decode(&bytes).map_err(TransportError::Decode)?;
        Ok(K::items(decoded))
    }
}

/// Factory handing out [`InMemoryTransport`]s over one shared cluster.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFactory {
    cluster: Arc<InMemoryCluster>,
    latency: Option<Duration>,
}

impl InMemoryFactory {
    pub fn new(cluster: Arc<InMemoryCluster>) -> Self {
        Self {
            cluster,
            latency: None,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn cluster(&self) -> &Arc<InMemoryCluster> {
        &self.cluster
    }
}

impl ClientFactory for InMemoryFactory {
    type Client = InMemoryTransport;

    fn build(&self, format: &str) -> Result<InMemoryTransport, ConfigurationError> {
        let content_type: ContentType = format.parse()?;
        let transport = InMemoryTransport::new(Arc::clone(&self.cluster), content_type);
        Ok(match self.latency {
            Some(latency) => transport.with_latency(latency),
            None => transport,
        })
    }
}
