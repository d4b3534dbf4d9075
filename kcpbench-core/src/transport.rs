// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! The CRUD contract the workloads are written against.
//!
//! [`Transport`] is implemented by the HTTP [`ClusterClient`](crate::client::ClusterClient)
//! and by the [`InMemoryTransport`](crate::memory::InMemoryTransport). Workloads
//! use the typed [`Api`] view, which pins a logical cluster, an optional
//! namespace and a resource kind.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::resources::{Listable, Resource};

/// Path of a logical cluster, e.g. `root` or `root:org:team`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterPath(String);

impl ClusterPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The root logical cluster.
    pub fn root() -> Self {
        Self("root".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClusterPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for ClusterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a request lands: a logical cluster and, for namespaced kinds, a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    pub cluster: ClusterPath,
    pub namespace: Option<String>,
}

impl Scope {
    pub fn cluster(cluster: ClusterPath) -> Self {
        Self {
            cluster,
            namespace: None,
        }
    }

    pub fn namespaced(cluster: ClusterPath, namespace: impl Into<String>) -> Self {
        Self {
            cluster,
            namespace: Some(namespace.into()),
        }
    }

    /// The namespace, required when `K` is namespaced.
    pub fn namespace_for<K: Resource>(&self) -> Result<Option<&str>, TransportError> {
        match (K::NAMESPACED, self.namespace.as_deref()) {
            (true, None) => Err(TransportError::MissingNamespace { kind: K::KIND }),
            (true, ns) => Ok(ns),
            (false, _) => Ok(None),
        }
    }
}

/// Remote CRUD over typed resources.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Create `obj`. The server assigns the name when `generateName` is set.
    async fn create<K: Resource>(&self, scope: &Scope, obj: &K) -> Result<K, TransportError>;

    async fn get<K: Resource>(&self, scope: &Scope, name: &str) -> Result<K, TransportError>;

    async fn delete<K: Resource>(&self, scope: &Scope, name: &str) -> Result<(), TransportError>;

    /// List objects, optionally filtered by a label selector.
    async fn list<K: Listable>(
        &self,
        scope: &Scope,
        label_selector: Option<&str>,
    ) -> Result<Vec<K>, TransportError>;
}

/// A typed view of one resource kind in one scope.
pub struct Api<'c, C, K> {
    client: &'c C,
    scope: Scope,
    _kind: PhantomData<fn() -> K>,
}

impl<'c, C: Transport, K: Resource> Api<'c, C, K> {
    /// Namespaced resources of `cluster`.
    pub fn namespaced(client: &'c C, cluster: &ClusterPath, namespace: &str) -> Self {
        Self {
            client,
            scope: Scope::namespaced(cluster.clone(), namespace),
            _kind: PhantomData,
        }
    }

    /// Cluster-scoped resources of `cluster`.
    pub fn all(client: &'c C, cluster: &ClusterPath) -> Self {
        Self {
            client,
            scope: Scope::cluster(cluster.clone()),
            _kind: PhantomData,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub async fn create(&self, obj: &K) -> Result<K, TransportError> {
        self.client.create(&self.scope, obj).await
    }

    pub async fn get(&self, name: &str) -> Result<K, TransportError> {
        self.client.get(&self.scope, name).await
    }

    pub async fn delete(&self, name: &str) -> Result<(), TransportError> {
        self.client.delete::<K>(&self.scope, name).await
    }
}

impl<'c, C: Transport, K: Listable> Api<'c, C, K> {
    pub async fn list(&self, label_selector: Option<&str>) -> Result<Vec<K>, TransportError> {
        self.client.list(&self.scope, label_selector).await
    }
}
