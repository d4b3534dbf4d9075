// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! The lifecycle workloads.
//!
//! Each invocation creates one object with a server-generated name, reads it
//! back by that name and deletes it. The first failing step aborts the
//! invocation; nothing is retried. Every step races the cancellation token.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{ConfigurationError, SerializationError, TransportError, WorkloadError};
use crate::resources::{sample_rules, ClusterRole, ConfigMap, ObjectMeta, Resource};
use crate::transport::{Api, ClusterPath, Transport};

/// Namespace used by namespaced workloads.
pub const DEFAULT_NAMESPACE: &str = "default";

/// One network step of a lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Create,
    Get,
    Delete,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::Create => "create",
            Step::Get => "get",
            Step::Delete => "delete",
        };
        write!(f, "{}", s)
    }
}

/// Kind of object a workload cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    ConfigMap,
    ClusterRole,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::ConfigMap => "configmap",
            ResourceKind::ClusterRole => "clusterrole",
        };
        write!(f, "{}", s)
    }
}

/// The closed set of lifecycle workloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Workload {
    /// A namespaced ConfigMap in `default`.
    ConfigMap,
    /// A cluster-scoped ClusterRole with the two sample rules.
    ClusterRole,
}

impl Workload {
    pub const ALL: [Workload; 2] = [Workload::ConfigMap, Workload::ClusterRole];

    /// Name used in run identifiers and reports.
    pub fn name(self) -> &'static str {
        match self {
            Workload::ConfigMap => "configmap-lifecycle",
            Workload::ClusterRole => "clusterrole-lifecycle",
        }
    }

    pub fn kind(self) -> ResourceKind {
        match self {
            Workload::ConfigMap => ResourceKind::ConfigMap,
            Workload::ClusterRole => ResourceKind::ClusterRole,
        }
    }

    /// Run one lifecycle in the root logical cluster.
    pub async fn run<C: Transport>(
        &self,
        cancel: &CancellationToken,
        client: &C,
        base_name: &str,
    ) -> Result<(), WorkloadError> {
        self.run_in(cancel, client, &ClusterPath::root(), base_name)
            .await
    }

    /// Run one lifecycle in `cluster`.
    pub async fn run_in<C: Transport>(
        &self,
        cancel: &CancellationToken,
        client: &C,
        cluster: &ClusterPath,
        base_name: &str,
    ) -> Result<(), WorkloadError> {
        let kind = self.kind();
        match self {
            Workload::ConfigMap => {
                let api: Api<'_, C, ConfigMap> = Api::namespaced(client, cluster, DEFAULT_NAMESPACE);
                cycle(cancel, &api, config_map(base_name), kind).await
            }
            Workload::ClusterRole => {
                let api: Api<'_, C, ClusterRole> = Api::all(client, cluster);
                cycle(cancel, &api, cluster_role(base_name), kind).await
            }
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Workload {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "configmap" | "configmaps" | "configmap-lifecycle" | "cm" => Ok(Workload::ConfigMap),
            "clusterrole" | "clusterroles" | "clusterrole-lifecycle" | "rbac" => {
                Ok(Workload::ClusterRole)
            }
            _ => Err(ConfigurationError::InvalidFieldValue {
                field: "workload",
                value: s.to_string(),
                reason: "expected 'configmap' or 'clusterrole'".to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Workload {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Workload> for String {
    fn from(value: Workload) -> Self {
        value.name().to_string()
    }
}

fn config_map(base_name: &str) -> ConfigMap {
    let mut cm = ConfigMap::new(ObjectMeta::generated(base_name));
    cm.metadata.namespace = Some(DEFAULT_NAMESPACE.to_string());
    cm.data.insert(base_name.to_string(), base_name.to_string());
    cm
}

fn cluster_role(base_name: &str) -> ClusterRole {
    ClusterRole::new(ObjectMeta::generated(base_name), sample_rules())
}

async fn cycle<C: Transport, K: Resource>(
    cancel: &CancellationToken,
    api: &Api<'_, C, K>,
    obj: K,
    kind: ResourceKind,
) -> Result<(), WorkloadError> {
    let created = step(cancel, Step::Create, kind, api.create(&obj)).await?;
    let name = created
        .metadata()
        .name
        .clone()
        .ok_or_else(|| WorkloadError::Failed {
            step: Step::Create,
            kind,
            source: TransportError::Decode(SerializationError::InvalidValue {
                field: "metadata.name",
                reason: "server did not assign a name".to_string(),
            }),
        })?;

    // Existence check only; the returned object is not compared.
    step(cancel, Step::Get, kind, api.get(&name)).await?;
    step(cancel, Step::Delete, kind, api.delete(&name)).await
}

async fn step<T, F>(
    cancel: &CancellationToken,
    step: Step,
    kind: ResourceKind,
    call: F,
) -> Result<T, WorkloadError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    if cancel.is_cancelled() {
        return Err(WorkloadError::Cancelled { step, kind });
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(WorkloadError::Cancelled { step, kind }),
        result = call => result.map_err(|source| WorkloadError::Failed { step, kind, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_type::ContentType;
    use crate::memory::{InMemoryCluster, InMemoryTransport};
    use std::sync::Arc;
    use std::time::Duration;

    fn transport(ct: ContentType) -> (Arc<InMemoryCluster>, InMemoryTransport) {
        let cluster = Arc::new(InMemoryCluster::new());
        let transport = InMemoryTransport::new(Arc::clone(&cluster), ct);
        (cluster, transport)
    }

    #[test]
    fn test_parse_workload() {
        assert_eq!("ConfigMap".parse::<Workload>().unwrap(), Workload::ConfigMap);
        assert_eq!(
            "clusterrole-lifecycle".parse::<Workload>().unwrap(),
            Workload::ClusterRole
        );
        assert!("secret".parse::<Workload>().is_err());
    }

    #[test]
    fn test_config_map_template() {
        let cm = config_map("bench-json");
        assert_eq!(cm.metadata.generate_name.as_deref(), Some("bench-json"));
        assert_eq!(cm.data.get("bench-json").map(String::as_str), Some("bench-json"));
        assert!(cm.metadata.name.is_none());
    }

    #[tokio::test]
    async fn test_lifecycle_leaves_nothing_behind() {
        for workload in Workload::ALL {
            for ct in ContentType::ALL {
                let (cluster, transport) = transport(ct);
                let cancel = CancellationToken::new();
                workload.run(&cancel, &transport, "lifecycle-").await.unwrap();
                assert!(cluster.is_empty(), "{} over {} left residue", workload, ct);

                let ops = cluster.operations();
                assert_eq!((ops.creates, ops.gets, ops.deletes), (1, 1, 1));
            }
        }
    }

    #[tokio::test]
    async fn test_invalid_base_name_fails_at_create() {
        let (cluster, transport) = transport(ContentType::Json);
        let cancel = CancellationToken::new();
        let err = Workload::ClusterRole
            .run(&cancel, &transport, "Not/A/Name")
            .await
            .unwrap_err();
        assert_eq!(err.step(), Step::Create);
        assert_eq!(cluster.operations().gets, 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (cluster, transport) = transport(ContentType::Yaml);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = Workload::ConfigMap
            .run(&cancel, &transport, "cancelled-")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkloadError::Cancelled {
                step: Step::Create,
                ..
            }
        ));
        assert_eq!(cluster.operations().creates, 0);
    }

    #[tokio::test]
    async fn test_cancelled_mid_flight() {
        let cluster = Arc::new(InMemoryCluster::new());
        let transport = InMemoryTransport::new(Arc::clone(&cluster), ContentType::Cbor)
            .with_latency(Duration::from_secs(30));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = Workload::ClusterRole
            .run(&cancel, &transport, "slow-")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkloadError::Cancelled { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
