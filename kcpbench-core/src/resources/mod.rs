// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Typed API objects exercised by the benchmarks.
//!
//! Field names follow the Kubernetes JSON schema so the same structs serve the
//! JSON, YAML and CBOR codecs. [`proto`] holds the protobuf mirror of each
//! type with `k8s.io/api` field tags.

pub mod proto;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SerializationError;

/// Group, version and kind of an API type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersionKind {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
}

impl GroupVersionKind {
    /// `apiVersion` as written on the wire.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

/// Any top-level object a codec can encode and decode.
pub trait Object:
    Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    const GROUP: &'static str;
    const VERSION: &'static str;
    const KIND: &'static str;

    /// Protobuf representation (without type meta, which lives in the envelope).
    type Proto: prost::Message + Default;

    fn gvk() -> GroupVersionKind {
        GroupVersionKind {
            group: Self::GROUP,
            version: Self::VERSION,
            kind: Self::KIND,
        }
    }

    /// The `apiVersion` and `kind` carried by this value.
    fn type_meta(&self) -> (&str, &str);

    fn set_type_meta(&mut self, api_version: String, kind: String);

    fn to_proto(&self) -> Self::Proto;

    /// Build from protobuf. Type meta is left empty for the codec to fill.
    fn from_proto(proto: Self::Proto) -> Result<Self, SerializationError>;
}

/// An object stored by the server under a name.
pub trait Resource: Object {
    /// Lower-case plural used in request paths.
    const PLURAL: &'static str;
    const NAMESPACED: bool;

    fn metadata(&self) -> &ObjectMeta;

    fn metadata_mut(&mut self) -> &mut ObjectMeta;
}

/// A resource that can be listed by label selector.
pub trait Listable: Resource {
    type List: Object;

    fn items(list: Self::List) -> Vec<Self>;

    fn list_of(items: Vec<Self>) -> Self::List;
}

/// Deserialize a string map, rejecting duplicate keys instead of keeping the last.
fn unique_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct UniqueMapVisitor;

    impl<'de> Visitor<'de> for UniqueMapVisitor {
        type Value = BTreeMap<String, String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of strings")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut map = BTreeMap::new();
            while let Some((key, value)) = access.next_entry::<String, String>()? {
                if map.contains_key(&key) {
                    return Err(de::Error::custom(format!("duplicate map key '{}'", key)));
                }
                map.insert(key, value);
            }
            Ok(map)
        }
    }

    deserializer.deserialize_map(UniqueMapVisitor)
}

/// Standard object metadata (the subset the benchmarks touch).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "unique_map"
    )]
    pub labels: BTreeMap<String, String>,
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "unique_map"
    )]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,
}

impl ObjectMeta {
    /// Metadata with an exact name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Metadata asking the server to generate a name from `prefix`.
    pub fn generated(prefix: impl Into<String>) -> Self {
        Self {
            generate_name: Some(prefix.into()),
            ..Default::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// List metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(rename = "continue", default, skip_serializing_if = "Option::is_none")]
    pub continue_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_item_count: Option<i64>,
}

/// A namespaced key/value object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "unique_map"
    )]
    pub data: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immutable: Option<bool>,
}

impl ConfigMap {
    pub fn new(metadata: ObjectMeta) -> Self {
        Self {
            api_version: Self::gvk().api_version(),
            kind: Self::KIND.to_string(),
            metadata,
            data: BTreeMap::new(),
            immutable: None,
        }
    }
}

impl Object for ConfigMap {
    const GROUP: &'static str = "";
    const VERSION: &'static str = "v1";
    const KIND: &'static str = "ConfigMap";
    type Proto = proto::ConfigMap;

    fn type_meta(&self) -> (&str, &str) {
        (&self.api_version, &self.kind)
    }

    fn set_type_meta(&mut self, api_version: String, kind: String) {
        self.api_version = api_version;
        self.kind = kind;
    }

    fn to_proto(&self) -> Self::Proto {
        proto::ConfigMap {
            metadata: Some(proto::ObjectMeta::from(&self.metadata)),
            data: self.data.clone(),
            immutable: self.immutable,
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, SerializationError> {
        Ok(Self {
            api_version: String::new(),
            kind: String::new(),
            metadata: proto.metadata.map(ObjectMeta::try_from).transpose()?.unwrap_or_default(),
            data: proto.data,
            immutable: proto.immutable,
        })
    }
}

impl Resource for ConfigMap {
    const PLURAL: &'static str = "configmaps";
    const NAMESPACED: bool = true;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// One authorization rule of a role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    pub verbs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api_groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_names: Vec<String>,
    #[serde(
        rename = "nonResourceURLs",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub non_resource_urls: Vec<String>,
}

impl PolicyRule {
    /// A rule granting `verbs` on `resources` of one API group.
    pub fn new(api_group: &str, resources: &[&str], verbs: &[&str]) -> Self {
        Self {
            verbs: verbs.iter().map(|v| v.to_string()).collect(),
            api_groups: vec![api_group.to_string()],
            resources: resources.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }
}

/// A cluster-scoped access policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRole {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<PolicyRule>,
}

impl ClusterRole {
    pub fn new(metadata: ObjectMeta, rules: Vec<PolicyRule>) -> Self {
        Self {
            api_version: Self::gvk().api_version(),
            kind: Self::KIND.to_string(),
            metadata,
            rules,
        }
    }
}

impl Object for ClusterRole {
    const GROUP: &'static str = "rbac.authorization.k8s.io";
    const VERSION: &'static str = "v1";
    const KIND: &'static str = "ClusterRole";
    type Proto = proto::ClusterRole;

    fn type_meta(&self) -> (&str, &str) {
        (&self.api_version, &self.kind)
    }

    fn set_type_meta(&mut self, api_version: String, kind: String) {
        self.api_version = api_version;
        self.kind = kind;
    }

    fn to_proto(&self) -> Self::Proto {
        proto::ClusterRole {
            metadata: Some(proto::ObjectMeta::from(&self.metadata)),
            rules: self.rules.iter().map(proto::PolicyRule::from).collect(),
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, SerializationError> {
        Ok(Self {
            api_version: String::new(),
            kind: String::new(),
            metadata: proto.metadata.map(ObjectMeta::try_from).transpose()?.unwrap_or_default(),
            rules: proto.rules.into_iter().map(PolicyRule::from).collect(),
        })
    }
}

impl Resource for ClusterRole {
    const PLURAL: &'static str = "clusterroles";
    const NAMESPACED: bool = false;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

/// A namespace inside one logical cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<NamespaceSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NamespaceStatus>,
}

impl Namespace {
    pub fn new(metadata: ObjectMeta) -> Self {
        Self {
            api_version: Self::gvk().api_version(),
            kind: Self::KIND.to_string(),
            metadata,
            spec: None,
            status: None,
        }
    }
}

impl Object for Namespace {
    const GROUP: &'static str = "";
    const VERSION: &'static str = "v1";
    const KIND: &'static str = "Namespace";
    type Proto = proto::Namespace;

    fn type_meta(&self) -> (&str, &str) {
        (&self.api_version, &self.kind)
    }

    fn set_type_meta(&mut self, api_version: String, kind: String) {
        self.api_version = api_version;
        self.kind = kind;
    }

    fn to_proto(&self) -> Self::Proto {
        proto::Namespace {
            metadata: Some(proto::ObjectMeta::from(&self.metadata)),
            spec: self.spec.as_ref().map(|spec| proto::NamespaceSpec {
                finalizers: spec.finalizers.clone(),
            }),
            status: self.status.as_ref().map(|status| proto::NamespaceStatus {
                phase: status.phase.clone(),
            }),
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, SerializationError> {
        Ok(Self {
            api_version: String::new(),
            kind: String::new(),
            metadata: proto.metadata.map(ObjectMeta::try_from).transpose()?.unwrap_or_default(),
            spec: proto.spec.map(|spec| NamespaceSpec {
                finalizers: spec.finalizers,
            }),
            status: proto.status.map(|status| NamespaceStatus {
                phase: status.phase,
            }),
        })
    }
}

impl Resource for Namespace {
    const PLURAL: &'static str = "namespaces";
    const NAMESPACED: bool = false;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl Listable for Namespace {
    type List = NamespaceList;

    fn items(list: Self::List) -> Vec<Self> {
        list.items
    }

    fn list_of(items: Vec<Self>) -> Self::List {
        NamespaceList {
            api_version: NamespaceList::gvk().api_version(),
            kind: NamespaceList::KIND.to_string(),
            metadata: ListMeta::default(),
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceList {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default)]
    pub items: Vec<Namespace>,
}

impl Object for NamespaceList {
    const GROUP: &'static str = "";
    const VERSION: &'static str = "v1";
    const KIND: &'static str = "NamespaceList";
    type Proto = proto::NamespaceList;

    fn type_meta(&self) -> (&str, &str) {
        (&self.api_version, &self.kind)
    }

    fn set_type_meta(&mut self, api_version: String, kind: String) {
        self.api_version = api_version;
        self.kind = kind;
    }

    fn to_proto(&self) -> Self::Proto {
        proto::NamespaceList {
            metadata: Some(proto::ListMeta::from(&self.metadata)),
            items: self.items.iter().map(Namespace::to_proto).collect(),
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, SerializationError> {
        Ok(Self {
            api_version: String::new(),
            kind: String::new(),
            metadata: proto.metadata.map(ListMeta::from).unwrap_or_default(),
            items: proto
                .items
                .into_iter()
                .map(Namespace::from_proto)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Error (or success) report returned by the server for non-object responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
}

impl Status {
    /// A failure status as the server would send it.
    pub fn failure(code: u16, reason: &str, message: impl Into<String>) -> Self {
        Self {
            api_version: Self::gvk().api_version(),
            kind: Self::KIND.to_string(),
            metadata: ListMeta::default(),
            status: Some("Failure".to_string()),
            message: Some(message.into()),
            reason: Some(reason.to_string()),
            code: Some(i32::from(code)),
        }
    }
}

impl Object for Status {
    const GROUP: &'static str = "";
    const VERSION: &'static str = "v1";
    const KIND: &'static str = "Status";
    type Proto = proto::Status;

    fn type_meta(&self) -> (&str, &str) {
        (&self.api_version, &self.kind)
    }

    fn set_type_meta(&mut self, api_version: String, kind: String) {
        self.api_version = api_version;
        self.kind = kind;
    }

    fn to_proto(&self) -> Self::Proto {
        proto::Status {
            metadata: Some(proto::ListMeta::from(&self.metadata)),
            status: self.status.clone(),
            message: self.message.clone(),
            reason: self.reason.clone(),
            code: self.code,
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, SerializationError> {
        Ok(Self {
            api_version: String::new(),
            kind: String::new(),
            metadata: proto.metadata.map(ListMeta::from).unwrap_or_default(),
            status: proto.status,
            message: proto.message,
            reason: proto.reason,
            code: proto.code,
        })
    }
}

/// The fixed access-policy rules used by the ClusterRole workload and the
/// serializer sample: read-only pods, write deployments.
pub fn sample_rules() -> Vec<PolicyRule> {
    vec![
        PolicyRule::new("", &["pods"], &["get", "list", "watch"]),
        PolicyRule::new("apps", &["deployments"], &["create", "update", "delete"]),
    ]
}

/// The representative object every serializer is measured against.
pub fn sample_cluster_role(name: &str) -> ClusterRole {
    ClusterRole::new(ObjectMeta::named(name), sample_rules())
}
