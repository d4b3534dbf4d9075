// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Protobuf messages for the benchmark resources.
//!
//! Tags match `k8s.io/api` and `k8s.io/apimachinery` `generated.proto`, so
//! bytes produced here are readable by a real API server and vice versa.
//! All scalar fields are proto2 `optional` to keep presence information.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::SerializationError;

/// `runtime.TypeMeta` inside the envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeMeta {
    #[prost(string, optional, tag = "1")]
    pub api_version: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub kind: Option<String>,
}

/// `runtime.Unknown`: the envelope written after the `k8s\0` magic.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Unknown {
    #[prost(message, optional, tag = "1")]
    pub type_meta: Option<TypeMeta>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub raw: Option<Vec<u8>>,
    #[prost(string, optional, tag = "3")]
    pub content_encoding: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub content_type: Option<String>,
}

/// `metav1.Time`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Time {
    #[prost(int64, optional, tag = "1")]
    pub seconds: Option<i64>,
    #[prost(int32, optional, tag = "2")]
    pub nanos: Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ObjectMeta {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub generate_name: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub namespace: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub uid: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub resource_version: Option<String>,
    #[prost(int64, optional, tag = "7")]
    pub generation: Option<i64>,
    #[prost(message, optional, tag = "8")]
    pub creation_timestamp: Option<Time>,
    #[prost(btree_map = "string, string", tag = "11")]
    pub labels: BTreeMap<String, String>,
    #[prost(btree_map = "string, string", tag = "12")]
    pub annotations: BTreeMap<String, String>,
    #[prost(string, repeated, tag = "14")]
    pub finalizers: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListMeta {
    #[prost(string, optional, tag = "2")]
    pub resource_version: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub continue_token: Option<String>,
    #[prost(int64, optional, tag = "4")]
    pub remaining_item_count: Option<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConfigMap {
    #[prost(message, optional, tag = "1")]
    pub metadata: Option<ObjectMeta>,
    #[prost(btree_map = "string, string", tag = "2")]
    pub data: BTreeMap<String, String>,
    #[prost(bool, optional, tag = "4")]
    pub immutable: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PolicyRule {
    #[prost(string, repeated, tag = "1")]
    pub verbs: Vec<String>,
    #[prost(string, repeated, tag = "2")]
    pub api_groups: Vec<String>,
    #[prost(string, repeated, tag = "3")]
    pub resources: Vec<String>,
    #[prost(string, repeated, tag = "4")]
    pub resource_names: Vec<String>,
    #[prost(string, repeated, tag = "5")]
    pub non_resource_urls: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClusterRole {
    #[prost(message, optional, tag = "1")]
    pub metadata: Option<ObjectMeta>,
    #[prost(message, repeated, tag = "2")]
    pub rules: Vec<PolicyRule>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamespaceSpec {
    #[prost(string, repeated, tag = "1")]
    pub finalizers: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamespaceStatus {
    #[prost(string, optional, tag = "1")]
    pub phase: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Namespace {
    #[prost(message, optional, tag = "1")]
    pub metadata: Option<ObjectMeta>,
    #[prost(message, optional, tag = "2")]
    pub spec: Option<NamespaceSpec>,
    #[prost(message, optional, tag = "3")]
    pub status: Option<NamespaceStatus>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamespaceList {
    #[prost(message, optional, tag = "1")]
    pub metadata: Option<ListMeta>,
    #[prost(message, repeated, tag = "2")]
    pub items: Vec<Namespace>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Status {
    #[prost(message, optional, tag = "1")]
    pub metadata: Option<ListMeta>,
    #[prost(string, optional, tag = "2")]
    pub status: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub message: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub reason: Option<String>,
    #[prost(int32, optional, tag = "6")]
    pub code: Option<i32>,
}

impl From<&DateTime<Utc>> for Time {
    fn from(value: &DateTime<Utc>) -> Self {
        Self {
            seconds: Some(value.timestamp()),
            nanos: Some(value.timestamp_subsec_nanos() as i32),
        }
    }
}

impl TryFrom<Time> for DateTime<Utc> {
    type Error = SerializationError;

    fn try_from(value: Time) -> Result<Self, Self::Error> {
        let seconds = value.seconds.unwrap_or_default();
        let nanos = u32::try_from(value.nanos.unwrap_or_default()).map_err(|_| {
            SerializationError::InvalidValue {
                field: "creationTimestamp",
                reason: "negative nanoseconds".to_string(),
            }
        })?;
        DateTime::from_timestamp(seconds, nanos).ok_or_else(|| SerializationError::InvalidValue {
            field: "creationTimestamp",
            reason: format!("timestamp {}s out of range", seconds),
        })
    }
}

impl From<&super::ObjectMeta> for ObjectMeta {
    fn from(meta: &super::ObjectMeta) -> Self {
        Self {
            name: meta.name.clone(),
            generate_name: meta.generate_name.clone(),
            namespace: meta.namespace.clone(),
            uid: meta.uid.clone(),
            resource_version: meta.resource_version.clone(),
            generation: meta.generation,
            creation_timestamp: meta.creation_timestamp.as_ref().map(Time::from),
            labels: meta.labels.clone(),
            annotations: meta.annotations.clone(),
            finalizers: meta.finalizers.clone(),
        }
    }
}

impl TryFrom<ObjectMeta> for super::ObjectMeta {
    type Error = SerializationError;

    fn try_from(meta: ObjectMeta) -> Result<Self, Self::Error> {
        Ok(Self {
            name: meta.name,
            generate_name: meta.generate_name,
            namespace: meta.namespace,
            uid: meta.uid,
            resource_version: meta.resource_version,
            generation: meta.generation,
            creation_timestamp: meta
                .creation_timestamp
                .map(DateTime::<Utc>::try_from)
                .transpose()?,
            labels: meta.labels,
            annotations: meta.annotations,
            finalizers: meta.finalizers,
        })
    }
}

impl From<&super::ListMeta> for ListMeta {
    fn from(meta: &super::ListMeta) -> Self {
        Self {
            resource_version: meta.resource_version.clone(),
            continue_token: meta.continue_token.clone(),
            remaining_item_count: meta.remaining_item_count,
        }
    }
}

impl From<ListMeta> for super::ListMeta {
    fn from(meta: ListMeta) -> Self {
        Self {
            resource_version: meta.resource_version,
            continue_token: meta.continue_token,
            remaining_item_count: meta.remaining_item_count,
        }
    }
}

impl From<&super::PolicyRule> for PolicyRule {
    fn from(rule: &super::PolicyRule) -> Self {
        Self {
            verbs: rule.verbs.clone(),
            api_groups: rule.api_groups.clone(),
            resources: rule.resources.clone(),
            resource_names: rule.resource_names.clone(),
            non_resource_urls: rule.non_resource_urls.clone(),
        }
    }
}

impl From<PolicyRule> for super::PolicyRule {
    fn from(rule: PolicyRule) -> Self {
        Self {
            verbs: rule.verbs,
            api_groups: rule.api_groups,
            resources: rule.resources,
            resource_names: rule.resource_names,
            non_resource_urls: rule.non_resource_urls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_conversion() {
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let proto = Time::from(&ts);
        assert_eq!(proto.seconds, Some(1_700_000_000));
        assert_eq!(DateTime::<Utc>::try_from(proto).unwrap(), ts);
    }

    #[test]
    fn test_negative_nanos_rejected() {
        let proto = Time {
            seconds: Some(0),
            nanos: Some(-1),
        };
        assert!(DateTime::<Utc>::try_from(proto).is_err());
    }
}
