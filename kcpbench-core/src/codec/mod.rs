// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Wire codecs for the four negotiated content types.
//!
//! A [`Serializer`] is a content type plus a strictness flag. Strict decoding
//! rejects unknown fields on top of the checks every decode performs
//! (well-formedness, duplicate keys, kind mismatch). Clients talk to the server
//! with lenient serializers; the micro-benchmark registry uses strict ones.

mod cbor;
mod json;
mod protobuf;
mod yaml;

use serde::{Deserialize, Deserializer};

use crate::content_type::ContentType;
use crate::error::SerializationError;
use crate::resources::Object;

/// Encoder/decoder for one content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Serializer {
    content_type: ContentType,
    strict: bool,
}

impl Serializer {
    /// A lenient serializer: unknown fields are ignored on decode.
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            strict: false,
        }
    }

    /// A strict serializer: unknown fields fail the decode.
    pub fn strict(content_type: ContentType) -> Self {
        Self {
            content_type,
            strict: true,
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Encode an object. Its type meta must match its Rust type.
    pub fn encode<K: Object>(&self, obj: &K) -> Result<Vec<u8>, SerializationError> {
        check_type_meta(obj)?;
        match self.content_type {
            ContentType::Json => json::encode(obj),
            ContentType::Yaml => yaml::encode(obj),
            ContentType::Protobuf => protobuf::encode(obj),
            ContentType::Cbor => cbor::encode(obj),
        }
    }

    /// Decode bytes as kind `K`.
    ///
    /// Missing type meta defaults to `K`; a different kind is an error.
    pub fn decode<K: Object>(&self, bytes: &[u8]) -> Result<K, SerializationError> {
        let mut obj: K = match self.content_type {
            ContentType::Json => json::decode(bytes, self.strict)?,
            ContentType::Yaml => yaml::decode(bytes, self.strict)?,
            ContentType::Protobuf => protobuf::decode(bytes)?,
            ContentType::Cbor => cbor::decode(bytes, self.strict)?,
        };
        complete_type_meta(&mut obj)?;
        Ok(obj)
    }
}

/// Run a typed deserialize, collecting the paths of ignored fields.
fn deserialize_tracked<'de, D, T>(
    deserializer: D,
    format: &'static str,
    strict: bool,
) -> Result<T, SerializationError>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let mut unknown = Vec::new();
    let value = serde_ignored::deserialize(deserializer, |path| unknown.push(path.to_string()))
        .map_err(|e| SerializationError::Malformed {
            format,
            reason: e.to_string(),
        })?;

    if strict {
        if let Some(path) = unknown.into_iter().next() {
            return Err(SerializationError::UnknownField { format, path });
        }
    }
    Ok(value)
}

fn check_type_meta<K: Object>(obj: &K) -> Result<(), SerializationError> {
    let expected = K::gvk();
    let (api_version, kind) = obj.type_meta();
    if kind != K::KIND || api_version != expected.api_version() {
        return Err(SerializationError::KindMismatch {
            expected: expected.to_string(),
            actual: format!("{}, Kind={}", api_version, kind),
        });
    }
    Ok(())
}

/// Accept type meta that is absent or equal to `K`'s.
fn check_envelope_kind<K: Object>(api_version: &str, kind: &str) -> Result<(), SerializationError> {
    let expected = K::gvk();
    let version_ok = api_version.is_empty() || api_version == expected.api_version();
    let kind_ok = kind.is_empty() || kind == K::KIND;
    if version_ok && kind_ok {
        Ok(())
    } else {
        Err(SerializationError::KindMismatch {
            expected: expected.to_string(),
            actual: format!("{}, Kind={}", api_version, kind),
        })
    }
}

fn complete_type_meta<K: Object>(obj: &mut K) -> Result<(), SerializationError> {
    let (api_version, kind) = obj.type_meta();
    check_envelope_kind::<K>(api_version, kind)?;
    obj.set_type_meta(K::gvk().api_version(), K::KIND.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{sample_cluster_role, ClusterRole, ConfigMap, ObjectMeta, Status};

    #[test]
    fn test_round_trip_every_format() {
        let role = sample_cluster_role("serialization-sample");
        for ct in ContentType::ALL {
            let serializer = Serializer::strict(ct);
            let bytes = serializer.encode(&role).unwrap();
            let decoded: ClusterRole = serializer.decode(&bytes).unwrap();
            assert_eq!(decoded, role, "round trip through {}", ct);
        }
    }

    #[test]
    fn test_malformed_input_rejected_by_every_format() {
        let garbage = b"\xff\x00{not: [valid";
        for ct in ContentType::ALL {
            let result = Serializer::strict(ct).decode::<ClusterRole>(garbage);
            assert!(result.is_err(), "{} accepted garbage", ct);
        }
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let role = sample_cluster_role("mismatch");
        for ct in ContentType::ALL {
            let serializer = Serializer::new(ct);
            let bytes = serializer.encode(&role).unwrap();
            let result = serializer.decode::<ConfigMap>(&bytes);
            assert!(
                matches!(result, Err(SerializationError::KindMismatch { .. })),
                "{} decoded a ClusterRole as a ConfigMap",
                ct
            );
        }
    }

    #[test]
    fn test_encode_requires_type_meta() {
        let mut cm = ConfigMap::new(ObjectMeta::named("cm"));
        cm.kind = "Secret".to_string();
        let result = Serializer::new(ContentType::Json).encode(&cm);
        assert!(matches!(result, Err(SerializationError::KindMismatch { .. })));
    }

    #[test]
    fn test_missing_type_meta_is_filled() {
        let status: Status = Serializer::new(ContentType::Json)
            .decode(br#"{"status":"Failure","code":404}"#)
            .unwrap();
        assert_eq!(status.kind, "Status");
        assert_eq!(status.api_version, "v1");
        assert_eq!(status.code, Some(404));
    }

    #[test]
    fn test_strict_rejects_unknown_field_lenient_ignores() {
        let input = br#"{"apiVersion":"v1","kind":"ConfigMap","metadata":{"name":"a","managedFields":[]},"data":{}}"#;
        let strict = Serializer::strict(ContentType::Json).decode::<ConfigMap>(input);
        match strict {
            Err(SerializationError::UnknownField { path, .. }) => {
                assert!(path.contains("managedFields"))
            }
            other => panic!("expected unknown field error, got {:?}", other),
        }

        let lenient: ConfigMap = Serializer::new(ContentType::Json).decode(input).unwrap();
        assert_eq!(lenient.metadata.name(), Some("a"));
    }
}
