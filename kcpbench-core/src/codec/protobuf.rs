//! `application/vnd.kubernetes.protobuf`.
//!
//! Layout: the 4-byte magic `k8s\0`, then a `runtime.Unknown` envelope whose
//! `raw` field holds the object message. Protobuf has no notion of unknown
//! field rejection, so strictness does not apply here.

use prost::Message;

use super::check_envelope_kind;
use crate::error::SerializationError;
use crate::resources::proto::{TypeMeta, Unknown};
use crate::resources::Object;

const FORMAT: &str = "protobuf";

/// Magic prefix identifying a Kubernetes protobuf payload.
pub const MAGIC: [u8; 4] = [0x6b, 0x38, 0x73, 0x00];

pub(super) fn encode<K: Object>(obj: &K) -> Result<Vec<u8>, SerializationError> {
    let (api_version, kind) = obj.type_meta();
    let envelope = Unknown {
        type_meta: Some(TypeMeta {
            api_version: Some(api_version.to_string()),
            kind: Some(kind.to_string()),
        }),
        raw: Some(obj.to_proto().encode_to_vec()),
        content_encoding: Some(String::new()),
        content_type: Some(String::new()),
    };

    let mut buf = Vec::with_capacity(MAGIC.len() + envelope.encoded_len());
    buf.extend_from_slice(&MAGIC);
    envelope
        .encode(&mut buf)
        .map_err(|e| SerializationError::EncodeFailed {
            format: FORMAT,
            reason: e.to_string(),
        })?;
    Ok(buf)
}

pub(super) fn decode<K: Object>(bytes: &[u8]) -> Result<K, SerializationError> {
    let payload = bytes
        .strip_prefix(&MAGIC)
        .ok_or(SerializationError::MissingPrefix { format: FORMAT })?;

    let envelope = Unknown::decode(payload).map_err(|e| SerializationError::Malformed {
        format: FORMAT,
        reason: e.to_string(),
    })?;

    if let Some(encoding) = envelope.content_encoding.as_deref() {
        if !encoding.is_empty() {
            return Err(SerializationError::Malformed {
                format: FORMAT,
                reason: format!("unsupported content encoding '{}'", encoding),
            });
        }
    }

    let type_meta = envelope.type_meta.unwrap_or_default();
    let api_version = type_meta.api_version.unwrap_or_default();
    let kind = type_meta.kind.unwrap_or_default();
    check_envelope_kind::<K>(&api_version, &kind)?;

    let raw = envelope.raw.unwrap_or_default();
    let message = K::Proto::decode(raw.as_slice()).map_err(|e| SerializationError::Malformed {
        format: FORMAT,
        reason: e.to_string(),
    })?;

    let mut obj = K::from_proto(message)?;
    obj.set_type_meta(api_version, kind);
    Ok(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{sample_cluster_role, ClusterRole};

    #[test]
    fn test_magic_prefix_written() {
        let bytes = encode(&sample_cluster_role("magic")).unwrap();
        assert_eq!(&bytes[..4], b"k8s\0");
    }

    #[test]
    fn test_missing_prefix_rejected() {
        let bytes = encode(&sample_cluster_role("magic")).unwrap();
        assert!(matches!(
            decode::<ClusterRole>(&bytes[4..]),
            Err(SerializationError::MissingPrefix { .. })
        ));
    }

    #[test]
    fn test_truncated_envelope_rejected() {
        let bytes = encode(&sample_cluster_role("truncated")).unwrap();
        let truncated = &bytes[..bytes.len() - 3];
        assert!(matches!(
            decode::<ClusterRole>(truncated),
            Err(SerializationError::Malformed { .. })
        ));
    }
}
