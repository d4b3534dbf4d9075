//! `application/cbor`.
//!
//! Objects are written with the self-described CBOR tag (55799) in front, as
//! the API server does. Decoding goes through an intermediate value so that
//! duplicate map keys and unexpected tags are rejected before the typed decode
//! sees the data. Byte strings are read as strings when they hold valid UTF-8,
//! in keys and values alike.

use ciborium::value::Value as CborValue;
use serde_json::{Map, Number, Value as JsonValue};

use crate::error::SerializationError;
use crate::resources::Object;

const FORMAT: &str = "cbor";

/// Encoded self-described CBOR tag.
pub const SELF_DESCRIBED: [u8; 3] = [0xd9, 0xd9, 0xf7];

const SELF_DESCRIBED_TAG: u64 = 55799;

pub(super) fn encode<K: Object>(obj: &K) -> Result<Vec<u8>, SerializationError> {
    let mut buf = SELF_DESCRIBED.to_vec();
    ciborium::into_writer(obj, &mut buf).map_err(|e| SerializationError::EncodeFailed {
        format: FORMAT,
        reason: e.to_string(),
    })?;
    Ok(buf)
}

pub(super) fn decode<K: Object>(bytes: &[u8], strict: bool) -> Result<K, SerializationError> {
    let mut reader = bytes;
    let value: CborValue =
        ciborium::from_reader(&mut reader).map_err(|e| SerializationError::Malformed {
            format: FORMAT,
            reason: e.to_string(),
        })?;
    if !reader.is_empty() {
        return Err(SerializationError::Malformed {
            format: FORMAT,
            reason: format!("{} trailing bytes after data item", reader.len()),
        });
    }

    let value = to_json(value)?;
    super::deserialize_tracked(value, FORMAT, strict)
}

fn malformed(reason: impl Into<String>) -> SerializationError {
    SerializationError::Malformed {
        format: FORMAT,
        reason: reason.into(),
    }
}

fn utf8(bytes: Vec<u8>) -> Result<String, SerializationError> {
    String::from_utf8(bytes).map_err(|e| malformed(format!("byte string is not UTF-8: {}", e)))
}

fn to_json(value: CborValue) -> Result<JsonValue, SerializationError> {
    match value {
        CborValue::Null => Ok(JsonValue::Null),
        CborValue::Bool(b) => Ok(JsonValue::Bool(b)),
        CborValue::Text(s) => Ok(JsonValue::String(s)),
        CborValue::Integer(i) => {
            let i = i128::from(i);
            if let Ok(v) = i64::try_from(i) {
                Ok(JsonValue::Number(Number::from(v)))
            } else if let Ok(v) = u64::try_from(i) {
                Ok(JsonValue::Number(Number::from(v)))
            } else {
                Err(malformed(format!("integer {} out of range", i)))
            }
        }
        CborValue::Float(f) => Number::from_f64(f)
            .map(JsonValue::Number)
            .ok_or_else(|| malformed(format!("non-finite float {}", f))),
        CborValue::Array(items) => items
            .into_iter()
            .map(to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array),
        CborValue::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, value) in entries {
                let key = match key {
                    CborValue::Text(key) => key,
                    CborValue::Bytes(key) => utf8(key)?,
                    other => return Err(malformed(format!("non-string map key {:?}", other))),
                };
                if map.contains_key(&key) {
                    return Err(SerializationError::DuplicateKey { key });
                }
                let value = to_json(value)?;
                map.insert(key, value);
            }
            Ok(JsonValue::Object(map))
        }
        CborValue::Tag(SELF_DESCRIBED_TAG, inner) => to_json(*inner),
        CborValue::Tag(tag, _) => Err(malformed(format!("unsupported tag {}", tag))),
        CborValue::Bytes(bytes) => utf8(bytes).map(JsonValue::String),
        other => Err(malformed(format!("unsupported data item {:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Serializer;
    use crate::content_type::ContentType;
    use crate::resources::{sample_cluster_role, ClusterRole};

    fn encode_value(value: &CborValue) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_self_described_prefix() {
        let bytes = encode(&sample_cluster_role("tagged")).unwrap();
        assert_eq!(&bytes[..3], &SELF_DESCRIBED);
    }

    #[test]
    fn test_untagged_input_accepted() {
        let bytes = encode(&sample_cluster_role("untagged")).unwrap();
        let role: ClusterRole = decode(&bytes[3..], true).unwrap();
        assert_eq!(role.metadata.name(), Some("untagged"));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let value = CborValue::Map(vec![
            (CborValue::Text("kind".into()), CborValue::Text("ClusterRole".into())),
            (CborValue::Text("kind".into()), CborValue::Text("ClusterRole".into())),
        ]);
        assert!(matches!(
            decode::<ClusterRole>(&encode_value(&value), true),
            Err(SerializationError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode(&sample_cluster_role("trailing")).unwrap();
        bytes.push(0x00);
        assert!(matches!(
            decode::<ClusterRole>(&bytes, true),
            Err(SerializationError::Malformed { .. })
        ));
    }

    fn bytes(s: &str) -> CborValue {
        CborValue::Bytes(s.as_bytes().to_vec())
    }

    fn byte_keyed_role() -> Vec<u8> {
        let value = CborValue::Tag(
            SELF_DESCRIBED_TAG,
            Box::new(CborValue::Map(vec![
                (bytes("apiVersion"), bytes("rbac.authorization.k8s.io/v1")),
                (bytes("kind"), CborValue::Text("ClusterRole".into())),
                (
                    bytes("metadata"),
                    CborValue::Map(vec![(bytes("name"), bytes("from-bytes"))]),
                ),
            ])),
        );
        encode_value(&value)
    }

    #[test]
    fn test_byte_string_keys_and_values_lenient() {
        let role: ClusterRole = Serializer::new(ContentType::Cbor)
            .decode(&byte_keyed_role())
            .unwrap();
        assert_eq!(role.api_version, "rbac.authorization.k8s.io/v1");
        assert_eq!(role.kind, "ClusterRole");
        assert_eq!(role.metadata.name(), Some("from-bytes"));
    }

    #[test]
    fn test_byte_string_keys_and_values_strict() {
        let role: ClusterRole = Serializer::strict(ContentType::Cbor)
            .decode(&byte_keyed_role())
            .unwrap();
        assert_eq!(role.metadata.name(), Some("from-bytes"));
    }

    #[test]
    fn test_invalid_utf8_byte_string_rejected() {
        let value = CborValue::Map(vec![(
            bytes("kind"),
            CborValue::Bytes(vec![0xff, 0xfe]),
        )]);
        for strict in [false, true] {
            assert!(matches!(
                decode::<ClusterRole>(&encode_value(&value), strict),
                Err(SerializationError::Malformed { .. })
            ));
        }
    }

    #[test]
    fn test_byte_and_text_key_collide() {
        let value = CborValue::Map(vec![
            (CborValue::Text("kind".into()), CborValue::Text("ClusterRole".into())),
            (bytes("kind"), bytes("ClusterRole")),
        ]);
        assert!(matches!(
            decode::<ClusterRole>(&encode_value(&value), false),
            Err(SerializationError::DuplicateKey { .. })
        ));
    }
}
