//! `application/yaml`.

use crate::error::SerializationError;
use crate::resources::Object;

const FORMAT: &str = "yaml";

pub(super) fn encode<K: Object>(obj: &K) -> Result<Vec<u8>, SerializationError> {
    serde_yaml::to_string(obj)
        .map(String::into_bytes)
        .map_err(|e| SerializationError::EncodeFailed {
            format: FORMAT,
            reason: e.to_string(),
        })
}

pub(super) fn decode<K: Object>(bytes: &[u8], strict: bool) -> Result<K, SerializationError> {
    let deserializer = serde_yaml::Deserializer::from_slice(bytes);
    super::deserialize_tracked(deserializer, FORMAT, strict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ConfigMap;

    #[test]
    fn test_decode_plain_yaml() {
        let input = b"apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cfg\ndata:\n  key: value\n";
        let cm: ConfigMap = decode(input, true).unwrap();
        assert_eq!(cm.metadata.name(), Some("cfg"));
        assert_eq!(cm.data.get("key").map(String::as_str), Some("value"));
    }

    #[test]
    fn test_unknown_field_path_reported() {
        let input = b"kind: ConfigMap\nmetadata:\n  name: cfg\nbinaryData:\n  k: dg==\n";
        match decode::<ConfigMap>(input, true) {
            Err(SerializationError::UnknownField { path, .. }) => assert_eq!(path, "binaryData"),
            other => panic!("expected unknown field, got {:?}", other),
        }
    }
}
