//! `application/json`.

use crate::error::SerializationError;
use crate::resources::Object;

const FORMAT: &str = "json";

pub(super) fn encode<K: Object>(obj: &K) -> Result<Vec<u8>, SerializationError> {
    serde_json::to_vec(obj).map_err(|e| SerializationError::EncodeFailed {
        format: FORMAT,
        reason: e.to_string(),
    })
}

pub(super) fn decode<K: Object>(bytes: &[u8], strict: bool) -> Result<K, SerializationError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let obj = super::deserialize_tracked(&mut deserializer, FORMAT, strict)?;
    deserializer
        .end()
        .map_err(|e| SerializationError::Malformed {
            format: FORMAT,
            reason: e.to_string(),
        })?;
    Ok(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ClusterRole;

    #[test]
    fn test_trailing_data_rejected() {
        let input = br#"{"kind":"ClusterRole"} {}"#;
        assert!(matches!(
            decode::<ClusterRole>(input, true),
            Err(SerializationError::Malformed { .. })
        ));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let input = br#"{"kind":"ClusterRole","kind":"ClusterRole"}"#;
        assert!(decode::<ClusterRole>(input, false).is_err());
    }
}
