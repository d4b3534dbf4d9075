//! Immutable registry of the serializers under measurement.
//!
//! Built once, read-only afterwards. Entries keep matrix order.

use crate::codec::Serializer;
use crate::content_type::ContentType;
use crate::error::SerializationError;
use crate::resources::Object;

/// A format name bound to its serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializerEntry {
    pub name: &'static str,
    pub serializer: Serializer,
}

impl SerializerEntry {
    /// Encode then decode `obj`, returning the decoded copy.
    pub fn round_trip<K: Object>(&self, obj: &K) -> Result<K, SerializationError> {
        let bytes = self.serializer.encode(obj)?;
        self.serializer.decode(&bytes)
    }
}

/// The set of serializers a micro-benchmark runs over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerRegistry {
    entries: Vec<SerializerEntry>,
}

impl SerializerRegistry {
    /// Strict serializers for every format of the matrix.
    pub fn strict() -> Self {
        Self::from_content_types(&ContentType::ALL, true)
    }

    pub fn from_content_types(content_types: &[ContentType], strict: bool) -> Self {
        let entries = content_types
            .iter()
            .map(|&ct| SerializerEntry {
                name: ct.name(),
                serializer: if strict {
                    Serializer::strict(ct)
                } else {
                    Serializer::new(ct)
                },
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&SerializerEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SerializerEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::sample_cluster_role;

    #[test]
    fn test_strict_registry_contents() {
        let registry = SerializerRegistry::strict();
        let names: Vec<_> = registry.iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["json", "yaml", "protobuf", "cbor"]);
        assert!(registry.iter().all(|e| e.serializer.is_strict()));
        assert!(registry.get("xml").is_none());
    }

    #[test]
    fn test_round_trip_sample() {
        let sample = sample_cluster_role("serialization-sample");
        for entry in SerializerRegistry::strict().iter() {
            assert_eq!(entry.round_trip(&sample).unwrap(), sample, "{}", entry.name);
        }
    }
}
