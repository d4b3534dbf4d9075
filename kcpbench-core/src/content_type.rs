// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! The content-type matrix.
//!
//! Every benchmark is parameterized by one of four wire formats. The matrix
//! order is fixed so reports always list formats the same way.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A wire format the API server can negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ContentType {
    Json,
    Yaml,
    Protobuf,
    Cbor,
}

/// The accept/content MIME pair a client sends for one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MimePair {
    /// Value of the `Accept` header.
    pub accept: &'static str,
    /// Value of the `Content-Type` header on request bodies.
    pub content: &'static str,
}

impl ContentType {
    /// The full matrix, in reporting order.
    ///
    /// `application/cbor-seq` is deliberately absent: it is only used for
    /// streaming watch responses, never for plain requests.
    pub const ALL: [ContentType; 4] = [
        ContentType::Json,
        ContentType::Yaml,
        ContentType::Protobuf,
        ContentType::Cbor,
    ];

    /// Short identifier used in configuration and reports.
    pub fn name(self) -> &'static str {
        match self {
            ContentType::Json => "json",
            ContentType::Yaml => "yaml",
            ContentType::Protobuf => "protobuf",
            ContentType::Cbor => "cbor",
        }
    }

    /// MIME type of this format.
    pub fn mime(self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::Yaml => "application/yaml",
            ContentType::Protobuf => "application/vnd.kubernetes.protobuf",
            ContentType::Cbor => "application/cbor",
        }
    }

    /// Accept and content MIME types negotiated for this format.
    pub fn negotiation(self) -> MimePair {
        MimePair {
            accept: self.mime(),
            content: self.mime(),
        }
    }

    /// Resolve a `Content-Type` response header, ignoring parameters.
    pub fn from_mime(header: &str) -> Option<Self> {
        let essence = header.split(';').next().unwrap_or_default().trim();
        Self::ALL
            .into_iter()
            .find(|ct| ct.mime().eq_ignore_ascii_case(essence))
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ContentType {
    type Err = ConfigurationError;

    /// Accepts the short name or the MIME type, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Self::ALL
            .into_iter()
            .find(|ct| ct.name().eq_ignore_ascii_case(value) || ct.mime().eq_ignore_ascii_case(value))
            .ok_or_else(|| ConfigurationError::UnknownContentType {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for ContentType {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContentType> for String {
    fn from(value: ContentType) -> Self {
        value.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_order() {
        let names: Vec<_> = ContentType::ALL.iter().map(|ct| ct.name()).collect();
        assert_eq!(names, vec!["json", "yaml", "protobuf", "cbor"]);
    }

    #[test]
    fn test_parse_name_and_mime() {
        assert_eq!("json".parse::<ContentType>().unwrap(), ContentType::Json);
        assert_eq!("CBOR".parse::<ContentType>().unwrap(), ContentType::Cbor);
        assert_eq!(
            "application/vnd.kubernetes.protobuf"
                .parse::<ContentType>()
                .unwrap(),
            ContentType::Protobuf
        );
        assert!(matches!(
            "application/xml".parse::<ContentType>(),
            Err(ConfigurationError::UnknownContentType { .. })
        ));
    }

    #[test]
    fn test_negotiation_is_symmetric() {
        for ct in ContentType::ALL {
            let pair = ct.negotiation();
            assert_eq!(pair.accept, pair.content);
            assert_eq!(pair, ct.negotiation());
        }
    }

    #[test]
    fn test_from_mime_strips_parameters() {
        assert_eq!(
            ContentType::from_mime("application/json; charset=utf-8"),
            Some(ContentType::Json)
        );
        assert_eq!(ContentType::from_mime("text/plain"), None);
    }
}
