//! Namespace-specific string (`<NSS>`)

use crate::codec::{self, Context};
use crate::error::UrnError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Separator between NSS parts
pub const PART_SEPARATOR: char = ':';

/// A namespace-specific string held in both its wire and decoded forms
///
/// The string is split on `:` *before* decoding, so a literal colon inside a
/// part travels as `%3A` and never shifts part boundaries. Two values are
/// equal when their decoded parts are equal, regardless of how they were
/// escaped.
#[derive(Debug, Clone, Eq)]
pub struct NamespaceSpecificString {
    encoded: String,
    parts: Vec<String>,
}

impl NamespaceSpecificString {
    /// Validate and decode a percent-encoded NSS
    pub fn from_encoded(s: &str) -> Result<Self, UrnError> {
        if s.is_empty() {
            return Err(UrnError::InvalidNss("namespace-specific string is empty".to_string()));
        }
        if s.starts_with('/') {
            return Err(UrnError::InvalidNss(format!("'{}' must not start with '/'", s)));
        }

        let mut parts = Vec::new();
        let mut offset = 0;
        for part in s.split(PART_SEPARATOR) {
            let decoded = codec::decode(part, Context::NssPart).map_err(|e| e.shifted(offset))?;
            parts.push(decoded);
            offset += part.len() + PART_SEPARATOR.len_utf8();
        }

        Ok(Self {
            encoded: s.to_string(),
            parts,
        })
    }

    /// Build an NSS from decoded parts, escaping each part independently
    ///
    /// Fails only when the parts encode to an empty string.
    pub fn from_decoded_parts<I, S>(parts: I) -> Result<Self, UrnError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parts: Vec<String> = parts.into_iter().map(|p| p.as_ref().to_string()).collect();
        let encoded = Self::encode_parts(&parts);
        if encoded.is_empty() {
            return Err(UrnError::InvalidNss("namespace-specific string is empty".to_string()));
        }
        Ok(Self { encoded, parts })
    }

    fn encode_parts(parts: &[String]) -> String {
        let encoded = parts
            .iter()
            .map(|part| codec::encode(part, Context::NssPart))
            .collect::<Vec<_>>()
            .join(":");
        // A leading slash is legal inside a part but not at the start of the NSS
        match encoded.strip_prefix('/') {
            Some(rest) => format!("%2F{}", rest),
            None => encoded,
        }
    }

    /// The percent-encoded wire form as it was parsed or built
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// The decoded parts joined with `:`
    pub fn decoded(&self) -> String {
        self.parts.join(":")
    }

    /// The decoded colon-delimited parts
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Re-encoding of the decoded parts with canonical escapes
    pub fn normalized(&self) -> String {
        Self::encode_parts(&self.parts)
    }
}

impl PartialEq for NamespaceSpecificString {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Hash for NamespaceSpecificString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts.hash(state);
    }
}

impl FromStr for NamespaceSpecificString {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_encoded(s)
    }
}

impl fmt::Display for NamespaceSpecificString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl Serialize for NamespaceSpecificString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.encoded)
    }
}

impl<'de> Deserialize<'de> for NamespaceSpecificString {
    fn deserialize<D>(deserializer: D) -> Result<NamespaceSpecificString, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NamespaceSpecificString::from_encoded(&s).map_err(serde::de::Error::custom)
    }
}
