//! Namespace identifier (`<NID>`)

use crate::error::UrnError;
use crate::policy::{NidPolicy, INFORMAL_PREFIX};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Shortest accepted namespace identifier
pub const MIN_NID_LENGTH: usize = 1;
/// Longest accepted namespace identifier
pub const MAX_NID_LENGTH: usize = 31;

/// A validated namespace identifier
///
/// Comparison and hashing ignore ASCII case; the original spelling is kept
/// for display.
#[derive(Debug, Clone, Eq)]
pub struct NamespaceIdentifier {
    value: String,
}

impl NamespaceIdentifier {
    /// Parse a namespace identifier under the default [`NidPolicy`]
    pub fn parse(token: &str) -> Result<Self, UrnError> {
        Self::parse_with(token, &NidPolicy::default())
    }

    /// Parse a namespace identifier under `policy`
    ///
    /// The identifier is 1 to 31 characters of `[A-Za-z0-9-]`, starts with a
    /// letter and does not end with `-`. Escapes are never decoded here.
    pub fn parse_with(token: &str, policy: &NidPolicy) -> Result<Self, UrnError> {
        let invalid = |reason: String| UrnError::InvalidNid {
            nid: token.to_string(),
            reason,
        };

        let length = token.chars().count();
        if length < MIN_NID_LENGTH {
            return Err(invalid("namespace identifier is empty".to_string()));
        }
        if length > MAX_NID_LENGTH {
            return Err(invalid(format!("longer than {} characters", MAX_NID_LENGTH)));
        }
        if let Some((position, c)) = token
            .char_indices()
            .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '-'))
        {
            return Err(invalid(format!("invalid character '{}' at position {}", c, position)));
        }
        if !token.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(invalid("must start with a letter".to_string()));
        }
        if token.ends_with('-') {
            return Err(invalid("must not end with '-'".to_string()));
        }
        if let Some(prefix) = policy.reserved_prefix_of(token) {
            return Err(invalid(format!("prefix '{}' is reserved", prefix)));
        }

        Ok(Self {
            value: token.to_string(),
        })
    }

    /// The identifier as written
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Lower-cased form used for comparison
    pub fn normalized(&self) -> String {
        self.value.to_ascii_lowercase()
    }

    /// Whether this is an RFC 8141 informal namespace (`urn-<number>`)
    pub fn is_informal(&self) -> bool {
        match self.value.get(..INFORMAL_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(INFORMAL_PREFIX) => {
                let number = &self.value[INFORMAL_PREFIX.len()..];
                number.starts_with(|c: char| ('1'..='9').contains(&c))
                    && number.chars().all(|c| c.is_ascii_digit())
            }
            _ => false,
        }
    }
}

impl PartialEq for NamespaceIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.value.eq_ignore_ascii_case(&other.value)
    }
}

impl Hash for NamespaceIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.value.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl FromStr for NamespaceIdentifier {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NamespaceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Serialize for NamespaceIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for NamespaceIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<NamespaceIdentifier, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NamespaceIdentifier::parse(&s).map_err(serde::de::Error::custom)
    }
}
