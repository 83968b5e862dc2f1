//! Namespace identifier policy
//!
//! Which NID prefixes count as reserved is a profile decision rather than a
//! grammar rule, so it is carried as data that applications may load from
//! their own configuration.

use serde::{Deserialize, Serialize};

/// Prefix of RFC 8141 informal namespace identifiers (`urn-<number>`)
pub const INFORMAL_PREFIX: &str = "urn-";

/// Policy applied to namespace identifiers on top of the ABNF rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NidPolicy {
    /// Case-insensitive prefixes rejected as reserved
    pub reserved_prefixes: Vec<String>,
    /// Accept informal `urn-` identifiers even when the prefix is reserved
    pub allow_informal: bool,
}

impl Default for NidPolicy {
    fn default() -> Self {
        Self {
            reserved_prefixes: vec![INFORMAL_PREFIX.to_string()],
            allow_informal: false,
        }
    }
}

impl NidPolicy {
    /// A policy that reserves nothing
    pub fn permissive() -> Self {
        Self {
            reserved_prefixes: Vec::new(),
            allow_informal: true,
        }
    }

    /// Return the reserved prefix `nid` starts with, if the policy forbids it
    pub fn reserved_prefix_of(&self, nid: &str) -> Option<&str> {
        self.reserved_prefixes
            .iter()
            .filter(|prefix| !(self.allow_informal && prefix.eq_ignore_ascii_case(INFORMAL_PREFIX)))
            .find(|prefix| {
                nid.len() >= prefix.len()
                    && nid.is_char_boundary(prefix.len())
                    && nid[..prefix.len()].eq_ignore_ascii_case(prefix)
            })
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reserves_informal_prefix() {
        let policy = NidPolicy::default();
        assert_eq!(policy.reserved_prefix_of("urn-7"), Some("urn-"));
        assert_eq!(policy.reserved_prefix_of("URN-7"), Some("urn-"));
        assert_eq!(policy.reserved_prefix_of("example"), None);
        assert_eq!(policy.reserved_prefix_of("urn"), None);
    }

    #[test]
    fn test_allow_informal() {
        let policy = NidPolicy {
            reserved_prefixes: vec!["urn-".to_string(), "x-".to_string()],
            allow_informal: true,
        };
        assert_eq!(policy.reserved_prefix_of("urn-7"), None);
        assert_eq!(policy.reserved_prefix_of("X-private"), Some("x-"));
    }

    #[test]
    fn test_permissive() {
        assert_eq!(NidPolicy::permissive().reserved_prefix_of("urn-7"), None);
    }

    #[test]
    fn test_policy_from_config() {
        let policy: NidPolicy = serde_json::from_str(r#"{"reserved_prefixes": ["x-"]}"#).unwrap();
        assert_eq!(policy.reserved_prefixes, vec!["x-".to_string()]);
        assert!(!policy.allow_informal);

        let empty: NidPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, NidPolicy::default());
    }
}
