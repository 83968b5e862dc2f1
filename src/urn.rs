//! RFC 8141 Uniform Resource Names
//!
//! A [`Urn`] composes a [`NamespaceIdentifier`], a
//! [`NamespaceSpecificString`] and an [`RqfComponent`]:
//!
//! ```text
//! urn:<NID>:<NSS>[?+<resolution>][?=<query>][#<fragment>]
//! ```

use crate::error::UrnError;
use crate::nid::NamespaceIdentifier;
use crate::nss::NamespaceSpecificString;
use crate::policy::NidPolicy;
use crate::rqf::{RqfComponent, FRAGMENT_MARKER, QUERY_MARKER, RESOLUTION_MARKER};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use tracing::{debug, trace};

/// The scheme prefix, matched case-insensitively and always written lower-case
pub const URN_PREFIX: &str = "urn:";

/// A parsed URN
///
/// Two URNs are equal when their NIDs match ignoring case, their NSS parts
/// decode to the same text, and their resolution, query and fragment
/// components decode to the same pairs and text. [`Urn::is_equivalent`]
/// implements the narrower RFC 8141 URN-equivalence that ignores the RQF
/// components.
#[derive(Debug, Clone, Eq)]
pub struct Urn {
    nid: NamespaceIdentifier,
    nss: NamespaceSpecificString,
    rqf: RqfComponent,
}

impl Urn {
    /// Compose a URN from already-validated parts
    pub fn new(nid: NamespaceIdentifier, nss: NamespaceSpecificString, rqf: RqfComponent) -> Self {
        Self { nid, nss, rqf }
    }

    /// Parse a URN string under the default [`NidPolicy`]
    pub fn parse(s: &str) -> Result<Self, UrnError> {
        Self::parse_with(s, &NidPolicy::default())
    }

    /// Parse a URN string, validating the namespace identifier against `policy`
    pub fn parse_with(s: &str, policy: &NidPolicy) -> Result<Self, UrnError> {
        trace!(input = s, "parsing urn");
        let result = Self::split_and_parse(s, policy);
        if let Err(error) = &result {
            debug!(input = s, %error, "rejected urn");
        }
        result
    }

    fn split_and_parse(s: &str, policy: &NidPolicy) -> Result<Self, UrnError> {
        let rest = match s.get(..URN_PREFIX.len()) {
            Some(scheme) if scheme.eq_ignore_ascii_case(URN_PREFIX) => &s[URN_PREFIX.len()..],
            _ => return Err(UrnError::MissingScheme(s.to_string())),
        };

        let (nid, rest) = rest
            .split_once(':')
            .filter(|(nid, _)| !nid.is_empty())
            .ok_or(UrnError::MissingNid)?;
        let nid = NamespaceIdentifier::parse_with(nid, policy)?;

        // NSS runs up to the earliest component marker
        let nss_offset = URN_PREFIX.len() + nid.as_str().len() + 1;
        let nss_end = [RESOLUTION_MARKER, QUERY_MARKER, FRAGMENT_MARKER]
            .iter()
            .filter_map(|marker| rest.find(marker))
            .min()
            .unwrap_or(rest.len());

        let nss = NamespaceSpecificString::from_encoded(&rest[..nss_end])
            .map_err(|e| e.shifted(nss_offset))?;
        let rqf = RqfComponent::parse_at(&rest[nss_end..], nss_offset + nss_end)?;

        Ok(Self { nid, nss, rqf })
    }

    /// Parse `s` and return its [normalized](Urn::normalized) form
    pub fn normalize(s: &str) -> Result<String, UrnError> {
        Ok(Self::parse(s)?.normalized())
    }

    pub fn nid(&self) -> &NamespaceIdentifier {
        &self.nid
    }

    pub fn nss(&self) -> &NamespaceSpecificString {
        &self.nss
    }

    pub fn rqf(&self) -> &RqfComponent {
        &self.rqf
    }

    /// `urn:<NID>:<NSS>` without any resolution, query or fragment
    pub fn assigned_name(&self) -> String {
        format!("{}{}:{}", URN_PREFIX, self.nid, self.nss)
    }

    /// RFC 8141 URN-equivalence: same NID ignoring case and same decoded NSS,
    /// with resolution, query and fragment disregarded
    pub fn is_equivalent(&self, other: &Urn) -> bool {
        self.nid == other.nid && self.nss == other.nss
    }

    /// Stable comparison key: lower-cased NID, NSS re-encoded from its
    /// decoded parts, and RQF pairs sorted by key
    ///
    /// Equal URNs always produce the same key.
    pub fn normalized(&self) -> String {
        format!(
            "{}{}:{}{}",
            URN_PREFIX,
            self.nid.normalized(),
            self.nss.normalized(),
            self.rqf.normalized()
        )
    }

    /// Replace the resolution, query and fragment components
    pub fn with_rqf(mut self, rqf: RqfComponent) -> Self {
        self.rqf = rqf;
        self
    }

    /// Drop the resolution, query and fragment components
    pub fn without_rqf(self) -> Self {
        self.with_rqf(RqfComponent::new())
    }
}

impl PartialEq for Urn {
    fn eq(&self, other: &Self) -> bool {
        self.nid == other.nid && self.nss == other.nss && self.rqf == other.rqf
    }
}

impl Hash for Urn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.nid.hash(state);
        self.nss.hash(state);
        self.rqf.hash(state);
    }
}

impl FromStr for Urn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Urn::parse(s)
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:{}{}", URN_PREFIX, self.nid, self.nss, self.rqf)
    }
}

// Serde serialization support
impl Serialize for Urn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Urn {
    fn deserialize<D>(deserializer: D) -> Result<Urn, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Urn::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rqf::Params;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    const REFERENCE: &str =
        "urn:example:example.org:resources:example%20resource?+res1=a?=param1=test&param2=test2#example.org";

    fn hash_of(urn: &Urn) -> u64 {
        let mut hasher = DefaultHasher::new();
        urn.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_reference_example() {
        let urn = Urn::parse(REFERENCE).unwrap();
        assert_eq!(urn.nid().as_str(), "example");
        assert_eq!(urn.nss().parts(), ["example.org", "resources", "example resource"]);

        let resolution = urn.rqf().resolution().unwrap();
        assert_eq!(resolution.len(), 1);
        assert_eq!(resolution.get("res1"), Some("a"));

        let query = urn.rqf().query().unwrap();
        assert_eq!(query.iter().collect::<Vec<_>>(), vec![("param1", "test"), ("param2", "test2")]);
        assert_eq!(urn.rqf().fragment(), Some("example.org"));

        assert_eq!(urn.to_string(), REFERENCE);
    }

    #[test]
    fn test_reference_example_from_parts() {
        let nid = NamespaceIdentifier::parse("example").unwrap();
        let nss = NamespaceSpecificString::from_encoded("example.org:resources:example%20resource").unwrap();
        let rqf = RqfComponent::new()
            .with_resolution([("res1", "a")].into_iter().collect())
            .with_query([("param1", "test"), ("param2", "test2")].into_iter().collect())
            .with_fragment("example.org");

        let urn = Urn::new(nid, nss, rqf);
        assert_eq!(urn.to_string(), REFERENCE);
        assert_eq!(urn, Urn::parse(REFERENCE).unwrap());
    }

    #[test]
    fn test_without_rqf() {
        let urn = Urn::parse("urn:isbn:0451450523").unwrap();
        assert_eq!(urn.nid().as_str(), "isbn");
        assert_eq!(urn.nss().decoded(), "0451450523");
        assert!(urn.rqf().is_empty());
        assert_eq!(urn.to_string(), "urn:isbn:0451450523");
    }

    #[test]
    fn test_scheme_case_insensitive() {
        let urn = Urn::parse("URN:Example:x").unwrap();
        assert_eq!(urn.nid().as_str(), "Example");
        assert_eq!(urn.to_string(), "urn:Example:x");
        assert_eq!(urn, Urn::parse("urn:example:x").unwrap());
    }

    #[test]
    fn test_missing_scheme() {
        for input in ["", "urn", "uri:tests:x", "uri:tests#example.org", "example:x", "urn-ex:x"] {
            assert!(
                matches!(Urn::parse(input), Err(UrnError::MissingScheme(_))),
                "{:?} should lack a scheme",
                input
            );
        }
    }

    #[test]
    fn test_missing_nid() {
        assert_eq!(Urn::parse("urn:"), Err(UrnError::MissingNid));
        assert_eq!(Urn::parse("urn:example"), Err(UrnError::MissingNid));
        assert_eq!(Urn::parse("urn::x"), Err(UrnError::MissingNid));
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(Urn::parse("urn:1ex:rest"), Err(UrnError::InvalidNid { .. })));
        assert!(matches!(Urn::parse("urn:ex#ample:rest"), Err(UrnError::InvalidNid { .. })));
        assert_eq!(Urn::parse("urn:example:a%2"), Err(UrnError::MalformedEscape(13)));
        assert!(matches!(Urn::parse("urn:example:a?=k"), Err(UrnError::MalformedKeyValue(_))));
        assert!(matches!(Urn::parse("urn:example:"), Err(UrnError::InvalidNss(_))));
        assert!(matches!(Urn::parse("urn:example:?=k=v"), Err(UrnError::InvalidNss(_))));
        assert!(matches!(
            Urn::parse("urn:example:a b"),
            Err(UrnError::IllegalCharacter { ch: ' ', position: 13 })
        ));
        assert!(matches!(
            Urn::parse("urn:example:x#frag?=k=v"),
            Err(UrnError::OutOfOrderComponent { .. })
        ));
    }

    #[test]
    fn test_nid_policy() {
        assert!(matches!(Urn::parse("urn:urn-7:x"), Err(UrnError::InvalidNid { .. })));
        let urn = Urn::parse_with("urn:urn-7:x", &NidPolicy::permissive()).unwrap();
        assert!(urn.nid().is_informal());
    }

    #[test]
    fn test_equality_across_encodings() {
        let a = Urn::parse("urn:Example:a%2fb?=k=v%20w#f").unwrap();
        let b = Urn::parse("urn:example:a/b?=k=v%20w#f").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a.normalized(), b.normalized());

        let c = Urn::parse("urn:example:a/b?=k=other#f").unwrap();
        assert_ne!(a, c);
        assert!(a.is_equivalent(&c));

        let d = Urn::parse("urn:example:a/c").unwrap();
        assert!(!a.is_equivalent(&d));
    }

    #[test]
    fn test_hash_set_membership() {
        let mut seen = HashSet::new();
        seen.insert(Urn::parse("urn:example:x?=a=1&b=2").unwrap());
        assert!(seen.contains(&Urn::parse("urn:EXAMPLE:x?=b=2&a=1").unwrap()));
        assert!(seen.contains(&Urn::parse("urn:example:%78?=a=%31&b=2").unwrap()));
        assert!(!seen.contains(&Urn::parse("urn:example:x").unwrap()));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            Urn::normalize("URN:Example:a%2fb:%7e?=z=1&a=2#x").unwrap(),
            "urn:example:a/b:~?=a=2&z=1#x"
        );
        assert!(Urn::normalize("not a urn").is_err());
    }

    #[test]
    fn test_assigned_name_and_rqf_replacement() {
        let urn = Urn::parse("urn:tests:example:attributes:123?=key=value%3Asubvalue#example.org").unwrap();
        assert_eq!(urn.assigned_name(), "urn:tests:example:attributes:123");
        assert_eq!(urn.nss().encoded(), "example:attributes:123");

        let bare = urn.clone().without_rqf();
        assert_eq!(bare.to_string(), "urn:tests:example:attributes:123");
        assert!(bare.is_equivalent(&urn));

        let mut query = Params::new();
        query.insert("page", "2");
        let paged = bare.with_rqf(RqfComponent::new().with_query(query));
        assert_eq!(paged.to_string(), "urn:tests:example:attributes:123?=page=2");
    }

    #[test]
    fn test_serde() {
        let urn = Urn::parse(REFERENCE).unwrap();
        let json = serde_json::to_string(&urn).unwrap();
        assert_eq!(json, format!("\"{}\"", REFERENCE));
        let back: Urn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, urn);
        assert!(serde_json::from_str::<Urn>("\"urn:1bad:x\"").is_err());
    }
}
