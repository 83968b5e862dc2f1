//! Fluent construction of URNs from decoded values

use crate::error::UrnError;
use crate::nid::NamespaceIdentifier;
use crate::nss::NamespaceSpecificString;
use crate::rqf::{Params, RqfComponent};
use crate::urn::Urn;

/// Builder for creating URNs from decoded parts, pairs and fragment text
///
/// Every value is escaped for its component when the URN is built.
pub struct UrnBuilder {
    nid: NamespaceIdentifier,
    parts: Vec<String>,
    resolution: Params,
    query: Params,
    fragment: Option<String>,
}

impl UrnBuilder {
    /// Create a new builder, validating `nid` under the default policy
    pub fn new(nid: &str) -> Result<Self, UrnError> {
        Ok(Self::with_nid(NamespaceIdentifier::parse(nid)?))
    }

    /// Create a new builder for an already-validated namespace identifier
    pub fn with_nid(nid: NamespaceIdentifier) -> Self {
        Self {
            nid,
            parts: Vec::new(),
            resolution: Params::new(),
            query: Params::new(),
            fragment: None,
        }
    }

    /// Append one decoded NSS part; a literal `:` stays inside the part
    pub fn part(mut self, part: &str) -> Self {
        self.parts.push(part.to_string());
        self
    }

    /// Add a resolution pair (a repeated key keeps the last value)
    pub fn resolution(mut self, key: &str, value: &str) -> Self {
        self.resolution.insert(key, value);
        self
    }

    /// Add a query pair (a repeated key keeps the last value)
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key, value);
        self
    }

    pub fn fragment(mut self, fragment: &str) -> Self {
        self.fragment = Some(fragment.to_string());
        self
    }

    /// Build the URN; fails with `InvalidNss` when no non-empty part was given
    pub fn build(self) -> Result<Urn, UrnError> {
        let nss = NamespaceSpecificString::from_decoded_parts(&self.parts)?;
        let mut rqf = RqfComponent::new()
            .with_resolution(self.resolution)
            .with_query(self.query);
        if let Some(fragment) = self.fragment {
            rqf = rqf.with_fragment(fragment);
        }
        Ok(Urn::new(self.nid, nss, rqf))
    }
}
