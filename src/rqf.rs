//! Resolution, query and fragment components (`?+`, `?=`, `#`)

use crate::codec::{self, Context};
use crate::error::UrnError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Marker introducing the resolution component
pub const RESOLUTION_MARKER: &str = "?+";
/// Marker introducing the query component
pub const QUERY_MARKER: &str = "?=";
/// Marker introducing the fragment
pub const FRAGMENT_MARKER: &str = "#";

/// Insertion-ordered `key=value` mapping with unique keys
///
/// Inserting an existing key replaces its value in place, so the last write
/// wins while the first position is kept for stable re-serialization.
/// Equality and hashing ignore order.
#[derive(Debug, Clone, Default, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// An empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair, returning the value it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` has a value
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no pairs
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse `&`-joined pairs; `offset` locates `raw` in the caller's input
    fn parse(raw: &str, offset: usize) -> Result<Self, UrnError> {
        let mut params = Params::new();
        let mut position = offset;
        for piece in raw.split('&') {
            let (key, value) = match piece.split_once('=') {
                Some((key, value)) if !value.contains('=') => (key, value),
                _ => return Err(UrnError::MalformedKeyValue(piece.to_string())),
            };
            let key = codec::decode(key, Context::Query).map_err(|e| e.shifted(position))?;
            let value_offset = position + piece.len() - value.len();
            let value = codec::decode(value, Context::Query).map_err(|e| e.shifted(value_offset))?;
            params.insert(key, value);
            position += piece.len() + 1;
        }
        Ok(params)
    }

    fn encode_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
        pairs
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    codec::encode(k, Context::Query),
                    codec::encode(v, Context::Query)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Pairs sorted by key, the order-free basis for comparison
    fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_unstable();
        pairs
    }
}

impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Hash for Params {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Params::encode_pairs(self.iter()))
    }
}

/// The optional trailing components of a URN
///
/// Each field is independently optional. An empty resolution or query is
/// the same as an absent one; a present-but-empty fragment is kept apart
/// from an absent fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RqfComponent {
    resolution: Option<Params>,
    query: Option<Params>,
    fragment: Option<String>,
}

/// Components in the order they must appear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Resolution,
    Query,
    Fragment,
}

impl Slot {
    fn marker(self) -> &'static str {
        match self {
            Slot::Resolution => RESOLUTION_MARKER,
            Slot::Query => QUERY_MARKER,
            Slot::Fragment => FRAGMENT_MARKER,
        }
    }
}

impl RqfComponent {
    /// An RQF component with every field absent
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the suffix following the NSS; the empty string yields all fields absent
    pub fn parse(suffix: &str) -> Result<Self, UrnError> {
        Self::parse_at(suffix, 0)
    }

    /// Parse `suffix` reporting error positions relative to `offset`
    pub(crate) fn parse_at(suffix: &str, offset: usize) -> Result<Self, UrnError> {
        let found: Vec<(Slot, usize)> = [Slot::Resolution, Slot::Query, Slot::Fragment]
            .into_iter()
            .filter_map(|slot| suffix.find(slot.marker()).map(|pos| (slot, pos)))
            .collect();

        for pair in found.windows(2) {
            let ((earlier, earlier_pos), (later, later_pos)) = (pair[0], pair[1]);
            if later_pos < earlier_pos {
                return Err(UrnError::OutOfOrderComponent {
                    found: earlier.marker().to_string(),
                    after: later.marker().to_string(),
                });
            }
        }

        match found.first() {
            None if !suffix.is_empty() => {
                return Err(UrnError::InvalidRqf(format!(
                    "'{}' does not start with a component marker",
                    suffix
                )))
            }
            Some(&(_, first)) if first != 0 => {
                return Err(UrnError::InvalidRqf(format!(
                    "unexpected '{}' before first component marker",
                    &suffix[..first]
                )))
            }
            _ => {}
        }

        let mut rqf = RqfComponent::new();
        let ends: Vec<usize> = found
            .iter()
            .skip(1)
            .map(|&(_, pos)| pos)
            .chain(std::iter::once(suffix.len()))
            .collect();
        for (&(slot, pos), end) in found.iter().zip(ends) {
            let start = pos + slot.marker().len();
            let raw = &suffix[start..end];
            match slot {
                Slot::Resolution => rqf.resolution = Self::parse_params(raw, offset + start)?,
                Slot::Query => rqf.query = Self::parse_params(raw, offset + start)?,
                Slot::Fragment => {
                    let fragment = codec::decode(raw, Context::Fragment)
                        .map_err(|e| e.shifted(offset + start))?;
                    rqf.fragment = Some(fragment);
                }
            }
        }

        Ok(rqf)
    }

    fn parse_params(raw: &str, offset: usize) -> Result<Option<Params>, UrnError> {
        if raw.is_empty() {
            return Ok(None);
        }
        Params::parse(raw, offset).map(Some)
    }

    /// Replace the resolution parameters
    pub fn with_resolution(mut self, resolution: Params) -> Self {
        self.resolution = Some(resolution).filter(|p| !p.is_empty());
        self
    }

    /// Replace the query parameters
    pub fn with_query(mut self, query: Params) -> Self {
        self.query = Some(query).filter(|p| !p.is_empty());
        self
    }

    /// Replace the fragment with decoded text
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn without_fragment(mut self) -> Self {
        self.fragment = None;
        self
    }

    pub fn resolution(&self) -> Option<&Params> {
        self.resolution.as_ref()
    }

    pub fn query(&self) -> Option<&Params> {
        self.query.as_ref()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Whether all three fields are absent
    pub fn is_empty(&self) -> bool {
        self.resolution.is_none() && self.query.is_none() && self.fragment.is_none()
    }

    /// Serialization with resolution and query pairs sorted by key
    pub fn normalized(&self) -> String {
        self.render(|params| Params::encode_pairs(params.sorted().into_iter()))
    }

    fn render(&self, pairs: impl Fn(&Params) -> String) -> String {
        let mut out = String::new();
        if let Some(resolution) = &self.resolution {
            out.push_str(RESOLUTION_MARKER);
            out.push_str(&pairs(resolution));
        }
        if let Some(query) = &self.query {
            out.push_str(QUERY_MARKER);
            out.push_str(&pairs(query));
        }
        if let Some(fragment) = &self.fragment {
            out.push_str(FRAGMENT_MARKER);
            out.push_str(&codec::encode(fragment, Context::Fragment));
        }
        out
    }
}

impl FromStr for RqfComponent {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RqfComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(|params| params.to_string()))
    }
}

impl Serialize for RqfComponent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RqfComponent {
    fn deserialize<D>(deserializer: D) -> Result<RqfComponent, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RqfComponent::parse(&s).map_err(serde::de::Error::custom)
    }
}
