//! Errors produced while parsing URNs and their components

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing a URN or one of its components
///
/// Every parse entry point either yields a fully valid value or exactly one
/// of these. Serialization of an already-constructed value never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum UrnError {
    /// Input does not start with the `urn:` scheme (case-insensitive)
    #[error("URN must start with 'urn:': '{0}'")]
    MissingScheme(String),
    /// No `:` terminates the namespace identifier, or it is empty
    #[error("URN has no namespace identifier")]
    MissingNid,
    /// Namespace identifier violates length, character or prefix rules
    #[error("invalid namespace identifier '{nid}': {reason}")]
    InvalidNid { nid: String, reason: String },
    /// `%` not followed by two hexadecimal digits
    #[error("malformed percent-escape at position {0}")]
    MalformedEscape(usize),
    /// Character outside the unescaped set of its component
    #[error("illegal character '{ch}' at position {position}")]
    IllegalCharacter { ch: char, position: usize },
    /// Namespace-specific string is empty, malformed, or decodes to invalid text
    #[error("invalid namespace-specific string: {0}")]
    InvalidNss(String),
    /// `?+`, `?=` and `#` appear out of resolution, query, fragment order
    #[error("'{found}' component appears after '{after}' component")]
    OutOfOrderComponent { found: String, after: String },
    /// Resolution or query piece is not a single `key=value` pair
    #[error("malformed key=value pair: '{0}'")]
    MalformedKeyValue(String),
    /// Resolution, query or fragment decodes to invalid text
    #[error("invalid resolution/query/fragment component: {0}")]
    InvalidRqf(String),
}

impl UrnError {
    /// Re-base a character position reported for a substring onto the
    /// enclosing input that starts `offset` bytes earlier
    pub(crate) fn shifted(self, offset: usize) -> Self {
        match self {
            UrnError::MalformedEscape(position) => UrnError::MalformedEscape(position + offset),
            UrnError::IllegalCharacter { ch, position } => UrnError::IllegalCharacter {
                ch,
                position: position + offset,
            },
            other => other,
        }
    }
}
