//! Percent-encoding with a distinct unescaped character set per grammar context
//!
//! RFC 8141 builds every URN component from RFC 3986 `pchar`s, but each
//! production keeps a different subset of the reserved characters as
//! literal delimiters. Using the wrong set silently accepts or rejects the
//! wrong strings, so every call names its [`Context`] explicitly.
//!
//! The namespace identifier never carries escapes and does not pass through
//! this module.

use crate::error::UrnError;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped when encoding one colon-delimited NSS part
const NSS_PART: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b'@')
    .remove(b'/');

/// Characters escaped when encoding a resolution or query key or value
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b':')
    .remove(b'@')
    .remove(b'/');

/// Characters escaped when encoding a fragment
const FRAGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@')
    .remove(b'/');

/// Grammar context selecting the unescaped character set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// One colon-delimited part of the namespace-specific string (`:` is the delimiter)
    NssPart,
    /// A key or value inside the resolution or query component (`&` and `=` are delimiters)
    Query,
    /// The fragment, a single opaque string
    Fragment,
}

impl Context {
    /// Whether `c` may appear unescaped in this context when decoding
    ///
    /// `?` is accepted in query and fragment text as RFC 3986 allows, but
    /// it is always escaped on output so that a serialized value can never
    /// spell an `?+` or `?=` marker.
    pub fn allows(self, c: char) -> bool {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~') {
            return true;
        }
        match self {
            Context::NssPart => matches!(
                c,
                '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' | '@' | '/'
            ),
            Context::Query => matches!(
                c,
                '!' | '$' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | ':' | '@' | '/' | '?'
            ),
            Context::Fragment => matches!(
                c,
                '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' | ':' | '@' | '/' | '?'
            ),
        }
    }

    fn escape_set(self) -> &'static AsciiSet {
        match self {
            Context::NssPart => NSS_PART,
            Context::Query => QUERY,
            Context::Fragment => FRAGMENT,
        }
    }

    fn undecodable(self, input: &str) -> UrnError {
        let detail = format!("'{}' does not decode to UTF-8 text", input);
        match self {
            Context::NssPart => UrnError::InvalidNss(detail),
            Context::Query | Context::Fragment => UrnError::InvalidRqf(detail),
        }
    }
}

/// Check that every character is either unescaped-legal in `context` or part
/// of a well-formed `%XX` escape
pub fn validate(input: &str, context: Context) -> Result<(), UrnError> {
    let bytes = input.as_bytes();
    for (position, ch) in input.char_indices() {
        if ch == '%' {
            let well_formed = bytes
                .get(position + 1..position + 3)
                .map_or(false, |hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !well_formed {
                return Err(UrnError::MalformedEscape(position));
            }
        } else if !context.allows(ch) {
            return Err(UrnError::IllegalCharacter { ch, position });
        }
    }
    Ok(())
}

/// Decode percent-escapes after validating `input` against `context`
pub fn decode(input: &str, context: Context) -> Result<String, UrnError> {
    validate(input, context)?;
    percent_decode_str(input)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| context.undecodable(input))
}

/// Escape every character outside the unescaped set of `context` as `%XX`
/// with uppercase hex digits
pub fn encode(input: &str, context: Context) -> String {
    utf8_percent_encode(input, context.escape_set()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXTS: [Context; 3] = [Context::NssPart, Context::Query, Context::Fragment];

    #[test]
    fn test_escape_sets_agree_with_allowed_sets() {
        for context in CONTEXTS {
            for b in 0x20u8..0x7f {
                let c = b as char;
                let passes = encode(&c.to_string(), context) == c.to_string();
                assert_eq!(
                    passes,
                    context.allows(c) && c != '?',
                    "{:?} disagrees on {:?}",
                    context,
                    c
                );
            }
        }
    }

    #[test]
    fn test_decode_escapes() {
        assert_eq!(decode("example%20resource", Context::NssPart).unwrap(), "example resource");
        assert_eq!(decode("a%3Ab", Context::NssPart).unwrap(), "a:b");
        assert_eq!(decode("a%3ab", Context::NssPart).unwrap(), "a:b");
        assert_eq!(decode("caf%C3%A9", Context::Fragment).unwrap(), "café");
    }

    #[test]
    fn test_malformed_escape() {
        assert_eq!(decode("a%2", Context::NssPart), Err(UrnError::MalformedEscape(1)));
        assert_eq!(decode("%", Context::Query), Err(UrnError::MalformedEscape(0)));
        assert_eq!(decode("ab%zz", Context::Fragment), Err(UrnError::MalformedEscape(2)));
    }

    #[test]
    fn test_illegal_character_per_context() {
        // `:` delimits NSS parts but is literal in query values
        assert_eq!(
            decode("a:b", Context::NssPart),
            Err(UrnError::IllegalCharacter { ch: ':', position: 1 })
        );
        assert!(decode("a:b", Context::Query).is_ok());

        // `&` and `=` delimit query pairs but are literal elsewhere
        assert!(matches!(
            decode("a&b", Context::Query),
            Err(UrnError::IllegalCharacter { ch: '&', .. })
        ));
        assert!(decode("a&b=c", Context::Fragment).is_ok());
        assert!(decode("a&b=c", Context::NssPart).is_ok());

        assert!(matches!(
            decode("a b", Context::Fragment),
            Err(UrnError::IllegalCharacter { ch: ' ', position: 1 })
        ));
        assert!(matches!(
            decode("a#b", Context::Fragment),
            Err(UrnError::IllegalCharacter { ch: '#', .. })
        ));
        assert!(matches!(
            decode("é", Context::NssPart),
            Err(UrnError::IllegalCharacter { ch: 'é', position: 0 })
        ));
    }

    #[test]
    fn test_invalid_utf8_maps_to_component_error() {
        assert!(matches!(decode("%FF", Context::NssPart), Err(UrnError::InvalidNss(_))));
        assert!(matches!(decode("%FF", Context::Query), Err(UrnError::InvalidRqf(_))));
        assert!(matches!(decode("%C3", Context::Fragment), Err(UrnError::InvalidRqf(_))));
    }

    #[test]
    fn test_encode_uppercase_hex() {
        assert_eq!(encode("example resource", Context::NssPart), "example%20resource");
        assert_eq!(encode("a:b", Context::NssPart), "a%3Ab");
        assert_eq!(encode("a:b", Context::Query), "a:b");
        assert_eq!(encode("k=v&x", Context::Query), "k%3Dv%26x");
        assert_eq!(encode("100%", Context::Fragment), "100%25");
        assert_eq!(encode("café", Context::Fragment), "caf%C3%A9");
        assert_eq!(encode("what?=", Context::Fragment), "what%3F=");
    }

    #[test]
    fn test_decode_encode_identity() {
        for context in CONTEXTS {
            for s in ["plain", "with space", "a:b&c=d", "?+?=#", "%41", "ünï©ødé", ""] {
                assert_eq!(decode(&encode(s, context), context).unwrap(), s);
            }
        }
    }
}
