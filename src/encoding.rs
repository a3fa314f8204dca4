use std::borrow::Cow;

use anyhow::Context;
use percent_encoding::{percent_decode_str, AsciiSet, NON_ALPHANUMERIC};

/// The characters escaped by ECMAScript's `encodeURIComponent`: everything but
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a cookie value with the proper encoding set.
pub(crate) fn encode(string: &str) -> impl std::fmt::Display + '_ {
    percent_encoding::utf8_percent_encode(string, COMPONENT)
}

/// Percent-decode a cookie name or value.
///
/// Unlike [`percent_decode_str`], a `%` that isn't followed by two hex digits
/// is an error rather than being passed through.
pub(crate) fn decode(string: &str) -> Result<Cow<'_, str>, DecodingError> {
    let bytes = string.as_bytes();
    let mut i = 0;
    while let Some(offset) = bytes[i..].iter().position(|b| *b == b'%') {
        let at = i + offset;
        let escape = bytes.get(at + 1..at + 3);
        if !escape.is_some_and(|e| e.iter().all(u8::is_ascii_hexdigit)) {
            return Err(DecodingError {
                raw_value: string.to_string(),
                source: anyhow::anyhow!("Malformed percent-escape at byte offset {at}"),
            });
        }
        i = at + 3;
    }

    percent_decode_str(string)
        .decode_utf8()
        .context("The percent-decoded bytes are not valid UTF-8")
        .map_err(|e| DecodingError {
            raw_value: string.to_string(),
            source: e,
        })
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to percent-decode `{raw_value}`")]
/// An error that occurred while decoding a percent-encoded cookie name or value.
pub(crate) struct DecodingError {
    raw_value: String,
    #[source]
    source: anyhow::Error,
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(encode("hello world").to_string(), "hello%20world");
        assert_eq!(encode("a;b=c,d").to_string(), "a%3Bb%3Dc%2Cd");
        assert_eq!(encode("-_.!~*'()").to_string(), "-_.!~*'()");
        assert_eq!(encode("ü").to_string(), "%C3%BC");
    }

    #[test]
    fn decodes_valid_escapes() {
        assert_eq!(decode("hello%20world").unwrap(), "hello world");
        assert_eq!(decode("%C3%BC").unwrap(), "ü");
        assert_eq!(decode("plain").unwrap(), "plain");
    }

    #[test]
    fn rejects_malformed_escapes() {
        assert!(decode("100%").is_err());
        assert!(decode("%zz").is_err());
        assert!(decode("%2").is_err());
        assert_eq!(decode("%F1%F2").unwrap_err().raw_value, "%F1%F2");
    }
}
