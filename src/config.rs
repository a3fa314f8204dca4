//! Configuration for encoding and decoding cookie text.
//!
//! Check out the [`Config`] struct for more information.

/// `Config` specifies whether cookie values should be percent-encoded when
/// rendered and whether cookie names and values should be percent-decoded
/// when parsed out of a `Cookie` header.
///
/// The defaults match what browsers expect: both are enabled.
/// Entry points that don't take a `Config` use [`Config::default()`].
///
/// ```rust
/// use amaretti::{Cookie, CookieCollection};
/// use amaretti::config::Config;
///
/// let mut config = Config::default();
/// config.percent_decode = false;
/// let cookies = CookieCollection::parse_header_with("name=hello%20world", &config);
/// assert_eq!(cookies.get("name"), Some("hello%20world"));
///
/// config.percent_encode = false;
/// let cookie = Cookie::new("name", "a b").unwrap();
/// assert_eq!(cookie.encoded(&config).to_string(), "name=a b; Path=/; SameSite=Lax");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// If `true`, cookie values are percent-encoded (with the same set of
    /// characters as ECMAScript's `encodeURIComponent`) when rendered as
    /// `Cookie` or `Set-Cookie` header values.
    ///
    /// By default, this field is `true`.
    pub percent_encode: bool,
    /// If `true` and a `Cookie` header value contains a `%` anywhere, every
    /// name and value in it is percent-decoded. A pair that fails to decode
    /// is kept verbatim.
    ///
    /// By default, this field is `true`.
    pub percent_decode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            percent_encode: true,
            percent_decode: true,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::Config;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{ "percent_decode": false }"#).unwrap();
        assert!(config.percent_encode);
        assert!(!config.percent_decode);
    }
}
