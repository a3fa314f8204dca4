use crate::encoding::decode;
use crate::validation::ValidationError;
use crate::{Cookie, Expiration, SameSite};
use std::borrow::Cow;
use std::str::FromStr;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

/// The date formats accepted for the `Expires` attribute, all interpreted as UTC.
static HTTP_DATE_FORMATS: [&[FormatItem<'static>]; 4] = [
    // IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
    format_description!("[weekday repr:short case_sensitive:false], [day] [month repr:short case_sensitive:false] [year] [hour]:[minute]:[second] GMT"),
    // Netscape's original format, e.g. `Sun, 06-Nov-1994 08:49:37 GMT`.
    format_description!("[weekday repr:short case_sensitive:false], [day]-[month repr:short case_sensitive:false]-[year] [hour]:[minute]:[second] GMT"),
    // Full weekday names, e.g. `Sunday, 06 Nov 1994 08:49:37 GMT`.
    format_description!("[weekday case_sensitive:false], [day] [month repr:short case_sensitive:false] [year] [hour]:[minute]:[second] GMT"),
    // asctime, e.g. `Sun Nov  6 08:49:37 1994`.
    format_description!("[weekday repr:short case_sensitive:false] [month repr:short case_sensitive:false] [day padding:space] [hour]:[minute]:[second] [year]"),
];

impl<'c> Cookie<'c> {
    /// Parses a `Set-Cookie` header value into a [`Cookie`].
    ///
    /// Attribute names are matched case-insensitively; unknown attributes, as
    /// well as attributes with malformed values, are ignored.
    /// `Max-Age` takes precedence over `Expires`, whatever their order.
    ///
    /// The value is percent-decoded, mirroring the encoding applied when a
    /// [`Cookie`] is rendered. A value that can't be decoded is kept verbatim.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::{Cookie, SameSite};
    ///
    /// let c = Cookie::parse("sessionId=abc123; Domain=Example.COM; Secure; HttpOnly").unwrap();
    /// assert_eq!(c.name_value(), ("sessionId", "abc123"));
    /// assert_eq!(c.domain(), "example.com");
    /// assert_eq!(c.path(), "/");
    /// assert!(c.secure());
    /// assert!(c.http_only());
    /// assert_eq!(c.same_site(), SameSite::Lax);
    /// ```
    pub fn parse(s: &'c str) -> Result<Cookie<'c>, ParseError> {
        if s.chars().count() < 2 {
            return Err(ParseError::TooShort);
        }

        let (pair, attributes) = match s.split_once(';') {
            Some((pair, attributes)) => (pair, Some(attributes)),
            None => (s, None),
        };

        let (name, value) = match pair.split_once('=') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => {
                return Err(ParseError::MissingPair(MissingPairError {
                    fragment: pair.to_string(),
                }))
            }
        };

        if name.is_empty() {
            return Err(ParseError::EmptyName(EmptyNameError {
                value: value.to_string(),
            }));
        }

        let value = match decode(value) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    cookie.name = name,
                    "Failed to percent-decode a `Set-Cookie` value, keeping it verbatim"
                );
                Cow::Borrowed(value)
            }
        };

        let mut builder = Cookie::build(name, value);
        let mut max_age_seen = false;

        for attribute in attributes.into_iter().flat_map(|a| a.split(';')) {
            let attribute = attribute.trim();
            let (key, value) = match attribute.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (attribute, ""),
            };

            match key.to_ascii_lowercase().as_str() {
                "domain" if !value.is_empty() => {
                    builder = builder.set_domain(lowercase(value));
                }
                "path" if value.starts_with('/') => {
                    builder = builder.set_path(value);
                }
                "expires" if !max_age_seen => {
                    if let Some(expires) = parse_http_date(value) {
                        builder = builder.set_expires(expires);
                    }
                }
                "max-age" => {
                    if let Ok(seconds) = value.parse::<i64>() {
                        max_age_seen = true;
                        builder = builder
                            .set_max_age(Duration::seconds(seconds))
                            .set_expires(Expiration::Session);
                    }
                }
                "secure" => builder = builder.set_secure(true),
                "httponly" => builder = builder.set_http_only(true),
                "partitioned" => builder = builder.set_partitioned(true),
                "samesite" => {
                    if let Some(same_site) = SameSite::from_attribute(value) {
                        builder = builder.set_same_site(same_site);
                    }
                }
                _ => {}
            }
        }

        builder.build().map_err(ParseError::from)
    }
}

fn lowercase(s: &str) -> Cow<'_, str> {
    if s.bytes().any(|b| b.is_ascii_uppercase()) || !s.is_ascii() {
        Cow::Owned(s.to_lowercase())
    } else {
        Cow::Borrowed(s)
    }
}

/// Parses an HTTP date, as found in the `Expires` attribute.
pub(crate) fn parse_http_date(s: &str) -> Option<OffsetDateTime> {
    HTTP_DATE_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(s, *format).ok())
        .map(PrimitiveDateTime::assume_utc)
}

impl FromStr for Cookie<'static> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cookie::parse(s).map(Cookie::into_owned)
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
/// The error returned by [`Cookie::parse()`].
pub enum ParseError {
    #[error("A `Set-Cookie` header value must be at least two characters long")]
    TooShort,
    #[error(transparent)]
    MissingPair(#[from] MissingPairError),
    #[error(transparent)]
    EmptyName(#[from] EmptyNameError),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, thiserror::Error)]
#[error("Expected a name-value pair, but no `=` was found in `{fragment}`")]
/// An error that occurs when the cookie-pair of a `Set-Cookie` header value
/// doesn't contain a name-value separator (`=`).
pub struct MissingPairError {
    fragment: String,
}

#[derive(Debug, thiserror::Error)]
#[error("The name of a cookie cannot be empty, but found an empty name with `{value}` as value")]
/// An error that occurs when the cookie-pair of a `Set-Cookie` header value
/// has an empty name (e.g. `=value`).
pub struct EmptyNameError {
    value: String,
}

#[cfg(test)]
mod tests {
    use googletest::matcher::{Matcher, MatcherResult};
    use googletest::prelude::{displays_as, eq, starts_with};
    use time::macros::datetime;
    use time::Duration;

    use crate::{Cookie, Expiration, SameSite};

    #[track_caller]
    fn check_err(string: &str, matcher: impl Matcher<ActualT = String>) {
        let err = Cookie::parse(string)
            .expect_err(&format!("Expected an error for {string}"))
            .to_string();
        let error = format!(
            "Expected: {}\n{}\n",
            matcher.describe(MatcherResult::Match),
            matcher.explain_match(&err)
        );
        assert!(matcher.matches(&err).is_match(), "{error}");
    }

    #[test]
    fn malformed_inputs() {
        check_err("", displays_as(starts_with("A `Set-Cookie` header value must")));
        check_err("a", displays_as(starts_with("A `Set-Cookie` header value must")));
        check_err(
            "yo; a=b",
            eq("Expected a name-value pair, but no `=` was found in `yo`"),
        );
        check_err(
            " =v; Path=/",
            eq("The name of a cookie cannot be empty, but found an empty name with `v` as value"),
        );
        check_err("a b=c", eq("`a b` is not a valid cookie name"));
    }

    #[test]
    fn scenario() {
        let c = Cookie::parse("sessionId=abc123; Domain=example.com; Secure; HttpOnly").unwrap();
        assert_eq!(c.name(), "sessionId");
        assert_eq!(c.value(), "abc123");
        assert_eq!(c.domain(), "example.com");
        assert!(c.secure());
        assert!(c.http_only());
        assert!(!c.partitioned());
        assert_eq!(c.path(), "/");
        assert_eq!(c.same_site(), SameSite::Lax);
        assert_eq!(c.expires(), Expiration::Session);
        assert_eq!(c.max_age(), None);
    }

    #[test]
    fn attribute_names_are_case_insensitive() {
        let c = Cookie::parse(
            "a=b;  pATH=/sub ;SECURE; httpOnly=whatever; PARTITIONED; samesite=STRICT; DOMAIN=Foo.Com",
        )
        .unwrap();
        assert_eq!(c.path(), "/sub");
        assert!(c.secure());
        assert!(c.http_only());
        assert!(c.partitioned());
        assert_eq!(c.same_site(), SameSite::Strict);
        assert_eq!(c.domain(), "foo.com");
    }

    #[test]
    fn malformed_attributes_are_ignored() {
        let c = Cookie::parse(
            "a=b; Path=relative; Domain=; Max-Age=soon; Expires=tomorrow; SameSite=sometimes; Flavour=vanilla",
        )
        .unwrap();
        assert_eq!(c, Cookie::new("a", "b").unwrap());
    }

    #[test]
    fn values_are_trimmed_and_decoded() {
        let c = Cookie::parse("  a  =  hello%20world  ").unwrap();
        assert_eq!(c.name_value(), ("a", "hello world"));

        let c = Cookie::parse("a=b=c; Path=/").unwrap();
        assert_eq!(c.value(), "b=c");

        let c = Cookie::parse("a=%C3%BC%3B").unwrap();
        assert_eq!(c.value(), "ü;");
    }

    #[test]
    fn undecodable_values_are_kept_verbatim() {
        for raw in ["100%", "%zz", "%F1%F2"] {
            let header = format!("a={raw}; Secure");
            let c = Cookie::parse(&header).unwrap();
            assert_eq!(c.value(), raw);
            assert!(c.secure());
        }
    }

    #[test]
    fn max_age_takes_precedence_over_expires() {
        for s in [
            "a=b; Max-Age=60; Expires=Wed, 21 Oct 2015 07:28:00 GMT",
            "a=b; Expires=Wed, 21 Oct 2015 07:28:00 GMT; Max-Age=60",
        ] {
            let c = Cookie::parse(s).unwrap();
            assert_eq!(c.max_age(), Some(Duration::seconds(60)), "{s}");
            assert_eq!(c.expires(), Expiration::Session, "{s}");
            assert_eq!(c.expires_millis(), None, "{s}");
        }
    }

    #[test]
    fn an_invalid_max_age_does_not_lock_out_expires() {
        let c = Cookie::parse("a=b; Max-Age=abc; Expires=Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        assert_eq!(c.max_age(), None);
        assert_eq!(
            c.expires().datetime(),
            Some(datetime!(2015-10-21 07:28:00 UTC))
        );
    }

    #[test]
    fn negative_max_age() {
        let c = Cookie::parse("a=b; Max-Age=-1").unwrap();
        assert_eq!(c.max_age(), Some(Duration::seconds(-1)));
        assert!(c.to_string().contains("Max-Age=-1"));
    }

    #[test]
    fn http_date_formats() {
        let expected = Some(datetime!(1994-11-06 08:49:37 UTC));
        for s in [
            "Sun, 06 Nov 1994 08:49:37 GMT",
            "sun, 06 nov 1994 08:49:37 GMT",
            "Sun, 06-Nov-1994 08:49:37 GMT",
            "Sunday, 06 Nov 1994 08:49:37 GMT",
            "Sun Nov  6 08:49:37 1994",
        ] {
            assert_eq!(super::parse_http_date(s), expected, "{s}");
        }
        assert_eq!(super::parse_http_date("06/11/1994"), None);
    }

    #[test]
    fn roundtrip_name_and_value() {
        for value in ["value", "", "a b", "a;b", "100%", "x%20y", "ü", "\"quoted\", =,"] {
            let original = Cookie::new("name", value).unwrap();
            let rendered = original.to_string();
            let parsed = Cookie::parse(&rendered).unwrap();
            assert_eq!(parsed, original, "Failed for rendered value: {rendered}");
        }
    }

    #[test]
    fn rendering_a_parsed_cookie_does_not_double_encode() {
        let c = Cookie::parse("a=x%20y; Path=/").unwrap();
        assert_eq!(c.to_string(), "a=x%20y; Path=/; SameSite=Lax");
    }

    #[test]
    fn reparsing_a_rendered_cookie_is_idempotent() {
        let canonical = "id=42; Domain=example.com; Path=/app; \
                         Expires=Wed, 21 Oct 2015 07:28:00 GMT; Secure; HttpOnly; \
                         Partitioned; SameSite=Strict";
        let parsed = Cookie::parse(canonical).unwrap();
        assert_eq!(parsed.to_string(), canonical);

        let with_max_age = "id=42; Domain=example.com; Path=/app; Max-Age=3600; Secure; SameSite=None";
        let parsed = Cookie::parse(with_max_age).unwrap();
        let rendered = parsed.to_string();
        assert_eq!(Cookie::parse(&rendered).unwrap(), parsed);
    }

    #[test]
    fn from_str_yields_an_owned_cookie() {
        let c: Cookie<'static> = {
            let header = String::from("a=b; Secure");
            header.parse().unwrap()
        };
        assert!(c.secure());
    }
}
