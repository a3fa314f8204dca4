//! Free functions to move between header values, cookies and plain maps.
//!
//! With the `http` feature enabled (the default), this module also provides
//! adapters to read cookies out of, and write changes into, an [`http::HeaderMap`].
use std::borrow::Cow;
use std::collections::HashMap;

use crate::config::Config;
use crate::encoding::encode;
use crate::errors::{ParseError, ValidationError};
use crate::{Cookie, CookieCollection};

/// Parses a `Cookie` header value into a name-to-value map.
///
/// It follows the same rules as [`CookieCollection::parse_header`]. If a name
/// appears more than once, the first value wins.
///
/// # Example
///
/// ```rust
/// use amaretti::headers::parse_cookie_header;
///
/// let cookies = parse_cookie_header("sessionId=abc123; theme=dark; lang=en");
/// assert_eq!(cookies.len(), 3);
/// assert_eq!(cookies["sessionId"], "abc123");
/// assert_eq!(cookies["theme"], "dark");
/// assert_eq!(cookies["lang"], "en");
/// ```
pub fn parse_cookie_header(header: &str) -> HashMap<Cow<'_, str>, Cow<'_, str>> {
    CookieCollection::parse_header(header).to_map()
}

/// Parses a single `Set-Cookie` header value.
///
/// It's a shorthand for [`Cookie::parse`].
pub fn parse_set_cookie_header(header: &str) -> Result<Cookie<'_>, ParseError> {
    Cookie::parse(header)
}

/// Parses multiple `Set-Cookie` header values.
///
/// Values that can't be parsed are skipped, with a warning.
///
/// # Example
///
/// ```rust
/// use amaretti::headers::parse_set_cookie_headers;
///
/// let cookies = parse_set_cookie_headers(["a=1; Secure", "malformed", "b=2"]);
/// let names: Vec<_> = cookies.iter().map(|c| c.name()).collect();
/// assert_eq!(names, ["a", "b"]);
/// ```
pub fn parse_set_cookie_headers<'c, I>(headers: I) -> Vec<Cookie<'c>>
where
    I: IntoIterator<Item = &'c str>,
{
    headers.into_iter().filter_map(parse_or_warn).collect()
}

fn parse_or_warn(header: &str) -> Option<Cookie<'_>> {
    match Cookie::parse(header) {
        Ok(cookie) => Some(cookie),
        Err(e) => {
            tracing::warn!(
                error = %e,
                header = header,
                "Skipping a malformed `Set-Cookie` header value"
            );
            None
        }
    }
}

/// Collects the name and value of each cookie into a map.
///
/// If a name appears more than once, the last value wins.
pub fn cookies_to_record<'a, 'c: 'a, I>(cookies: I) -> HashMap<Cow<'c, str>, Cow<'c, str>>
where
    I: IntoIterator<Item = &'a Cookie<'c>>,
{
    cookies
        .into_iter()
        .map(|c| (c.name.clone(), c.value.clone()))
        .collect()
}

/// Builds a cookie, with default attributes, for each name-value pair.
///
/// It fails on the first invalid name.
///
/// # Example
///
/// ```rust
/// use amaretti::headers::record_to_cookies;
///
/// let cookies = record_to_cookies([("a", "1")]).unwrap();
/// assert_eq!(cookies[0].to_string(), "a=1; Path=/; SameSite=Lax");
///
/// assert!(record_to_cookies([("a b", "1")]).is_err());
/// ```
pub fn record_to_cookies<'c, I, N, V>(record: I) -> Result<Vec<Cookie<'c>>, ValidationError>
where
    I: IntoIterator<Item = (N, V)>,
    N: Into<Cow<'c, str>>,
    V: Into<Cow<'c, str>>,
{
    record
        .into_iter()
        .map(|(name, value)| Cookie::new(name, value))
        .collect()
}

/// Renders cookies as a `Cookie` header value: `name=value` pairs joined by `; `.
///
/// Values are percent-encoded; attributes are left out.
///
/// # Example
///
/// ```rust
/// use amaretti::{serialize, Cookie};
///
/// let cookies = [
///     Cookie::new("a", "1").unwrap(),
///     Cookie::build("b", "two words").set_secure(true).build().unwrap(),
/// ];
/// assert_eq!(serialize(&cookies), "a=1; b=two%20words");
/// assert_eq!(serialize(&Vec::<Cookie>::new()), "");
/// ```
pub fn serialize<'a, 'c: 'a, I>(cookies: I) -> String
where
    I: IntoIterator<Item = &'a Cookie<'c>>,
{
    serialize_with(cookies, &Config::default())
}

/// Renders cookies as a `Cookie` header value, following the encoding rules in `config`.
pub fn serialize_with<'a, 'c: 'a, I>(cookies: I, config: &Config) -> String
where
    I: IntoIterator<Item = &'a Cookie<'c>>,
{
    join_pairs(cookies.into_iter().map(Cookie::name_value), config)
}

/// Renders the cookies visible in `cookies` as a `Cookie` header value.
///
/// # Example
///
/// ```rust
/// use amaretti::CookieCollection;
/// use amaretti::headers::serialize_cookie_map;
///
/// let mut cookies = CookieCollection::parse_header("a=1; b=2");
/// cookies.set("c", "x y").unwrap();
/// cookies.delete("a").unwrap();
/// assert_eq!(serialize_cookie_map(&cookies), "c=x%20y; b=2");
/// ```
pub fn serialize_cookie_map(cookies: &CookieCollection<'_>) -> String {
    join_pairs(cookies.entries(), &Config::default())
}

fn join_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>, config: &Config) -> String {
    pairs
        .map(|(name, value)| {
            if config.percent_encode {
                format!("{name}={}", encode(value))
            } else {
                format!("{name}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(feature = "http")]
mod http_adapters {
    use http::header::{InvalidHeaderValue, COOKIE, SET_COOKIE};
    use http::{HeaderMap, HeaderValue};

    use super::parse_or_warn;
    use crate::CookieCollection;

    /// Builds a [`CookieCollection`] out of the `Cookie` headers in `headers`.
    ///
    /// HTTP/2 clients may split cookies across several `Cookie` headers: they
    /// are joined with `; ` and parsed as a single header value. Values that
    /// aren't valid UTF-8 are skipped, with a warning. An empty collection is
    /// returned if there is no usable header.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::headers::from_request_headers;
    /// use http::{header::COOKIE, HeaderMap, HeaderValue};
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert(COOKIE, HeaderValue::from_static("a=1; b=2"));
    /// let cookies = from_request_headers(&headers);
    /// assert_eq!(cookies.get("b"), Some("2"));
    /// ```
    pub fn from_request_headers(headers: &HeaderMap) -> CookieCollection<'_> {
        let values: Vec<&str> = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| match value.to_str() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring a `Cookie` header that isn't valid UTF-8");
                    None
                }
            })
            .collect();

        match values.as_slice() {
            [] => CookieCollection::new(),
            [value] => CookieCollection::parse_header(*value),
            _ => CookieCollection::parse_header(&values.join("; ")).into_owned(),
        }
    }

    /// Builds a [`CookieCollection`] out of the `Set-Cookie` headers in `headers`.
    ///
    /// Each cookie is recorded as a change, as if it had been passed to
    /// [`CookieCollection::set_cookie`]. Malformed header values are skipped, with a warning.
    pub fn from_set_cookie_headers(headers: &HeaderMap) -> CookieCollection<'_> {
        let mut cookies = CookieCollection::new();
        for value in headers.get_all(SET_COOKIE) {
            let value = match value.to_str() {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Skipping a `Set-Cookie` header value that isn't valid UTF-8"
                    );
                    continue;
                }
            };
            if let Some(cookie) = parse_or_warn(value) {
                cookies.set_cookie(cookie);
            }
        }
        cookies
    }

    /// Appends one `Set-Cookie` header to `headers` for each change recorded in `cookies`.
    ///
    /// Either every change is written or, if one of them can't be turned into a
    /// header value, none is and `headers` is left untouched.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::CookieCollection;
    /// use amaretti::headers::write_set_cookie_headers;
    /// use http::{header::SET_COOKIE, HeaderMap};
    ///
    /// let mut cookies = CookieCollection::parse_header("a=1");
    /// cookies.set("b", "2").unwrap();
    /// cookies.delete("a").unwrap();
    ///
    /// let mut headers = HeaderMap::new();
    /// write_set_cookie_headers(&cookies, &mut headers).unwrap();
    /// let values: Vec<_> = headers
    ///     .get_all(SET_COOKIE)
    ///     .iter()
    ///     .map(|v| v.to_str().unwrap())
    ///     .collect();
    /// assert_eq!(values, [
    ///     "b=2; Path=/; SameSite=Lax",
    ///     "a=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; SameSite=Lax",
    /// ]);
    /// ```
    pub fn write_set_cookie_headers(
        cookies: &CookieCollection<'_>,
        headers: &mut HeaderMap,
    ) -> Result<(), InvalidHeaderValue> {
        let values = cookies
            .changes()
            .iter()
            .map(|cookie| HeaderValue::try_from(cookie.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        for value in values {
            headers.append(SET_COOKIE, value);
        }
        Ok(())
    }
}

#[cfg(feature = "http")]
pub use http_adapters::{from_request_headers, from_set_cookie_headers, write_set_cookie_headers};
