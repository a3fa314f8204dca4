use std::borrow::Cow;
use std::collections::HashMap;

use crate::collection::{Iter, Keys, Values};
use crate::config::Config;
use crate::encoding::decode;
use crate::validation::ValidationError;
use crate::{Cookie, RemovalCookie};

#[derive(Default, Debug, Clone, PartialEq, Eq)]
/// The cookies of an HTTP exchange: the ones received in the request's `Cookie`
/// header and the ones set or deleted by the server while handling it.
///
/// The two are kept apart:
///
/// - cookies received from the client ("original" cookies) are never sent back;
/// - cookies passed to [`set`](CookieCollection::set),
///   [`set_cookie`](CookieCollection::set_cookie) or
///   [`delete`](CookieCollection::delete) are recorded, in order, and returned by
///   [`changes`](CookieCollection::changes) to build `Set-Cookie` headers.
///
/// Lookups give precedence to the changes. At any point in time, a name
/// appears at most once across the two: setting or deleting a cookie first
/// discards every existing entry with the same name.
///
/// # Example
///
/// ```rust
/// use amaretti::CookieCollection;
///
/// let mut cookies = CookieCollection::parse_header("theme=dark; lang=en");
/// cookies.set("theme", "light").unwrap();
/// cookies.delete("lang").unwrap();
///
/// assert_eq!(cookies.get("theme"), Some("light"));
/// assert!(!cookies.has("lang"));
///
/// let headers: Vec<_> = cookies.changes().iter().map(|c| c.to_string()).collect();
/// assert_eq!(headers, [
///     "theme=light; Path=/; SameSite=Lax",
///     "lang=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; SameSite=Lax",
/// ]);
/// ```
pub struct CookieCollection<'c> {
    original: Vec<(Cow<'c, str>, Cow<'c, str>)>,
    modified: Vec<Cookie<'c>>,
}

impl<'c> CookieCollection<'c> {
    /// Creates a new, empty [`CookieCollection`].
    pub fn new() -> CookieCollection<'c> {
        Default::default()
    }

    /// Parses a `Cookie` header value into a [`CookieCollection`], using the default [`Config`].
    ///
    /// Parsing never fails:
    ///
    /// - fragments without a `=` are skipped, as are fragments with an empty name;
    /// - if `header` contains a `%` anywhere, names and values are
    ///   percent-decoded. A pair that can't be decoded is kept verbatim.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::CookieCollection;
    ///
    /// let cookies = CookieCollection::parse_header("name=hello%20world; flag; =anonymous");
    /// assert_eq!(cookies.get("name"), Some("hello world"));
    /// assert_eq!(cookies.len(), 1);
    ///
    /// let cookies = CookieCollection::parse_header("name=100%;x=1");
    /// assert_eq!(cookies.get("name"), Some("100%"));
    /// assert_eq!(cookies.get("x"), Some("1"));
    /// ```
    pub fn parse_header(header: &'c str) -> CookieCollection<'c> {
        Self::parse_header_with(header, &Config::default())
    }

    /// Parses a `Cookie` header value into a [`CookieCollection`], following
    /// the decoding rules in `config`.
    pub fn parse_header_with(header: &'c str, config: &Config) -> CookieCollection<'c> {
        let percent_decode = config.percent_decode && header.contains('%');
        let mut cookies = CookieCollection::new();

        for fragment in header.split(';') {
            let Some((name, value)) = fragment.split_once('=') else {
                continue;
            };
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() {
                continue;
            }

            let pair = if percent_decode {
                match (decode(name), decode(value)) {
                    (Ok(name), Ok(value)) => (name, value),
                    (Err(e), _) | (_, Err(e)) => {
                        tracing::debug!(
                            error = %e,
                            cookie.name = name,
                            "Failed to percent-decode a request cookie, keeping it verbatim"
                        );
                        (Cow::Borrowed(name), Cow::Borrowed(value))
                    }
                }
            } else {
                (Cow::Borrowed(name), Cow::Borrowed(value))
            };
            cookies.original.push(pair);
        }

        cookies
    }

    /// Returns the value of the cookie named `name`, if there is one.
    ///
    /// A value set by the program takes precedence over the value received from the client.
    /// Deleted cookies, as well as cookies set to an empty value, are reported as absent.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::CookieCollection;
    ///
    /// let mut cookies = CookieCollection::parse_header("a=1");
    /// assert_eq!(cookies.get("a"), Some("1"));
    ///
    /// cookies.set("a", "2").unwrap();
    /// assert_eq!(cookies.get("a"), Some("2"));
    ///
    /// cookies.delete("a").unwrap();
    /// assert_eq!(cookies.get("a"), None);
    /// ```
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some(cookie) = self.modified.iter().find(|c| c.name() == name) {
            return if cookie.value.is_empty() {
                None
            } else {
                Some(cookie.value())
            };
        }
        self.original
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_ref())
    }

    /// Returns `true` if [`get`](CookieCollection::get) would return a value for `name`.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sets a cookie with the given name and value, and default attributes.
    ///
    /// It fails if `name` is not a valid cookie name.
    /// See [`set_cookie`](CookieCollection::set_cookie) for more details.
    pub fn set<N, V>(&mut self, name: N, value: V) -> Result<&mut Self, ValidationError>
    where
        N: Into<Cow<'c, str>>,
        V: Into<Cow<'c, str>>,
    {
        let cookie = Cookie::new(name, value)?;
        Ok(self.set_cookie(cookie))
    }

    /// Records `cookie` as a change.
    ///
    /// Any existing cookie with the same name, received or set, is discarded first.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::{Cookie, CookieCollection};
    ///
    /// let mut cookies = CookieCollection::parse_header("a=1");
    /// let cookie = Cookie::build("a", "2").set_secure(true).build().unwrap();
    /// assert_eq!(cookies.set_cookie(cookie).get("a"), Some("2"));
    /// assert_eq!(cookies.len(), 1);
    /// assert_eq!(
    ///     cookies.changes()[0].to_string(),
    ///     "a=2; Path=/; Secure; SameSite=Lax"
    /// );
    /// ```
    pub fn set_cookie(&mut self, cookie: Cookie<'c>) -> &mut Self {
        self.remove(cookie.name());
        self.modified.push(cookie);
        self
    }

    /// Deletes a cookie.
    ///
    /// Any existing cookie with the same name is discarded and a delete marker
    /// is recorded as a change, so that a `Set-Cookie` header clearing the cookie
    /// is sent to the client.
    /// Pass a [`RemovalCookie`] rather than a plain name to target a specific
    /// domain or path.
    ///
    /// Returns `true` if the cookie was present before deletion. It fails if
    /// the name, domain or path are invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::{CookieCollection, RemovalCookie};
    ///
    /// let mut cookies = CookieCollection::parse_header("a=1");
    /// assert!(cookies.delete("a").unwrap());
    /// assert!(!cookies.delete(RemovalCookie::new("b").set_path("/app")).unwrap());
    ///
    /// assert!(!cookies.has("a"));
    /// assert_eq!(cookies.changes().len(), 2);
    /// assert_eq!(cookies.changes()[1].path(), "/app");
    /// ```
    pub fn delete<R>(&mut self, removal: R) -> Result<bool, ValidationError>
    where
        R: Into<RemovalCookie<'c>>,
    {
        let marker = removal.into().into_cookie()?;
        let existed = self.has(marker.name());
        self.set_cookie(marker);
        Ok(existed)
    }

    fn remove(&mut self, name: &str) {
        self.original.retain(|(n, _)| n != name);
        self.modified.retain(|c| c.name() != name);
    }

    /// Returns all visible `(name, value)` pairs: first the cookies set by the
    /// program, then the ones received from the client.
    ///
    /// It's equivalent to `self.iter().collect()`.
    pub fn get_all(&self) -> Vec<(&str, &str)> {
        self.iter().collect()
    }

    /// Returns the number of visible cookies.
    pub fn len(&self) -> usize {
        let modified = self.modified.iter().filter(|c| !c.value.is_empty()).count();
        modified + self.original.len()
    }

    /// Returns `true` if there are no visible cookies.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the visible cookies as a name-to-value map.
    ///
    /// Values set by the program take precedence and deleted cookies are left out.
    /// If the client sent the same name more than once, the first value wins.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use amaretti::CookieCollection;
    ///
    /// let mut cookies = CookieCollection::parse_header("a=1; b=2; b=3");
    /// cookies.set("a", "4").unwrap();
    /// assert_eq!(
    ///     cookies.to_map(),
    ///     HashMap::from([("a".into(), "4".into()), ("b".into(), "2".into())])
    /// );
    /// ```
    pub fn to_map(&self) -> HashMap<Cow<'c, str>, Cow<'c, str>> {
        let mut map = HashMap::with_capacity(self.len());
        for cookie in self.modified.iter().filter(|c| !c.value.is_empty()) {
            map.insert(cookie.name.clone(), cookie.value.clone());
        }
        for (name, value) in &self.original {
            map.entry(name.clone()).or_insert_with(|| value.clone());
        }
        map
    }

    /// Returns every change recorded by [`set`](CookieCollection::set),
    /// [`set_cookie`](CookieCollection::set_cookie) and
    /// [`delete`](CookieCollection::delete), in order, delete markers included.
    ///
    /// Each of them should be sent to the client as a `Set-Cookie` header.
    pub fn changes(&self) -> &[Cookie<'c>] {
        &self.modified
    }

    /// Iterates over the visible `(name, value)` pairs: first the cookies set by
    /// the program, then the ones received from the client.
    ///
    /// Each call returns an independent iterator.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::CookieCollection;
    ///
    /// let mut cookies = CookieCollection::parse_header("a=1; b=2");
    /// cookies.set("c", "3").unwrap();
    /// cookies.delete("a").unwrap();
    ///
    /// let pairs: Vec<_> = cookies.iter().collect();
    /// assert_eq!(pairs, [("c", "3"), ("b", "2")]);
    /// assert_eq!(cookies.keys().collect::<Vec<_>>(), ["c", "b"]);
    /// assert_eq!(cookies.values().collect::<Vec<_>>(), ["3", "2"]);
    /// ```
    pub fn iter(&self) -> Iter<'_, 'c> {
        Iter {
            modified: self.modified.iter(),
            original: self.original.iter(),
        }
    }

    /// An alias for [`iter`](CookieCollection::iter).
    pub fn entries(&self) -> Iter<'_, 'c> {
        self.iter()
    }

    /// Iterates over the visible cookie names, in the same order as [`iter`](CookieCollection::iter).
    pub fn keys(&self) -> Keys<'_, 'c> {
        Keys { iter: self.iter() }
    }

    /// Iterates over the visible cookie values, in the same order as [`iter`](CookieCollection::iter).
    pub fn values(&self) -> Values<'_, 'c> {
        Values { iter: self.iter() }
    }

    /// Removes all cookies, both received and set.
    pub fn clear(&mut self) {
        self.original.clear();
        self.modified.clear();
    }

    /// Converts `self` into a [`CookieCollection`] with a static lifetime.
    pub fn into_owned(self) -> CookieCollection<'static> {
        CookieCollection {
            original: self
                .original
                .into_iter()
                .map(|(name, value)| (Cow::Owned(name.into_owned()), Cow::Owned(value.into_owned())))
                .collect(),
            modified: self.modified.into_iter().map(Cookie::into_owned).collect(),
        }
    }
}

impl<'c, N, V> FromIterator<(N, V)> for CookieCollection<'c>
where
    N: Into<Cow<'c, str>>,
    V: Into<Cow<'c, str>>,
{
    /// Builds a [`CookieCollection`] whose received cookies are the given pairs,
    /// as is. No validation nor decoding takes place.
    ///
    /// It works for sequences of pairs as well as for maps.
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use amaretti::CookieCollection;
    ///
    /// let cookies: CookieCollection = [("a", "1"), ("b", "2")].into_iter().collect();
    /// assert_eq!(cookies.get_all(), [("a", "1"), ("b", "2")]);
    ///
    /// let cookies: CookieCollection = HashMap::from([("a", "1")]).into_iter().collect();
    /// assert_eq!(cookies.get("a"), Some("1"));
    /// ```
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        CookieCollection {
            original: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
            modified: Vec::new(),
        }
    }
}

impl<'a, 'c> IntoIterator for &'a CookieCollection<'c> {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a, 'c>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CookieCollection<'_> {
    /// Serializes the visible cookies as a map, like [`CookieCollection::to_map`],
    /// preserving iteration order.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seen = std::collections::HashSet::new();
        serializer.collect_map(self.iter().filter(|(name, _)| seen.insert(*name)))
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use crate::config::Config;
    use crate::{Cookie, CookieCollection, Expiration, RemovalCookie};

    #[test]
    fn parse_header_skips_malformed_fragments() {
        let cases: [(&str, &[(&str, &str)]); 8] = [
            ("", &[]),
            (";;", &[]),
            ("name=value", &[("name", "value")]),
            ("  name=value  ", &[("name", "value")]),
            ("yo; a=1", &[("a", "1")]),
            (";a=1 ;  ; =v ; c=", &[("a", "1"), ("c", "")]),
            (" ;   a=1 ;  ; ;;c===  ", &[("a", "1"), ("c", "==")]),
            ("a=d#$^&*()_", &[("a", "d#$^&*()_")]),
        ];
        for (header, expected) in cases {
            let cookies = CookieCollection::parse_header(header);
            assert_eq!(cookies.get_all(), expected, "Failed for header: {header}");
        }
    }

    #[test]
    fn scenario_parse_header() {
        let cookies = CookieCollection::parse_header("sessionId=abc123; theme=dark; lang=en");
        assert_that!(
            cookies.get_all(),
            elements_are![
                eq(("sessionId", "abc123")),
                eq(("theme", "dark")),
                eq(("lang", "en"))
            ]
        );
    }

    #[test]
    fn percent_decoding_is_gated_on_the_whole_header() {
        let cookies = CookieCollection::parse_header("a%20or%20b=1; c=hello%20world");
        assert_eq!(cookies.get("a or b"), Some("1"));
        assert_eq!(cookies.get("c"), Some("hello world"));

        // No `%` anywhere: `+` and friends are left untouched.
        let cookies = CookieCollection::parse_header("a=b+c");
        assert_eq!(cookies.get("a"), Some("b+c"));
    }

    #[test]
    fn undecodable_pairs_are_kept_verbatim() {
        let cookies = CookieCollection::parse_header("name=100%;x=1");
        assert_eq!(cookies.get("name"), Some("100%"));
        assert_eq!(cookies.get("x"), Some("1"));

        // A failure on the value keeps the name verbatim too.
        let cookies = CookieCollection::parse_header("a%20b=%F1%F2; c=%20");
        assert_eq!(cookies.get("a%20b"), Some("%F1%F2"));
        assert_eq!(cookies.get("c"), Some(" "));
    }

    #[test]
    fn percent_decoding_can_be_disabled() {
        let mut config = Config::default();
        config.percent_decode = false;
        let cookies = CookieCollection::parse_header_with("a=%20", &config);
        assert_eq!(cookies.get("a"), Some("%20"));
    }

    #[test]
    fn set_overrides_original() {
        let mut cookies = CookieCollection::parse_header("a=1");
        assert_eq!(cookies.set("a", "2").unwrap().get("a"), Some("2"));
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies.to_map().len(), 1);
        assert_eq!(cookies.to_map()["a"], "2");
        assert_eq!(cookies.changes().len(), 1);
    }

    #[test]
    fn set_rejects_invalid_names() {
        let mut cookies = CookieCollection::new();
        let err = cookies.set("a b", "1").unwrap_err();
        assert_eq!(err.to_string(), "`a b` is not a valid cookie name");
        assert!(cookies.changes().is_empty());
    }

    #[test]
    fn set_twice_keeps_only_the_latest() {
        let mut cookies = CookieCollection::new();
        cookies.set("a", "1").unwrap().set("b", "2").unwrap();
        cookies.set("a", "3").unwrap();
        assert_eq!(cookies.get_all(), [("b", "2"), ("a", "3")]);
        let names: Vec<_> = cookies.changes().iter().map(Cookie::name).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn delete_records_a_marker() {
        let mut cookies = CookieCollection::parse_header("a=1");
        assert!(cookies.delete("a").unwrap());
        assert!(!cookies.has("a"));
        assert_eq!(cookies.get("a"), None);
        assert_eq!(cookies.len(), 0);
        assert!(cookies.is_empty());
        assert!(cookies.to_map().is_empty());
        assert_eq!(cookies.iter().count(), 0);

        let changes = cookies.changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].name(), "a");
        assert_eq!(changes[0].value(), "");
        assert_eq!(changes[0].expires(), Expiration::REMOVAL);
        assert_eq!(changes[0].expires_millis(), Some(1));
    }

    #[test]
    fn delete_reports_whether_the_cookie_was_visible() {
        let mut cookies = CookieCollection::new();
        assert!(!cookies.delete("missing").unwrap());
        cookies.set("a", "1").unwrap();
        assert!(cookies.delete("a").unwrap());
        // Already deleted.
        assert!(!cookies.delete("a").unwrap());
        assert_eq!(cookies.changes().len(), 2);
    }

    #[test]
    fn delete_with_scope() {
        let mut cookies = CookieCollection::new();
        cookies
            .delete(RemovalCookie::new("id").set_domain("example.com").set_path("/app"))
            .unwrap();
        assert_eq!(
            cookies.changes()[0].to_string(),
            "id=; Domain=example.com; Path=/app; Expires=Thu, 01 Jan 1970 00:00:00 GMT; SameSite=Lax"
        );
        assert!(cookies.delete(RemovalCookie::new("id").set_path("/a;b")).is_err());
    }

    #[test]
    fn set_after_delete_revives_the_cookie() {
        let mut cookies = CookieCollection::parse_header("a=1");
        cookies.delete("a").unwrap();
        cookies.set("a", "2").unwrap();
        assert_eq!(cookies.get("a"), Some("2"));
        assert_eq!(cookies.changes().len(), 1);
        assert!(!cookies.changes()[0].is_removal());
    }

    #[test]
    fn empty_values_read_as_absent() {
        let mut cookies = CookieCollection::new();
        cookies.set("a", "").unwrap();
        assert!(!cookies.has("a"));
        assert_eq!(cookies.len(), 0);
        assert_eq!(cookies.changes().len(), 1);
    }

    #[test]
    fn original_duplicates_are_all_replaced() {
        let mut cookies = CookieCollection::parse_header("a=1; a=2; b=3");
        assert_eq!(cookies.get("a"), Some("1"));
        assert_eq!(cookies.len(), 3);
        cookies.set("a", "4").unwrap();
        assert_eq!(cookies.get_all(), [("a", "4"), ("b", "3")]);
    }

    #[test]
    fn iteration_is_restartable() {
        let mut cookies = CookieCollection::parse_header("a=1; b=2");
        cookies.set("c", "3").unwrap();
        let iter = cookies.iter();
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
        assert_eq!(first, (&cookies).into_iter().collect::<Vec<_>>());
        assert_eq!(cookies.entries().collect::<Vec<_>>(), cookies.get_all());
    }

    #[test]
    fn clone_is_independent() {
        let mut cookies = CookieCollection::parse_header("a=1");
        let mut copy = cookies.clone();
        copy.set("b", "2").unwrap();
        cookies.delete("a").unwrap();

        assert_eq!(copy.get("a"), Some("1"));
        assert_eq!(copy.get("b"), Some("2"));
        assert_eq!(cookies.get("b"), None);
        assert_eq!(cookies.changes().len(), 1);
        assert!(cookies.changes()[0].is_removal());
    }

    #[test]
    fn clear_empties_everything() {
        let mut cookies = CookieCollection::parse_header("a=1");
        cookies.set("b", "2").unwrap();
        cookies.clear();
        assert!(cookies.is_empty());
        assert!(cookies.changes().is_empty());
        assert_eq!(cookies, CookieCollection::new());
    }

    #[test]
    fn from_pairs_and_maps() {
        let cookies: CookieCollection = vec![("a".to_string(), "1".to_string())]
            .into_iter()
            .collect();
        assert_eq!(cookies.get("a"), Some("1"));
        assert!(cookies.changes().is_empty());

        let map = std::collections::HashMap::from([("x", "%20")]);
        let cookies = CookieCollection::from_iter(map);
        // Pairs are taken as is.
        assert_eq!(cookies.get("x"), Some("%20"));
    }

    #[test]
    fn into_owned_outlives_the_header() {
        let cookies: CookieCollection<'static> = {
            let header = String::from("a=1; b=2");
            let mut cookies = CookieCollection::parse_header(&header);
            cookies.set("c", "3").unwrap();
            cookies.into_owned()
        };
        assert_eq!(cookies.get_all(), [("c", "3"), ("a", "1"), ("b", "2")]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_like_to_map() {
        let mut cookies = CookieCollection::parse_header("a=1; b=2; b=3");
        cookies.set("c", "4").unwrap();
        cookies.delete("a").unwrap();
        let json = serde_json::to_string(&cookies).unwrap();
        assert_eq!(json, r#"{"c":"4","b":"2"}"#);
    }
}
