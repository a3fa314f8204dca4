use crate::config::Config;
use crate::encoding::encode;
use crate::validation::{
    is_valid_cookie_domain, is_valid_cookie_name, is_valid_cookie_path, ValidationError,
};
use crate::{Expiration, SameSite};
use std::borrow::Cow;
use std::fmt;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

/// The path used when none is specified.
pub(crate) const DEFAULT_PATH: &str = "/";

/// An immutable HTTP cookie, with all the attributes of a `Set-Cookie` header.
///
/// ## Constructing a `Cookie`
///
/// To construct a cookie with only a name/value, use [`Cookie::new()`].
/// Construction fails if the name, path or domain contain characters that
/// aren't allowed (see [`is_valid_cookie_name`] and friends).
///
/// ```rust
/// use amaretti::Cookie;
///
/// let cookie = Cookie::new("name", "value").unwrap();
/// assert_eq!(cookie.to_string(), "name=value; Path=/; SameSite=Lax");
///
/// assert!(Cookie::new("a name", "value").is_err());
/// ```
///
/// ## Building a `Cookie`
///
/// To construct more elaborate cookies, use [`Cookie::build()`].
///
/// ```rust
/// use amaretti::{Cookie, SameSite};
///
/// let cookie = Cookie::build("name", "value")
///     .set_domain("www.rust-lang.org")
///     .set_path("/docs")
///     .set_secure(true)
///     .set_http_only(true)
///     .set_same_site(SameSite::Strict)
///     .build()
///     .unwrap();
/// assert_eq!(
///     cookie.to_string(),
///     "name=value; Domain=www.rust-lang.org; Path=/docs; Secure; HttpOnly; SameSite=Strict"
/// );
/// ```
///
/// [`is_valid_cookie_name`]: crate::is_valid_cookie_name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cookie<'c> {
    /// The cookie's name.
    pub(crate) name: Cow<'c, str>,
    /// The cookie's value.
    pub(crate) value: Cow<'c, str>,
    /// The cookie's domain. Empty if unset.
    pub(crate) domain: Cow<'c, str>,
    /// The cookie's path.
    pub(crate) path: Cow<'c, str>,
    /// The cookie's expiration.
    pub(crate) expires: Expiration,
    /// The cookie's maximum age, if any.
    pub(crate) max_age: Option<Duration>,
    /// Whether this cookie was marked Secure.
    pub(crate) secure: bool,
    /// Whether this cookie was marked HttpOnly.
    pub(crate) http_only: bool,
    /// Whether this cookie was marked Partitioned.
    pub(crate) partitioned: bool,
    /// The `SameSite` attribute.
    pub(crate) same_site: SameSite,
}

impl<'c> Cookie<'c> {
    /// Creates a new [`Cookie`] with the given name and value, and default attributes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::{Cookie, SameSite};
    ///
    /// let cookie = Cookie::new("name", "value").unwrap();
    /// assert_eq!(cookie.name_value(), ("name", "value"));
    /// assert_eq!(cookie.path(), "/");
    /// assert_eq!(cookie.domain(), "");
    /// assert_eq!(cookie.same_site(), SameSite::Lax);
    /// ```
    pub fn new<N, V>(name: N, value: V) -> Result<Self, ValidationError>
    where
        N: Into<Cow<'c, str>>,
        V: Into<Cow<'c, str>>,
    {
        Cookie::build(name, value).build()
    }

    /// Starts building a [`Cookie`] with the given name and value.
    ///
    /// Validation is deferred to [`CookieBuilder::build()`].
    pub fn build<N, V>(name: N, value: V) -> CookieBuilder<'c>
    where
        N: Into<Cow<'c, str>>,
        V: Into<Cow<'c, str>>,
    {
        CookieBuilder {
            cookie: Cookie {
                name: name.into(),
                value: value.into(),
                domain: Cow::Borrowed(""),
                path: Cow::Borrowed(DEFAULT_PATH),
                expires: Expiration::Session,
                max_age: None,
                secure: false,
                http_only: false,
                partitioned: false,
                same_site: SameSite::default(),
            },
        }
    }

    /// Returns a [`CookieBuilder`] pre-populated with the attributes of `self`.
    ///
    /// It's the way to derive a modified copy of an existing cookie.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::Cookie;
    ///
    /// let cookie = Cookie::new("name", "value").unwrap();
    /// let secure = cookie.to_builder().set_secure(true).build().unwrap();
    /// assert!(!cookie.secure());
    /// assert!(secure.secure());
    /// ```
    pub fn to_builder(&self) -> CookieBuilder<'c> {
        CookieBuilder {
            cookie: self.clone(),
        }
    }

    /// Converts `self` into a [`Cookie`] with a static lifetime with as few
    /// allocations as possible.
    pub fn into_owned(self) -> Cookie<'static> {
        Cookie {
            name: to_owned(self.name),
            value: to_owned(self.value),
            domain: to_owned(self.domain),
            path: to_owned(self.path),
            expires: self.expires,
            max_age: self.max_age,
            secure: self.secure,
            http_only: self.http_only,
            partitioned: self.partitioned,
            same_site: self.same_site,
        }
    }

    /// Returns the name of `self`.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Returns the value of `self`, as is. It is only percent-encoded
    /// when `self` is rendered.
    #[inline]
    pub fn value(&self) -> &str {
        self.value.as_ref()
    }

    /// Returns the name and value of `self` as a tuple of `(name, value)`.
    #[inline]
    pub fn name_value(&self) -> (&str, &str) {
        (self.name(), self.value())
    }

    /// Returns the `Domain` of `self`. An empty string means that no domain was specified.
    #[inline]
    pub fn domain(&self) -> &str {
        self.domain.as_ref()
    }

    /// Returns the `Path` of `self`. It defaults to `/`.
    #[inline]
    pub fn path(&self) -> &str {
        self.path.as_ref()
    }

    /// Returns the [`Expiration`] of `self`.
    /// It is [`Expiration::Session`] if no expiry was specified.
    #[inline]
    pub fn expires(&self) -> Expiration {
        self.expires
    }

    /// Returns the expiration of `self` as milliseconds since the Unix epoch,
    /// or `None` for a session cookie.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::Cookie;
    ///
    /// let c = Cookie::parse("id=1; Expires=Thu, 01 Jan 1970 00:00:10 GMT").unwrap();
    /// assert_eq!(c.expires_millis(), Some(10_000));
    ///
    /// let c = Cookie::parse("id=1").unwrap();
    /// assert_eq!(c.expires_millis(), None);
    /// ```
    #[inline]
    pub fn expires_millis(&self) -> Option<i64> {
        self.expires.unix_millis()
    }

    /// Returns the specified max-age of the cookie if one was specified.
    #[inline]
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Returns whether this cookie was marked `Secure`.
    #[inline]
    pub fn secure(&self) -> bool {
        self.secure
    }

    /// Returns whether this cookie was marked `HttpOnly`.
    #[inline]
    pub fn http_only(&self) -> bool {
        self.http_only
    }

    /// Returns whether this cookie was marked `Partitioned`.
    ///
    /// **Note:** This cookie attribute is an [HTTP draft]! Its meaning and
    /// definition are not standardized and therefore subject to change.
    ///
    /// [HTTP draft]: https://datatracker.ietf.org/doc/draft-cutler-httpbis-partitioned-cookies/
    #[inline]
    pub fn partitioned(&self) -> bool {
        self.partitioned
    }

    /// Returns the `SameSite` attribute of this cookie. It defaults to [`SameSite::Lax`].
    #[inline]
    pub fn same_site(&self) -> SameSite {
        self.same_site
    }

    /// Returns `true` if `self` is a delete marker: an empty value expiring
    /// one millisecond after the Unix epoch.
    pub fn is_removal(&self) -> bool {
        self.value.is_empty() && self.expires == Expiration::REMOVAL
    }

    /// Returns `true` if the expiry of `self` is in the past.
    ///
    /// Session cookies, as well as cookies whose expiry is at or before the
    /// Unix epoch, never expire.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::Cookie;
    ///
    /// let c = Cookie::parse("id=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
    /// assert!(c.is_expired());
    ///
    /// let c = Cookie::parse("id=1").unwrap();
    /// assert!(!c.is_expired());
    /// ```
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    /// Returns `true` if the expiry of `self` is before `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        match self.expires.effective() {
            Some(expires) => now > expires,
            None => false,
        }
    }

    /// Renders `self` as a `Set-Cookie` header value, following the encoding
    /// rules in `config`.
    ///
    /// The [`Display`](fmt::Display) implementation uses [`Config::default()`].
    pub fn encoded<'a>(&'a self, config: &'a Config) -> EncodedCookie<'a, 'c> {
        EncodedCookie {
            cookie: self,
            config,
        }
    }

    /// Renders the `name=value` pair of `self`, the way it appears in a `Cookie` header.
    pub(crate) fn fmt_pair(&self, f: &mut fmt::Formatter, config: &Config) -> fmt::Result {
        if config.percent_encode {
            write!(f, "{}={}", self.name(), encode(self.value()))
        } else {
            write!(f, "{}={}", self.name(), self.value())
        }
    }

    fn fmt_parameters(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.domain.is_empty() {
            write!(f, "; Domain={}", self.domain())?;
        }

        if !self.path.is_empty() {
            write!(f, "; Path={}", self.path())?;
        }

        if let Some(time) = self.expires.effective() {
            let time = time.to_offset(UtcOffset::UTC);

            // From http://tools.ietf.org/html/rfc2616#section-3.3.1.
            static FMT1: &[FormatItem<'_>] = format_description!("[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT");
            write!(
                f,
                "; Expires={}",
                time.format(&FMT1).map_err(|_| fmt::Error)?
            )?;
        }

        if let Some(max_age) = self.max_age() {
            write!(f, "; Max-Age={}", max_age.whole_seconds())?;
        }

        if self.secure {
            write!(f, "; Secure")?;
        }

        if self.http_only {
            write!(f, "; HttpOnly")?;
        }

        if self.partitioned {
            write!(f, "; Partitioned")?;
        }

        write!(f, "; SameSite={}", self.same_site)
    }
}

fn to_owned(s: Cow<'_, str>) -> Cow<'static, str> {
    match s {
        Cow::Borrowed(s) => Cow::Owned(s.to_owned()),
        Cow::Owned(s) => Cow::Owned(s),
    }
}

impl<'c> fmt::Display for Cookie<'c> {
    /// Formats the cookie `self` as a `Set-Cookie` header value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::Cookie;
    ///
    /// let cookie = Cookie::new("foo", "bar baz").unwrap();
    /// assert_eq!(cookie.to_string(), "foo=bar%20baz; Path=/; SameSite=Lax");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.encoded(&Config::default()), f)
    }
}

/// A [`Cookie`] rendered with a specific [`Config`].
///
/// This struct is created by the [`Cookie::encoded()`] method.
pub struct EncodedCookie<'a, 'c> {
    cookie: &'a Cookie<'c>,
    config: &'a Config,
}

impl fmt::Display for EncodedCookie<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.cookie.fmt_pair(f, self.config)?;
        self.cookie.fmt_parameters(f)
    }
}

/// A builder for [`Cookie`]s.
///
/// This struct is created by the [`Cookie::build()`] and [`Cookie::to_builder()`] methods.
#[derive(Debug, Clone)]
#[must_use = "builders have no effect if unused"]
pub struct CookieBuilder<'c> {
    cookie: Cookie<'c>,
}

impl<'c> CookieBuilder<'c> {
    /// Sets the value of the cookie.
    pub fn set_value<V: Into<Cow<'c, str>>>(mut self, value: V) -> Self {
        self.cookie.value = value.into();
        self
    }

    /// Sets the `Domain` of the cookie. An empty domain means "unset".
    ///
    /// The domain must be lowercase: see [`is_valid_cookie_domain`].
    ///
    /// [`is_valid_cookie_domain`]: crate::is_valid_cookie_domain
    pub fn set_domain<D: Into<Cow<'c, str>>>(mut self, domain: D) -> Self {
        self.cookie.domain = domain.into();
        self
    }

    /// Sets the `Path` of the cookie.
    pub fn set_path<P: Into<Cow<'c, str>>>(mut self, path: P) -> Self {
        self.cookie.path = path.into();
        self
    }

    /// Sets the expiration of the cookie. `None` makes it a session cookie.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::{Cookie, Expiration};
    /// use amaretti::time::macros::datetime;
    ///
    /// let c = Cookie::build("name", "value")
    ///     .set_expires(datetime!(2015-10-21 07:28:00 UTC))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(
    ///     c.to_string(),
    ///     "name=value; Path=/; Expires=Wed, 21 Oct 2015 07:28:00 GMT; SameSite=Lax"
    /// );
    ///
    /// let c = c.to_builder().set_expires(None).build().unwrap();
    /// assert_eq!(c.expires(), Expiration::Session);
    /// ```
    pub fn set_expires<T: Into<Expiration>>(mut self, time: T) -> Self {
        self.cookie.expires = time.into();
        self
    }

    /// Sets the `Max-Age` of the cookie. `None` unsets it.
    pub fn set_max_age<D: Into<Option<Duration>>>(mut self, value: D) -> Self {
        self.cookie.max_age = value.into();
        self
    }

    /// Marks the cookie as `Secure`, or not.
    pub fn set_secure(mut self, value: bool) -> Self {
        self.cookie.secure = value;
        self
    }

    /// Marks the cookie as `HttpOnly`, or not.
    pub fn set_http_only(mut self, value: bool) -> Self {
        self.cookie.http_only = value;
        self
    }

    /// Marks the cookie as `Partitioned`, or not.
    pub fn set_partitioned(mut self, value: bool) -> Self {
        self.cookie.partitioned = value;
        self
    }

    /// Sets the `SameSite` attribute of the cookie.
    pub fn set_same_site(mut self, value: SameSite) -> Self {
        self.cookie.same_site = value;
        self
    }

    /// Validates the name, path and domain and returns the [`Cookie`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::Cookie;
    /// use amaretti::errors::ValidationError;
    ///
    /// let err = Cookie::build("name", "value")
    ///     .set_domain("EXAMPLE.com")
    ///     .build()
    ///     .unwrap_err();
    /// assert_eq!(err, ValidationError::InvalidDomain("EXAMPLE.com".into()));
    /// ```
    pub fn build(self) -> Result<Cookie<'c>, ValidationError> {
        let cookie = self.cookie;
        if !is_valid_cookie_name(&cookie.name) {
            return Err(ValidationError::InvalidName(cookie.name.into_owned()));
        }
        if !is_valid_cookie_path(&cookie.path) {
            return Err(ValidationError::InvalidPath(cookie.path.into_owned()));
        }
        if !is_valid_cookie_domain(&cookie.domain) {
            return Err(ValidationError::InvalidDomain(cookie.domain.into_owned()));
        }
        Ok(cookie)
    }
}
