use crate::validation::ValidationError;
use crate::{Cookie, Expiration};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Describes a cookie to be removed from the client's machine.
///
/// It is passed to [`CookieCollection::delete()`], which records it as a
/// delete marker: a [`Cookie`] with an empty value and an expiry one
/// millisecond after the Unix epoch.
///
/// A plain name converts into a `RemovalCookie` with the default path and no domain.
///
/// ```rust
/// use amaretti::RemovalCookie;
///
/// let removal = RemovalCookie::new("name")
///     .set_domain("example.com")
///     .set_path("/app");
/// let marker = removal.into_cookie().unwrap();
/// assert_eq!(
///     marker.to_string(),
///     "name=; Domain=example.com; Path=/app; Expires=Thu, 01 Jan 1970 00:00:00 GMT; SameSite=Lax"
/// );
/// ```
///
/// [`CookieCollection::delete()`]: crate::CookieCollection::delete
pub struct RemovalCookie<'c> {
    /// The cookie's name.
    pub(crate) name: Cow<'c, str>,
    /// The cookie's domain, if any.
    pub(crate) domain: Option<Cow<'c, str>>,
    /// The cookie's path, if any.
    pub(crate) path: Option<Cow<'c, str>>,
}

impl<'c> RemovalCookie<'c> {
    /// Creates a new [`RemovalCookie`] with the given name.
    pub fn new<N>(name: N) -> Self
    where
        N: Into<Cow<'c, str>>,
    {
        Self {
            name: name.into(),
            domain: None,
            path: None,
        }
    }

    /// Returns the name of `self`.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Returns the `Path` of the [`RemovalCookie`] if one was specified.
    #[inline]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the `Domain` of the [`RemovalCookie`] if one was specified.
    #[inline]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Sets the path property of the removal cookie to `path`.
    /// It returns the modified removal cookie.
    pub fn set_path<P: Into<Cow<'c, str>>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the `domain` of `self` to `domain`.
    pub fn set_domain<D: Into<Cow<'c, str>>>(mut self, domain: D) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Builds the delete marker for `self`.
    ///
    /// It fails if the name, domain or path are invalid.
    pub fn into_cookie(self) -> Result<Cookie<'c>, ValidationError> {
        let mut c = Cookie::build(self.name, "").set_expires(Expiration::REMOVAL);
        if let Some(domain) = self.domain {
            c = c.set_domain(domain);
        }
        if let Some(path) = self.path {
            c = c.set_path(path);
        }
        c.build()
    }
}

impl<'a> From<&'a str> for RemovalCookie<'a> {
    fn from(value: &'a str) -> RemovalCookie<'a> {
        RemovalCookie::new(value)
    }
}

impl From<String> for RemovalCookie<'_> {
    fn from(value: String) -> Self {
        RemovalCookie::new(value)
    }
}

impl<'c> From<&Cookie<'c>> for RemovalCookie<'c> {
    /// Targets the same name, domain and path as the given cookie.
    fn from(value: &Cookie<'c>) -> Self {
        let mut removal = RemovalCookie::new(value.name.clone()).set_path(value.path.clone());
        if !value.domain.is_empty() {
            removal = removal.set_domain(value.domain.clone());
        }
        removal
    }
}
