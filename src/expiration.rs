use time::error::ComponentRange;
use time::macros::datetime;
use time::OffsetDateTime;

/// A cookie's expiration: either a date-time or session.
///
/// An `Expiration` is constructible with `Expiration::from()` via any of:
///
///   * `None` -> `Expiration::Session`
///   * `Some(OffsetDateTime)` -> `Expiration::DateTime`
///   * `OffsetDateTime` -> `Expiration::DateTime`
///
/// ```rust
/// use amaretti::{Expiration, time::OffsetDateTime};
///
/// let expires = Expiration::from(None);
/// assert_eq!(expires, Expiration::Session);
///
/// let now = OffsetDateTime::now_utc();
/// let expires = Expiration::from(now);
/// assert_eq!(expires, Expiration::DateTime(now));
///
/// let expires = Expiration::from(Some(now));
/// assert_eq!(expires, Expiration::DateTime(now));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expiration {
    /// Expiration for a "permanent" cookie at a specific date-time.
    DateTime(OffsetDateTime),
    /// Expiration for a "session" cookie. Browsers define the notion of a
    /// "session" and will automatically expire session cookies when they deem
    /// the "session" to be over. This is typically, but need not be, when the
    /// browser is closed.
    #[default]
    Session,
}

impl Expiration {
    /// The expiration carried by delete markers: one millisecond after the Unix epoch.
    ///
    /// ```rust
    /// use amaretti::Expiration;
    ///
    /// assert_eq!(Expiration::REMOVAL.unix_millis(), Some(1));
    /// ```
    pub const REMOVAL: Expiration = Expiration::DateTime(datetime!(1970-01-01 00:00:00.001 UTC));

    /// Builds an `Expiration::DateTime` from a number of milliseconds since the Unix epoch.
    ///
    /// It fails if the timestamp lies outside the range supported by [`OffsetDateTime`].
    ///
    /// ```rust
    /// use amaretti::Expiration;
    ///
    /// let expires = Expiration::from_unix_millis(1_000).unwrap();
    /// assert_eq!(expires.unix_millis(), Some(1_000));
    ///
    /// assert!(Expiration::from_unix_millis(i64::MAX).is_err());
    /// ```
    pub fn from_unix_millis(millis: i64) -> Result<Expiration, ComponentRange> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .map(Expiration::DateTime)
    }

    /// Returns the number of milliseconds since the Unix epoch if `self` is a `DateTime`.
    pub fn unix_millis(&self) -> Option<i64> {
        self.datetime()
            .map(|t| (t.unix_timestamp_nanos() / 1_000_000) as i64)
    }

    /// Returns `true` if `self` is an `Expiration::DateTime`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::{Expiration, time::OffsetDateTime};
    ///
    /// let expires = Expiration::from(None);
    /// assert!(!expires.is_datetime());
    ///
    /// let expires = Expiration::from(OffsetDateTime::now_utc());
    /// assert!(expires.is_datetime());
    /// ```
    pub fn is_datetime(&self) -> bool {
        match self {
            Expiration::DateTime(_) => true,
            Expiration::Session => false,
        }
    }

    /// Returns `true` if `self` is an `Expiration::Session`.
    pub fn is_session(&self) -> bool {
        match self {
            Expiration::DateTime(_) => false,
            Expiration::Session => true,
        }
    }

    /// Returns the inner [`OffsetDateTime`] value if `self` is a `DateTime`.
    pub fn datetime(&self) -> Option<OffsetDateTime> {
        match self {
            Expiration::Session => None,
            Expiration::DateTime(v) => Some(*v),
        }
    }

    /// Returns the date-time if it lies strictly after the Unix epoch, the
    /// only expirations that are rendered or checked for expiry.
    pub(crate) fn effective(&self) -> Option<OffsetDateTime> {
        match self.unix_millis() {
            Some(millis) if millis >= 1 => self.datetime(),
            _ => None,
        }
    }

    /// Applies `f` to the inner `OffsetDateTime` if `self` is a `DateTime` and
    /// returns the mapped `Expiration`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::Expiration;
    /// use amaretti::time::{Duration, OffsetDateTime};
    ///
    /// let now = OffsetDateTime::now_utc();
    /// let one_week = Duration::weeks(1);
    ///
    /// let expires = Expiration::from(now);
    /// assert_eq!(expires.map(|t| t + one_week).datetime(), Some(now + one_week));
    ///
    /// let expires = Expiration::from(None);
    /// assert_eq!(expires.map(|t| t + one_week).datetime(), None);
    /// ```
    pub fn map<F>(self, f: F) -> Self
    where
        F: FnOnce(OffsetDateTime) -> OffsetDateTime,
    {
        match self {
            Expiration::Session => Expiration::Session,
            Expiration::DateTime(v) => Expiration::DateTime(f(v)),
        }
    }
}

impl<T: Into<Option<OffsetDateTime>>> From<T> for Expiration {
    fn from(option: T) -> Self {
        match option.into() {
            Some(value) => Expiration::DateTime(value),
            None => Expiration::Session,
        }
    }
}
