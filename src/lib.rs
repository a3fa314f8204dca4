//! Parse HTTP cookie headers and keep track of the cookies a server changes
//! while handling a request.
//!
//! # Overview
//!
//! `amaretti` has support for:
//!
//! - Parsing `Set-Cookie` header values into a [`Cookie`], via [`Cookie::parse`]
//! - Rendering a [`Cookie`] as a `Set-Cookie` header value, via its [`Display`] implementation
//! - Handling the cookies of an HTTP exchange, via [`CookieCollection`]
//!
//! In particular:
//!
//! - Attribute names are matched case-insensitively and `Max-Age` always wins over `Expires`
//! - Names, paths and domains are validated whenever a [`Cookie`] is constructed
//! - Outgoing values are percent-encoded, and decoded again when parsed back with
//!   [`Cookie::parse`]. `Cookie` headers are decoded when they contain a `%`
//! - Only the cookies set or deleted by your code are ever sent back to the client
//!
//! # Non-goals
//!
//! `amaretti` is not a cookie jar: it doesn't store cookies, doesn't evict them and
//! doesn't match them against request URLs.
//!
//! # Quickstart
//!
//! ```rust
//! use amaretti::{Cookie, CookieCollection, RemovalCookie};
//!
//! // Parse the `Cookie` header you received from the client.
//! let mut cookies = CookieCollection::parse_header("session=abc123; theme=dark%20blue");
//! assert_eq!(cookies.get("theme"), Some("dark blue"));
//!
//! // Set and delete cookies while handling the request.
//! let session = Cookie::build("session", "def456")
//!     .set_http_only(true)
//!     .set_secure(true)
//!     .build()
//!     .unwrap();
//! cookies.set_cookie(session);
//! cookies.delete(RemovalCookie::new("theme")).unwrap();
//!
//! assert_eq!(cookies.get("session"), Some("def456"));
//! assert!(!cookies.has("theme"));
//!
//! // Only the changes are turned into `Set-Cookie` header values.
//! let header_values: Vec<_> = cookies.changes().iter().map(|c| c.to_string()).collect();
//! assert_eq!(header_values, [
//!     "session=def456; Path=/; Secure; HttpOnly; SameSite=Lax",
//!     "theme=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; SameSite=Lax",
//! ]);
//! ```
//!
//! ## Credits
//!
//! The cookie model is inspired by the [`biscotti` crate](https://crates.io/crates/biscotti)
//! and, through it, by the [`cookie` crate](https://crates.io/crates/cookie).
//!
//! [`Display`]: std::fmt::Display

pub mod collection;
pub mod config;
mod cookie;
mod cookie_collection;
mod encoding;
mod expiration;
pub mod headers;
mod parse;
mod removal;
mod same_site;
mod validation;

pub use crate::expiration::*;
pub use crate::same_site::*;
pub use cookie::{Cookie, CookieBuilder, EncodedCookie};
pub use cookie_collection::CookieCollection;
pub use headers::serialize;
pub use removal::RemovalCookie;
pub use time;
pub use validation::{is_valid_cookie_domain, is_valid_cookie_name, is_valid_cookie_path};

/// Errors that can occur when using `amaretti`.
pub mod errors {
    pub use crate::parse::{EmptyNameError, MissingPairError, ParseError};
    pub use crate::validation::ValidationError;
}
