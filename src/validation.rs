//! Character-class checks for cookie names, paths and domains.
//!
//! They are applied whenever a [`Cookie`] is constructed, but you can also use
//! them directly to vet user-provided input.
//!
//! [`Cookie`]: crate::Cookie

/// Returns `true` if `name` is a valid cookie name.
///
/// A valid name is non-empty and every character lies in `0x21..=0x3A`, is
/// `0x3C`, or lies in `0x3E..=0x7E`. Whitespace, control characters, `;`, `=`
/// and non-ASCII characters are rejected.
///
/// # Example
///
/// ```rust
/// use amaretti::is_valid_cookie_name;
///
/// assert!(is_valid_cookie_name("session_id"));
/// assert!(!is_valid_cookie_name(""));
/// assert!(!is_valid_cookie_name("a b"));
/// assert!(!is_valid_cookie_name("a=b"));
/// ```
pub fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| matches!(c, '\u{21}'..='\u{3A}' | '\u{3C}' | '\u{3E}'..='\u{7E}'))
}

/// Returns `true` if `path` is a valid cookie path.
///
/// Every character must lie in `0x20..=0x3A` or `0x3D..=0x7E`.
/// The empty path is valid.
///
/// # Example
///
/// ```rust
/// use amaretti::is_valid_cookie_path;
///
/// assert!(is_valid_cookie_path("/"));
/// assert!(is_valid_cookie_path(""));
/// assert!(!is_valid_cookie_path("/a;b"));
/// ```
pub fn is_valid_cookie_path(path: &str) -> bool {
    path.chars()
        .all(|c| matches!(c, '\u{20}'..='\u{3A}' | '\u{3D}'..='\u{7E}'))
}

/// Returns `true` if `domain` is a valid cookie domain.
///
/// Only lowercase ASCII letters, digits, `.` and `-` are allowed.
/// The empty domain is valid.
///
/// `Domain` attributes are lowercased when parsed out of a `Set-Cookie` header,
/// but a domain supplied programmatically must already be lowercase.
///
/// # Example
///
/// ```rust
/// use amaretti::is_valid_cookie_domain;
///
/// assert!(is_valid_cookie_domain("example.com"));
/// assert!(is_valid_cookie_domain(""));
/// assert!(!is_valid_cookie_domain("EXAMPLE.com"));
/// ```
pub fn is_valid_cookie_domain(domain: &str) -> bool {
    domain
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-'))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
/// The error returned when a [`Cookie`] is built with an invalid name, path or domain.
///
/// [`Cookie`]: crate::Cookie
pub enum ValidationError {
    #[error("`{0}` is not a valid cookie name")]
    InvalidName(String),
    #[error("`{0}` is not a valid cookie path")]
    InvalidPath(String),
    #[error("`{0}` is not a valid cookie domain")]
    InvalidDomain(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_boundaries() {
        for valid in ["a", "!", ":", "<", ">", "~", "__Host-id", "a.b"] {
            assert!(is_valid_cookie_name(valid), "{valid} should be valid");
        }
        for invalid in ["", " ", "a b", "a=b", "a;b", "\t", "a\u{7f}", "é"] {
            assert!(!is_valid_cookie_name(invalid), "{invalid:?} should be invalid");
        }
    }

    #[test]
    fn path_boundaries() {
        assert!(is_valid_cookie_path("/with space/"));
        assert!(is_valid_cookie_path("/a=b"));
        assert!(!is_valid_cookie_path("/a<b"));
        assert!(!is_valid_cookie_path("/a\u{7f}"));
        assert!(!is_valid_cookie_path("/\n"));
    }

    #[test]
    fn domain_boundaries() {
        assert!(is_valid_cookie_domain("sub-1.example.com"));
        assert!(is_valid_cookie_domain(".example.com"));
        assert!(!is_valid_cookie_domain("example.com:8080"));
        assert!(!is_valid_cookie_domain("Example.com"));
        assert!(!is_valid_cookie_domain("exa mple.com"));
    }

    #[test]
    fn errors_display_the_offending_text() {
        assert_eq!(
            ValidationError::InvalidName("a b".into()).to_string(),
            "`a b` is not a valid cookie name"
        );
    }
}
