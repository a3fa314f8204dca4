//! Low-level types related to [`CookieCollection`].
//!
//! [`CookieCollection`]: crate::CookieCollection
use crate::Cookie;
use std::borrow::Cow;
use std::iter::FusedIterator;
use std::slice;

/// An iterator over the `(name, value)` pairs visible in a [`CookieCollection`].
///
/// Cookies set by the program come first, in the order they were set, followed by
/// the cookies received in the `Cookie` header. Deleted cookies are skipped.
///
/// This struct is created by the [`CookieCollection::iter()`] method.
///
/// [`CookieCollection`]: crate::CookieCollection
/// [`CookieCollection::iter()`]: crate::CookieCollection::iter
#[derive(Debug, Clone)]
pub struct Iter<'a, 'c> {
    pub(crate) modified: slice::Iter<'a, Cookie<'c>>,
    pub(crate) original: slice::Iter<'a, (Cow<'c, str>, Cow<'c, str>)>,
}

impl<'a, 'c> Iterator for Iter<'a, 'c> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(cookie) = self.modified.by_ref().find(|c| !c.value.is_empty()) {
            return Some(cookie.name_value());
        }
        self.original
            .next()
            .map(|(name, value)| (name.as_ref(), value.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let original = self.original.len();
        (original, Some(original + self.modified.len()))
    }
}

impl FusedIterator for Iter<'_, '_> {}

/// An iterator over the names visible in a [`CookieCollection`].
///
/// This struct is created by the [`CookieCollection::keys()`] method.
///
/// [`CookieCollection`]: crate::CookieCollection
/// [`CookieCollection::keys()`]: crate::CookieCollection::keys
#[derive(Debug, Clone)]
pub struct Keys<'a, 'c> {
    pub(crate) iter: Iter<'a, 'c>,
}

impl<'a, 'c> Iterator for Keys<'a, 'c> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(name, _)| name)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl FusedIterator for Keys<'_, '_> {}

/// An iterator over the values visible in a [`CookieCollection`].
///
/// This struct is created by the [`CookieCollection::values()`] method.
///
/// [`CookieCollection`]: crate::CookieCollection
/// [`CookieCollection::values()`]: crate::CookieCollection::values
#[derive(Debug, Clone)]
pub struct Values<'a, 'c> {
    pub(crate) iter: Iter<'a, 'c>,
}

impl<'a, 'c> Iterator for Values<'a, 'c> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl FusedIterator for Values<'_, '_> {}
