//! Response header storage.
//!
//! Responses carry a handful of headers, so they live inline in a
//! [`SmallVec`] and are looked up with a linear, case-insensitive scan.
//! Unlike a `HashMap`, a name may appear more than once, which is what
//! `Set-Cookie` needs when a handler and a middleware both set cookies.

use smallvec::SmallVec;
use std::fmt;

/// Number of headers stored inline before spilling to the heap.
pub const INLINE_HEADERS: usize = 8;

/// A header name-value pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    /// Check if name matches (case-insensitive)
    #[inline]
    pub fn name_eq(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Ordered header map that allows repeated names.
///
/// ```
/// use palisade_core::HeaderMap;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("Content-Type", "text/html");
/// headers.append("Set-Cookie", "session=abc");
/// headers.append("Set-Cookie", "csrftoken=xyz");
///
/// assert_eq!(headers.get("content-type"), Some(&"text/html".to_string()));
/// assert_eq!(headers.get_all("set-cookie").len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct HeaderMap {
    inner: SmallVec<[Header; INLINE_HEADERS]>,
}

impl HeaderMap {
    #[inline]
    pub const fn new() -> Self {
        Self {
            inner: SmallVec::new_const(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// First value for `name` (case-insensitive)
    #[inline]
    pub fn get(&self, name: &str) -> Option<&String> {
        self.inner
            .iter()
            .find(|h| h.name_eq(name))
            .map(|h| &h.value)
    }

    /// Every value for `name`, in insertion order
    pub fn get_all(&self, name: &str) -> Vec<&String> {
        self.inner
            .iter()
            .filter(|h| h.name_eq(name))
            .map(|h| &h.value)
            .collect()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.iter().any(|h| h.name_eq(name))
    }

    /// Insert a header, replacing every existing value with the same name.
    ///
    /// Returns the first replaced value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();

        let old = self.remove(&name);
        self.remove_all(&name);
        self.inner.push(Header { name, value });
        old
    }

    /// Add a value without touching existing ones
    #[inline]
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push(Header {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Remove the first value for `name`
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.inner.iter().position(|h| h.name_eq(name))?;
        Some(self.inner.remove(pos).value)
    }

    /// Remove every value for `name`, returning how many were dropped
    pub fn remove_all(&mut self, name: &str) -> usize {
        let before = self.inner.len();
        self.inner.retain(|h| !h.name_eq(name));
        before - self.inner.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.inner.iter().map(|h| (&h.name, &h.value))
    }
}

impl fmt::Debug for HeaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.inner.iter().map(|h| (&h.name, &h.value)))
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HeaderMap::new();
        for (k, v) in iter {
            map.append(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_case_insensitively() {
        let mut headers = HeaderMap::new();
        assert_eq!(headers.insert("Content-Type", "text/plain"), None);
        let old = headers.insert("content-type", "application/json");

        assert_eq!(old, Some("text/plain".to_string()));
        assert_eq!(headers.len(), 1);
        assert_eq!(
            headers.get("CONTENT-TYPE"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_append_keeps_every_value() {
        let mut headers = HeaderMap::new();
        headers.append("Set-Cookie", "session=abc");
        headers.append("set-cookie", "csrftoken=xyz");

        assert_eq!(headers.len(), 2);
        assert_eq!(
            headers.get_all("Set-Cookie"),
            vec!["session=abc", "csrftoken=xyz"]
        );
        assert_eq!(headers.get("Set-Cookie"), Some(&"session=abc".to_string()));
    }

    #[test]
    fn test_insert_collapses_repeated_values() {
        let mut headers: HeaderMap = [("Vary", "Cookie"), ("Vary", "Origin")].into_iter().collect();
        headers.insert("Vary", "Accept");
        assert_eq!(headers.get_all("vary"), vec!["Accept"]);
    }

    #[test]
    fn test_remove_all() {
        let mut headers = HeaderMap::new();
        headers.append("Set-Cookie", "a=1");
        headers.append("Set-Cookie", "b=2");
        headers.insert("X-Frame-Options", "DENY");

        assert_eq!(headers.remove_all("set-cookie"), 2);
        assert!(!headers.contains("Set-Cookie"));
        assert!(headers.contains("x-frame-options"));
    }
}
