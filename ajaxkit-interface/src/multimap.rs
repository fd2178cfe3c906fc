//! Ordered multimaps for headers and query parameters.
//!
//! Both keep insertion order and allow repeated keys. [`Headers`] compares keys
//! case-insensitively; [`Params`] compares them exactly.

use std::fmt;
use std::marker::PhantomData;

/// How a [`MultiMap`] compares its keys.
pub trait KeyPolicy: 'static {
    /// Returns whether two keys name the same entry.
    fn same_key(a: &str, b: &str) -> bool;
}

/// Keys are compared ignoring ASCII case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseInsensitive;

/// Keys are compared byte for byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseSensitive;

impl KeyPolicy for CaseInsensitive {
    fn same_key(a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }
}

impl KeyPolicy for CaseSensitive {
    fn same_key(a: &str, b: &str) -> bool {
        a == b
    }
}

/// An ordered list of key/value pairs with repeatable keys.
pub struct MultiMap<P> {
    entries: Vec<(String, String)>,
    _policy: PhantomData<P>,
}

/// Request or response headers. Keys are case-insensitive.
pub type Headers = MultiMap<CaseInsensitive>;
/// Query parameters. Keys are case-sensitive.
pub type Params = MultiMap<CaseSensitive>;

impl<P: KeyPolicy> MultiMap<P> {
    /// Creates an empty map.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            _policy: PhantomData,
        }
    }

    /// Number of entries, counting repeated keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| P::same_key(k, key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value for `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| P::same_key(k, key))
            .map(|(_, v)| v.as_str())
    }

    /// Whether at least one entry exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| P::same_key(k, key))
    }

    /// Replaces every value of `key` with `value`.
    ///
    /// The entry keeps the position of the first existing occurrence, or is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter().position(|(k, _)| P::same_key(k, &key)) {
            Some(first) => {
                let mut index = 0;
                self.entries.retain(|(k, _)| {
                    let keep = index == first || !P::same_key(k, &key);
                    index += 1;
                    keep
                });
                self.entries[first] = (key, value);
            }
            None => self.entries.push((key, value)),
        }
    }

    /// Appends a value without touching existing values of the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Removes every value of `key`, returning how many entries were removed.
    pub fn remove(&mut self, key: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| !P::same_key(k, key));
        before - self.entries.len()
    }

    /// Iterates over all entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the distinct keys, in order of first appearance.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (k, _) in &self.entries {
            if !keys.iter().any(|seen| P::same_key(seen, k)) {
                keys.push(k);
            }
        }
        keys
    }

    /// Returns a new map holding `self` overridden key-wise by `other`.
    ///
    /// Keys present in `other` replace all of their values in `self`; keys absent in
    /// `other` are retained. Neither input is modified.
    pub fn merged_with(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        let mut entries: Vec<(String, String)> = self
            .entries
            .iter()
            .filter(|(k, _)| !other.contains_key(k))
            .cloned()
            .collect();
        entries.extend(other.entries.iter().cloned());
        Self {
            entries,
            _policy: PhantomData,
        }
    }
}

impl Params {
    /// Serializes the parameters as an `application/x-www-form-urlencoded` query string.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }

    /// Parses an `application/x-www-form-urlencoded` string.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes()).into_owned().collect()
    }
}

impl<P> Clone for MultiMap<P> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            _policy: PhantomData,
        }
    }
}

impl<P: KeyPolicy> Default for MultiMap<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> PartialEq for MultiMap<P> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<P> Eq for MultiMap<P> {}

impl<P> fmt::Debug for MultiMap<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<P: KeyPolicy, K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MultiMap<P> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<P: KeyPolicy, K: Into<String>, V: Into<String>> Extend<(K, V)> for MultiMap<P> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.append(k, v);
        }
    }
}

impl<P> IntoIterator for MultiMap<P> {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
