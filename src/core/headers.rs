//! Case-preserving HTTP header map.
//!
//! Header names compare case-insensitively on lookup, but the casing used at
//! insertion is kept verbatim. The v0.1 binary mapping relies on this to emit
//! names such as `CE-EventID` exactly as written.

use std::collections::BTreeMap;

/// Ordered mapping from header name to its list of values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: BTreeMap<String, Vec<String>>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every casing of `name` with a single value stored under `name` as given.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.entries.insert(name, vec![value.into()]);
    }

    /// Replace every casing of `name` with the given value list, which may be empty.
    pub fn insert_all(&mut self, name: impl Into<String>, values: Vec<String>) {
        let name = name.into();
        self.remove(&name);
        self.entries.insert(name, values);
    }

    /// Append a value under the exact key `name`.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(name.into()).or_default().push(value.into());
    }

    /// First value stored under `name`, compared case-insensitively.
    ///
    /// An exact-case entry wins over other casings of the same name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values stored under `name`, compared case-insensitively.
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        if let Some(values) = self.entries.get(name) {
            return Some(values.as_slice());
        }
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_all(name).is_some()
    }

    /// Remove every casing of `name`, returning the values of the last one removed.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        let keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.eq_ignore_ascii_case(name))
            .cloned()
            .collect();
        let mut removed = None;
        for key in keys {
            removed = self.entries.remove(&key);
        }
        removed
    }

    /// Move the values stored under the exact key `from` to the exact key `to`.
    ///
    /// Any values already under `to` are overwritten, not merged.
    pub fn rename(&mut self, from: &str, to: impl Into<String>) {
        if let Some(values) = self.entries.remove(from) {
            self.entries.insert(to.into(), values);
        }
    }

    /// Header names exactly as stored.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

/// Canonical MIME header casing: upper-case the first letter and every letter
/// following a hyphen, lower-case the rest (`content-type` -> `Content-Type`).
pub fn canonical_mime_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}

/// True if `c` may appear in an HTTP header field name (RFC 7230 `tchar`).
pub fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}
