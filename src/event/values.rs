//! URI-reference and timestamp helpers.
//!
//! Malformed input yields `None`, never an error, so a bad attribute cannot
//! fail a whole decode.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use url::{ParseError, Url};

/// Non-special base that relative references are resolved against.
const RELATIVE_BASE: &str = "x-relative://base/";

/// An RFC 3986 URI reference (absolute URI or relative reference).
///
/// The default value is empty and stands for an attribute that was absent or
/// unparsable on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UriRef(String);

impl UriRef {
    /// Parse a URI reference, returning `None` on malformed input.
    ///
    /// Absolute URIs go through [`Url::parse`]; relative references are
    /// resolved against a placeholder base so the same parser checks their
    /// authority, path and query. The original text is kept as given.
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() || !has_uri_chars_only(s) {
            return None;
        }

        // A colon before the first '/', '?' or '#' delimits a scheme.
        let head_end = s.find(['/', '?', '#']).unwrap_or(s.len());
        if let Some(colon) = s[..head_end].find(':') {
            let scheme = &s[..colon];
            let mut chars = scheme.chars();
            let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c));
            if !valid {
                return None;
            }
        }

        match Url::parse(s) {
            Ok(_) => {}
            Err(ParseError::RelativeUrlWithoutBase) => {
                Url::parse(RELATIVE_BASE).and_then(|base| base.join(s)).ok()?;
            }
            Err(_) => return None,
        }

        Some(UriRef(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if the reference carries a scheme (`https://...`, `urn:...`)
    pub fn is_absolute(&self) -> bool {
        let head_end = self.0.find(['/', '?', '#']).unwrap_or(self.0.len());
        self.0[..head_end].contains(':')
    }
}

impl fmt::Display for UriRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// RFC 3986 allows only unreserved and reserved characters plus `%`
/// escapes, and every `%` must be followed by two hex digits.
fn has_uri_chars_only(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escaped = bytes.get(i + 1..i + 3);
                if !escaped.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                    return false;
                }
                i += 3;
                continue;
            }
            b if b.is_ascii_alphanumeric() => {}
            b'-' | b'.' | b'_' | b'~' => {}
            b':' | b'/' | b'?' | b'#' | b'[' | b']' | b'@' => {}
            b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=' => {}
            _ => return false,
        }
        i += 1;
    }
    true
}

/// Parse an RFC 3339 timestamp into UTC, `None` on malformed input.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Format a timestamp as RFC 3339 with a `Z` suffix and only as many
/// fractional digits as needed.
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub(crate) fn serialize_timestamp<S>(t: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match t {
        Some(t) => serializer.serialize_str(&format_timestamp(t)),
        None => serializer.serialize_none(),
    }
}
