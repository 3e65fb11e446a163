//! # Payload Serialization
//!
//! Turns an event's logical [`Data`] into wire bytes, keyed on the event's
//! declared content type. Both the binary and structured encoders go through
//! the same [`PayloadMarshaler`], so a custom marshaler changes both paths.
//!
//! ## Formats
//! - **Json**: `application/json`, `text/json`, any `+json` suffix, or no declared type.
//!   Only `application/json` (or no type) requires the payload to parse;
//!   see [`is_plain_json`].
//! - **Text**: any `text/*` type, `application/xml` and `+xml` suffixes
//! - **Binary**: everything else, passed through untouched
//!
//! ## Usage
//! ```rust
//! use event_envelope::core::serialization::{JsonMarshaler, PayloadFormat, PayloadMarshaler};
//! use event_envelope::event::Data;
//!
//! assert_eq!(PayloadFormat::from_content_type("application/json; charset=utf-8"), PayloadFormat::Json);
//!
//! let data = Data::Json(serde_json::json!({"answer": 42}));
//! let bytes = JsonMarshaler.marshal("application/json", Some(&data)).expect("marshal");
//! assert_eq!(bytes.as_deref(), Some(&br#"{"answer":42}"#[..]));
//! ```

use crate::error::{CodecError, Result};
use crate::event::Data;
use bytes::Bytes;
use serde_json::Value;

/// Payload format implied by a MIME content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    /// JSON document (default when no content type is declared)
    #[default]
    Json,
    /// Human-readable text
    Text,
    /// Opaque bytes
    Binary,
}

impl PayloadFormat {
    /// Classify a content type, ignoring parameters and case
    pub fn from_content_type(content_type: &str) -> Self {
        let essence = essence(content_type);

        if essence.is_empty()
            || essence == "application/json"
            || essence == "text/json"
            || essence.ends_with("+json")
        {
            PayloadFormat::Json
        } else if essence.starts_with("text/")
            || essence == "application/xml"
            || essence.ends_with("+xml")
        {
            PayloadFormat::Text
        } else {
            PayloadFormat::Binary
        }
    }

    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            PayloadFormat::Json => "JSON",
            PayloadFormat::Text => "Text",
            PayloadFormat::Binary => "Binary",
        }
    }
}

/// Lower-cased MIME type with parameters stripped
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// True for exactly `application/json` or no declared type.
///
/// Other JSON-family types (`text/json`, `+json` suffixes) are JSON by
/// convention only and may carry payloads that do not parse.
pub fn is_plain_json(content_type: &str) -> bool {
    matches!(essence(content_type).as_str(), "" | "application/json")
}

/// Caller-supplied contract turning event data into wire bytes.
///
/// `Ok(None)` means there is no payload; encoders emit an empty body or omit
/// the `data` field.
pub trait PayloadMarshaler: Send + Sync {
    fn marshal(&self, content_type: &str, data: Option<&Data>) -> Result<Option<Bytes>>;
}

/// Default marshaler: serde_json for JSON formats, pass-through for bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaler;

impl PayloadMarshaler for JsonMarshaler {
    fn marshal(&self, content_type: &str, data: Option<&Data>) -> Result<Option<Bytes>> {
        let Some(data) = data else {
            return Ok(None);
        };

        let bytes = match data {
            Data::Bytes(bytes) => bytes.clone(),
            Data::Text(text) => Bytes::from(text.clone()),
            Data::Json(value) => {
                let format = PayloadFormat::from_content_type(content_type);
                marshal_json(format, value, content_type)?
            }
        };
        Ok(Some(bytes))
    }
}

fn marshal_json(format: PayloadFormat, value: &Value, content_type: &str) -> Result<Bytes> {
    match (format, value) {
        (PayloadFormat::Json, _) => serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| CodecError::Marshal(e.to_string())),
        (_, Value::String(s)) => Ok(Bytes::from(s.clone())),
        (PayloadFormat::Text, _) => Ok(Bytes::from(value.to_string())),
        (PayloadFormat::Binary, _) => Err(CodecError::Marshal(format!(
            "JSON value cannot be marshaled as {} payload {content_type:?}",
            format.name()
        ))),
    }
}
