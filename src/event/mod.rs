//! # Events
//!
//! The in-memory side of the codec: an [`Event`] pairs a version-specific
//! context with an opaque payload.
//!
//! ## Components
//! - **EventContext**: version-polymorphic wrapper; exactly one version active
//! - **EventContextV01**: CloudEvents v0.1 attribute set
//! - **Data**: payload as raw bytes, a JSON value, or text
//! - **Values**: URI-reference and timestamp helpers

mod context_v01;
pub mod values;

pub use context_v01::{canonical_extension_name, EventContextV01};
pub use values::{format_timestamp, parse_timestamp, UriRef};

use crate::error::{CodecError, Result};
use crate::extensions::EventTracer;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// Event context for exactly one protocol version
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EventContext {
    V01(EventContextV01),
}

impl EventContext {
    /// Version tag the context declares
    pub fn spec_version(&self) -> &str {
        match self {
            EventContext::V01(ctx) => &ctx.cloud_events_version,
        }
    }

    /// Declared content type of the payload, if any
    pub fn data_content_type(&self) -> Option<&str> {
        match self {
            EventContext::V01(ctx) => ctx.content_type.as_deref(),
        }
    }

    pub fn extensions(&self) -> &BTreeMap<String, Value> {
        match self {
            EventContext::V01(ctx) => &ctx.extensions,
        }
    }

    pub fn as_v01(&self) -> Option<&EventContextV01> {
        match self {
            EventContext::V01(ctx) => Some(ctx),
        }
    }

    pub fn as_v01_mut(&mut self) -> Option<&mut EventContextV01> {
        match self {
            EventContext::V01(ctx) => Some(ctx),
        }
    }
}

impl From<EventContextV01> for EventContext {
    fn from(ctx: EventContextV01) -> Self {
        EventContext::V01(ctx)
    }
}

impl EventTracer for EventContext {
    fn set_extension(&mut self, name: &str, value: Value) -> Result<()> {
        match self {
            EventContext::V01(ctx) => ctx.set_extension(name, value),
        }
    }
}

/// Event payload.
///
/// Decoding always yields [`Data::Bytes`]: the raw body in binary mode, the
/// undecoded JSON fragment of `data` in structured mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Bytes(Bytes),
    Json(Value),
    Text(String),
}

impl Data {
    /// Interpret the payload as JSON
    pub fn to_json(&self) -> Result<Value> {
        match self {
            Data::Bytes(bytes) => Ok(serde_json::from_slice(bytes)?),
            Data::Json(value) => Ok(value.clone()),
            Data::Text(text) => Ok(serde_json::from_str(text)?),
        }
    }

    /// Raw bytes of the payload, when it is already in wire form
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Data::Bytes(bytes) => Some(bytes.as_ref()),
            Data::Text(text) => Some(text.as_bytes()),
            Data::Json(_) => None,
        }
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        Data::Json(value)
    }
}

impl From<Bytes> for Data {
    fn from(bytes: Bytes) -> Self {
        Data::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Data {
    fn from(bytes: Vec<u8>) -> Self {
        Data::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for Data {
    fn from(text: String) -> Self {
        Data::Text(text)
    }
}

/// A context plus an optional payload
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub context: EventContext,
    pub data: Option<Data>,
}

impl Event {
    pub fn new(context: EventContext, data: Option<Data>) -> Self {
        Self { context, data }
    }

    /// Deserialize the payload with serde_json.
    ///
    /// Returns `Ok(None)` when the event has no payload.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let Some(data) = &self.data else {
            return Ok(None);
        };
        let parsed = match data {
            Data::Bytes(bytes) => serde_json::from_slice(bytes),
            Data::Json(value) => serde_json::from_value(value.clone()),
            Data::Text(text) => serde_json::from_str(text),
        };
        parsed
            .map(Some)
            .map_err(|e| CodecError::Unmarshal(e.to_string()))
    }
}

impl EventTracer for Event {
    fn set_extension(&mut self, name: &str, value: Value) -> Result<()> {
        self.context.set_extension(name, value)
    }
}
