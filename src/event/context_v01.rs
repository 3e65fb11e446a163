use crate::config::SPEC_VERSION_V01;
use crate::core::headers::is_token_char;
use crate::error::{constants, CodecError, Result};
use crate::event::values::{serialize_timestamp, UriRef};
use crate::extensions::EventTracer;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute set of a CloudEvents v0.1 event.
///
/// Serializes to the structured-mode JSON field names. Optional attributes
/// that are unset are left out of the JSON entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventContextV01 {
    #[serde(rename = "cloudEventsVersion")]
    pub cloud_events_version: String,

    #[serde(rename = "eventID")]
    pub event_id: String,

    #[serde(rename = "eventType")]
    pub event_type: String,

    #[serde(rename = "eventTypeVersion", skip_serializing_if = "Option::is_none")]
    pub event_type_version: Option<String>,

    pub source: UriRef,

    #[serde(
        rename = "eventTime",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_timestamp"
    )]
    pub event_time: Option<DateTime<Utc>>,

    #[serde(rename = "schemaURL", skip_serializing_if = "Option::is_none")]
    pub schema_url: Option<UriRef>,

    #[serde(rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, Value>,
}

impl EventContextV01 {
    /// Context with the mandatory attributes set and everything optional absent
    pub fn new(event_id: impl Into<String>, event_type: impl Into<String>, source: UriRef) -> Self {
        Self {
            cloud_events_version: SPEC_VERSION_V01.to_string(),
            event_id: event_id.into(),
            event_type: event_type.into(),
            event_type_version: None,
            source,
            event_time: None,
            schema_url: None,
            content_type: None,
            extensions: BTreeMap::new(),
        }
    }

    /// Every attribute at its zero value, version tag included; decoders fill it in
    pub(crate) fn empty() -> Self {
        Self {
            cloud_events_version: String::new(),
            ..Self::new(String::new(), String::new(), UriRef::default())
        }
    }

    pub fn with_event_time(mut self, time: DateTime<Utc>) -> Self {
        self.event_time = Some(time);
        self
    }

    pub fn with_event_type_version(mut self, version: impl Into<String>) -> Self {
        self.event_type_version = Some(version.into());
        self
    }

    pub fn with_schema_url(mut self, url: UriRef) -> Self {
        self.schema_url = Some(url);
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Add an extension, rejecting names that cannot travel as a header.
    ///
    /// The name is stored in canonical form, see [`canonical_extension_name`].
    pub fn with_extension(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set_extension(name, value.into())?;
        Ok(self)
    }

    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(&canonical_extension_name(name))
    }

    /// List every problem with the mandatory attributes.
    ///
    /// Empty list means the context is complete.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.cloud_events_version != SPEC_VERSION_V01 {
            errors.push(format!(
                "cloudEventsVersion must be {SPEC_VERSION_V01:?}, got {:?}",
                self.cloud_events_version
            ));
        }
        if self.event_id.is_empty() {
            errors.push("eventID cannot be empty".to_string());
        }
        if self.event_type.is_empty() {
            errors.push("eventType cannot be empty".to_string());
        }
        if self.source.is_empty() {
            errors.push("source cannot be empty".to_string());
        }
        for name in self.extensions.keys() {
            if let Err(e) = validate_extension_name(name) {
                errors.push(e.to_string());
            }
            let canonical = canonical_extension_name(name);
            if canonical != *name {
                errors.push(format!(
                    "{}: {name:?} (expected {canonical:?})",
                    constants::ERR_NON_CANONICAL_EXTENSION
                ));
            }
        }

        errors
    }
}

impl EventTracer for EventContextV01 {
    fn set_extension(&mut self, name: &str, value: Value) -> Result<()> {
        validate_extension_name(name)?;
        self.extensions.insert(canonical_extension_name(name), value);
        Ok(())
    }
}

/// Canonical form of an extension name: first character lower-cased.
///
/// Binary mode carries the name as `CE-X-<Name>`, where the first character
/// is always upper-cased, so two names differing only there are the same
/// attribute on the wire.
pub fn canonical_extension_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn validate_extension_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(CodecError::InvalidExtension(
            constants::ERR_EMPTY_EXTENSION_NAME.to_string(),
        ));
    }
    if !name.chars().all(is_token_char) {
        return Err(CodecError::InvalidExtension(format!(
            "{}: {name:?}",
            constants::ERR_INVALID_EXTENSION_CHAR
        )));
    }
    Ok(())
}
