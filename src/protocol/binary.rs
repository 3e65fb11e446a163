//! # Binary Encoding (v0.1)
//!
//! Context attributes travel as HTTP headers and the payload as the body.
//!
//! ## Header Mapping
//! ```text
//! cloudEventsVersion -> CE-CloudEventsVersion
//! eventID            -> CE-EventID
//! eventType          -> CE-EventType
//! source             -> CE-Source
//! eventTime          -> CE-EventTime          (omitted when unset)
//! eventTypeVersion   -> CE-EventTypeVersion   (omitted when unset)
//! schemaURL          -> CE-SchemaURL          (omitted when unset)
//! contentType        -> Content-Type          (application/json when unset)
//! extensions[k]      -> CE-X-<K>              (JSON value, first letter of k upper-cased)
//! ```
//!
//! Header casing is preserved as written above even though HTTP treats names
//! case-insensitively. On decode, headers in any other casing are renamed to
//! these canonical forms before attributes are read.

use crate::config::{
    CONTENT_TYPE_JSON, EXTENSION_PREFIX, HEADER_CONTENT_TYPE, HEADER_EVENT_ID, HEADER_EVENT_TIME,
    HEADER_EVENT_TYPE, HEADER_EVENT_TYPE_VERSION, HEADER_SCHEMA_URL, HEADER_SOURCE,
    HEADER_SPEC_VERSION,
};
use crate::core::headers::{canonical_mime_key, Headers};
use crate::core::message::{HeaderedMessage, Message};
use crate::core::serialization::PayloadMarshaler;
use crate::error::{constants, CodecError, DecodeWarning, Decoded, Result};
use crate::event::{
    canonical_extension_name, format_timestamp, parse_timestamp, Data, Event, EventContextV01,
    UriRef,
};
use crate::protocol::Encoding;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Header names with a fixed canonical casing
const KNOWN_HEADERS: [&str; 8] = [
    HEADER_SPEC_VERSION,
    HEADER_EVENT_ID,
    HEADER_EVENT_TYPE,
    HEADER_SOURCE,
    HEADER_EVENT_TIME,
    HEADER_EVENT_TYPE_VERSION,
    HEADER_SCHEMA_URL,
    HEADER_CONTENT_TYPE,
];

/// Encode a v0.1 context and payload as a binary-mode message
pub fn encode(
    ctx: &EventContextV01,
    data: Option<&Data>,
    encoding: Encoding,
    marshaler: &dyn PayloadMarshaler,
) -> Result<Message> {
    let headers = to_headers(ctx, encoding)?;
    let content_type = ctx.content_type.as_deref().unwrap_or_default();
    let body = marshaler.marshal(content_type, data)?.unwrap_or_default();
    Ok(Message::new(headers, body))
}

/// Map context attributes onto headers
pub fn to_headers(ctx: &EventContextV01, encoding: Encoding) -> Result<Headers> {
    let mut h = Headers::new();
    h.insert(HEADER_SPEC_VERSION, ctx.cloud_events_version.as_str());
    h.insert(HEADER_EVENT_ID, ctx.event_id.as_str());
    h.insert(HEADER_EVENT_TYPE, ctx.event_type.as_str());
    h.insert(HEADER_SOURCE, ctx.source.as_str());
    if let Some(time) = &ctx.event_time {
        h.insert(HEADER_EVENT_TIME, format_timestamp(time));
    }
    if let Some(version) = ctx.event_type_version.as_deref().filter(|v| !v.is_empty()) {
        h.insert(HEADER_EVENT_TYPE_VERSION, version);
    }
    if let Some(url) = &ctx.schema_url {
        h.insert(HEADER_SCHEMA_URL, url.as_str());
    }

    match ctx.content_type.as_deref().filter(|ct| !ct.is_empty()) {
        Some(ct) => h.insert(HEADER_CONTENT_TYPE, ct),
        // The JSON default is tied to binary mode only.
        None if encoding.is_binary() => h.insert(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON),
        None => {}
    }

    for (name, value) in &ctx.extensions {
        let header = extension_header_name(name);
        if h.contains(&header) {
            return Err(CodecError::InvalidExtension(format!(
                "{}: {name:?} -> {header}",
                constants::ERR_EXTENSION_HEADER_COLLISION
            )));
        }
        let encoded =
            serde_json::to_string(value).map_err(|e| CodecError::Marshal(e.to_string()))?;
        h.insert(header, encoded);
    }
    Ok(h)
}

/// Decode a binary-mode message, normalizing its header casing in place
pub fn decode(msg: &mut dyn HeaderedMessage) -> Result<Decoded<Event>> {
    let mut warnings = Vec::new();
    normalize_headers(msg.headers_mut(), &mut warnings);

    let ctx = from_headers(msg.headers(), &mut warnings)?;
    let data = if msg.body().is_empty() {
        None
    } else {
        Some(Data::Bytes(msg.body_bytes()))
    };

    Ok(Decoded::new(Event::new(ctx.into(), data), warnings))
}

/// Rename every non-canonical header name to its canonical form.
///
/// Idempotent: a second pass finds nothing to rename.
pub fn normalize_headers(headers: &mut Headers, warnings: &mut Vec<DecodeWarning>) {
    let renames: Vec<(String, String)> = headers
        .names()
        .filter_map(|name| {
            let canonical = canonical_header_name(name);
            (canonical != name).then(|| (name.to_string(), canonical))
        })
        .collect();

    for (found, canonical) in renames {
        warn!(
            canonical = %canonical,
            found = %found,
            "Received header with non-canonical form"
        );
        headers.rename(&found, canonical.clone());
        warnings.push(DecodeWarning::NonCanonicalHeader { found, canonical });
    }
}

/// Canonical casing of a header name for this version
pub fn canonical_header_name(name: &str) -> String {
    if let Some(known) = KNOWN_HEADERS.iter().find(|k| k.eq_ignore_ascii_case(name)) {
        return (*known).to_string();
    }
    if let Some(suffix) = extension_suffix(name) {
        return extension_header_name(suffix);
    }
    canonical_mime_key(name)
}

/// `CE-X-` plus the attribute name with its first character upper-cased
pub fn extension_header_name(name: &str) -> String {
    format!("{EXTENSION_PREFIX}{}", title_first(name))
}

/// Read context attributes from (already normalized) headers
pub fn from_headers(h: &Headers, warnings: &mut Vec<DecodeWarning>) -> Result<EventContextV01> {
    let mut ctx = EventContextV01::empty();

    ctx.cloud_events_version = single(h, HEADER_SPEC_VERSION)?.unwrap_or_default().to_string();
    ctx.event_id = single(h, HEADER_EVENT_ID)?.unwrap_or_default().to_string();
    ctx.event_type = single(h, HEADER_EVENT_TYPE)?.unwrap_or_default().to_string();

    if let Some(raw) = single(h, HEADER_SOURCE)? {
        ctx.source = parse_uri(HEADER_SOURCE, raw, warnings).unwrap_or_default();
    }
    if let Some(raw) = single(h, HEADER_EVENT_TIME)? {
        ctx.event_time = parse_timestamp(raw);
        if ctx.event_time.is_none() {
            warn!(value = raw, "Dropping unparsable event time");
            warnings.push(DecodeWarning::InvalidTimestamp {
                value: raw.to_string(),
            });
        }
    }
    ctx.event_type_version = single(h, HEADER_EVENT_TYPE_VERSION)?
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    if let Some(raw) = single(h, HEADER_SCHEMA_URL)? {
        ctx.schema_url = parse_uri(HEADER_SCHEMA_URL, raw, warnings);
    }
    // No default when absent: an empty content type stays empty.
    ctx.content_type = single(h, HEADER_CONTENT_TYPE)?
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    ctx.extensions = extensions_from_headers(h, warnings)?;
    Ok(ctx)
}

fn extensions_from_headers(
    h: &Headers,
    warnings: &mut Vec<DecodeWarning>,
) -> Result<BTreeMap<String, Value>> {
    let mut extensions = BTreeMap::new();
    for (header, values) in h.iter() {
        let Some(suffix) = extension_suffix(header) else {
            continue;
        };
        if suffix.is_empty() {
            warn!(header, "Ignoring extension header without a name");
            continue;
        }
        let raw = values.first().ok_or_else(|| empty_values(header))?;
        let name = canonical_extension_name(suffix);
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(_) => {
                warn!(extension = %name, "Extension value is not JSON, keeping raw string");
                warnings.push(DecodeWarning::ExtensionNotJson { name: name.clone() });
                Value::String(raw.clone())
            }
        };
        extensions.insert(name, value);
    }
    Ok(extensions)
}

/// First value of a header; a header present with no values is malformed
fn single<'a>(h: &'a Headers, name: &str) -> Result<Option<&'a str>> {
    match h.get_all(name) {
        None => Ok(None),
        Some([]) => Err(empty_values(name)),
        Some([first, ..]) => Ok(Some(first.as_str())),
    }
}

fn empty_values(name: &str) -> CodecError {
    CodecError::MalformedMessage(format!("{}: {name}", constants::ERR_EMPTY_HEADER_VALUES))
}

fn parse_uri(attribute: &str, raw: &str, warnings: &mut Vec<DecodeWarning>) -> Option<UriRef> {
    let parsed = UriRef::parse(raw);
    if parsed.is_none() {
        warn!(attribute, value = raw, "Dropping unparsable URI reference");
        warnings.push(DecodeWarning::InvalidUriReference {
            attribute: attribute.to_string(),
            value: raw.to_string(),
        });
    }
    parsed
}

/// Suffix after a case-insensitive `CE-X-` prefix
fn extension_suffix(name: &str) -> Option<&str> {
    let prefix = name.get(..EXTENSION_PREFIX.len())?;
    prefix
        .eq_ignore_ascii_case(EXTENSION_PREFIX)
        .then(|| &name[EXTENSION_PREFIX.len()..])
}

fn title_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
