//! # Structured Encoding (v0.1)
//!
//! The whole event travels as one `application/cloudevents+json` document:
//!
//! ```json
//! {
//!   "cloudEventsVersion": "0.1",
//!   "eventID": "A234-1234-1234",
//!   "eventType": "com.example.someevent",
//!   "source": "/mycontext",
//!   "contentType": "application/json",
//!   "extensions": {"comexampleextension": "value"},
//!   "data": {"appinfoA": "abc"}
//! }
//! ```
//!
//! JSON payloads are embedded natively. Any other payload is run through the
//! marshaler and embedded as a base64 string.

use crate::config::{CONTENT_TYPE_CLOUDEVENTS_JSON, HEADER_CONTENT_TYPE};
use crate::core::headers::Headers;
use crate::core::message::{HeaderedMessage, Message};
use crate::core::serialization::{is_plain_json, PayloadFormat, PayloadMarshaler};
use crate::error::{constants, CodecError, DecodeWarning, Decoded, Result};
use crate::event::{
    canonical_extension_name, parse_timestamp, Data, Event, EventContextV01, UriRef,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Encode a v0.1 context and payload as a structured-mode message
pub fn encode(
    ctx: &EventContextV01,
    data: Option<&Data>,
    marshaler: &dyn PayloadMarshaler,
) -> Result<Message> {
    let mut envelope = match serde_json::to_value(ctx) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return Err(CodecError::Marshal(
                "event context did not serialize to a JSON object".to_string(),
            ))
        }
        Err(e) => return Err(CodecError::Marshal(e.to_string())),
    };

    let content_type = ctx.content_type.as_deref().unwrap_or_default();
    if let Some(data) = embed_data(content_type, data, marshaler)? {
        envelope.insert("data".to_string(), data);
    }

    let body = serde_json::to_vec(&Value::Object(envelope))
        .map_err(|e| CodecError::Marshal(e.to_string()))?;

    let mut headers = Headers::new();
    headers.insert(HEADER_CONTENT_TYPE, CONTENT_TYPE_CLOUDEVENTS_JSON);
    Ok(Message::new(headers, body))
}

/// JSON value for the envelope's `data` field, `None` when there is no payload
fn embed_data(
    content_type: &str,
    data: Option<&Data>,
    marshaler: &dyn PayloadMarshaler,
) -> Result<Option<Value>> {
    let Some(data) = data else {
        return Ok(None);
    };

    if PayloadFormat::from_content_type(content_type) == PayloadFormat::Json {
        let parsed = match data {
            Data::Json(value) => Ok(value.clone()),
            Data::Bytes(bytes) => serde_json::from_slice(bytes),
            Data::Text(text) => serde_json::from_str(text),
        };
        match parsed {
            Ok(value) => return Ok(Some(value)),
            Err(e) if is_plain_json(content_type) => return Err(not_json(e)),
            Err(e) => {
                debug!(content_type, error = %e, "Payload is not JSON, embedding as base64");
            }
        }
    }

    let encoded = marshaler
        .marshal(content_type, Some(data))?
        .map(|bytes| Value::String(STANDARD.encode(&bytes)));
    Ok(encoded)
}

fn not_json(err: serde_json::Error) -> CodecError {
    CodecError::Marshal(format!("payload declared as JSON is not valid JSON: {err}"))
}

/// Decode a structured-mode message.
///
/// Keys are decoded one at a time. Unknown keys are skipped with a warning;
/// a known key holding the wrong JSON type fails the decode.
pub fn decode(msg: &dyn HeaderedMessage) -> Result<Decoded<Event>> {
    let raw: BTreeMap<String, Box<RawValue>> =
        serde_json::from_slice(msg.body()).map_err(|e| {
            CodecError::Unmarshal(format!("{}: {e}", constants::ERR_NOT_JSON_OBJECT))
        })?;

    let mut warnings = Vec::new();
    let mut ctx = EventContextV01::empty();
    let mut data = None;

    for (key, value) in &raw {
        trace!(key = %key, "Decoding structured key");
        match key.as_str() {
            "cloudEventsVersion" => {
                ctx.cloud_events_version = field::<String>(key, value)?.unwrap_or_default();
            }
            "eventID" => ctx.event_id = field::<String>(key, value)?.unwrap_or_default(),
            "eventType" => ctx.event_type = field::<String>(key, value)?.unwrap_or_default(),
            "eventTypeVersion" => {
                ctx.event_type_version = field::<String>(key, value)?.filter(|v| !v.is_empty());
            }
            "source" => {
                if let Some(src) = field::<String>(key, value)? {
                    ctx.source = parse_uri(key, &src, &mut warnings).unwrap_or_default();
                }
            }
            "schemaURL" => {
                if let Some(url) = field::<String>(key, value)? {
                    ctx.schema_url = parse_uri(key, &url, &mut warnings);
                }
            }
            "contentType" => {
                ctx.content_type = field::<String>(key, value)?.filter(|v| !v.is_empty());
            }
            "eventTime" => {
                if let Some(t) = field::<String>(key, value)? {
                    ctx.event_time = parse_timestamp(&t);
                    if ctx.event_time.is_none() {
                        warn!(value = %t, "Dropping unparsable event time");
                        warnings.push(DecodeWarning::InvalidTimestamp { value: t });
                    }
                }
            }
            "data" => data = Some(Data::Bytes(Bytes::copy_from_slice(value.get().as_bytes()))),
            "extensions" => {
                let found = field::<BTreeMap<String, Value>>(key, value)?.unwrap_or_default();
                for (name, value) in found {
                    let canonical = canonical_extension_name(&name);
                    if ctx.extensions.insert(canonical, value).is_some() {
                        warn!(extension = %name, "Extension name repeated after canonicalization");
                    }
                }
            }
            _ => {
                warn!(key = %key, "Decode structured, unknown key");
                warnings.push(DecodeWarning::UnknownStructuredKey(key.clone()));
            }
        }
    }

    Ok(Decoded::new(Event::new(ctx.into(), data), warnings))
}

/// Decode one envelope field; JSON `null` reads as absent
fn field<T: DeserializeOwned>(key: &str, raw: &RawValue) -> Result<Option<T>> {
    serde_json::from_str::<Option<T>>(raw.get())
        .map_err(|e| CodecError::Unmarshal(format!("field {key:?}: {e}")))
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

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::core::serialization::JsonMarshaler;
    use serde_json::{json, Map};

    fn context() -> EventContextV01 {
        EventContextV01::new("1234", "com.example.test", UriRef::parse("/src").unwrap())
    }

    fn message(body: &str) -> Message {
        let mut headers = Headers::new();
        headers.insert(HEADER_CONTENT_TYPE, CONTENT_TYPE_CLOUDEVENTS_JSON);
        Message::new(headers, body.as_bytes().to_vec())
    }

    fn envelope(msg: &Message) -> Map<String, Value> {
        serde_json::from_slice(msg.body()).unwrap()
    }

    #[test]
    fn test_json_data_embedded_natively() {
        let ctx = context().with_content_type("application/json");
        let data = Data::Json(json!({"hello": "world"}));
        let msg = encode(&ctx, Some(&data), &JsonMarshaler).unwrap();
        let env = envelope(&msg);
        assert_eq!(env["data"], json!({"hello": "world"}));
    }

    #[test]
    fn test_json_bytes_embedded_natively() {
        let ctx = context().with_content_type("application/json");
        let data = Data::Bytes(Bytes::from_static(br#"[1,2,3]"#));
        let msg = encode(&ctx, Some(&data), &JsonMarshaler).unwrap();
        assert_eq!(envelope(&msg)["data"], json!([1, 2, 3]));
    }

    #[test]
    fn test_invalid_json_bytes_fail_marshal() {
        let ctx = context().with_content_type("application/json");
        let data = Data::Bytes(Bytes::from_static(b"not json"));
        let err = encode(&ctx, Some(&data), &JsonMarshaler).unwrap_err();
        assert!(matches!(err, CodecError::Marshal(_)));
    }

    #[test]
    fn test_non_json_payload_under_json_suffix_falls_back_to_base64() {
        let ctx = context().with_content_type("application/vnd.x+json");
        let data = Data::Bytes(Bytes::from_static(b"not json"));
        let msg = encode(&ctx, Some(&data), &JsonMarshaler).unwrap();
        assert_eq!(envelope(&msg)["data"], json!("bm90IGpzb24="));

        let ctx = context().with_content_type("text/json");
        let data = Data::Text("{broken".to_string());
        let msg = encode(&ctx, Some(&data), &JsonMarshaler).unwrap();
        assert_eq!(envelope(&msg)["data"], json!("e2Jyb2tlbg=="));
    }

    #[test]
    fn test_valid_payload_under_json_suffix_stays_native() {
        let ctx = context().with_content_type("application/vnd.x+json");
        let data = Data::Bytes(Bytes::from_static(br#"{"a":1}"#));
        let msg = encode(&ctx, Some(&data), &JsonMarshaler).unwrap();
        assert_eq!(envelope(&msg)["data"], json!({"a": 1}));
    }

    #[test]
    fn test_non_json_data_embedded_as_base64() {
        let ctx = context().with_content_type("text/plain");
        let data = Data::Text("hello".to_string());
        let msg = encode(&ctx, Some(&data), &JsonMarshaler).unwrap();
        assert_eq!(envelope(&msg)["data"], json!("aGVsbG8="));
    }

    #[test]
    fn test_absent_data_omitted() {
        let msg = encode(&context(), None, &JsonMarshaler).unwrap();
        assert!(envelope(&msg).get("data").is_none());
    }

    #[test]
    fn test_wire_content_type_fixed() {
        let ctx = context().with_content_type("text/xml");
        let msg = encode(&ctx, None, &JsonMarshaler).unwrap();
        assert_eq!(msg.content_type(), Some(CONTENT_TYPE_CLOUDEVENTS_JSON));
        assert_eq!(envelope(&msg)["contentType"], "text/xml");
    }

    #[test]
    fn test_data_kept_as_raw_fragment() {
        let msg = message(r#"{"cloudEventsVersion":"0.1","eventID":"1","data":{"a": [1, 2]}}"#);
        let decoded = decode(&msg).unwrap();
        assert_eq!(
            decoded.value.data,
            Some(Data::Bytes(Bytes::from_static(br#"{"a": [1, 2]}"#)))
        );
    }

    #[test]
    fn test_unknown_key_is_soft() {
        let msg = message(r#"{"cloudEventsVersion":"0.1","eventID":"1","bogus":true}"#);
        let decoded = decode(&msg).unwrap();
        assert_eq!(
            decoded.warnings,
            vec![DecodeWarning::UnknownStructuredKey("bogus".to_string())]
        );
        assert_eq!(decoded.value.context.as_v01().unwrap().event_id, "1");
    }

    #[test]
    fn test_wrong_type_on_known_key_is_hard() {
        let msg = message(r#"{"cloudEventsVersion":"0.1","eventID":42}"#);
        assert!(matches!(decode(&msg), Err(CodecError::Unmarshal(_))));
    }

    #[test]
    fn test_non_object_body_is_hard() {
        assert!(matches!(decode(&message("[1,2]")), Err(CodecError::Unmarshal(_))));
        assert!(matches!(decode(&message("{")), Err(CodecError::Unmarshal(_))));
    }

    #[test]
    fn test_null_fields_read_as_absent() {
        let msg = message(r#"{"cloudEventsVersion":"0.1","eventID":"1","contentType":null}"#);
        let decoded = decode(&msg).unwrap();
        assert_eq!(decoded.value.context.data_content_type(), None);
        assert!(decoded.is_clean());
    }

    #[test]
    fn test_extensions_decode_flat() {
        let msg = message(
            r#"{"cloudEventsVersion":"0.1","eventID":"1","extensions":{"traceparent":"00-a-b-01","n":3}}"#,
        );
        let decoded = decode(&msg).unwrap();
        let ext = decoded.value.context.extensions();
        assert_eq!(ext.get("traceparent"), Some(&json!("00-a-b-01")));
        assert_eq!(ext.get("n"), Some(&json!(3)));
    }

    #[test]
    fn test_extension_names_canonicalized_on_decode() {
        let msg = message(
            r#"{"cloudEventsVersion":"0.1","eventID":"1","extensions":{"ID":1,"Traceparent":"x"}}"#,
        );
        let decoded = decode(&msg).unwrap();
        let ext = decoded.value.context.extensions();
        assert_eq!(ext.get("iD"), Some(&json!(1)));
        assert_eq!(ext.get("traceparent"), Some(&json!("x")));
        assert!(ext.get("ID").is_none());
    }
}
