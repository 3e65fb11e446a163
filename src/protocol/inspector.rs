//! Inbound encoding detection.
//!
//! A message is classified by its declared protocol version first and its
//! `Content-Type` second. A version mismatch always wins: a v0.2 message with
//! `application/json` is still `Unknown` to the v0.1 codec.

use crate::config::{
    CONTENT_TYPE_CLOUDEVENTS_JSON, CONTENT_TYPE_JSON, HEADER_CONTENT_TYPE, SPEC_VERSION_V01,
};
use crate::core::message::HeaderedMessage;
use crate::protocol::Encoding;

/// Classify `msg` as binary, structured, or unknown. Never mutates the message.
pub fn inspect_encoding(msg: &dyn HeaderedMessage) -> Encoding {
    if msg.spec_version().as_deref() != Some(SPEC_VERSION_V01) {
        return Encoding::Unknown;
    }

    match msg.headers().get(HEADER_CONTENT_TYPE) {
        Some(CONTENT_TYPE_JSON) => Encoding::BinaryV01,
        Some(CONTENT_TYPE_CLOUDEVENTS_JSON) => Encoding::StructuredV01,
        _ => Encoding::Unknown,
    }
}
