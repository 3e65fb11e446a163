//! HTTP wire message and the capability trait the codec reads it through.

use crate::config::{
    CONTENT_TYPE_CLOUDEVENTS_JSON, HEADER_CONTENT_TYPE, HEADER_SPEC_VERSION, HEADER_SPEC_VERSION_V02,
};
use crate::core::headers::Headers;
use bytes::Bytes;
use serde::Deserialize;
use std::fmt;

/// Transport-facing view of a message: headers, body, declared protocol version.
///
/// Every transport-specific message type implements this; the codec never
/// depends on a concrete message struct.
pub trait HeaderedMessage: fmt::Debug + Send {
    fn headers(&self) -> &Headers;

    fn headers_mut(&mut self) -> &mut Headers;

    fn body(&self) -> &[u8];

    /// Owned copy of the body. Implementations holding `Bytes` hand out a cheap clone.
    fn body_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.body())
    }

    /// Protocol version the message declares, if any.
    ///
    /// Binary messages carry it in a header. Structured messages carry it in
    /// the JSON envelope, which is peeked at without decoding the rest.
    fn spec_version(&self) -> Option<String> {
        let headers = self.headers();
        if let Some(v) = headers
            .get(HEADER_SPEC_VERSION)
            .or_else(|| headers.get(HEADER_SPEC_VERSION_V02))
        {
            return Some(v.to_string());
        }

        if headers.get(HEADER_CONTENT_TYPE) != Some(CONTENT_TYPE_CLOUDEVENTS_JSON) {
            return None;
        }
        serde_json::from_slice::<VersionPeek>(self.body())
            .ok()
            .and_then(|peek| peek.cloud_events_version.or(peek.spec_version))
    }
}

#[derive(Deserialize)]
struct VersionPeek {
    #[serde(rename = "cloudEventsVersion")]
    cloud_events_version: Option<String>,
    #[serde(rename = "specversion")]
    spec_version: Option<String>,
}

/// HTTP message: header map plus raw body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub headers: Headers,
    pub body: Bytes,
}

impl Message {
    pub fn new(headers: Headers, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// Value of the `Content-Type` header, if present
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(HEADER_CONTENT_TYPE)
    }
}

impl HeaderedMessage for Message {
    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    fn body_bytes(&self) -> Bytes {
        self.body.clone()
    }
}
