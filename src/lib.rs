//! # event-envelope
//!
//! Versioned event envelope codec for HTTP transports.
//!
//! Converts a CloudEvents-style [`Event`] (typed context plus opaque payload) to
//! and from an HTTP-carried [`Message`], in either of two wire encodings:
//!
//! - **Binary**: context attributes as headers, payload as body
//! - **Structured**: the whole event as one `application/cloudevents+json` document
//!
//! Inbound messages are classified automatically by [`protocol::inspector`].
//!
//! ## Modules
//! - [`core`]: header map, wire message, payload marshaling
//! - [`event`]: events, version-specific contexts, URI/timestamp helpers
//! - [`protocol`]: the `Codec` contract, encoding inspection, v0.1 codec
//! - [`extensions`]: distributed-tracing attribute propagation
//! - [`config`]: TOML/env configuration
//! - [`utils`]: logging setup and metrics
//!
//! ## Example
//! ```rust
//! use event_envelope::event::{Event, EventContextV01, UriRef};
//! use event_envelope::protocol::{Codec, CodecV01, Encoding};
//!
//! let source = UriRef::parse("/sensors/tn-1234567/alerts").expect("valid uri");
//! let ctx = EventContextV01::new("A234-1234-1234", "com.example.someevent", source);
//! let event = Event::new(ctx.into(), None);
//!
//! let codec = CodecV01::new(Encoding::BinaryV01);
//! let mut msg = codec.encode(&event).expect("encode");
//! let decoded = codec.decode(&mut msg).expect("decode");
//! assert_eq!(decoded.value.context.as_v01().map(|c| c.event_id.as_str()), Some("A234-1234-1234"));
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod event;
pub mod extensions;
pub mod protocol;
pub mod utils;

pub use crate::core::headers::Headers;
pub use crate::core::message::{HeaderedMessage, Message};
pub use crate::error::{CodecError, DecodeWarning, Decoded, Result};
pub use crate::event::{Data, Event, EventContext, EventContextV01};
pub use crate::protocol::{Codec, CodecV01, Encoding};
