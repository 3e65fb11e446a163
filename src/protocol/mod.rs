//! # Codec Protocol
//!
//! The per-version [`Codec`] contract and its v0.1 implementation.
//!
//! ## Components
//! - **Encoding**: tag for the wire encoding (binary, structured, unknown)
//! - **Inspector**: classifies an inbound message by version and content type
//! - **Binary**: attributes as headers, payload as body
//! - **Structured**: whole event as one JSON envelope
//! - **CodecV01**: dispatches between the two through a strategy table

pub mod binary;
pub mod inspector;
pub mod structured;
pub mod v01;


pub use inspector::inspect_encoding;
pub use v01::CodecV01;

use crate::core::message::{HeaderedMessage, Message};
use crate::error::{CodecError, Decoded, Result};
use crate::event::Event;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Converts events to and from wire messages for one protocol version.
pub trait Codec: Send + Sync {
    /// Encode an event using the codec's configured wire encoding
    fn encode(&self, event: &Event) -> Result<Message>;

    /// Inspect a message's encoding and decode it.
    ///
    /// Takes the message mutably: binary decoding normalizes header casing in place.
    fn decode(&self, msg: &mut dyn HeaderedMessage) -> Result<Decoded<Event>>;
}

/// Wire encoding tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Alias for binary
    #[default]
    Default,
    BinaryV01,
    StructuredV01,
    /// Unrecognized; never encodable
    Unknown,
}

impl Encoding {
    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Default => "default",
            Encoding::BinaryV01 => "binary/v0.1",
            Encoding::StructuredV01 => "structured/v0.1",
            Encoding::Unknown => "unknown",
        }
    }

    /// True for the binary encoding or its `Default` alias
    pub fn is_binary(self) -> bool {
        matches!(self, Encoding::Default | Encoding::BinaryV01)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Encoding::Default),
            "binary" | "binary_v01" | "binary/v0.1" => Ok(Encoding::BinaryV01),
            "structured" | "structured_v01" | "structured/v0.1" => Ok(Encoding::StructuredV01),
            other => Err(CodecError::UnsupportedEncoding(other.to_string())),
        }
    }
}
