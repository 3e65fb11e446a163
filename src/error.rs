//! # Error Types
//!
//! Error handling for the envelope codec.
//!
//! Failures come in two tiers:
//! - **Hard errors** ([`CodecError`]) abort the whole encode/decode call
//! - **Soft warnings** ([`DecodeWarning`]) are recovered locally and returned
//!   alongside the decoded value in [`Decoded`]
//!
//! ## Error Categories
//! - **Encoding errors**: unsupported wire encoding, version mismatch
//! - **Message errors**: malformed headers, oversized bodies
//! - **Conversion errors**: payload marshaling, JSON envelope parsing
//! - **Extension errors**: invalid names, propagation failures
//! - **Configuration errors**: unreadable or invalid config
//!
//! ## Example Usage
//! ```rust
//! use event_envelope::error::{CodecError, Result};
//! use tracing::error;
//!
//! fn pick(encoding: &str) -> Result<()> {
//!     Err(CodecError::UnsupportedEncoding(encoding.to_string()))
//! }
//!
//! if let Err(e) = pick("batch") {
//!     error!(error = %e, "Encoding rejected");
//! }
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Registry lock errors
    pub const ERR_REGISTRY_READ_LOCK: &str = "Failed to acquire read lock on attribute registry";
    pub const ERR_REGISTRY_WRITE_LOCK: &str = "Failed to acquire write lock on attribute registry";

    /// Message validation errors
    pub const ERR_EMPTY_HEADER_VALUES: &str = "Header present without any values";
    pub const ERR_NOT_JSON_OBJECT: &str = "Structured body is not a JSON object";

    /// Extension errors
    pub const ERR_EMPTY_EXTENSION_NAME: &str = "Extension name cannot be empty";
    pub const ERR_INVALID_EXTENSION_CHAR: &str = "Extension name contains a non-token character";
    pub const ERR_NON_CANONICAL_EXTENSION: &str = "Extension name must start lower-case";
    pub const ERR_EXTENSION_HEADER_COLLISION: &str = "Extension names map to the same header";
}

/// CodecError is the primary error type for all codec operations
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Protocol version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Message body too large: {0} bytes")]
    OversizedBody(usize),

    #[error("Marshal error: {0}")]
    Marshal(String),

    #[error("Unmarshal error: {0}")]
    Unmarshal(String),

    #[error("Invalid event context: {0}")]
    InvalidContext(String),

    #[error("Invalid extension: {0}")]
    InvalidExtension(String),

    #[error("Failed to propagate extension {name:?}: {source}")]
    ExtensionPropagation {
        name: String,
        #[source]
        source: Box<CodecError>,
    },

    #[error("Synchronization primitive poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Unmarshal(err.to_string())
    }
}

/// Type alias for Results using CodecError
pub type Result<T> = std::result::Result<T, CodecError>;

/// A locally recovered decode problem.
///
/// Each warning is also emitted through `tracing::warn!` at the point of recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// Header arrived in non-canonical casing and was renamed in place
    NonCanonicalHeader { found: String, canonical: String },
    /// Structured body carried a top-level key outside the known set
    UnknownStructuredKey(String),
    /// Extension header value was not JSON; kept as the raw string
    ExtensionNotJson { name: String },
    /// URI-reference attribute could not be parsed and was dropped
    InvalidUriReference { attribute: String, value: String },
    /// Timestamp attribute could not be parsed and was dropped
    InvalidTimestamp { value: String },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeWarning::NonCanonicalHeader { found, canonical } => {
                write!(f, "non-canonical header {found:?}, canonical {canonical:?}")
            }
            DecodeWarning::UnknownStructuredKey(key) => write!(f, "unknown structured key {key:?}"),
            DecodeWarning::ExtensionNotJson { name } => {
                write!(f, "extension {name:?} is not JSON, kept as string")
            }
            DecodeWarning::InvalidUriReference { attribute, value } => {
                write!(f, "invalid URI reference for {attribute}: {value:?}")
            }
            DecodeWarning::InvalidTimestamp { value } => write!(f, "invalid timestamp {value:?}"),
        }
    }
}

/// A decoded value together with the soft warnings recovered while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub warnings: Vec<DecodeWarning>,
}

impl<T> Decoded<T> {
    pub fn new(value: T, warnings: Vec<DecodeWarning>) -> Self {
        Self { value, warnings }
    }

    /// True when nothing had to be recovered
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
