//! # Core Wire Components
//!
//! Transport-facing building blocks the codec reads and writes.
//!
//! ## Components
//! - **Headers**: case-preserving, case-insensitive header map
//! - **Message**: header map plus raw body, and the `HeaderedMessage` capability trait
//! - **Serialization**: payload marshaling keyed on declared content type
//!
//! ## Wire Forms
//! ```text
//! binary:     CE-EventID: ...  CE-X-<Ext>: <json>   Content-Type: <declared>   body = payload
//! structured: Content-Type: application/cloudevents+json   body = {"eventID": ..., "data": ...}
//! ```

pub mod headers;
pub mod message;
pub mod serialization;
