//! # Extension Propagation
//!
//! Well-known extension attributes (W3C `traceparent` / `tracestate`) held in
//! a [`TracingAttributes`] registry and copied onto any context that can set
//! an extension by name.
//!
//! The registry is gated: nothing is applied until the `traceparent` marker
//! has been set, and once it has, *every* registered entry is applied together.
//!
//! ## Lifecycle of the global registry
//! - Created lazily on first use; lives for the rest of the process
//! - Read and written under a `RwLock`
//! - No teardown; repeated sets simply overwrite

mod registry;

pub use registry::{
    add_tracing_attributes, global_attributes, TracingAttributes, TRACE_PARENT, TRACE_STATE,
};

use crate::error::Result;
use serde_json::Value;

/// Capability of setting an extension attribute by name.
pub trait EventTracer {
    fn set_extension(&mut self, name: &str, value: Value) -> Result<()>;
}
