use crate::error::{constants, CodecError, Result};
use crate::extensions::EventTracer;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::{debug, instrument};

/// Presence marker; gates application of every registered attribute
pub const TRACE_PARENT: &str = "traceparent";

pub const TRACE_STATE: &str = "tracestate";

/// Guarded name -> value registry of extension attributes.
#[derive(Debug, Default)]
pub struct TracingAttributes {
    attributes: RwLock<BTreeMap<String, Value>>,
}

impl TracingAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`, overwriting any previous value
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let mut attributes = self
            .attributes
            .write()
            .map_err(|_| CodecError::LockPoisoned(constants::ERR_REGISTRY_WRITE_LOCK))?;
        attributes.insert(name.into(), value.into());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        let attributes = self
            .attributes
            .read()
            .map_err(|_| CodecError::LockPoisoned(constants::ERR_REGISTRY_READ_LOCK))?;
        Ok(attributes.get(name).cloned())
    }

    pub fn set_trace_parent(&self, traceparent: impl Into<String>) -> Result<()> {
        self.set(TRACE_PARENT, traceparent.into())
    }

    pub fn trace_parent(&self) -> Result<Option<String>> {
        self.get_string(TRACE_PARENT)
    }

    pub fn set_trace_state(&self, tracestate: impl Into<String>) -> Result<()> {
        self.set(TRACE_STATE, tracestate.into())
    }

    pub fn trace_state(&self) -> Result<Option<String>> {
        self.get_string(TRACE_STATE)
    }

    /// Copy of every registered entry
    pub fn snapshot(&self) -> Result<BTreeMap<String, Value>> {
        let attributes = self
            .attributes
            .read()
            .map_err(|_| CodecError::LockPoisoned(constants::ERR_REGISTRY_READ_LOCK))?;
        Ok(attributes.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.snapshot()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Set every registered attribute onto `target`, once `traceparent` is present.
    ///
    /// Stops at the first failing `set_extension`. Attributes applied before
    /// the failure stay applied.
    #[instrument(skip_all)]
    pub fn apply(&self, target: &mut dyn EventTracer) -> Result<()> {
        // Snapshot so the lock is not held while calling into the target.
        let attributes = self.snapshot()?;
        if !attributes.contains_key(TRACE_PARENT) {
            return Ok(());
        }

        for (name, value) in attributes {
            debug!(attribute = %name, "Applying tracing attribute");
            target
                .set_extension(&name, value)
                .map_err(|e| CodecError::ExtensionPropagation {
                    name: name.clone(),
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }

    fn get_string(&self, name: &str) -> Result<Option<String>> {
        Ok(self.get(name)?.map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        }))
    }
}

/// Global attribute registry (lazy static for simplicity)
static ATTRIBUTES: once_cell::sync::Lazy<TracingAttributes> =
    once_cell::sync::Lazy::new(TracingAttributes::new);

/// Get the process-wide attribute registry
pub fn global_attributes() -> &'static TracingAttributes {
    &ATTRIBUTES
}

/// Apply the process-wide registry to `target`
pub fn add_tracing_attributes(target: &mut dyn EventTracer) -> Result<()> {
    global_attributes().apply(target)
}
