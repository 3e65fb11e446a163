//! Integration tests for tracing-attribute propagation

#![allow(clippy::unwrap_used, clippy::expect_used)]

use event_envelope::event::{Event, EventContextV01, UriRef};
use event_envelope::extensions::{
    add_tracing_attributes, global_attributes, EventTracer, TracingAttributes, TRACE_PARENT,
    TRACE_STATE,
};
use event_envelope::CodecError;
use serde_json::json;

const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

fn event() -> Event {
    let ctx = EventContextV01::new("1", "com.example.trace", UriRef::parse("/trace").unwrap());
    Event::new(ctx.into(), None)
}

#[test]
fn test_apply_without_marker_leaves_event_untouched() {
    let attributes = TracingAttributes::new();
    attributes.set_trace_state("congo=t61rcWkgMzE").unwrap();
    attributes.set("custom", 7).unwrap();

    let mut event = event();
    attributes.apply(&mut event).unwrap();
    assert!(event.context.extensions().is_empty());
}

#[test]
fn test_apply_copies_every_entry_once_marker_set() {
    let attributes = TracingAttributes::new();
    attributes.set_trace_parent(TRACEPARENT).unwrap();
    attributes.set_trace_state("congo=t61rcWkgMzE").unwrap();
    attributes.set("custom", json!({"k": "v"})).unwrap();

    let mut event = event();
    attributes.apply(&mut event).unwrap();

    let ext = event.context.extensions();
    assert_eq!(ext.len(), 3);
    assert_eq!(ext.get(TRACE_PARENT), Some(&json!(TRACEPARENT)));
    assert_eq!(ext.get(TRACE_STATE), Some(&json!("congo=t61rcWkgMzE")));
    assert_eq!(ext.get("custom"), Some(&json!({"k": "v"})));
}

#[test]
fn test_apply_overwrites_existing_extension() {
    let attributes = TracingAttributes::new();
    attributes.set_trace_parent(TRACEPARENT).unwrap();

    let mut event = event();
    event.set_extension(TRACE_PARENT, json!("stale")).unwrap();
    attributes.apply(&mut event).unwrap();
    assert_eq!(
        event.context.extensions().get(TRACE_PARENT),
        Some(&json!(TRACEPARENT))
    );
}

#[test]
fn test_invalid_entry_aborts_propagation() {
    let attributes = TracingAttributes::new();
    attributes.set_trace_parent(TRACEPARENT).unwrap();
    attributes.set("bad name", 1).unwrap();

    let mut event = event();
    match attributes.apply(&mut event) {
        Err(CodecError::ExtensionPropagation { name, source }) => {
            assert_eq!(name, "bad name");
            assert!(matches!(*source, CodecError::InvalidExtension(_)));
        }
        other => panic!("expected ExtensionPropagation, got {other:?}"),
    }
}

#[test]
fn test_typed_accessors() {
    let attributes = TracingAttributes::new();
    assert!(attributes.is_empty().unwrap());
    assert_eq!(attributes.trace_parent().unwrap(), None);

    attributes.set_trace_parent(TRACEPARENT).unwrap();
    attributes.set_trace_state("a=1").unwrap();
    assert_eq!(attributes.trace_parent().unwrap().as_deref(), Some(TRACEPARENT));
    assert_eq!(attributes.trace_state().unwrap().as_deref(), Some("a=1"));
    assert_eq!(attributes.len().unwrap(), 2);
    assert_eq!(attributes.snapshot().unwrap().len(), 2);
}

#[test]
fn test_global_registry() {
    let mut before = event();
    add_tracing_attributes(&mut before).unwrap();
    assert!(before.context.extensions().is_empty());

    global_attributes().set_trace_parent(TRACEPARENT).unwrap();

    let mut after = event();
    add_tracing_attributes(&mut after).unwrap();
    assert_eq!(
        after.context.extensions().get(TRACE_PARENT),
        Some(&json!(TRACEPARENT))
    );
}
