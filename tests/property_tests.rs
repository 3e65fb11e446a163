//! Property-based tests using proptest
//!
//! These tests check codec invariants across randomly generated contexts,
//! header casings and payloads.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bytes::Bytes;
use event_envelope::event::{canonical_extension_name, Data, Event, EventContextV01, UriRef};
use event_envelope::protocol::{binary, inspect_encoding, Codec, CodecV01, Encoding};
use event_envelope::{Headers, Message};
use proptest::prelude::*;

fn context_strategy() -> impl Strategy<Value = EventContextV01> {
    (
        "[A-Za-z0-9-]{1,32}",
        "[a-z]{1,8}(\\.[a-z]{1,8}){0,3}",
        "/[a-z0-9/-]{0,24}",
    )
        .prop_map(|(id, ty, source)| {
            EventContextV01::new(id, ty, UriRef::parse(&source).expect("generated URI is valid"))
        })
}

fn encoding_strategy() -> impl Strategy<Value = Encoding> {
    prop_oneof![
        Just(Encoding::Default),
        Just(Encoding::BinaryV01),
        Just(Encoding::StructuredV01),
    ]
}

// Property: mandatory attributes survive a round trip in every encoding
proptest! {
    #[test]
    fn prop_mandatory_attributes_roundtrip(ctx in context_strategy(), encoding in encoding_strategy()) {
        let codec = CodecV01::new(encoding);
        let event = Event::new(ctx.clone().into(), None);

        let mut msg = codec.encode(&event).expect("encode should not fail");
        let decoded = codec.decode(&mut msg).expect("decode should not fail");
        let out = decoded.value.context.as_v01().expect("v0.1 context");

        prop_assert_eq!(&out.event_id, &ctx.event_id);
        prop_assert_eq!(&out.event_type, &ctx.event_type);
        prop_assert_eq!(&out.source, &ctx.source);
        prop_assert!(decoded.warnings.is_empty());
    }
}

// Property: the inspector classifies the codec's own output as the encoding that produced it
proptest! {
    #[test]
    fn prop_inspector_agrees_with_encoder(ctx in context_strategy(), encoding in encoding_strategy()) {
        let msg = CodecV01::new(encoding).encode(&Event::new(ctx.into(), None)).unwrap();
        let expected = if encoding.is_binary() { Encoding::BinaryV01 } else { Encoding::StructuredV01 };
        prop_assert_eq!(inspect_encoding(&msg), expected);
    }
}

// Property: any version other than 0.1 is never recognized
proptest! {
    #[test]
    fn prop_foreign_version_is_unknown(version in "[0-9]\\.[0-9]{1,2}", structured in any::<bool>()) {
        prop_assume!(version != "0.1");
        let mut headers = Headers::new();
        headers.insert("CE-CloudEventsVersion", version);
        headers.insert(
            "Content-Type",
            if structured { "application/cloudevents+json" } else { "application/json" },
        );
        let msg = Message::new(headers, Bytes::new());
        prop_assert_eq!(inspect_encoding(&msg), Encoding::Unknown);
    }
}

// Property: header casing does not change what decodes
proptest! {
    #[test]
    fn prop_header_casing_irrelevant(ctx in context_strategy(), upper in prop::collection::vec(any::<bool>(), 8)) {
        let headers = binary::to_headers(&ctx, Encoding::BinaryV01).unwrap();
        let mut scrambled = Headers::new();
        for (i, (name, values)) in headers.iter().enumerate() {
            let name = if upper[i % upper.len()] {
                name.to_ascii_uppercase()
            } else {
                name.to_ascii_lowercase()
            };
            scrambled.insert_all(name, values.to_vec());
        }

        let mut msg = Message::new(scrambled, Bytes::new());
        let decoded = CodecV01::default().decode(&mut msg).unwrap();
        let out = decoded.value.context.as_v01().unwrap();
        prop_assert_eq!(out, &ctx.clone().with_content_type("application/json"));
    }
}

// Property: binary bodies pass through untouched
proptest! {
    #[test]
    fn prop_binary_body_passthrough(ctx in context_strategy(), body in prop::collection::vec(any::<u8>(), 1..4096)) {
        let ctx = ctx.with_content_type("application/json");
        let event = Event::new(ctx.into(), Some(Data::Bytes(Bytes::from(body.clone()))));
        let codec = CodecV01::new(Encoding::BinaryV01);

        let mut msg = codec.encode(&event).unwrap();
        let decoded = codec.decode(&mut msg).unwrap();
        prop_assert_eq!(decoded.value.data, Some(Data::Bytes(Bytes::from(body))));
    }
}

// Property: extension names come back canonical and identical in both encodings
proptest! {
    #[test]
    fn prop_extension_roundtrip(name in "[A-Za-z][a-z0-9-]{0,15}", value in any::<i64>()) {
        let ctx = EventContextV01::new("1", "t", UriRef::parse("/s").unwrap())
            .with_extension(&name, value)
            .unwrap();
        let canonical = canonical_extension_name(&name);

        for encoding in [Encoding::BinaryV01, Encoding::StructuredV01] {
            let codec = CodecV01::new(encoding);
            let mut msg = codec.encode(&Event::new(ctx.clone().into(), None)).unwrap();
            let decoded = codec.decode(&mut msg).unwrap();
            let ext = decoded.value.context.extensions();
            prop_assert_eq!(ext.len(), 1);
            prop_assert_eq!(ext.get(&canonical), Some(&serde_json::json!(value)));
        }
    }
}

// Property: normalization is idempotent for arbitrary header names
proptest! {
    #[test]
    fn prop_normalize_idempotent(names in prop::collection::vec("[A-Za-z][A-Za-z-]{0,20}", 0..10)) {
        let mut headers: Headers = names.iter().map(|n| (n.as_str(), "v")).collect();
        let mut first = Vec::new();
        binary::normalize_headers(&mut headers, &mut first);

        let mut second = Vec::new();
        binary::normalize_headers(&mut headers, &mut second);
        prop_assert!(second.is_empty());
    }
}
