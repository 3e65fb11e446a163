//! Integration tests for configuration validation

#![allow(clippy::expect_used, clippy::unwrap_used)]

use event_envelope::config::{CodecConfig, LoggingConfig, MAX_BODY_SIZE};
use event_envelope::error::CodecError;
use event_envelope::protocol::{Codec, CodecV01, Encoding};
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = CodecConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
    assert_eq!(config.codec.encoding, Encoding::Default);
    assert_eq!(config.limits.max_body_size, MAX_BODY_SIZE);
}

#[test]
fn test_unknown_encoding_rejected() {
    let mut config = CodecConfig::default();
    config.codec.encoding = Encoding::Unknown;

    let errors = config.validate();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Encoding cannot be 'unknown'"));
}

#[test]
fn test_zero_body_size() {
    let mut config = CodecConfig::default();
    config.limits.max_body_size = 0;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Max body size cannot be 0")));
}

#[test]
fn test_excessive_body_size() {
    let mut config = CodecConfig::default();
    config.limits.max_body_size = 200 * 1024 * 1024;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Max body size too large")));
}

#[test]
fn test_empty_app_name() {
    let mut config = CodecConfig::default();
    config.logging.app_name = String::new();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_long_app_name() {
    let mut config = CodecConfig::default();
    config.logging.app_name = "a".repeat(65);

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Application name too long")));
}

#[test]
fn test_multiple_validation_errors() {
    let mut config = CodecConfig::default();
    config.codec.encoding = Encoding::Unknown;
    config.limits.max_body_size = 0;
    config.logging.app_name = String::new();

    assert_eq!(config.validate().len(), 3);
}

#[test]
fn test_validate_strict() {
    assert!(CodecConfig::default().validate_strict().is_ok());

    let config = CodecConfig::default_with_overrides(|c| c.limits.max_body_size = 0);
    match config.validate_strict() {
        Err(CodecError::ConfigError(msg)) => {
            assert!(msg.contains("Configuration validation failed"));
            assert!(msg.contains("Max body size cannot be 0"));
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn test_from_toml() {
    let config = CodecConfig::from_toml(
        r#"
        [codec]
        encoding = "structured_v01"
        strict_validation = true

        [limits]
        max_body_size = 4096

        [logging]
        log_level = "debug"
        "#,
    )
    .expect("TOML should parse");

    assert_eq!(config.codec.encoding, Encoding::StructuredV01);
    assert!(config.codec.strict_validation);
    assert_eq!(config.limits.max_body_size, 4096);
    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert_eq!(config.logging.app_name, LoggingConfig::default().app_name);
}

#[test]
fn test_from_toml_partial_sections() {
    let config = CodecConfig::from_toml("[codec]\nencoding = \"binary_v01\"\n").unwrap();
    assert_eq!(config.codec.encoding, Encoding::BinaryV01);
    assert!(!config.codec.strict_validation);
    assert_eq!(config.limits.max_body_size, MAX_BODY_SIZE);
}

#[test]
fn test_from_toml_rejects_bad_level() {
    let err = CodecConfig::from_toml("[logging]\nlog_level = \"loud\"\n").unwrap_err();
    assert!(matches!(err, CodecError::ConfigError(ref m) if m.contains("Failed to parse TOML")));
}

#[test]
fn test_example_config_round_trips() {
    let example = CodecConfig::example_config();
    assert!(example.contains("[codec]"));
    let parsed = CodecConfig::from_toml(&example).expect("example config should parse");
    assert!(parsed.validate().is_empty());
}

#[test]
fn test_save_and_load_file() {
    let path = std::env::temp_dir().join(format!(
        "event-envelope-config-{}.toml",
        std::process::id()
    ));
    let config = CodecConfig::default_with_overrides(|c| {
        c.codec.encoding = Encoding::StructuredV01;
        c.logging.json_format = true;
    });
    config.save_to_file(&path).expect("save should succeed");

    let loaded = CodecConfig::from_file(&path).expect("load should succeed");
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.codec.encoding, Encoding::StructuredV01);
    assert!(loaded.logging.json_format);
}

#[test]
fn test_missing_file() {
    let err = CodecConfig::from_file("/nonexistent/event-envelope.toml").unwrap_err();
    assert!(matches!(err, CodecError::ConfigError(_)));
}

#[test]
fn test_from_env() {
    std::env::set_var("EVENT_ENVELOPE_ENCODING", "structured");
    std::env::set_var("EVENT_ENVELOPE_MAX_BODY_SIZE", "2048");
    std::env::set_var("EVENT_ENVELOPE_STRICT_VALIDATION", "true");
    let config = CodecConfig::from_env();

    std::env::set_var("EVENT_ENVELOPE_ENCODING", "carrier-pigeon");
    let bad = CodecConfig::from_env();

    std::env::remove_var("EVENT_ENVELOPE_ENCODING");
    std::env::remove_var("EVENT_ENVELOPE_MAX_BODY_SIZE");
    std::env::remove_var("EVENT_ENVELOPE_STRICT_VALIDATION");

    let config = config.expect("env config should load");
    assert_eq!(config.codec.encoding, Encoding::StructuredV01);
    assert_eq!(config.limits.max_body_size, 2048);
    assert!(config.codec.strict_validation);
    assert!(matches!(bad, Err(CodecError::UnsupportedEncoding(_))));
}

#[test]
fn test_codec_from_config() {
    let config = CodecConfig::default_with_overrides(|c| {
        c.codec.encoding = Encoding::StructuredV01;
    });
    let codec = CodecV01::from_config(&config);
    assert_eq!(codec.encoding(), Encoding::StructuredV01);

    let ctx = event_envelope::event::EventContextV01::new(
        "1",
        "com.example.test",
        event_envelope::event::UriRef::parse("/src").unwrap(),
    );
    let msg = codec
        .encode(&event_envelope::Event::new(ctx.into(), None))
        .unwrap();
    assert_eq!(msg.content_type(), Some("application/cloudevents+json"));
}
