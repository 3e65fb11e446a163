//! # Configuration Management
//!
//! Centralized configuration and wire constants for the envelope codec.
//!
//! This module provides structured configuration for codec instances,
//! including the outbound wire encoding, body size limits, and logging options.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()` (`EVENT_ENVELOPE_*`)

use crate::error::{CodecError, Result};
use crate::protocol::Encoding;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Protocol version modeled by this crate
pub const SPEC_VERSION_V01: &str = "0.1";

/// Content type that marks a binary-mode message (and the binary default)
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Content type that marks a structured-mode message
pub const CONTENT_TYPE_CLOUDEVENTS_JSON: &str = "application/cloudevents+json";

/// Binary-mode header names. Casing is emitted exactly as written here.
pub const HEADER_SPEC_VERSION: &str = "CE-CloudEventsVersion";
pub const HEADER_EVENT_ID: &str = "CE-EventID";
pub const HEADER_EVENT_TYPE: &str = "CE-EventType";
pub const HEADER_SOURCE: &str = "CE-Source";
pub const HEADER_EVENT_TIME: &str = "CE-EventTime";
pub const HEADER_EVENT_TYPE_VERSION: &str = "CE-EventTypeVersion";
pub const HEADER_SCHEMA_URL: &str = "CE-SchemaURL";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Version header used by later protocol revisions; recognized only to reject them
pub const HEADER_SPEC_VERSION_V02: &str = "ce-specversion";

/// Prefix of every extension header
pub const EXTENSION_PREFIX: &str = "CE-X-";

/// Max allowed message body size (e.g. 16 MB)
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Main configuration structure that contains all configurable settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CodecConfig {
    /// Codec behavior
    #[serde(default)]
    pub codec: CodecSettings,

    /// Size limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CodecConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| CodecError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| CodecError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| CodecError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(encoding) = std::env::var("EVENT_ENVELOPE_ENCODING") {
            config.codec.encoding = encoding.parse()?;
        }

        if let Ok(strict) = std::env::var("EVENT_ENVELOPE_STRICT_VALIDATION") {
            if let Ok(val) = strict.parse::<bool>() {
                config.codec.strict_validation = val;
            }
        }

        if let Ok(size) = std::env::var("EVENT_ENVELOPE_MAX_BODY_SIZE") {
            if let Ok(val) = size.parse::<usize>() {
                config.limits.max_body_size = val;
            }
        }

        if let Ok(level) = std::env::var("EVENT_ENVELOPE_LOG_LEVEL") {
            if let Ok(val) = level.parse::<Level>() {
                config.logging.log_level = val;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CodecError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| CodecError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.codec.validate());
        errors.extend(self.limits.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CodecError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Codec behavior settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecSettings {
    /// Wire encoding used for outbound events
    pub encoding: Encoding,

    /// Reject outbound contexts with missing mandatory attributes
    pub strict_validation: bool,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            encoding: Encoding::Default,
            strict_validation: false,
        }
    }
}

impl CodecSettings {
    /// Validate codec settings
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.encoding == Encoding::Unknown {
            errors.push(
                "Encoding cannot be 'unknown' (use default, binary_v01 or structured_v01)"
                    .to_string(),
            );
        }
        errors
    }
}

/// Size limits applied to encoded and decoded bodies
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum message body size in bytes
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: MAX_BODY_SIZE,
        }
    }
}

impl LimitsConfig {
    /// Validate limits
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        } else if self.max_body_size > 100 * 1024 * 1024 {
            errors.push(format!(
                "Max body size too large: {} bytes (maximum recommended: 100 MB)",
                self.max_body_size
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("event-envelope"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = level.as_str().to_ascii_lowercase();
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
