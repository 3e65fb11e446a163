//! Structured logging setup
//!
//! Installs a `tracing-subscriber` fmt subscriber driven by [`LoggingConfig`].
//! `RUST_LOG` takes precedence over the configured level when set.

use crate::config::LoggingConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed, which leaves the
/// existing one in place. Safe to call more than once.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_ascii_lowercase()));

    let installed = if config.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
            .is_ok()
    };

    if installed {
        debug!(app = %config.app_name, json = config.json_format, "Logging initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config);
        assert!(!init_logging(&config));
    }
}
