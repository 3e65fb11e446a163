//! # Utility Modules
//!
//! Supporting utilities for logging and observability.
//!
//! ## Components
//! - **Logging**: `tracing-subscriber` setup from [`LoggingConfig`](crate::config::LoggingConfig)
//! - **Metrics**: Thread-safe codec counters and an operation timer

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{global_metrics, init_metrics, MetricsSnapshot, Timer};
