//! Observability and Metrics
//!
//! Counters for codec traffic, shared by every codec in the process.
//!
//! Uses atomic counters for thread-safe metrics collection.

use crate::protocol::Encoding;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Global metrics collector for codec operations
#[derive(Debug)]
pub struct Metrics {
    /// Events encoded in binary mode
    pub encoded_binary: AtomicU64,
    /// Events encoded in structured mode
    pub encoded_structured: AtomicU64,
    /// Messages decoded successfully
    pub decoded_total: AtomicU64,
    /// Decodes that failed with an error
    pub decode_failures: AtomicU64,
    /// Soft warnings returned alongside decoded events
    pub decode_warnings: AtomicU64,
    /// Total body bytes produced by encode
    pub bytes_out: AtomicU64,
    /// Total body bytes consumed by successful decodes
    pub bytes_in: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            encoded_binary: AtomicU64::new(0),
            encoded_structured: AtomicU64::new(0),
            decoded_total: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            decode_warnings: AtomicU64::new(0),
            bytes_out: AtomicU64::new(0),
            bytes_in: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record an encoded event and its body size
    pub fn event_encoded(&self, encoding: Encoding, byte_count: u64) {
        if encoding.is_binary() {
            self.encoded_binary.fetch_add(1, Ordering::Relaxed);
        } else {
            self.encoded_structured.fetch_add(1, Ordering::Relaxed);
        }
        self.bytes_out.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a successful decode
    pub fn event_decoded(&self, byte_count: u64, warning_count: u64) {
        self.decoded_total.fetch_add(1, Ordering::Relaxed);
        self.bytes_in.fetch_add(byte_count, Ordering::Relaxed);
        self.decode_warnings.fetch_add(warning_count, Ordering::Relaxed);
    }

    /// Record a failed decode
    pub fn decode_failed(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            encoded_binary: self.encoded_binary.load(Ordering::Relaxed),
            encoded_structured: self.encoded_structured.load(Ordering::Relaxed),
            decoded_total: self.decoded_total.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            decode_warnings: self.decode_warnings.load(Ordering::Relaxed),
            bytes_out: self.bytes_out.load(Ordering::Relaxed),
            bytes_in: self.bytes_in.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub encoded_binary: u64,
    pub encoded_structured: u64,
    pub decoded_total: u64,
    pub decode_failures: u64,
    pub decode_warnings: u64,
    pub bytes_out: u64,
    pub bytes_in: u64,
    pub uptime_seconds: u64,
}

static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}

/// Initialize metrics collection (call once at startup)
pub fn init_metrics() {
    let _ = global_metrics();
    info!("Metrics collection initialized");
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}
