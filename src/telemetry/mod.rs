//! Telemetry for the bill analysis service.
//!
//! Lightweight in-process counters, exposed through the `/metrics` endpoint.
//! Log output itself goes through `tracing`.

use crate::config::TelemetryConfig;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Telemetry instance for recording service metrics.
#[derive(Debug)]
pub struct Telemetry {
    /// Configuration
    config: TelemetryConfig,
    /// Bill ingestion counters
    bills_processed: AtomicU64,
    bills_failed: AtomicU64,
    usage_fallbacks: AtomicU64,
    /// Chat counters
    chat_replies: AtomicU64,
    chat_failures: AtomicU64,
    /// Model call counters
    model_calls: AtomicU64,
    total_model_time_us: AtomicU64,
    /// Error counter
    errors: AtomicU64,
}

impl Telemetry {
    /// Create a new telemetry instance.
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            config: config.clone(),
            bills_processed: AtomicU64::new(0),
            bills_failed: AtomicU64::new(0),
            usage_fallbacks: AtomicU64::new(0),
            chat_replies: AtomicU64::new(0),
            chat_failures: AtomicU64::new(0),
            model_calls: AtomicU64::new(0),
            total_model_time_us: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    /// Record the outcome of a bill ingestion.
    pub fn record_ingestion(&self, success: bool, used_fallback: bool) {
        if !self.config.enabled {
            return;
        }
        if success {
            self.bills_processed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.bills_failed.fetch_add(1, Ordering::Relaxed);
        }
        if used_fallback {
            self.usage_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record the outcome of a chat reply.
    pub fn record_chat(&self, success: bool) {
        if !self.config.enabled {
            return;
        }
        if success {
            self.chat_replies.fetch_add(1, Ordering::Relaxed);
        } else {
            self.chat_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record one external model call.
    pub fn record_model_call(&self, duration_ms: f64) {
        if !self.config.enabled {
            return;
        }
        self.model_calls.fetch_add(1, Ordering::Relaxed);
        let duration_us = (duration_ms * 1000.0) as u64;
        self.total_model_time_us
            .fetch_add(duration_us, Ordering::Relaxed);
    }

    /// Record an error.
    pub fn record_error(&self, category: &str) {
        if !self.config.enabled {
            return;
        }
        tracing::debug!(category, "Recorded error");
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics.
    pub fn metrics(&self) -> TelemetryMetrics {
        let model_calls = self.model_calls.load(Ordering::Relaxed);
        let total_time_us = self.total_model_time_us.load(Ordering::Relaxed);
        let avg_model_time_ms = if model_calls > 0 {
            (total_time_us as f64 / model_calls as f64) / 1000.0
        } else {
            0.0
        };

        TelemetryMetrics {
            service_name: self.config.service_name.clone(),
            bills_processed: self.bills_processed.load(Ordering::Relaxed),
            bills_failed: self.bills_failed.load(Ordering::Relaxed),
            usage_fallbacks: self.usage_fallbacks.load(Ordering::Relaxed),
            chat_replies: self.chat_replies.load(Ordering::Relaxed),
            chat_failures: self.chat_failures.load(Ordering::Relaxed),
            model_calls,
            avg_model_time_ms,
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    /// Check if telemetry is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Get the service name.
    pub fn service_name(&self) -> &str {
        &self.config.service_name
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new(&TelemetryConfig::default())
    }
}

/// Metrics collected by telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryMetrics {
    /// Service name
    pub service_name: String,
    /// Bills analysed successfully
    pub bills_processed: u64,
    /// Bills that failed analysis
    pub bills_failed: u64,
    /// Analyses that fell back to the default usage
    pub usage_fallbacks: u64,
    /// Chat replies delivered
    pub chat_replies: u64,
    /// Chat requests that failed
    pub chat_failures: u64,
    /// External model calls made
    pub model_calls: u64,
    /// Average model call latency in milliseconds
    pub avg_model_time_ms: f64,
    /// Total errors
    pub errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_creation() {
        let telemetry = Telemetry::default();
        assert!(telemetry.is_enabled());
        assert_eq!(telemetry.service_name(), "ecosync");
    }

    #[test]
    fn test_record_ingestion_and_chat() {
        let telemetry = Telemetry::default();

        telemetry.record_ingestion(true, false);
        telemetry.record_ingestion(true, true);
        telemetry.record_ingestion(false, false);
        telemetry.record_chat(true);
        telemetry.record_chat(false);
        telemetry.record_error("integration");

        let metrics = telemetry.metrics();
        assert_eq!(metrics.bills_processed, 2);
        assert_eq!(metrics.bills_failed, 1);
        assert_eq!(metrics.usage_fallbacks, 1);
        assert_eq!(metrics.chat_replies, 1);
        assert_eq!(metrics.chat_failures, 1);
        assert_eq!(metrics.errors, 1);
    }

    #[test]
    fn test_model_latency_average() {
        let telemetry = Telemetry::default();
        telemetry.record_model_call(10.0);
        telemetry.record_model_call(30.0);

        let metrics = telemetry.metrics();
        assert_eq!(metrics.model_calls, 2);
        assert!((metrics.avg_model_time_ms - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_disabled_records_nothing() {
        let config = TelemetryConfig {
            enabled: false,
            ..TelemetryConfig::default()
        };
        let telemetry = Telemetry::new(&config);
        telemetry.record_ingestion(true, true);
        telemetry.record_model_call(5.0);

        let metrics = telemetry.metrics();
        assert_eq!(metrics.bills_processed, 0);
        assert_eq!(metrics.model_calls, 0);
    }
}
