// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the submission queue.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding application is responsible for choosing the exporter
//! (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `report_queue_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `outcome`: delivered, retried, failed_terminal, skipped
//! - `kind`: notification kind
//! - `operation`: load, save

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record one delivery attempt and its outcome.
pub fn record_attempt(outcome: &'static str) {
    counter!("report_queue_attempts_total", "outcome" => outcome).increment(1);
}

/// Record how long a delivery attempt took, including the timeout path.
pub fn record_attempt_latency(duration: Duration) {
    histogram!("report_queue_attempt_seconds").record(duration.as_secs_f64());
}

/// Record a completed sweep and how many pending reports it touched.
pub fn record_sweep(attempted: usize, duration: Duration) {
    counter!("report_queue_sweeps_total").increment(1);
    histogram!("report_queue_sweep_reports").record(attempted as f64);
    histogram!("report_queue_sweep_seconds").record(duration.as_secs_f64());
}

/// Set the current number of pending reports.
pub fn set_pending_reports(count: usize) {
    gauge!("report_queue_pending_reports").set(count as f64);
}

/// Record a dispatched notification.
pub fn record_notification(kind: &'static str) {
    counter!("report_queue_notifications_total", "kind" => kind).increment(1);
}

/// Record a durable-store failure.
pub fn record_store_error(operation: &'static str) {
    counter!("report_queue_store_errors_total", "operation" => operation).increment(1);
}
