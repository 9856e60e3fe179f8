//! Configuration for the submission queue.
//!
//! # Example
//!
//! ```
//! use report_queue::QueueConfig;
//!
//! // Minimal config (uses defaults)
//! let config = QueueConfig::default();
//! assert_eq!(config.max_retries, 3);
//!
//! // Full config
//! let config = QueueConfig {
//!     db_path: Some("reports.db".into()),
//!     delivery_timeout_ms: 5_000,
//!     sweep_interval_secs: Some(60),
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;
use std::time::Duration;

/// Configuration for the submission queue and delivery engine.
///
/// All fields have sensible defaults. Configure `db_path` to persist
/// reports across process restarts.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// SQLite file backing the durable store (e.g. "reports.db").
    /// `None` keeps the queue in memory only.
    #[serde(default)]
    pub db_path: Option<String>,

    /// Failed delivery attempts before a report becomes terminally `Failed`.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-attempt delivery timeout in milliseconds. A timed-out attempt
    /// counts as a failure.
    #[serde(default = "default_delivery_timeout_ms")]
    pub delivery_timeout_ms: u64,

    /// Optional periodic sweep interval in seconds. Not required for
    /// correctness, only for freshness; disabled by default.
    #[serde(default)]
    pub sweep_interval_secs: Option<u64>,
}

fn default_max_retries() -> u32 { 3 }
fn default_delivery_timeout_ms() -> u64 { 10_000 }

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            max_retries: default_max_retries(),
            delivery_timeout_ms: default_delivery_timeout_ms(),
            sweep_interval_secs: None,
        }
    }
}

impl QueueConfig {
    /// Per-attempt delivery timeout as a [`Duration`].
    #[must_use]
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QueueConfig::default();

        assert!(config.db_path.is_none());
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.delivery_timeout(), Duration::from_secs(10));
        assert!(config.sweep_interval_secs.is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: QueueConfig =
            serde_json::from_str(r#"{"db_path": "queue.db", "max_retries": 5}"#).unwrap();

        assert_eq!(config.db_path.as_deref(), Some("queue.db"));
        assert_eq!(config.max_retries, 5);
        // Unspecified fields fall back to defaults
        assert_eq!(config.delivery_timeout_ms, 10_000);
    }
}
