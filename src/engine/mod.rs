// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Delivery engine coordinator.
//!
//! The [`SyncEngine`] owns report lifecycle state. It is the only writer of
//! `status`/`retry_count`; every other component is a reader or an event
//! source. Transitions are persisted to the durable store before the
//! in-memory snapshot advances, so `list()`/`pending_count()` always observe
//! the last fully-persisted snapshot.
//!
//! # Lifecycle
//!
//! ```text
//! Created → Loading → Ready → Running → ShuttingDown
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use std::time::Duration;
//! # use report_queue::{ConnectivityMonitor, LinkSnapshot, LogNotifier, QueueConfig};
//! # use report_queue::engine::{EngineState, SyncEngine};
//! # use report_queue::storage::MemoryStore;
//! # async fn example(client: Arc<dyn report_queue::DeliveryClient>) {
//! let monitor = Arc::new(ConnectivityMonitor::new(
//!     LinkSnapshot::offline(),
//!     Duration::from_millis(500),
//! ));
//! let engine = Arc::new(SyncEngine::new(
//!     QueueConfig::default(),
//!     Arc::new(MemoryStore::new()),
//!     client,
//!     monitor,
//!     Arc::new(LogNotifier),
//! ));
//!
//! assert_eq!(engine.state(), EngineState::Created);
//! engine.start().await.expect("load failed");
//! tokio::spawn(Arc::clone(&engine).run());
//! # }
//! ```

mod attempt;
mod lifecycle;
mod types;

pub use types::{AttemptOutcome, EngineState, QueueError, SweepSummary};

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{watch, Mutex};

use crate::config::QueueConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::delivery::DeliveryClient;
use crate::notify::{Notification, Notifier};
use crate::report::Report;
use crate::storage::traits::ReportStore;

/// Core state machine: decides which reports to attempt, serializes
/// attempts, applies retry/backoff and terminal-failure policy.
pub struct SyncEngine {
    pub(super) config: QueueConfig,

    /// Durable persistence of the report collection.
    pub(super) store: Arc<dyn ReportStore>,

    /// Abstract capability that transmits one report.
    pub(super) client: Arc<dyn DeliveryClient>,

    /// Link state and transition events.
    pub(super) monitor: Arc<ConnectivityMonitor>,

    /// Fire-and-forget user alerts.
    pub(super) notifier: Arc<dyn Notifier>,

    /// Last fully-persisted snapshot, in insertion order. Readers never see
    /// a state that is not also in the durable store.
    pub(super) reports: RwLock<Vec<Report>>,

    /// Serializes sweeps and single-report attempts; delivery is strictly
    /// sequential.
    pub(super) sweep_gate: Mutex<()>,

    /// Serializes read-modify-write commits of the collection, so a submit
    /// never races an attempt's persisted transition. Held only for the
    /// duration of one `save_all`, never across a delivery.
    pub(super) commit_lock: Mutex<()>,

    /// Set by every sweep request, drained by the sweep that services it.
    /// A queued sweep whose request was already drained by the in-flight
    /// sweep returns without a pass.
    pub(super) sweep_requested: AtomicBool,

    /// Engine state (broadcast to watchers)
    pub(super) state: watch::Sender<EngineState>,

    /// Engine state receiver (for internal use)
    pub(super) state_rx: watch::Receiver<EngineState>,
}

impl SyncEngine {
    /// Create a new engine.
    ///
    /// The engine starts in `Created` state. Call [`start()`](Self::start)
    /// to load the persisted collection, then spawn [`run()`](Self::run) to
    /// react to connectivity transitions.
    pub fn new(
        config: QueueConfig,
        store: Arc<dyn ReportStore>,
        client: Arc<dyn DeliveryClient>,
        monitor: Arc<ConnectivityMonitor>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(EngineState::Created);

        Self {
            config,
            store,
            client,
            monitor,
            notifier,
            reports: RwLock::new(Vec::new()),
            sweep_gate: Mutex::new(()),
            commit_lock: Mutex::new(()),
            sweep_requested: AtomicBool::new(false),
            state: state_tx,
            state_rx,
        }
    }

    /// Get current engine state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        *self.state_rx.borrow()
    }

    /// Get a receiver to watch state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<EngineState> {
        self.state_rx.clone()
    }

    /// Store-ordered snapshot of all reports, for display.
    #[must_use]
    pub fn list(&self) -> Vec<Report> {
        self.reports.read().clone()
    }

    /// Number of reports still awaiting delivery.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.reports.read().iter().filter(|r| r.is_pending()).count()
    }

    /// Retry count of one report, if it exists.
    #[must_use]
    pub fn retry_count(&self, id: &str) -> Option<u32> {
        self.reports
            .read()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.retry_count)
    }

    /// Record the notification metric and hand the alert to the dispatcher.
    /// Never fails; dispatch problems are the notifier's to swallow.
    pub(super) async fn dispatch_notification(&self, notification: Notification) {
        crate::metrics::record_notification(notification.kind.as_str());
        self.notifier.notify(notification).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::LinkSnapshot;
    use crate::delivery::DeliveryError;
    use crate::notify::NoopNotifier;
    use crate::report::{Location, ReportDraft, Severity};
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::time::Duration;

    struct RejectingClient;

    #[async_trait]
    impl DeliveryClient for RejectingClient {
        async fn send(&self, _report: &Report) -> Result<(), DeliveryError> {
            Err(DeliveryError::Failed("unreachable".to_string()))
        }
    }

    fn offline_engine() -> SyncEngine {
        SyncEngine::new(
            QueueConfig::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(RejectingClient),
            Arc::new(ConnectivityMonitor::new(
                LinkSnapshot::offline(),
                Duration::ZERO,
            )),
            Arc::new(NoopNotifier),
        )
    }

    fn test_draft() -> ReportDraft {
        ReportDraft {
            report_type: "storm".to_string(),
            severity: Severity::Low,
            description: "Downed power line".to_string(),
            photos: Vec::new(),
            location: Location { latitude: 0.0, longitude: 0.0, address: None },
        }
    }

    #[test]
    fn test_engine_created_state() {
        let engine = offline_engine();
        assert_eq!(engine.state(), EngineState::Created);
    }

    #[tokio::test]
    async fn test_start_transitions_to_ready() {
        let engine = offline_engine();
        engine.start().await.unwrap();
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn test_reads_on_empty_engine() {
        let engine = offline_engine();
        engine.start().await.unwrap();

        assert!(engine.list().is_empty());
        assert_eq!(engine.pending_count(), 0);
        assert!(engine.retry_count("missing").is_none());
    }

    #[tokio::test]
    async fn test_submit_offline_stays_pending() {
        let engine = Arc::new(offline_engine());
        engine.start().await.unwrap();

        let report = Arc::clone(&engine).submit(test_draft()).await.unwrap();

        assert_eq!(engine.pending_count(), 1);
        assert_eq!(engine.retry_count(&report.id), Some(0));
    }
}
