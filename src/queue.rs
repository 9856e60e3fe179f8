//! Queue facade — the only surface exposed to the UI layer.
//!
//! [`ReportQueue`] wires the engine to its collaborators, owns the run-loop
//! task, and exposes the contract the surrounding application may depend on:
//! [`submit`](ReportQueue::submit), [`list`](ReportQueue::list),
//! [`pending_count`](ReportQueue::pending_count),
//! [`retry_count`](ReportQueue::retry_count), and the emergency-alert relay.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::QueueConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::delivery::DeliveryClient;
use crate::engine::{QueueError, SyncEngine};
use crate::notify::{Notification, Notifier};
use crate::report::{Report, ReportDraft, Severity};
use crate::storage::traits::ReportStore;
use crate::storage::{MemoryStore, SqliteStore};

/// The submission queue as seen by the UI.
pub struct ReportQueue {
    engine: Arc<SyncEngine>,
    runner: JoinHandle<()>,
}

impl ReportQueue {
    /// Build a queue on an explicit store, start the engine, and spawn its
    /// run loop.
    pub async fn new(
        config: QueueConfig,
        store: Arc<dyn ReportStore>,
        client: Arc<dyn DeliveryClient>,
        monitor: Arc<ConnectivityMonitor>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, QueueError> {
        let engine = Arc::new(SyncEngine::new(config, store, client, monitor, notifier));
        engine.start().await?;
        let runner = tokio::spawn(Arc::clone(&engine).run());
        Ok(Self { engine, runner })
    }

    /// Build a queue with the store chosen by `config.db_path`: SQLite when
    /// a path is configured, in-memory otherwise.
    pub async fn open(
        config: QueueConfig,
        client: Arc<dyn DeliveryClient>,
        monitor: Arc<ConnectivityMonitor>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, QueueError> {
        let store: Arc<dyn ReportStore> = match &config.db_path {
            Some(path) => Arc::new(SqliteStore::open(path).await?),
            None => Arc::new(MemoryStore::new()),
        };
        Self::new(config, store, client, monitor, notifier).await
    }

    /// Construct and enqueue a new report.
    ///
    /// Returns the created report synchronously; delivery, if immediately
    /// eligible, proceeds in the background.
    pub async fn submit(&self, draft: ReportDraft) -> Result<Report, QueueError> {
        Arc::clone(&self.engine).submit(draft).await
    }

    /// Store-ordered snapshot of all reports, for display.
    #[must_use]
    pub fn list(&self) -> Vec<Report> {
        self.engine.list()
    }

    /// Number of reports still awaiting delivery.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.engine.pending_count()
    }

    /// Retry count of one report, if it exists.
    #[must_use]
    pub fn retry_count(&self, id: &str) -> Option<u32> {
        self.engine.retry_count(id)
    }

    /// Relay a platform emergency broadcast through the notification
    /// channel. Unrelated to any queued report.
    pub async fn emergency_alert(&self, message: impl Into<String>, severity: Severity) {
        self.engine
            .dispatch_notification(Notification::emergency(message, severity))
            .await;
    }

    /// Access the underlying engine, e.g. to watch its state.
    #[must_use]
    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    /// Stop the run loop and wait for it to finish. An in-flight delivery
    /// attempt completes first.
    pub async fn shutdown(self) {
        self.engine.shutdown();
        if let Err(err) = self.runner.await {
            debug!(error = %err, "Engine run loop ended abnormally");
        }
    }
}
