//! # Report Queue
//!
//! An offline-first submission queue and delivery engine for field incident
//! reports: a report recorded in the field is guaranteed to eventually reach
//! the remote authority, even when connectivity is intermittent or absent at
//! creation time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Queue Facade (UI surface)               │
//! │  • submit() / list() / pending_count() / retry_count()     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Sync Engine                          │
//! │  • Per-report state machine: Pending → Sent | Failed       │
//! │  • Sequential sweeps, coalesced; bounded retry (3)         │
//! │  • Persists every transition before readers observe it     │
//! └─────────────────────────────────────────────────────────────┘
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//! ┌──────────────┐    ┌─────────────────┐    ┌────────────────┐
//! │ Durable Store│    │ Delivery Client │    │   Notifier     │
//! │ SQLite/memory│    │ (injected)      │    │ (fire & forget)│
//! └──────────────┘    └─────────────────┘    └────────────────┘
//!                              ▲
//!                   Connectivity Monitor
//!              (debounced online/offline events)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use report_queue::{
//!     ConnectivityMonitor, DeliveryClient, DeliveryError, LinkSnapshot, Location,
//!     LogNotifier, QueueConfig, Report, ReportDraft, ReportQueue, Severity,
//! };
//!
//! struct AuthorityEndpoint;
//!
//! #[async_trait::async_trait]
//! impl DeliveryClient for AuthorityEndpoint {
//!     async fn send(&self, _report: &Report) -> Result<(), DeliveryError> {
//!         // authenticated call to the incident-authority endpoint
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let monitor = Arc::new(ConnectivityMonitor::new(
//!         LinkSnapshot::online(),
//!         Duration::from_millis(500),
//!     ));
//!
//!     let queue = ReportQueue::open(
//!         QueueConfig { db_path: Some("reports.db".into()), ..Default::default() },
//!         Arc::new(AuthorityEndpoint),
//!         Arc::clone(&monitor),
//!         Arc::new(LogNotifier),
//!     )
//!     .await?;
//!
//!     let report = queue
//!         .submit(ReportDraft {
//!             report_type: "flood".into(),
//!             severity: Severity::High,
//!             description: "Road washed out near the bridge".into(),
//!             photos: Vec::new(),
//!             location: Location { latitude: 51.5, longitude: -0.12, address: None },
//!         })
//!         .await?;
//!
//!     println!("queued {} ({} pending)", report.id, queue.pending_count());
//!
//!     // The platform layer feeds link events; the engine sweeps on its own.
//!     monitor.set_online(false);
//!     monitor.set_online(true);
//!
//!     queue.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! - **Durability**: every report and every state transition is persisted
//!   before it becomes observable; the queue survives process restarts.
//! - **Bounded retry**: a failed attempt advances the report's retry count;
//!   after `max_retries` (default 3) the report is terminally `Failed` and
//!   the user is told once.
//! - **Sequential delivery**: attempts never overlap; sweeps coalesce.
//! - **Honest reads**: `list()`/`pending_count()` never block on an
//!   in-flight attempt and only observe persisted state.
//!
//! ## Modules
//!
//! - [`queue`]: The [`ReportQueue`] facade — the only surface for UI code
//! - [`engine`]: The state machine deciding when and what to deliver
//! - [`storage`]: Durable store backends (SQLite, memory)
//! - [`connectivity`]: Link monitoring with debounced transitions
//! - [`delivery`]: The abstract transport capability
//! - [`notify`]: Fire-and-forget user alerts

pub mod config;
pub mod connectivity;
pub mod delivery;
pub mod engine;
pub mod metrics;
pub mod notify;
pub mod queue;
pub mod report;
pub mod retry;
pub mod storage;

pub use config::QueueConfig;
pub use connectivity::{
    ConnectivityEvents, ConnectivityMonitor, LinkQuality, LinkSnapshot, DEFAULT_DEBOUNCE_WINDOW,
};
pub use delivery::{DeliveryClient, DeliveryError};
pub use engine::{AttemptOutcome, EngineState, QueueError, SweepSummary, SyncEngine};
pub use notify::{LogNotifier, NoopNotifier, Notification, NotificationKind, Notifier};
pub use queue::ReportQueue;
pub use report::{Location, Report, ReportDraft, ReportStatus, Severity};
pub use storage::{MemoryStore, ReportStore, SqliteStore, StoreError};
