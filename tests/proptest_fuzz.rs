//! Property-based tests for the delivery state machine.
//!
//! Uses proptest to generate arbitrary delivery outcome sequences and report
//! payloads, and verifies the queue's invariants hold along every path:
//!
//! - `retry_count` is monotonically non-decreasing and never exceeds the
//!   retry budget
//! - `Sent` and `Failed` are terminal: once reached, nothing transitions
//! - `Pending` implies `retry_count < max_retries`; `Failed` implies
//!   `retry_count == max_retries`
//! - the in-memory snapshot always equals a fresh load of the store
//!
//! Reports are submitted while the link is down and sweeps are driven by the
//! test, so every delivery attempt consumes the scripted outcomes in a
//! deterministic order.
//!
//! Run with: `cargo test --test proptest_fuzz`

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;

use report_queue::{
    ConnectivityMonitor, DeliveryClient, DeliveryError, LinkSnapshot, Location, MemoryStore,
    NoopNotifier, QueueConfig, Report, ReportDraft, ReportStatus, ReportStore, Severity,
    SyncEngine,
};

// =============================================================================
// Strategies and fakes
// =============================================================================

fn severity_strategy() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Low),
        Just(Severity::Medium),
        Just(Severity::High),
        Just(Severity::Critical),
    ]
}

/// Arbitrary report payloads, including empty and unicode-heavy strings.
fn draft_strategy() -> impl Strategy<Value = ReportDraft> {
    (
        "[a-z]{1,12}",
        severity_strategy(),
        ".{0,64}",
        prop::collection::vec("[A-Za-z0-9+/=]{0,32}", 0..3),
        -90.0f64..90.0,
        -180.0f64..180.0,
    )
        .prop_map(|(report_type, severity, description, photos, lat, lon)| ReportDraft {
            report_type,
            severity,
            description,
            photos,
            location: Location { latitude: lat, longitude: lon, address: None },
        })
}

struct SequenceClient {
    outcomes: Mutex<VecDeque<bool>>,
}

impl SequenceClient {
    fn new(outcomes: &[bool]) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.iter().copied().collect()),
        }
    }
}

#[async_trait]
impl DeliveryClient for SequenceClient {
    async fn send(&self, _report: &Report) -> Result<(), DeliveryError> {
        match self.outcomes.lock().unwrap().pop_front() {
            Some(true) | None => Ok(()),
            Some(false) => Err(DeliveryError::Failed("injected".to_string())),
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime")
}

/// Engine over an offline monitor, so submits never spawn background
/// attempts; tests flip the link and drive sweeps themselves.
async fn offline_engine(
    store: Arc<MemoryStore>,
    outcomes: &[bool],
) -> (Arc<SyncEngine>, Arc<ConnectivityMonitor>) {
    let monitor = Arc::new(ConnectivityMonitor::new(
        LinkSnapshot::offline(),
        Duration::ZERO,
    ));
    let engine = Arc::new(SyncEngine::new(
        QueueConfig::default(),
        store as Arc<dyn ReportStore>,
        Arc::new(SequenceClient::new(outcomes)),
        Arc::clone(&monitor),
        Arc::new(NoopNotifier),
    ));
    engine.start().await.expect("start");
    (engine, monitor)
}

fn check_invariants(current: &[Report], previous: &[Report], max_retries: u32) {
    for report in current {
        assert!(report.retry_count <= max_retries, "retry count exceeded budget");
        match report.status {
            ReportStatus::Pending => assert!(report.retry_count < max_retries),
            ReportStatus::Failed => assert_eq!(report.retry_count, max_retries),
            ReportStatus::Sent => {}
        }
    }
    for old in previous {
        let new = current
            .iter()
            .find(|r| r.id == old.id)
            .expect("reports are never deleted");
        assert!(new.retry_count >= old.retry_count, "retry count went backwards");
        if old.status.is_terminal() {
            assert_eq!(new.status, old.status, "terminal state transitioned");
            assert_eq!(new.retry_count, old.retry_count, "terminal retry count moved");
        }
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any outcome sequence leaves every report in a legal state, with
    /// retry counts monotone and bounded, and terminal states frozen.
    #[test]
    fn prop_state_machine_invariants(
        drafts in prop::collection::vec(draft_strategy(), 1..4),
        outcomes in prop::collection::vec(any::<bool>(), 0..24),
    ) {
        runtime().block_on(async move {
            let store = Arc::new(MemoryStore::new());
            let (engine, monitor) = offline_engine(Arc::clone(&store), &outcomes).await;
            let max_retries = QueueConfig::default().max_retries;

            for draft in drafts {
                engine.clone().submit(draft).await.expect("submit");
            }
            monitor.set_online(true);

            let mut previous = engine.list();
            // Sweep until every report is terminal or the scripted outcomes
            // run out (outcomes past the script always deliver).
            for _ in 0..(max_retries as usize + 2) {
                engine.sweep().await.expect("sweep");
                let current = engine.list();
                check_invariants(&current, &previous, max_retries);
                prop_assert_eq!(&store.load().await.expect("load"), &current);
                previous = current;
            }
            Ok(())
        })?;
    }

    /// A report that reaches a terminal state is never attempted again:
    /// repeated sweeps settle it and the retry count stays bounded.
    #[test]
    fn prop_attempts_are_bounded(
        outcomes in prop::collection::vec(any::<bool>(), 0..16),
    ) {
        runtime().block_on(async move {
            let store = Arc::new(MemoryStore::new());
            let (engine, monitor) = offline_engine(Arc::clone(&store), &outcomes).await;
            let max_retries = QueueConfig::default().max_retries;

            let report = engine
                .clone()
                .submit(ReportDraft {
                    report_type: "probe".to_string(),
                    severity: Severity::Low,
                    description: String::new(),
                    photos: Vec::new(),
                    location: Location { latitude: 0.0, longitude: 0.0, address: None },
                })
                .await
                .expect("submit");
            monitor.set_online(true);

            // Drive sweeps well past the retry budget.
            for _ in 0..8 {
                engine.sweep().await.expect("sweep");
            }

            let final_report = engine
                .list()
                .into_iter()
                .find(|r| r.id == report.id)
                .expect("report exists");

            prop_assert!(final_report.retry_count <= max_retries);
            prop_assert!(
                final_report.status.is_terminal(),
                "eight sweeps over a 3-retry budget must settle the report"
            );
            Ok(())
        })?;
    }

    /// Serialization round-trips for arbitrary payloads: what the store
    /// persists is exactly what a fresh engine loads.
    #[test]
    fn prop_restart_preserves_reports(
        drafts in prop::collection::vec(draft_strategy(), 1..5),
    ) {
        runtime().block_on(async move {
            let store = Arc::new(MemoryStore::new());

            let (engine, _monitor) = offline_engine(Arc::clone(&store), &[]).await;
            for draft in drafts {
                engine.clone().submit(draft).await.expect("submit");
            }
            let before = engine.list();
            drop(engine);

            let (engine, _monitor) = offline_engine(Arc::clone(&store), &[]).await;
            prop_assert_eq!(engine.list(), before);
            Ok(())
        })?;
    }
}
