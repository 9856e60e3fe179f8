//! Public types for the delivery engine.

use thiserror::Error;

use crate::storage::traits::StoreError;

/// Engine lifecycle state.
///
/// The engine progresses through states during startup and shutdown.
/// Use [`super::SyncEngine::state()`] to check current state or
/// [`super::SyncEngine::state_receiver()`] to watch for changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Just created, not yet started
    Created,
    /// Loading the persisted report collection
    Loading,
    /// Collection loaded, run loop not yet active
    Ready,
    /// Run loop active, sweeping on connectivity transitions
    Running,
    /// Graceful shutdown in progress
    ShuttingDown,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Loading => write!(f, "Loading"),
            Self::Ready => write!(f, "Ready"),
            Self::Running => write!(f, "Running"),
            Self::ShuttingDown => write!(f, "ShuttingDown"),
        }
    }
}

/// What a single delivery attempt did to its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Delivered; the report is now `Sent`.
    Delivered,
    /// Delivery failed; the report stays `Pending` with its retry count
    /// advanced.
    Retried,
    /// Delivery failed and the retry budget is exhausted; the report is now
    /// terminally `Failed`.
    FailedTerminal,
    /// The report was not `Pending` anymore (or unknown); nothing happened.
    Skipped,
}

/// Result of one sweep over the pending reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Reports for which a delivery attempt ran.
    pub attempted: usize,
    /// Attempts that delivered.
    pub delivered: usize,
    /// Attempts that failed with retry budget left.
    pub retried: usize,
    /// Attempts that exhausted the retry budget.
    pub failed: usize,
}

impl SweepSummary {
    /// Whether every attempted report was delivered.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.retried == 0 && self.failed == 0
    }

    pub(super) fn tally(&mut self, outcome: AttemptOutcome) {
        match outcome {
            AttemptOutcome::Delivered => {
                self.attempted += 1;
                self.delivered += 1;
            }
            AttemptOutcome::Retried => {
                self.attempted += 1;
                self.retried += 1;
            }
            AttemptOutcome::FailedTerminal => {
                self.attempted += 1;
                self.failed += 1;
            }
            AttemptOutcome::Skipped => {}
        }
    }
}

/// Recoverable errors surfaced to callers of `submit`/`sweep`.
///
/// Delivery failures are not errors: they advance a report's retry state.
/// Notification failures are swallowed. Only a durable-store failure
/// propagates, and the in-memory state is never advanced past the last
/// successfully persisted snapshot.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}
