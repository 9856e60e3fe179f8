use async_trait::async_trait;
use thiserror::Error;

use crate::report::Report;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("could not encode report '{id}': {source}")]
    Encode {
        id: String,
        source: serde_json::Error,
    },
}

/// Durable persistence of the report collection.
///
/// The store is a single collection with full-read/full-replace semantics.
/// `save_all` is atomic: it either replaces the whole persisted collection or
/// leaves the prior snapshot readable — partial writes are never visible to a
/// subsequent `load`.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Load every persisted report in insertion order. Returns an empty
    /// collection when nothing has been persisted yet or the medium is
    /// unreadable.
    async fn load(&self) -> Result<Vec<Report>, StoreError>;

    /// Atomically replace the persisted collection. Safe to call repeatedly.
    async fn save_all(&self, reports: &[Report]) -> Result<(), StoreError>;
}
