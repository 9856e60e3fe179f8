use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{ReportStore, StoreError};
use crate::report::Report;

/// In-memory store for tests and ephemeral queues. Keeps insertion order.
pub struct MemoryStore {
    reports: RwLock<Vec<Report>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: RwLock::new(Vec::new()),
        }
    }

    /// Get current report count
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn load(&self) -> Result<Vec<Report>, StoreError> {
        Ok(self.reports.read().clone())
    }

    async fn save_all(&self, reports: &[Report]) -> Result<(), StoreError> {
        *self.reports.write() = reports.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Location, Report, ReportDraft, Severity};

    fn test_report(description: &str) -> Report {
        Report::from_draft(ReportDraft {
            report_type: "fire".to_string(),
            severity: Severity::High,
            description: description.to_string(),
            photos: Vec::new(),
            location: Location { latitude: 0.0, longitude: 0.0, address: None },
        })
    }

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.load().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_save_and_load_preserves_order() {
        let store = MemoryStore::new();
        let reports = vec![test_report("first"), test_report("second"), test_report("third")];

        store.save_all(&reports).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].description, "first");
        assert_eq!(loaded[2].description, "third");
    }

    #[tokio::test]
    async fn test_save_all_replaces() {
        let store = MemoryStore::new();

        store.save_all(&[test_report("old")]).await.unwrap();
        store
            .save_all(&[test_report("new a"), test_report("new b")])
            .await
            .unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].description, "new a");
    }

    #[tokio::test]
    async fn test_save_empty_clears() {
        let store = MemoryStore::new();

        store.save_all(&[test_report("only")]).await.unwrap();
        store.save_all(&[]).await.unwrap();

        assert!(store.load().await.unwrap().is_empty());
    }
}
