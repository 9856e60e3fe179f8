// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SQLite-backed durable store.
//!
//! Reports are persisted as JSON text in a single table keyed by insertion
//! position:
//!
//! ```sql
//! CREATE TABLE reports (
//!   position INTEGER PRIMARY KEY,  -- insertion order
//!   id TEXT NOT NULL UNIQUE,       -- report id, for dedup/inspection
//!   payload TEXT NOT NULL          -- the full report as JSON
//! )
//! ```
//!
//! `save_all` runs DELETE + INSERT inside one transaction, so the persisted
//! collection is replaced atomically: a failed save rolls back and the prior
//! snapshot stays readable. A row whose payload no longer decodes is skipped
//! on `load` with a warning rather than poisoning the whole collection.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::traits::{ReportStore, StoreError};
use crate::report::Report;
use crate::retry::{retry, RetryConfig};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the store at the given path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let url = format!("sqlite://{}?mode=rwc", path_str);

        info!(path = %path_str, "Opening report store");

        let pool = retry("report_store_connect", &RetryConfig::startup(), || async {
            SqlitePoolOptions::new()
                .max_connections(4)
                .acquire_timeout(Duration::from_secs(10))
                .connect(&url)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))
        })
        .await?;

        let store = Self { pool };
        store.enable_wal_mode().await?;
        store.init_schema().await?;
        Ok(store)
    }

    /// Enable WAL (Write-Ahead Logging) mode.
    ///
    /// Readers don't block the writer, and commits need a single fsync.
    /// WAL mode is safe with synchronous = NORMAL.
    async fn enable_wal_mode(&self) -> Result<(), StoreError> {
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to enable WAL mode: {}", e)))?;

        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to set synchronous mode: {}", e)))?;

        Ok(())
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        retry("report_store_init_schema", &RetryConfig::startup(), || async {
            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS reports (
                    position INTEGER PRIMARY KEY,
                    id TEXT NOT NULL UNIQUE,
                    payload TEXT NOT NULL
                )
                "#,
            )
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
        })
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ReportStore for SqliteStore {
    async fn load(&self) -> Result<Vec<Report>, StoreError> {
        let rows = sqlx::query("SELECT payload FROM reports ORDER BY position")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut reports = Vec::with_capacity(rows.len());
        for row in rows {
            let payload: String = match row.try_get("payload") {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable report row");
                    continue;
                }
            };
            match serde_json::from_str::<Report>(&payload) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupt report row");
                }
            }
        }

        debug!(reports = reports.len(), "Loaded report collection");
        Ok(reports)
    }

    async fn save_all(&self, reports: &[Report]) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::query("DELETE FROM reports")
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        for (position, report) in reports.iter().enumerate() {
            let payload =
                serde_json::to_string(report).map_err(|e| StoreError::Encode {
                    id: report.id.clone(),
                    source: e,
                })?;

            sqlx::query("INSERT INTO reports (position, id, payload) VALUES (?1, ?2, ?3)")
                .bind(position as i64)
                .bind(&report.id)
                .bind(payload)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        debug!(reports = reports.len(), "Persisted report collection");
        Ok(())
    }
}
