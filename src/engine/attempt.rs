// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Submission, delivery attempts, and sweeps.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::types::{AttemptOutcome, QueueError, SweepSummary};
use super::SyncEngine;
use crate::delivery::DeliveryError;
use crate::notify::Notification;
use crate::report::{Report, ReportDraft, ReportStatus};

impl SyncEngine {
    /// Accept a new report into the queue.
    ///
    /// The report is appended to the durable store as `Pending` and a queued
    /// notification is dispatched. When the link is online and not in
    /// save-data mode, an immediate delivery attempt for this single report
    /// is scheduled; the caller gets the created report back either way —
    /// delivery stays asynchronous.
    #[tracing::instrument(skip(self, draft), fields(report_type = %draft.report_type))]
    pub async fn submit(self: Arc<Self>, draft: ReportDraft) -> Result<Report, QueueError> {
        let report = Report::from_draft(draft);

        let appended = report.clone();
        self.commit(move |reports| reports.push(appended)).await?;

        debug!(id = %report.id, "Report queued");
        self.dispatch_notification(Notification::queued(&report)).await;

        let link = self.monitor.snapshot();
        if link.online && !link.save_data {
            let engine = Arc::clone(&self);
            let id = report.id.clone();
            tokio::spawn(async move {
                if let Err(err) = engine.attempt_one(&id).await {
                    warn!(error = %err, id = %id, "Immediate delivery attempt aborted");
                }
            });
        } else if link.online {
            debug!(id = %report.id, "Save-data mode, deferring delivery to next sweep");
        } else {
            debug!(id = %report.id, "Offline, report queued for next online transition");
        }

        Ok(report)
    }

    /// Attempt delivery of a single report, serialized with sweeps.
    pub async fn attempt_one(&self, id: &str) -> Result<AttemptOutcome, QueueError> {
        let _gate = self.sweep_gate.lock().await;
        self.attempt_locked(id).await
    }

    /// Attempt delivery of every pending report, oldest first.
    ///
    /// Sweeps never run concurrently: overlapping requests queue behind the
    /// in-flight sweep, and a queued request that the in-flight sweep already
    /// serviced returns without another pass. The sweep only executes while
    /// the link is online.
    pub async fn sweep(&self) -> Result<SweepSummary, QueueError> {
        self.sweep_requested.store(true, Ordering::Release);

        let _gate = self.sweep_gate.lock().await;
        if !self.sweep_requested.swap(false, Ordering::AcqRel) {
            // Coalesced into the sweep that just finished.
            return Ok(SweepSummary::default());
        }
        if !self.monitor.snapshot().online {
            debug!("Sweep requested while offline, nothing to do");
            return Ok(SweepSummary::default());
        }

        self.sweep_pass().await
    }

    /// One pass over the pending reports. Caller holds the sweep gate.
    async fn sweep_pass(&self) -> Result<SweepSummary, QueueError> {
        let started = Instant::now();
        let pending_ids: Vec<String> = self
            .reports
            .read()
            .iter()
            .filter(|r| r.is_pending())
            .map(|r| r.id.clone())
            .collect();

        let mut summary = SweepSummary::default();
        for id in &pending_ids {
            // The link can drop mid-sweep; remaining reports wait for the
            // next online transition instead of burning retries.
            if !self.monitor.snapshot().online {
                info!(remaining = pending_ids.len() - summary.attempted, "Link lost mid-sweep");
                break;
            }
            summary.tally(self.attempt_locked(id).await?);
        }

        crate::metrics::record_sweep(summary.attempted, started.elapsed());
        info!(
            attempted = summary.attempted,
            delivered = summary.delivered,
            retried = summary.retried,
            failed = summary.failed,
            "Sweep completed"
        );
        Ok(summary)
    }

    /// Deliver one report and apply the outcome. Caller holds the sweep gate.
    ///
    /// Exactly one `DeliveryClient::send` call, bounded by the configured
    /// timeout (a timeout counts as a failure). The resulting transition is
    /// persisted before anything else observes it.
    async fn attempt_locked(&self, id: &str) -> Result<AttemptOutcome, QueueError> {
        let report = {
            let reports = self.reports.read();
            match reports.iter().find(|r| r.id == id) {
                Some(report) if report.is_pending() => report.clone(),
                _ => {
                    crate::metrics::record_attempt("skipped");
                    return Ok(AttemptOutcome::Skipped);
                }
            }
        };

        let started = Instant::now();
        let outcome = match tokio::time::timeout(
            self.config.delivery_timeout(),
            self.client.send(&report),
        )
        .await
        {
            Ok(result) => result,
            Err(_elapsed) => Err(DeliveryError::Timeout),
        };
        crate::metrics::record_attempt_latency(started.elapsed());

        match outcome {
            Ok(()) => {
                let mut updated = report;
                updated.status = ReportStatus::Sent;
                self.persist_update(updated.clone()).await?;

                crate::metrics::record_attempt("delivered");
                info!(id = %updated.id, "Report delivered");
                self.dispatch_notification(Notification::sent(&updated)).await;
                Ok(AttemptOutcome::Delivered)
            }
            Err(err) => {
                let mut updated = report;
                updated.retry_count += 1;

                if updated.retry_count >= self.config.max_retries {
                    updated.status = ReportStatus::Failed;
                    self.persist_update(updated.clone()).await?;

                    crate::metrics::record_attempt("failed_terminal");
                    warn!(
                        id = %updated.id,
                        retries = updated.retry_count,
                        error = %err,
                        "Report failed terminally"
                    );
                    self.dispatch_notification(Notification::failed_terminal(&updated))
                        .await;
                    Ok(AttemptOutcome::FailedTerminal)
                } else {
                    self.persist_update(updated.clone()).await?;

                    crate::metrics::record_attempt("retried");
                    debug!(
                        id = %updated.id,
                        retries = updated.retry_count,
                        error = %err,
                        "Delivery failed, will retry"
                    );
                    Ok(AttemptOutcome::Retried)
                }
            }
        }
    }

    /// Persist a single-report transition into the collection.
    async fn persist_update(&self, updated: Report) -> Result<(), QueueError> {
        self.commit(move |reports| {
            if let Some(slot) = reports.iter_mut().find(|r| r.id == updated.id) {
                *slot = updated;
            }
        })
        .await
    }

    /// Apply an edit to the collection, write the result to the durable
    /// store, then publish it to readers. Commits are serialized, and on
    /// failure the in-memory snapshot stays at the last persisted state.
    async fn commit(&self, edit: impl FnOnce(&mut Vec<Report>)) -> Result<(), QueueError> {
        let _guard = self.commit_lock.lock().await;

        let mut next = self.reports.read().clone();
        edit(&mut next);

        if let Err(err) = self.store.save_all(&next).await {
            crate::metrics::record_store_error("save");
            warn!(error = %err, "Failed to persist report collection");
            return Err(QueueError::Persistence(err));
        }

        let pending = next.iter().filter(|r| r.is_pending()).count();
        *self.reports.write() = next;
        crate::metrics::set_pending_reports(pending);
        Ok(())
    }
}
