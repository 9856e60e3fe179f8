// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Engine lifecycle management: start, run loop, shutdown.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::types::{EngineState, QueueError};
use super::SyncEngine;

impl SyncEngine {
    /// Load the persisted report collection.
    ///
    /// Must complete before [`run()`](Self::run); the loaded snapshot is what
    /// the first sweep decision operates on.
    pub async fn start(&self) -> Result<(), QueueError> {
        let _ = self.state.send(EngineState::Loading);

        let loaded = match self.store.load().await {
            Ok(loaded) => loaded,
            Err(err) => {
                crate::metrics::record_store_error("load");
                return Err(QueueError::Persistence(err));
            }
        };

        let pending = loaded.iter().filter(|r| r.is_pending()).count();
        info!(reports = loaded.len(), pending, "Loaded persisted reports");
        *self.reports.write() = loaded;
        crate::metrics::set_pending_reports(pending);

        let _ = self.state.send(EngineState::Ready);
        Ok(())
    }

    /// Run until shutdown, sweeping on connectivity transitions.
    ///
    /// Sweeps are triggered by (a) a settled transition that reports the
    /// link online — including a flap that lands back on online, since
    /// pending work may have accumulated while the link was down — and
    /// (b) the optional periodic freshness timer. The startup sweep runs
    /// immediately when the initial snapshot is online.
    pub async fn run(self: Arc<Self>) {
        let _ = self.state.send(EngineState::Running);

        let mut events = self.monitor.subscribe();
        let mut state_rx = self.state_rx.clone();
        let mut ticker = self
            .config
            .sweep_interval_secs
            .map(|secs| tokio::time::interval(Duration::from_secs(secs)));
        if let Some(t) = ticker.as_mut() {
            // The first tick resolves immediately; the startup sweep below
            // covers it.
            t.tick().await;
        }

        if self.monitor.snapshot().online {
            if let Err(err) = self.sweep().await {
                warn!(error = %err, "Startup sweep failed");
            }
        }

        loop {
            tokio::select! {
                transition = events.next_transition() => {
                    match transition {
                        Some(link) if link.online => {
                            info!("Connection available, syncing pending reports");
                            if let Err(err) = self.sweep().await {
                                warn!(error = %err, "Sweep failed, will retry on next transition");
                            }
                        }
                        Some(_) => {
                            info!("Connection lost, new reports will be queued");
                        }
                        None => {
                            debug!("Connectivity monitor dropped, stopping run loop");
                            break;
                        }
                    }
                }
                _ = next_tick(&mut ticker) => {
                    if self.monitor.snapshot().online {
                        debug!("Periodic sweep");
                        if let Err(err) = self.sweep().await {
                            warn!(error = %err, "Periodic sweep failed");
                        }
                    }
                }
                changed = state_rx.changed() => {
                    if changed.is_err() || *state_rx.borrow() == EngineState::ShuttingDown {
                        break;
                    }
                }
            }
        }

        debug!("Engine run loop exited");
    }

    /// Request a graceful stop of the run loop.
    ///
    /// An in-flight attempt is awaited, never cancelled mid-delivery.
    pub fn shutdown(&self) {
        let _ = self.state.send(EngineState::ShuttingDown);
    }
}

async fn next_tick(ticker: &mut Option<tokio::time::Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
