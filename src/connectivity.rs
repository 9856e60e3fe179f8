//! Connectivity monitoring.
//!
//! The [`ConnectivityMonitor`] holds the current [`LinkSnapshot`] and
//! broadcasts transitions over a [`tokio::sync::watch`] channel. The platform
//! layer feeds it raw online/offline and link-quality events via
//! [`publish`](ConnectivityMonitor::publish); the delivery engine consumes
//! debounced transitions via [`subscribe`](ConnectivityMonitor::subscribe).
//!
//! A deterministic initial snapshot is supplied at construction, so the
//! engine's first sweep decision is well-defined before any event fires.
//!
//! # Debouncing
//!
//! Rapid link flaps are coalesced: a subscription absorbs further raw
//! transitions until the link has stayed quiet for the debounce window
//! ([`DEFAULT_DEBOUNCE_WINDOW`], 500 ms) and then yields a single
//! notification carrying the settled snapshot. A flap that lands back on the
//! starting state still yields one notification, because transitions did
//! occur and pending work may have accumulated while the link was down.

use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Default window for coalescing link flaps into one notification.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Coarse link-quality hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkQuality {
    #[default]
    Unknown,
    Slow,
    Fast,
}

impl LinkQuality {
    /// Map a Network Information API effective-type string to a hint.
    #[must_use]
    pub fn from_effective_type(effective_type: &str) -> Self {
        match effective_type {
            "slow-2g" | "2g" | "3g" => Self::Slow,
            "4g" => Self::Fast,
            _ => Self::Unknown,
        }
    }
}

/// Point-in-time view of the network link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSnapshot {
    pub online: bool,
    /// User prefers reduced network usage; suppresses immediate delivery of
    /// new submissions but not sweeps of already-pending reports.
    pub save_data: bool,
    pub quality: LinkQuality,
    /// Estimated downstream bandwidth, when the platform reports one.
    pub downlink_mbps: Option<f64>,
    /// Estimated round-trip time, when the platform reports one.
    pub rtt_ms: Option<u32>,
}

impl LinkSnapshot {
    /// An online snapshot with no quality information.
    #[must_use]
    pub fn online() -> Self {
        Self {
            online: true,
            save_data: false,
            quality: LinkQuality::Unknown,
            downlink_mbps: None,
            rtt_ms: None,
        }
    }

    /// An offline snapshot.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            online: false,
            save_data: false,
            quality: LinkQuality::Unknown,
            downlink_mbps: None,
            rtt_ms: None,
        }
    }

    /// Builder-style save-data toggle.
    #[must_use]
    pub fn with_save_data(mut self, save_data: bool) -> Self {
        self.save_data = save_data;
        self
    }
}

impl Default for LinkSnapshot {
    /// Conservative default: offline until the platform says otherwise.
    fn default() -> Self {
        Self::offline()
    }
}

/// Tracks link state and notifies subscribers of transitions.
pub struct ConnectivityMonitor {
    tx: watch::Sender<LinkSnapshot>,
    debounce: Duration,
}

impl ConnectivityMonitor {
    /// Create a monitor with a known initial snapshot and debounce window.
    #[must_use]
    pub fn new(initial: LinkSnapshot, debounce: Duration) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx, debounce }
    }

    /// Current link state.
    #[must_use]
    pub fn snapshot(&self) -> LinkSnapshot {
        self.tx.borrow().clone()
    }

    /// Feed a raw platform event. Publishing a snapshot equal to the current
    /// one is a no-op; subscribers only ever wake for real transitions.
    pub fn publish(&self, snapshot: LinkSnapshot) {
        let modified = self.tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot.clone();
                true
            }
        });
        if modified {
            debug!(
                online = snapshot.online,
                save_data = snapshot.save_data,
                "Link transition"
            );
        }
    }

    /// Convenience: flip only the online bit.
    pub fn set_online(&self, online: bool) {
        let mut next = self.snapshot();
        next.online = online;
        self.publish(next);
    }

    /// Subscribe to debounced transitions.
    #[must_use]
    pub fn subscribe(&self) -> ConnectivityEvents {
        ConnectivityEvents {
            rx: self.tx.subscribe(),
            debounce: self.debounce,
        }
    }
}

/// A debounced transition stream handed out by
/// [`ConnectivityMonitor::subscribe`].
pub struct ConnectivityEvents {
    rx: watch::Receiver<LinkSnapshot>,
    debounce: Duration,
}

impl ConnectivityEvents {
    /// Wait for the next transition and return the settled snapshot.
    ///
    /// Flaps inside the debounce window coalesce into a single notification.
    /// Returns `None` once the monitor has been dropped.
    pub async fn next_transition(&mut self) -> Option<LinkSnapshot> {
        self.rx.changed().await.ok()?;

        // Absorb further raw transitions until the link stays quiet for a
        // full debounce window.
        if !self.debounce.is_zero() {
            while let Ok(changed) = tokio::time::timeout(self.debounce, self.rx.changed()).await {
                if changed.is_err() {
                    break;
                }
            }
        }

        Some(self.rx.borrow_and_update().clone())
    }
}
