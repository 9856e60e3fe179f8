//! Report data structure.
//!
//! The [`Report`] is the unit of work that flows through the submission
//! queue. Each report carries an immutable payload captured at creation
//! (type, severity, description, photos, location) plus the two fields the
//! delivery engine is allowed to mutate: [`status`](Report::status) and
//! [`retry_count`](Report::retry_count).
//!
//! # Example
//!
//! ```
//! use report_queue::{Location, Report, ReportDraft, ReportStatus, Severity};
//!
//! let draft = ReportDraft {
//!     report_type: "flood".into(),
//!     severity: Severity::High,
//!     description: "Road washed out near the bridge".into(),
//!     photos: Vec::new(),
//!     location: Location { latitude: 51.5, longitude: -0.12, address: None },
//! };
//!
//! let report = Report::from_draft(draft);
//! assert_eq!(report.status, ReportStatus::Pending);
//! assert_eq!(report.retry_count, 0);
//! assert!(!report.id.is_empty());
//! ```

use serde::{Deserialize, Serialize};

/// Report severity, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Lifecycle state of a report.
///
/// `Pending → Sent` on successful delivery, `Pending → Failed` once the
/// retry budget is exhausted. `Sent` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Queued, awaiting delivery (or a further retry).
    Pending,
    /// Delivered to the remote authority.
    Sent,
    /// Retry budget exhausted; no further automatic attempts.
    Failed,
}

impl ReportStatus {
    /// Terminal states never transition again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent | Self::Failed)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Sent => write!(f, "sent"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Coordinates captured once at report creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Reverse-geocoded address, when the capturing layer provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Caller-supplied payload for a new report.
///
/// The queue facade turns a draft into a [`Report`] by assigning a fresh id,
/// a creation timestamp, and the initial `Pending` state.
#[derive(Debug, Clone)]
pub struct ReportDraft {
    pub report_type: String,
    pub severity: Severity,
    pub description: String,
    /// Ordered opaque encoded image blobs (the capturing layer hands these
    /// over already encoded, e.g. as base64 data URLs).
    pub photos: Vec<String>,
    pub location: Location,
}

/// One submitted incident record tracked by the queue.
///
/// Persisted as JSON with camelCase field names (`retryCount`, `createdAt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Unique id, assigned at creation, stable for the report's lifetime.
    /// Doubles as the dedup key and the retry counter's subject.
    pub id: String,
    #[serde(rename = "type")]
    pub report_type: String,
    pub severity: Severity,
    pub description: String,
    pub photos: Vec<String>,
    pub location: Location,
    /// Creation timestamp, epoch milliseconds.
    pub created_at: i64,
    pub status: ReportStatus,
    pub retry_count: u32,
}

impl Report {
    /// Build a new `Pending` report from a draft.
    #[must_use]
    pub fn from_draft(draft: ReportDraft) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            report_type: draft.report_type,
            severity: draft.severity,
            description: draft.description,
            photos: draft.photos,
            location: draft.location,
            created_at: epoch_millis(),
            status: ReportStatus::Pending,
            retry_count: 0,
        }
    }

    /// Whether the report is still awaiting delivery.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ReportStatus::Pending
    }
}

/// Current wall-clock time as epoch milliseconds.
pub(crate) fn epoch_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
