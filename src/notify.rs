//! Best-effort user notifications.
//!
//! The engine reports delivery outcomes through a [`Notifier`] — a
//! fire-and-forget capability with no return value. Dispatch failures
//! (missing permission, unsupported platform) are dropped; they are never
//! part of the delivery guarantee and never affect report state.

use async_trait::async_trait;
use tracing::info;

use crate::report::{Report, Severity};

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// A new report was accepted into the queue.
    ReportQueued,
    /// A report was delivered to the authority.
    ReportSent,
    /// A report exhausted its retry budget.
    ReportFailedTerminal,
    /// A platform-level emergency broadcast, unrelated to any one report.
    EmergencyAlert,
}

impl NotificationKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::ReportQueued => "report_queued",
            Self::ReportSent => "report_sent",
            Self::ReportFailedTerminal => "report_failed_terminal",
            Self::EmergencyAlert => "emergency_alert",
        }
    }
}

/// A user-facing alert, ready for the platform notification channel.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Set for per-report notifications, absent for emergency alerts.
    pub report_id: Option<String>,
    pub severity: Option<Severity>,
    /// Hint that the alert should stay on screen until acknowledged.
    pub requires_interaction: bool,
}

impl Notification {
    /// A report was accepted into the queue.
    #[must_use]
    pub fn queued(report: &Report) -> Self {
        Self {
            kind: NotificationKind::ReportQueued,
            title: "Report Queued".to_string(),
            body: format!(
                "Your {} report has been saved and will be sent to authorities",
                report.report_type
            ),
            report_id: Some(report.id.clone()),
            severity: Some(report.severity),
            requires_interaction: false,
        }
    }

    /// A report reached the authority.
    #[must_use]
    pub fn sent(report: &Report) -> Self {
        Self {
            kind: NotificationKind::ReportSent,
            title: "Report Synced Successfully".to_string(),
            body: format!(
                "Your {} report has been sent to authorities",
                report.report_type
            ),
            report_id: Some(report.id.clone()),
            severity: Some(report.severity),
            requires_interaction: false,
        }
    }

    /// A report exhausted its retry budget.
    #[must_use]
    pub fn failed_terminal(report: &Report) -> Self {
        Self {
            kind: NotificationKind::ReportFailedTerminal,
            title: "Report Sync Failed".to_string(),
            body: format!(
                "Failed to send {} report after multiple attempts",
                report.report_type
            ),
            report_id: Some(report.id.clone()),
            severity: Some(report.severity),
            requires_interaction: false,
        }
    }

    /// A platform emergency broadcast. High and critical severities ask the
    /// platform to keep the alert on screen until acknowledged.
    #[must_use]
    pub fn emergency(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind: NotificationKind::EmergencyAlert,
            title: "Emergency Alert".to_string(),
            body: message.into(),
            report_id: None,
            severity: Some(severity),
            requires_interaction: matches!(severity, Severity::High | Severity::Critical),
        }
    }
}

/// Fire-and-forget notification channel.
///
/// Implementations must never panic and must swallow their own dispatch
/// failures; the engine does not observe whether a notification reached the
/// user.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

/// Default notifier: emits structured log events.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) {
        info!(
            kind = notification.kind.as_str(),
            title = %notification.title,
            body = %notification.body,
            report_id = notification.report_id.as_deref().unwrap_or(""),
            "User notification"
        );
    }
}

/// Notifier for platforms where the alert permission is absent.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _notification: Notification) {}
}
