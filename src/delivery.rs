//! Delivery client abstraction.
//!
//! Transmitting a report to the remote authority is an opaque capability
//! with a binary outcome. In a real deployment the implementation is an
//! authenticated network call; tests inject deterministic fakes. The engine
//! never depends on transport details, only on [`DeliveryClient::send`].

use async_trait::async_trait;
use thiserror::Error;

use crate::report::Report;

/// Why a delivery attempt did not succeed.
///
/// Both variants are transient from the engine's point of view: they advance
/// the report's retry count, never the process state.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("delivery failed: {0}")]
    Failed(String),
    #[error("delivery timed out")]
    Timeout,
}

/// Capability that attempts to transmit one report to a remote authority.
///
/// `send` is called exactly once per attempt, sequentially across reports.
/// There are no partial or streaming semantics; the call either delivers the
/// whole report or fails.
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    async fn send(&self, report: &Report) -> Result<(), DeliveryError>;
}
