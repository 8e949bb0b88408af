//! Switch notification subsystem.
//!
//! # Data Flow
//! ```text
//! Polling loop records a transition
//!     → dispatcher.rs: publish new active receiver on a watch channel (non-blocking)
//!     → background worker picks up the latest value
//!     → SwitchNotifier::notify (http.rs: POST {url}/switch/{label})
//!     → timeout / failure → backoff, retry within the attempt budget
//! ```
//!
//! # Design Decisions
//! - The loop never awaits the downstream; a dead endpoint cannot stall ticks
//! - Latest decision wins: a newer switch supersedes an undelivered older one
//! - Failure is logged and counted, never reported back to the controller

pub mod dispatcher;
pub mod http;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

pub use dispatcher::{DeliveryPolicy, NotifyDispatcher};
pub use http::HttpNotifier;

/// Errors from a single notification attempt.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("downstream rejected switch with status {0}")]
    Rejected(u16),
}

/// Tells the downstream consumer which receiver is now active.
pub trait SwitchNotifier: Send + Sync + 'static {
    fn notify(&self, receiver: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Used when downstream notification is disabled: the decision is only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl SwitchNotifier for LogNotifier {
    async fn notify(&self, receiver: &str) -> Result<(), NotifyError> {
        tracing::info!(receiver = %receiver, "Switch decision (downstream notification disabled)");
        Ok(())
    }
}
