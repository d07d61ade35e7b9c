pub mod slack;
pub mod transport;

use async_trait::async_trait;
use thiserror::Error;

pub use slack::{SlackNotifier, SlackOptions};
pub use transport::{HttpTransport, Transport, TransportError};

#[derive(Debug, Error)]
#[error("Cannot send notify to {sink}: {source}")]
pub struct NotifyError {
    pub sink: &'static str,
    #[source]
    pub source: TransportError,
}

/// Destination for human-readable alert messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` once. Callers decide whether a failure matters.
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}
