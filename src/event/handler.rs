use async_trait::async_trait;
use thiserror::Error;

use super::events::PredictionEvent;

/// Errors that can occur when handling events
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Retryable error: {0}")]
    Retryable(String),

    #[error("Non-retryable error: {0}")]
    NonRetryable(String),
}

impl EventError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, EventError::Retryable(_))
    }

    pub fn retryable(msg: impl Into<String>) -> Self {
        EventError::Retryable(msg.into())
    }

    pub fn non_retryable(msg: impl Into<String>) -> Self {
        EventError::NonRetryable(msg.into())
    }
}

/// Trait for components that react to prediction events
///
/// Handlers must be idempotent: the same event (or a burst of them) may be
/// observed more than once, and a lagging subscriber is handed
/// [`PredictionEventHandler::handle_missed`] instead of the dropped events.
#[async_trait]
pub trait PredictionEventHandler: Send + Sync {
    async fn handle(&self, event: &PredictionEvent) -> Result<(), EventError>;

    /// Called when the subscriber fell behind and `skipped` events were dropped
    async fn handle_missed(&self, skipped: u64) -> Result<(), EventError>;

    fn handler_name(&self) -> &'static str;
}
