use tokio::sync::broadcast;
use tracing::debug;

use super::events::PredictionEvent;

/// Event bus for distributing prediction events throughout the application
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PredictionEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` undelivered events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Emits an event to all current subscribers
    pub fn emit(&self, event: PredictionEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    event_type,
                    receivers = receiver_count,
                    "Prediction event emitted"
                );
            }
            Err(_) => {
                debug!(event_type, "Prediction event emitted with no receivers");
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PredictionEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
