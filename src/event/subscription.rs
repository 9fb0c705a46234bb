use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{bus::EventBus, handler::PredictionEventHandler};

/// Routes events from the bus to a single handler on a background task
pub struct EventSubscription {
    handler: Arc<dyn PredictionEventHandler>,
    event_bus: EventBus,
}

impl EventSubscription {
    pub fn new(handler: Arc<dyn PredictionEventHandler>, event_bus: EventBus) -> Self {
        Self { handler, event_bus }
    }

    /// Subscribes immediately, then spawns the task that drains events into the handler.
    /// Events emitted after this returns are guaranteed to reach the handler.
    pub fn start(self) -> JoinHandle<()> {
        let handler = self.handler;
        let handler_name = handler.handler_name();
        // Only the receiver moves into the task so the bus can close once dropped
        let mut receiver = self.event_bus.subscribe();

        info!(
            handler = handler_name,
            subscribers = self.event_bus.subscriber_count(),
            "Starting event subscription"
        );

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        debug!(
                            handler = handler_name,
                            event_type = event.event_type(),
                            match_id = ?event.match_id(),
                            "Received prediction event"
                        );
                        if let Err(e) = handler.handle(&event).await {
                            warn!(
                                handler = handler_name,
                                event_type = event.event_type(),
                                match_id = ?event.match_id(),
                                error = %e,
                                retryable = e.is_retryable(),
                                "Prediction event handler failed"
                            );
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(handler = handler_name, skipped, "Event subscriber lagged");
                        if let Err(e) = handler.handle_missed(skipped).await {
                            warn!(
                                handler = handler_name,
                                error = %e,
                                "Handler failed to recover from missed events"
                            );
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            info!(handler = handler_name, "Event subscription ended - bus closed");
        })
    }
}
