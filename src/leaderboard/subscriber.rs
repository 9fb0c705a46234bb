use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::service::LeaderboardService;
use crate::event::{EventError, PredictionEvent, PredictionEventHandler};

/// Republishes the ranking snapshot whenever prediction state changes.
///
/// Recalculation always rebuilds from the store, so handling the same event
/// twice, or a burst of events with one recalculation, converges on the same
/// ranking.
pub struct LeaderboardRefreshSubscriber {
    leaderboard: Arc<LeaderboardService>,
}

impl LeaderboardRefreshSubscriber {
    pub fn new(leaderboard: Arc<LeaderboardService>) -> Self {
        Self { leaderboard }
    }

    async fn refresh(&self) -> Result<(), EventError> {
        let snapshot = self.leaderboard.recalculate().await.map_err(|e| {
            if e.is_caller_error() {
                EventError::non_retryable(e.to_string())
            } else {
                EventError::retryable(e.to_string())
            }
        })?;
        debug!(version = snapshot.version, "Leaderboard refreshed");
        Ok(())
    }
}

#[async_trait]
impl PredictionEventHandler for LeaderboardRefreshSubscriber {
    async fn handle(&self, event: &PredictionEvent) -> Result<(), EventError> {
        if !event.affects_standings() {
            debug!(
                event_type = event.event_type(),
                match_id = ?event.match_id(),
                "Event leaves standings unchanged"
            );
            return Ok(());
        }
        self.refresh().await
    }

    async fn handle_missed(&self, skipped: u64) -> Result<(), EventError> {
        info!(skipped, "Rebuilding leaderboard after missed events");
        self.refresh().await
    }

    fn handler_name(&self) -> &'static str {
        "LeaderboardRefreshSubscriber"
    }
}
