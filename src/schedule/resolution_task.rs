use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::prediction::PredictionService;
use crate::shared::AppError;

/// Configuration for the outcome polling task
#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    /// How often to look for newly decided matches
    pub poll_interval: Duration,
    /// Upper bound on matches settled at the same time
    pub max_concurrent_matches: usize,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            max_concurrent_matches: 8,
        }
    }
}

/// Starts the background task that settles predictions once their match is decided
#[instrument(skip(predictions))]
pub async fn start_resolution_task(predictions: Arc<PredictionService>, config: ResolutionConfig) {
    info!(
        poll_interval_secs = config.poll_interval.as_secs(),
        max_concurrent_matches = config.max_concurrent_matches,
        "Starting outcome resolution background task"
    );

    let mut poll = interval(config.poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        poll.tick().await;

        match resolve_pending_matches(&predictions, config.max_concurrent_matches).await {
            Ok(resolved) => {
                debug!(resolved, "Outcome resolution pass completed");
            }
            Err(e) => {
                error!(error = %e, "Outcome resolution pass failed");
            }
        }
    }
}

/// Applies the provider's current outcome to every match with pending predictions.
///
/// Returns how many predictions were settled. A failure on one match is
/// logged and left for the next pass; replays are harmless because each
/// prediction is only ever moved out of pending once.
#[instrument(skip(predictions))]
pub async fn resolve_pending_matches(
    predictions: &PredictionService,
    max_concurrent_matches: usize,
) -> Result<usize, AppError> {
    let match_ids = predictions.pending_match_ids().await?;
    if match_ids.is_empty() {
        debug!("No matches awaiting outcomes");
        return Ok(0);
    }

    let results: Vec<(String, Result<usize, AppError>)> = stream::iter(match_ids)
        .map(|match_id| async move {
            let result = predictions
                .resolve_match(&match_id)
                .await
                .map(|summary| summary.resolved);
            (match_id, result)
        })
        .buffer_unordered(max_concurrent_matches.max(1))
        .collect()
        .await;

    let mut resolved = 0;
    for (match_id, result) in results {
        match result {
            Ok(count) => {
                if count > 0 {
                    info!(match_id = %match_id, resolved = count, "Settled match predictions");
                }
                resolved += count;
            }
            Err(e) => {
                warn!(match_id = %match_id, error = %e, "Failed to settle match predictions");
            }
        }
    }

    Ok(resolved)
}
