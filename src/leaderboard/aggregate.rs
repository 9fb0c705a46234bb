use std::collections::{BTreeMap, HashSet};

use super::models::UserAggregate;
use crate::prediction::{Prediction, PredictionStatus};

/// Share of settled picks that were correct, 0 when nothing is settled yet
pub fn percentage(correct: u32, incorrect: u32) -> f64 {
    let settled = correct + incorrect;
    if settled == 0 {
        return 0.0;
    }
    f64::from(correct) / f64::from(settled) * 100.0
}

/// Builds the aggregate for `user_id` from that user's predictions.
///
/// Predictions belonging to other users are ignored.
pub fn compute_user_aggregate(user_id: &str, predictions: &[Prediction]) -> UserAggregate {
    let mut aggregate = UserAggregate::empty(user_id);

    for prediction in predictions.iter().filter(|p| p.user_id == user_id) {
        match prediction.status {
            PredictionStatus::Pending => aggregate.pending_picks += 1,
            PredictionStatus::Correct => aggregate.correct_picks += 1,
            PredictionStatus::Incorrect => aggregate.incorrect_picks += 1,
            PredictionStatus::Void => aggregate.void_picks += 1,
        }
        aggregate.points += i64::from(prediction.points);
    }

    aggregate.total_picks =
        aggregate.correct_picks + aggregate.incorrect_picks + aggregate.pending_picks;
    aggregate.percentage = percentage(aggregate.correct_picks, aggregate.incorrect_picks);
    aggregate
}

/// Aggregates every user that appears in `predictions`, ordered by user id
pub fn aggregate_all(predictions: &[Prediction]) -> Vec<UserAggregate> {
    let mut by_user: BTreeMap<&str, Vec<Prediction>> = BTreeMap::new();
    for prediction in predictions {
        by_user
            .entry(prediction.user_id.as_str())
            .or_default()
            .push(prediction.clone());
    }

    by_user
        .into_iter()
        .map(|(user_id, predictions)| compute_user_aggregate(user_id, &predictions))
        .collect()
}

/// Number of distinct matches with at least one correct or incorrect prediction
pub fn finished_match_count(predictions: &[Prediction]) -> usize {
    predictions
        .iter()
        .filter(|p| {
            matches!(
                p.status,
                PredictionStatus::Correct | PredictionStatus::Incorrect
            )
        })
        .map(|p| p.match_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}
