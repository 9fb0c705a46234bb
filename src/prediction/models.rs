use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::schedule::MatchOutcome;
use crate::shared::AppError;

/// Lifecycle state of a prediction.
///
/// `Pending` is the only non-terminal state; every transition leaves it for
/// one of the three terminal states and nothing ever leaves a terminal state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PredictionStatus {
    Pending,
    Correct,
    Incorrect,
    Void,
}

impl PredictionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PredictionStatus::Pending)
    }

    /// Points awarded once a prediction settles in this status
    pub fn points(self) -> i32 {
        match self {
            PredictionStatus::Correct => 1,
            _ => 0,
        }
    }

    /// Checks the state machine edge `self -> next`.
    pub fn check_transition(self, next: PredictionStatus) -> Result<(), AppError> {
        if self.is_terminal() {
            return Err(AppError::failed_precondition(format!(
                "prediction is already {} and cannot become {}",
                self, next
            )));
        }
        if !next.is_terminal() {
            return Err(AppError::invalid_argument(
                "target status must be correct, incorrect or void",
            ));
        }
        Ok(())
    }

    /// Status a pending pick of `predicted_winner_id` settles into, or `None` while undecided
    pub fn settle(predicted_winner_id: &str, outcome: &MatchOutcome) -> Option<PredictionStatus> {
        match outcome {
            MatchOutcome::Pending => None,
            MatchOutcome::Finished { winner_id } if winner_id == predicted_winner_id => {
                Some(PredictionStatus::Correct)
            }
            MatchOutcome::Finished { .. } => Some(PredictionStatus::Incorrect),
            MatchOutcome::Cancelled | MatchOutcome::Postponed => Some(PredictionStatus::Void),
        }
    }
}

/// A user's pick of the winner of one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: String,
    pub user_id: String,
    pub match_id: String,
    pub predicted_winner_id: String,
    pub status: PredictionStatus,
    pub points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Prediction {
    /// Creates a new pending prediction with a generated id
    pub fn new(user_id: String, match_id: String, predicted_winner_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: format!("pred_{}", Uuid::new_v4().simple()),
            user_id,
            match_id,
            predicted_winner_id,
            status: PredictionStatus::Pending,
            points: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == PredictionStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn new_prediction_is_pending_with_zero_points() {
        let prediction = Prediction::new("alice".into(), "1".into(), "KC".into());
        assert!(prediction.is_pending());
        assert_eq!(prediction.points, 0);
        assert!(prediction.id.starts_with("pred_"));
        assert_eq!(prediction.created_at, prediction.updated_at);
    }

    #[test]
    fn ids_are_unique() {
        let a = Prediction::new("alice".into(), "1".into(), "KC".into());
        let b = Prediction::new("alice".into(), "1".into(), "KC".into());
        assert_ne!(a.id, b.id);
    }

    #[rstest]
    #[case("KC", MatchOutcome::Finished { winner_id: "KC".into() }, Some(PredictionStatus::Correct))]
    #[case("SF", MatchOutcome::Finished { winner_id: "KC".into() }, Some(PredictionStatus::Incorrect))]
    #[case("KC", MatchOutcome::Cancelled, Some(PredictionStatus::Void))]
    #[case("KC", MatchOutcome::Postponed, Some(PredictionStatus::Void))]
    #[case("KC", MatchOutcome::Pending, None)]
    fn settles_against_outcome(
        #[case] pick: &str,
        #[case] outcome: MatchOutcome,
        #[case] expected: Option<PredictionStatus>,
    ) {
        assert_eq!(PredictionStatus::settle(pick, &outcome), expected);
    }

    #[rstest]
    #[case(PredictionStatus::Correct, 1)]
    #[case(PredictionStatus::Incorrect, 0)]
    #[case(PredictionStatus::Void, 0)]
    #[case(PredictionStatus::Pending, 0)]
    fn points_per_status(#[case] status: PredictionStatus, #[case] points: i32) {
        assert_eq!(status.points(), points);
    }

    #[test]
    fn pending_may_move_to_any_terminal_state() {
        for next in [
            PredictionStatus::Correct,
            PredictionStatus::Incorrect,
            PredictionStatus::Void,
        ] {
            assert!(PredictionStatus::Pending.check_transition(next).is_ok());
        }
        assert!(matches!(
            PredictionStatus::Pending.check_transition(PredictionStatus::Pending),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn terminal_states_never_transition() {
        let all = [
            PredictionStatus::Pending,
            PredictionStatus::Correct,
            PredictionStatus::Incorrect,
            PredictionStatus::Void,
        ];
        for from in all.iter().filter(|s| s.is_terminal()) {
            for to in all {
                assert!(matches!(
                    from.check_transition(to),
                    Err(AppError::FailedPrecondition(_))
                ));
            }
        }
    }

    #[test]
    fn status_round_trips_through_text() {
        assert_eq!(PredictionStatus::Incorrect.to_string(), "incorrect");
        assert_eq!(PredictionStatus::Void.as_ref(), "void");
        assert_eq!(
            PredictionStatus::from_str("correct").unwrap(),
            PredictionStatus::Correct
        );
        assert!(PredictionStatus::from_str("won").is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let prediction = Prediction::new("alice".into(), "1".into(), "KC".into());
        let json = serde_json::to_value(&prediction).unwrap();
        assert_eq!(json["userId"], "alice");
        assert_eq!(json["predictedWinnerId"], "KC");
        assert_eq!(json["status"], "pending");
    }
}
