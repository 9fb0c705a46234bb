use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{Prediction, PredictionStatus},
    repository::{DeleteResult, InsertResult, PredictionStore, TransitionResult},
    types::{
        CreatePredictionRequest, MatchPredictionsResponse, PredictionsResponse,
        UserPredictionsResponse, WeekPredictionsResponse,
    },
};
use crate::event::{EventBus, PredictionEvent};
use crate::leaderboard::aggregate::compute_user_aggregate;
use crate::schedule::{MatchModel, MatchOutcome, MatchOutcomeProvider};
use crate::shared::{require_non_empty, AppError};
use crate::user::UserDirectory;

/// What a single outcome application did to a match's predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionSummary {
    pub match_id: String,
    /// Predictions moved out of pending by this call
    pub resolved: usize,
    /// Predictions that were already terminal when this call reached them
    pub already_settled: usize,
}

impl ResolutionSummary {
    fn new(match_id: &str) -> Self {
        Self {
            match_id: match_id.to_string(),
            resolved: 0,
            already_settled: 0,
        }
    }
}

/// Admission and lifecycle rules for predictions
pub struct PredictionService {
    store: Arc<dyn PredictionStore>,
    outcomes: Arc<dyn MatchOutcomeProvider>,
    users: Option<Arc<dyn UserDirectory>>,
    event_bus: EventBus,
}

impl PredictionService {
    pub fn builder(
        store: Arc<dyn PredictionStore>,
        outcomes: Arc<dyn MatchOutcomeProvider>,
    ) -> PredictionServiceBuilder {
        PredictionServiceBuilder::new(store, outcomes)
    }

    /// Bus on which every persisted change is announced
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Admits a new pending prediction.
    ///
    /// The pick must name a participant of a match that is still undecided,
    /// and the (user, match) pair must not already hold a prediction. The
    /// uniqueness check is the store's atomic insert, so concurrent callers
    /// for the same pair see exactly one success.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, match_id = %request.match_id))]
    pub async fn create_prediction(
        &self,
        request: CreatePredictionRequest,
    ) -> Result<Prediction, AppError> {
        let user_id = require_non_empty("userId", &request.user_id)?;
        let match_id = require_non_empty("matchId", &request.match_id)?;
        let predicted_winner_id =
            require_non_empty("predictedWinnerId", &request.predicted_winner_id)?;

        let participants = self
            .outcomes
            .get_participants(&match_id)
            .await?
            .ok_or_else(|| AppError::invalid_argument(format!("match {} not found", match_id)))?;

        if !participants.contains(&predicted_winner_id) {
            return Err(AppError::invalid_argument(format!(
                "team {} does not participate in match {}",
                predicted_winner_id, match_id
            )));
        }

        if let Some(outcome) = self.outcomes.get_outcome(&match_id).await? {
            if outcome.is_decided() {
                return Err(AppError::failed_precondition(format!(
                    "match {} is already decided",
                    match_id
                )));
            }
        }

        if let Some(users) = &self.users {
            if !users.user_exists(&user_id).await? {
                return Err(AppError::not_found(format!("user {} not found", user_id)));
            }
        }

        let prediction = Prediction::new(user_id, match_id, predicted_winner_id);
        match self.store.insert_if_absent(&prediction).await? {
            InsertResult::Inserted(stored) => {
                info!(prediction_id = %stored.id, "Prediction created");
                self.event_bus.emit(PredictionEvent::Created {
                    prediction_id: stored.id.clone(),
                    user_id: stored.user_id.clone(),
                    match_id: stored.match_id.clone(),
                });
                Ok(stored)
            }
            InsertResult::AlreadyExists { existing_id } => {
                debug!(existing_id = %existing_id, "Duplicate prediction rejected");
                Err(AppError::AlreadyExists(format!(
                    "user {} already has prediction {} for match {}",
                    prediction.user_id, existing_id, prediction.match_id
                )))
            }
        }
    }

    /// Settles every still-pending prediction on `match_id` against `outcome`.
    ///
    /// Each record is moved with its own compare-and-set from `Pending`, so a
    /// replay or a concurrent call for the same match never settles a
    /// prediction twice. An undecided outcome leaves everything untouched,
    /// and a winner that did not play the match settles nothing.
    #[instrument(skip(self))]
    pub async fn transition_on_outcome(
        &self,
        match_id: &str,
        outcome: &MatchOutcome,
    ) -> Result<ResolutionSummary, AppError> {
        let match_id = require_non_empty("matchId", match_id)?;
        let mut summary = ResolutionSummary::new(&match_id);
        if !outcome.is_decided() {
            debug!("Outcome not decided yet");
            return Ok(summary);
        }
        if let Some(winner_id) = outcome.winner() {
            self.check_winner(&match_id, winner_id).await?;
        }

        let predictions = self.store.list_by_match(&match_id).await?;
        let result = self.settle_all(&predictions, outcome, &mut summary).await;

        // Whatever was written before a failure is real and must be announced
        if summary.resolved > 0 {
            self.event_bus.emit(PredictionEvent::Resolved {
                match_id: match_id.clone(),
                resolved: summary.resolved,
            });
        }
        result?;

        info!(
            resolved = summary.resolved,
            already_settled = summary.already_settled,
            "Match predictions settled"
        );
        Ok(summary)
    }

    async fn check_winner(&self, match_id: &str, winner_id: &str) -> Result<(), AppError> {
        let participants = self
            .outcomes
            .get_participants(match_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("match {} not found", match_id)))?;

        if !participants.contains(winner_id) {
            return Err(AppError::invalid_argument(format!(
                "team {} did not play in match {}",
                winner_id, match_id
            )));
        }
        Ok(())
    }

    async fn settle_all(
        &self,
        predictions: &[Prediction],
        outcome: &MatchOutcome,
        summary: &mut ResolutionSummary,
    ) -> Result<(), AppError> {
        for prediction in predictions {
            if !prediction.is_pending() {
                summary.already_settled += 1;
                continue;
            }
            let Some(status) = PredictionStatus::settle(&prediction.predicted_winner_id, outcome)
            else {
                continue;
            };

            match self
                .store
                .transition(&prediction.id, PredictionStatus::Pending, status, status.points())
                .await?
            {
                TransitionResult::Applied(_) => summary.resolved += 1,
                TransitionResult::StatusMismatch(_) => summary.already_settled += 1,
                // Withdrawn between listing and settling
                TransitionResult::NotFound => {}
            }
        }
        Ok(())
    }

    /// Pulls the match's current outcome from the provider and applies it
    #[instrument(skip(self))]
    pub async fn resolve_match(&self, match_id: &str) -> Result<ResolutionSummary, AppError> {
        let outcome = self
            .outcomes
            .get_outcome(match_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("match {} not found", match_id)))?;
        self.transition_on_outcome(match_id, &outcome).await
    }

    /// Records a pushed outcome with the provider, then settles the match
    #[instrument(skip(self))]
    pub async fn record_outcome(
        &self,
        match_id: &str,
        outcome: MatchOutcome,
    ) -> Result<(MatchModel, ResolutionSummary), AppError> {
        let match_id = require_non_empty("matchId", match_id)?;
        let fixture = self.outcomes.record_outcome(&match_id, outcome).await?;
        let summary = self
            .transition_on_outcome(&match_id, &fixture.outcome)
            .await?;
        Ok((fixture, summary))
    }

    /// Withdraws a prediction; only pending ones can be withdrawn
    #[instrument(skip(self))]
    pub async fn delete_prediction(&self, prediction_id: &str) -> Result<Prediction, AppError> {
        let prediction_id = require_non_empty("id", prediction_id)?;
        match self.store.delete_if_pending(&prediction_id).await? {
            DeleteResult::Deleted(prediction) => {
                info!("Prediction withdrawn");
                self.event_bus.emit(PredictionEvent::Deleted {
                    prediction_id: prediction.id.clone(),
                    user_id: prediction.user_id.clone(),
                    match_id: prediction.match_id.clone(),
                });
                Ok(prediction)
            }
            DeleteResult::NotPending(prediction) => Err(AppError::failed_precondition(format!(
                "prediction {} is {} and can no longer be withdrawn",
                prediction.id, prediction.status
            ))),
            DeleteResult::NotFound => Err(AppError::not_found(format!(
                "prediction {} not found",
                prediction_id
            ))),
        }
    }

    /// Administrative override of a pending prediction's status.
    ///
    /// `points` defaults to what `status` is worth and must equal it when given.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        prediction_id: &str,
        status: PredictionStatus,
        points: Option<i32>,
    ) -> Result<Prediction, AppError> {
        let current = self.get_prediction(prediction_id).await?;
        current.status.check_transition(status)?;

        let points = points.unwrap_or_else(|| status.points());
        if points != status.points() {
            return Err(AppError::invalid_argument(format!(
                "a {} prediction is worth {} points, not {}",
                status,
                status.points(),
                points
            )));
        }

        match self
            .store
            .transition(&current.id, current.status, status, points)
            .await?
        {
            TransitionResult::Applied(updated) => {
                warn!(status = %updated.status, "Prediction status overridden");
                self.event_bus.emit(PredictionEvent::StatusOverridden {
                    prediction_id: updated.id.clone(),
                    user_id: updated.user_id.clone(),
                    status: updated.status,
                });
                Ok(updated)
            }
            TransitionResult::StatusMismatch(latest) => Err(AppError::failed_precondition(
                format!("prediction {} is already {}", latest.id, latest.status),
            )),
            TransitionResult::NotFound => Err(AppError::not_found(format!(
                "prediction {} not found",
                current.id
            ))),
        }
    }

    pub async fn get_prediction(&self, prediction_id: &str) -> Result<Prediction, AppError> {
        let prediction_id = require_non_empty("id", prediction_id)?;
        self.store
            .get(&prediction_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("prediction {} not found", prediction_id)))
    }

    pub async fn list_all(&self) -> Result<PredictionsResponse, AppError> {
        let predictions = self.store.list_all().await?;
        Ok(PredictionsResponse {
            total: predictions.len(),
            predictions,
        })
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<UserPredictionsResponse, AppError> {
        let user_id = require_non_empty("userId", user_id)?;
        let predictions = self.store.list_by_user(&user_id).await?;
        let aggregate = compute_user_aggregate(&user_id, &predictions);

        Ok(UserPredictionsResponse {
            user_id,
            predictions,
            total_picks: aggregate.total_picks,
            correct_picks: aggregate.correct_picks,
            incorrect_picks: aggregate.incorrect_picks,
            pending_picks: aggregate.pending_picks,
            void_picks: aggregate.void_picks,
            percentage: aggregate.percentage,
        })
    }

    pub async fn list_by_match(&self, match_id: &str) -> Result<MatchPredictionsResponse, AppError> {
        let match_id = require_non_empty("matchId", match_id)?;
        let predictions = self.store.list_by_match(&match_id).await?;
        let pending = predictions.iter().filter(|p| p.is_pending()).count();

        Ok(MatchPredictionsResponse {
            match_id,
            total: predictions.len(),
            pending,
            predictions,
        })
    }

    /// Every prediction on the matches scheduled for `week`.
    ///
    /// `week` comes straight from the request path and must be a positive
    /// week number.
    #[instrument(skip(self))]
    pub async fn list_by_week(&self, week: &str) -> Result<WeekPredictionsResponse, AppError> {
        let raw = require_non_empty("week", week)?;
        let week = raw
            .parse::<u32>()
            .ok()
            .filter(|week| *week > 0)
            .ok_or_else(|| AppError::invalid_argument(format!("week {} is not a week number", raw)))?;

        let matches = self.outcomes.list_matches().await?;
        let mut predictions = Vec::new();
        for fixture in matches.iter().filter(|m| m.week == week) {
            predictions.extend(self.list_by_match(&fixture.id).await?.predictions);
        }
        debug!(week, returned = predictions.len(), "Listed week predictions");

        Ok(WeekPredictionsResponse {
            week,
            total: predictions.len(),
            predictions,
        })
    }

    /// Matches that still have pending predictions waiting for an outcome
    pub async fn pending_match_ids(&self) -> Result<Vec<String>, AppError> {
        self.store.pending_match_ids().await
    }
}

pub struct PredictionServiceBuilder {
    store: Arc<dyn PredictionStore>,
    outcomes: Arc<dyn MatchOutcomeProvider>,
    users: Option<Arc<dyn UserDirectory>>,
    event_bus: Option<EventBus>,
}

impl PredictionServiceBuilder {
    fn new(store: Arc<dyn PredictionStore>, outcomes: Arc<dyn MatchOutcomeProvider>) -> Self {
        Self {
            store,
            outcomes,
            users: None,
            event_bus: None,
        }
    }

    /// Require every predicting user to exist in `users`
    pub fn with_user_directory(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn build(self) -> PredictionService {
        PredictionService {
            store: self.store,
            outcomes: self.outcomes,
            users: self.users,
            event_bus: self.event_bus.unwrap_or_default(),
        }
    }
}
