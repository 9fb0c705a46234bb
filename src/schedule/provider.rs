use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::data::{seed_matches, seed_teams};
use super::models::{MatchModel, MatchOutcome, Participants, Team};
use crate::shared::AppError;

/// Schedule and results collaborator consumed by the prediction lifecycle
#[async_trait]
pub trait MatchOutcomeProvider: Send + Sync {
    async fn get_participants(&self, match_id: &str) -> Result<Option<Participants>, AppError>;

    async fn get_outcome(&self, match_id: &str) -> Result<Option<MatchOutcome>, AppError>;

    async fn list_matches(&self) -> Result<Vec<MatchModel>, AppError>;

    async fn list_teams(&self) -> Result<Vec<Team>, AppError>;

    /// Records a final outcome pushed by the results feed.
    ///
    /// Re-recording the same outcome is a no-op; replacing a decided outcome
    /// with a different one fails with `FailedPrecondition`.
    async fn record_outcome(
        &self,
        match_id: &str,
        outcome: MatchOutcome,
    ) -> Result<MatchModel, AppError>;
}

/// In-memory schedule used for development, demos and tests
pub struct InMemoryMatchOutcomeProvider {
    matches: RwLock<HashMap<String, MatchModel>>,
    teams: Vec<Team>,
}

impl Default for InMemoryMatchOutcomeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMatchOutcomeProvider {
    /// Creates an empty schedule with no teams
    pub fn new() -> Self {
        Self {
            matches: RwLock::new(HashMap::new()),
            teams: Vec::new(),
        }
    }

    /// Creates a schedule pre-populated with the league's teams and opening fixtures
    pub fn with_seed_schedule() -> Self {
        let matches = seed_matches()
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();

        Self {
            matches: RwLock::new(matches),
            teams: seed_teams(),
        }
    }

    #[instrument(skip(self, fixture), fields(match_id = %fixture.id))]
    pub async fn add_match(&self, fixture: MatchModel) -> Result<(), AppError> {
        if fixture.id.trim().is_empty() {
            return Err(AppError::invalid_argument("match id is required"));
        }
        if fixture.home_team_id == fixture.away_team_id {
            return Err(AppError::invalid_argument(
                "a match needs two distinct participants",
            ));
        }

        let mut matches = self.matches.write().await;
        if matches.contains_key(&fixture.id) {
            warn!("Match already scheduled");
            return Err(AppError::AlreadyExists(format!(
                "match {} already scheduled",
                fixture.id
            )));
        }

        debug!(
            home = %fixture.home_team_id,
            away = %fixture.away_team_id,
            "Match scheduled"
        );
        matches.insert(fixture.id.clone(), fixture);
        Ok(())
    }
}

#[async_trait]
impl MatchOutcomeProvider for InMemoryMatchOutcomeProvider {
    async fn get_participants(&self, match_id: &str) -> Result<Option<Participants>, AppError> {
        let matches = self.matches.read().await;
        Ok(matches.get(match_id).map(MatchModel::participants))
    }

    async fn get_outcome(&self, match_id: &str) -> Result<Option<MatchOutcome>, AppError> {
        let matches = self.matches.read().await;
        Ok(matches.get(match_id).map(|m| m.outcome.clone()))
    }

    async fn list_matches(&self) -> Result<Vec<MatchModel>, AppError> {
        let matches = self.matches.read().await;
        let mut list: Vec<MatchModel> = matches.values().cloned().collect();
        list.sort_by(|a, b| a.kickoff_at.cmp(&b.kickoff_at).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        Ok(self.teams.clone())
    }

    #[instrument(skip(self))]
    async fn record_outcome(
        &self,
        match_id: &str,
        outcome: MatchOutcome,
    ) -> Result<MatchModel, AppError> {
        if !outcome.is_decided() {
            return Err(AppError::invalid_argument(
                "outcome must be finished, cancelled or postponed",
            ));
        }

        let mut matches = self.matches.write().await;
        let fixture = matches
            .get_mut(match_id)
            .ok_or_else(|| AppError::not_found(format!("match {} not found", match_id)))?;

        if let Some(winner) = outcome.winner() {
            if !fixture.participants().contains(winner) {
                return Err(AppError::invalid_argument(format!(
                    "team {} does not participate in match {}",
                    winner, match_id
                )));
            }
        }

        if fixture.outcome == outcome {
            debug!("Outcome already recorded");
            return Ok(fixture.clone());
        }
        if fixture.outcome.is_decided() {
            warn!(current = ?fixture.outcome, requested = ?outcome, "Refusing to overwrite decided outcome");
            return Err(AppError::failed_precondition(format!(
                "match {} already has a different outcome",
                match_id
            )));
        }

        fixture.outcome = outcome;
        fixture.updated_at = Utc::now();
        info!(outcome = ?fixture.outcome, "Match outcome recorded");

        Ok(fixture.clone())
    }
}
