use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::{
    models::MatchOutcome,
    types::{MatchesResponse, RecordOutcomeResponse, TeamsResponse},
};
use crate::shared::{AppError, AppState};

/// GET /matches
#[instrument(name = "list_matches", skip(state))]
pub async fn list_matches(State(state): State<AppState>) -> Result<Json<MatchesResponse>, AppError> {
    let matches = state.schedule.list_matches().await?;
    Ok(Json(MatchesResponse {
        total: matches.len(),
        matches,
    }))
}

/// GET /teams
#[instrument(name = "list_teams", skip(state))]
pub async fn list_teams(State(state): State<AppState>) -> Result<Json<TeamsResponse>, AppError> {
    let teams = state.schedule.list_teams().await?;
    Ok(Json(TeamsResponse {
        total: teams.len(),
        teams,
    }))
}

/// HTTP handler for the results feed
///
/// POST /matches/:id/outcome
/// Body: `{"status": "finished", "winnerId": "KC"}`, `{"status": "cancelled"}` or `{"status": "postponed"}`.
/// Replaying the same outcome is accepted and settles nothing new.
#[instrument(name = "record_outcome", skip(state))]
pub async fn record_outcome(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Json(outcome): Json<MatchOutcome>,
) -> Result<Json<RecordOutcomeResponse>, AppError> {
    let (fixture, resolution) = state
        .prediction_service
        .record_outcome(&match_id, outcome)
        .await?;

    info!(
        match_id = %fixture.id,
        resolved = resolution.resolved,
        already_settled = resolution.already_settled,
        "Outcome recorded"
    );

    Ok(Json(RecordOutcomeResponse {
        fixture,
        resolution,
    }))
}
