use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, instrument};

use super::types::{LeaderboardQuery, LeaderboardResponse, RecalculateResponse, UserStatsResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler for reading a page of the leaderboard
///
/// GET /leaderboard?limit=&offset=
/// Limit falls back to the configured default and is capped at the configured maximum
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let limit = state.leaderboard_limits.clamp(query.limit);
    let offset = query.offset.unwrap_or(0);

    let page = state.leaderboard_service.page(limit, offset).await?;

    info!(
        version = page.version,
        returned = page.leaderboard.len(),
        total_users = page.total_users,
        "Leaderboard served"
    );

    Ok(Json(page))
}

/// HTTP handler for a single user's stats and standing
///
/// GET /leaderboard/users/:user_id
#[instrument(name = "get_user_stats", skip(state))]
pub async fn get_user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStatsResponse>, AppError> {
    let stats = state.leaderboard_service.user_stats(&user_id).await?;
    Ok(Json(stats))
}

/// HTTP handler forcing a full ranking rebuild
///
/// POST /leaderboard/recalculate
#[instrument(name = "recalculate_leaderboard", skip(state))]
pub async fn recalculate_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<RecalculateResponse>, AppError> {
    let snapshot = state.leaderboard_service.recalculate().await?;

    info!(version = snapshot.version, "Leaderboard recalculated on request");

    Ok(Json(RecalculateResponse {
        version: snapshot.version,
        total_users: snapshot.total_users(),
        games_finished: snapshot.games_finished,
        computed_at: snapshot.computed_at,
    }))
}
