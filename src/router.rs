use axum::{
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::leaderboard::{get_leaderboard, get_user_stats, recalculate_leaderboard};
use crate::prediction::{
    create_prediction, delete_prediction, get_prediction, list_match_predictions,
    list_predictions, list_user_predictions, list_week_predictions, update_prediction_status,
};
use crate::schedule::{list_matches, list_teams, record_outcome};
use crate::shared::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the HTTP surface over an assembled [`AppState`]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predictions", post(create_prediction).get(list_predictions))
        .route(
            "/predictions/:id",
            get(get_prediction).delete(delete_prediction),
        )
        .route("/predictions/:id/status", put(update_prediction_status))
        .route("/predictions/user/:user_id", get(list_user_predictions))
        .route("/predictions/match/:match_id", get(list_match_predictions))
        .route("/predictions/week/:week", get(list_week_predictions))
        .route("/matches", get(list_matches))
        .route("/matches/:id/outcome", post(record_outcome))
        .route("/teams", get(list_teams))
        .route("/leaderboard", get(get_leaderboard))
        .route("/leaderboard/users/:user_id", get(get_user_stats))
        .route("/leaderboard/recalculate", post(recalculate_leaderboard))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
