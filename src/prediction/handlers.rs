use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use super::{
    models::Prediction,
    types::{
        CreatePredictionRequest, MatchPredictionsResponse, PredictionsResponse,
        UpdateStatusRequest, UserPredictionsResponse, WeekPredictionsResponse,
    },
};
use crate::shared::{AppError, AppState};

/// HTTP handler for placing a prediction
///
/// POST /predictions
/// Returns 201 with the stored pending prediction, 409 if the user already picked this match
#[instrument(name = "create_prediction", skip(state))]
pub async fn create_prediction(
    State(state): State<AppState>,
    Json(request): Json<CreatePredictionRequest>,
) -> Result<(StatusCode, Json<Prediction>), AppError> {
    let prediction = state.prediction_service.create_prediction(request).await?;

    info!(
        prediction_id = %prediction.id,
        user_id = %prediction.user_id,
        match_id = %prediction.match_id,
        "Prediction placed"
    );

    Ok((StatusCode::CREATED, Json(prediction)))
}

/// GET /predictions
#[instrument(name = "list_predictions", skip(state))]
pub async fn list_predictions(
    State(state): State<AppState>,
) -> Result<Json<PredictionsResponse>, AppError> {
    let listing = state.prediction_service.list_all().await?;
    Ok(Json(listing))
}

/// GET /predictions/:id
#[instrument(name = "get_prediction", skip(state))]
pub async fn get_prediction(
    State(state): State<AppState>,
    Path(prediction_id): Path<String>,
) -> Result<Json<Prediction>, AppError> {
    let prediction = state.prediction_service.get_prediction(&prediction_id).await?;
    Ok(Json(prediction))
}

/// HTTP handler for withdrawing a pending prediction
///
/// DELETE /predictions/:id
/// Settled predictions cannot be withdrawn (412)
#[instrument(name = "delete_prediction", skip(state))]
pub async fn delete_prediction(
    State(state): State<AppState>,
    Path(prediction_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .prediction_service
        .delete_prediction(&prediction_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// HTTP handler for administrative status overrides
///
/// PUT /predictions/:id/status
#[instrument(name = "update_prediction_status", skip(state))]
pub async fn update_prediction_status(
    State(state): State<AppState>,
    Path(prediction_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Prediction>, AppError> {
    let prediction = state
        .prediction_service
        .update_status(&prediction_id, request.status, request.points)
        .await?;
    Ok(Json(prediction))
}

/// GET /predictions/user/:user_id
#[instrument(name = "list_user_predictions", skip(state))]
pub async fn list_user_predictions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserPredictionsResponse>, AppError> {
    let listing = state.prediction_service.list_by_user(&user_id).await?;
    Ok(Json(listing))
}

/// GET /predictions/match/:match_id
#[instrument(name = "list_match_predictions", skip(state))]
pub async fn list_match_predictions(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchPredictionsResponse>, AppError> {
    let listing = state.prediction_service.list_by_match(&match_id).await?;
    Ok(Json(listing))
}

/// GET /predictions/week/:week
/// A week that is not a positive number is rejected with 400
#[instrument(name = "list_week_predictions", skip(state))]
pub async fn list_week_predictions(
    State(state): State<AppState>,
    Path(week): Path<String>,
) -> Result<Json<WeekPredictionsResponse>, AppError> {
    let listing = state.prediction_service.list_by_week(&week).await?;
    Ok(Json(listing))
}
