use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::config::LeaderboardLimits;
use crate::leaderboard::LeaderboardService;
use crate::prediction::PredictionService;
use crate::schedule::MatchOutcomeProvider;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub prediction_service: Arc<PredictionService>,
    pub leaderboard_service: Arc<LeaderboardService>,
    pub schedule: Arc<dyn MatchOutcomeProvider>,
    pub leaderboard_limits: LeaderboardLimits,
}

impl AppState {
    pub fn new(
        prediction_service: Arc<PredictionService>,
        leaderboard_service: Arc<LeaderboardService>,
        schedule: Arc<dyn MatchOutcomeProvider>,
        leaderboard_limits: LeaderboardLimits,
    ) -> Self {
        Self {
            prediction_service,
            leaderboard_service,
            schedule,
            leaderboard_limits,
        }
    }
}

/// Status-coded error shared by every component.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn failed_precondition(msg: impl Into<String>) -> Self {
        AppError::FailedPrecondition(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    /// Caller errors are reported as-is and never worth retrying.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidArgument(_)
                | AppError::AlreadyExists(_)
                | AppError::NotFound(_)
                | AppError::FailedPrecondition(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if !self.is_caller_error() {
            error!(error = %self, "Request failed on the server side");
        }

        let (status, error_message) = match self {
            AppError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AlreadyExists(msg) => (StatusCode::CONFLICT, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::FailedPrecondition(msg) => (StatusCode::PRECONDITION_FAILED, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error: {}", msg),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Trims an identifier and rejects it when empty.
pub fn require_non_empty(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidArgument(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
