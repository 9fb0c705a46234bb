use serde::{Deserialize, Serialize};

use super::models::{Prediction, PredictionStatus};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePredictionRequest {
    pub user_id: String,
    pub match_id: String,
    pub predicted_winner_id: String,
}

/// Administrative status override
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateStatusRequest {
    pub status: PredictionStatus,
    /// Defaults to the points the status is worth
    #[serde(default)]
    pub points: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionsResponse {
    pub predictions: Vec<Prediction>,
    pub total: usize,
}

/// A user's predictions with their live counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPredictionsResponse {
    pub user_id: String,
    pub predictions: Vec<Prediction>,
    pub total_picks: u32,
    pub correct_picks: u32,
    pub incorrect_picks: u32,
    pub pending_picks: u32,
    pub void_picks: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPredictionsResponse {
    pub match_id: String,
    pub predictions: Vec<Prediction>,
    pub total: usize,
    pub pending: usize,
}

/// Predictions on every match scheduled for one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPredictionsResponse {
    pub week: u32,
    pub predictions: Vec<Prediction>,
    pub total: usize,
}
