use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{RankedEntry, UserAggregate};
use crate::prediction::Prediction;

/// Query parameters for paginated leaderboard reads
#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(flatten)]
    pub entry: RankedEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// One page of the leaderboard, always cut from a single ranking snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub total_users: usize,
    pub games_finished: usize,
    pub limit: usize,
    pub offset: usize,
    pub version: u64,
    pub last_updated: DateTime<Utc>,
}

/// A user's live counters alongside their standing in the published ranking.
///
/// `aggregate` reflects predictions right now; `standing` comes from ranking
/// snapshot `ranking_version` and may trail it until the next recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub aggregate: UserAggregate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub standing: Option<RankedEntry>,
    pub ranking_version: u64,
    pub ranking_updated_at: DateTime<Utc>,
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateResponse {
    pub version: u64,
    pub total_users: usize,
    pub games_finished: usize,
    pub computed_at: DateTime<Utc>,
}
