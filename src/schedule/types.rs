use serde::{Deserialize, Serialize};

use super::models::{MatchModel, Team};
use crate::prediction::ResolutionSummary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcomeResponse {
    #[serde(rename = "match")]
    pub fixture: MatchModel,
    pub resolution: ResolutionSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchesResponse {
    pub matches: Vec<MatchModel>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamsResponse {
    pub teams: Vec<Team>,
    pub total: usize,
}
