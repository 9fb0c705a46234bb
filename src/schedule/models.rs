use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resolved (or not yet resolved) result of a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MatchOutcome {
    Pending,
    Finished {
        #[serde(rename = "winnerId")]
        winner_id: String,
    },
    Cancelled,
    Postponed,
}

impl MatchOutcome {
    /// Whether predictions on this match can be settled
    pub fn is_decided(&self) -> bool {
        !matches!(self, MatchOutcome::Pending)
    }

    pub fn winner(&self) -> Option<&str> {
        match self {
            MatchOutcome::Finished { winner_id } => Some(winner_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    pub home: String,
    pub away: String,
}

impl Participants {
    pub fn contains(&self, team_id: &str) -> bool {
        self.home == team_id || self.away == team_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String, // Short code like "KC"
    pub name: String,
    pub city: String,
    pub conference: String,
    pub division: String,
    pub stadium: String,
}

/// A scheduled match and its current outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchModel {
    pub id: String,
    pub week: u32,
    pub season: u32,
    pub home_team_id: String,
    pub away_team_id: String,
    pub kickoff_at: DateTime<Utc>,
    pub outcome: MatchOutcome,
    pub updated_at: DateTime<Utc>,
}

impl MatchModel {
    pub fn new(
        id: impl Into<String>,
        week: u32,
        season: u32,
        home_team_id: impl Into<String>,
        away_team_id: impl Into<String>,
        kickoff_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            week,
            season,
            home_team_id: home_team_id.into(),
            away_team_id: away_team_id.into(),
            kickoff_at,
            outcome: MatchOutcome::Pending,
            updated_at: Utc::now(),
        }
    }

    pub fn participants(&self) -> Participants {
        Participants {
            home: self.home_team_id.clone(),
            away: self.away_team_id.clone(),
        }
    }
}
