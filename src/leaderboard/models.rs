use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user counters derived from that user's predictions.
///
/// Never stored on its own: it is always recomputed from predictions.
/// `total_picks` counts pending and settled picks; void picks are tracked
/// separately so that `correct + incorrect + pending == total` holds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAggregate {
    pub user_id: String,
    pub total_picks: u32,
    pub correct_picks: u32,
    pub incorrect_picks: u32,
    pub pending_picks: u32,
    pub void_picks: u32,
    pub points: i64,
    pub percentage: f64,
}

impl UserAggregate {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn resolved_picks(&self) -> u32 {
        self.correct_picks + self.incorrect_picks
    }
}

/// A user's aggregate with its position in the global order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub aggregate: UserAggregate,
}

/// One fully computed ranking, published as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSnapshot {
    pub version: u64,
    pub computed_at: DateTime<Utc>,
    /// Matches with at least one settled correct/incorrect prediction
    pub games_finished: usize,
    pub entries: Vec<RankedEntry>,
}

impl RankingSnapshot {
    /// The snapshot served before the first recalculation
    pub fn empty() -> Self {
        Self {
            version: 0,
            computed_at: Utc::now(),
            games_finished: 0,
            entries: Vec::new(),
        }
    }

    pub fn total_users(&self) -> usize {
        self.entries.len()
    }

    pub fn top(&self, n: usize) -> &[RankedEntry] {
        self.page(n, 0)
    }

    pub fn page(&self, limit: usize, offset: usize) -> &[RankedEntry] {
        let start = offset.min(self.entries.len());
        let end = start.saturating_add(limit).min(self.entries.len());
        &self.entries[start..end]
    }

    pub fn rank_of(&self, user_id: &str) -> Option<RankedEntry> {
        super::ranking::rank_of(self.entries.iter().map(|e| &e.aggregate), user_id)
    }
}
