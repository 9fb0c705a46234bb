// Public API - what other modules can use
pub use handlers::{get_leaderboard, get_user_stats, recalculate_leaderboard};
pub use models::{RankedEntry, RankingSnapshot, UserAggregate};
pub use repository::{InMemoryRankingSnapshotStore, RankingSnapshotStore};
pub use service::{LeaderboardService, LeaderboardServiceBuilder};
pub use subscriber::LeaderboardRefreshSubscriber;
pub use types::{
    LeaderboardEntry, LeaderboardQuery, LeaderboardResponse, RecalculateResponse,
    UserStatsResponse,
};

// Internal modules
pub mod aggregate;
mod handlers;
pub mod models;
pub mod ranking;
pub mod repository;
mod service;
mod subscriber;
mod types;
