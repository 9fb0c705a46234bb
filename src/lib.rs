// Library crate for the prediction and leaderboard server
// This file exposes the public API for the binary and integration tests

pub mod config;
pub mod event;
pub mod leaderboard;
pub mod prediction;
pub mod router;
pub mod schedule;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use config::{AppConfig, LeaderboardLimits};
pub use event::{EventBus, EventSubscription, PredictionEvent};
pub use leaderboard::{
    InMemoryRankingSnapshotStore, LeaderboardRefreshSubscriber, LeaderboardService,
    RankedEntry, RankingSnapshot, UserAggregate,
};
pub use prediction::{
    CreatePredictionRequest, InMemoryPredictionStore, PostgresPredictionStore, Prediction,
    PredictionService, PredictionStatus, PredictionStore,
};
pub use router::build_router;
pub use schedule::{InMemoryMatchOutcomeProvider, MatchModel, MatchOutcome, MatchOutcomeProvider};
pub use shared::{AppError, AppState};
pub use user::{InMemoryUserDirectory, UserDirectory};
