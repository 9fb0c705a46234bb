#![allow(dead_code)] // Test utilities may not all be used in every test

use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;

use kickoff::{
    event::{EventBus, EventSubscription},
    leaderboard::{InMemoryRankingSnapshotStore, LeaderboardRefreshSubscriber, LeaderboardService},
    prediction::{InMemoryPredictionStore, PredictionService},
    schedule::{InMemoryMatchOutcomeProvider, MatchModel},
    user::InMemoryUserDirectory,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub store: Arc<InMemoryPredictionStore>,
    pub schedule: Arc<InMemoryMatchOutcomeProvider>,
    pub event_bus: EventBus,
    pub predictions: Arc<PredictionService>,
    pub leaderboard: Arc<LeaderboardService>,
    pub _subscription_handle: Option<JoinHandle<()>>,
}

pub struct TestSetupBuilder {
    matches: Vec<(String, String, String)>,
    users: Vec<(String, String)>,
    live_refresh: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            matches: vec![],
            users: vec![],
            live_refresh: false,
        }
    }

    /// Schedules a match between `home` and `away`
    pub fn with_match(mut self, id: &str, home: &str, away: &str) -> Self {
        self.matches
            .push((id.to_string(), home.to_string(), away.to_string()));
        self
    }

    /// Requires predicting users to be registered, and registers these
    pub fn with_registered_users(mut self, users: Vec<(&str, &str)>) -> Self {
        self.users = users
            .into_iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect();
        self
    }

    /// Keeps the leaderboard refreshed from prediction events
    pub fn with_live_refresh(mut self) -> Self {
        self.live_refresh = true;
        self
    }

    pub async fn build(self) -> TestSetup {
        let store = Arc::new(InMemoryPredictionStore::new());
        let schedule = Arc::new(InMemoryMatchOutcomeProvider::new());
        for (id, home, away) in &self.matches {
            schedule
                .add_match(MatchModel::new(id.as_str(), 1, 2024, home.as_str(), away.as_str(), Utc::now()))
                .await
                .unwrap();
        }

        let event_bus = EventBus::new(64);
        let mut predictions =
            PredictionService::builder(store.clone(), schedule.clone()).with_event_bus(event_bus.clone());
        let mut leaderboard =
            LeaderboardService::builder(store.clone(), Arc::new(InMemoryRankingSnapshotStore::new()));

        if !self.users.is_empty() {
            let directory = Arc::new(InMemoryUserDirectory::new());
            for (id, name) in &self.users {
                directory.register_user(id.as_str(), name.as_str()).await.unwrap();
            }
            predictions = predictions.with_user_directory(directory.clone());
            leaderboard = leaderboard.with_user_directory(directory);
        }

        let predictions = Arc::new(predictions.build());
        let leaderboard = Arc::new(leaderboard.build());

        let subscription_handle = self.live_refresh.then(|| {
            EventSubscription::new(
                Arc::new(LeaderboardRefreshSubscriber::new(leaderboard.clone())),
                event_bus.clone(),
            )
            .start()
        });

        TestSetup {
            store,
            schedule,
            event_bus,
            predictions,
            leaderboard,
            _subscription_handle: subscription_handle,
        }
    }
}
