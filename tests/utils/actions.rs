//! Test action helpers - the calls test scenarios repeat
#![allow(dead_code)] // Test utilities may not all be used in every test

use std::time::Duration;

use kickoff::{
    prediction::{CreatePredictionRequest, Prediction},
    schedule::MatchOutcome,
    AppError,
};

use super::setup::TestSetup;

pub fn finished(winner: &str) -> MatchOutcome {
    MatchOutcome::Finished {
        winner_id: winner.to_string(),
    }
}

/// Places a prediction through the lifecycle service
pub async fn pick(
    setup: &TestSetup,
    user: &str,
    match_id: &str,
    winner: &str,
) -> Result<Prediction, AppError> {
    setup
        .predictions
        .create_prediction(CreatePredictionRequest {
            user_id: user.to_string(),
            match_id: match_id.to_string(),
            predicted_winner_id: winner.to_string(),
        })
        .await
}

/// Waits until the published ranking reaches at least `version`
pub async fn wait_for_version(setup: &TestSetup, version: u64) -> u64 {
    let wait = async {
        loop {
            let current = setup.leaderboard.snapshot().await.unwrap().version;
            if current >= version {
                return current;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(2), wait)
        .await
        .expect("ranking was not republished in time")
}
