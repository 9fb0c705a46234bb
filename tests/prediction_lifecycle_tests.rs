mod utils;

use std::sync::Arc;

use kickoff::{
    prediction::{CreatePredictionRequest, PredictionStatus},
    schedule::{resolve_pending_matches, MatchOutcome, MatchOutcomeProvider},
    AppError,
};
use utils::{finished, pick, TestSetupBuilder};

#[tokio::test]
async fn concurrent_creations_for_same_pair_admit_exactly_one() {
    let setup = TestSetupBuilder::new().with_match("m1", "H", "V").build().await;
    let predictions = setup.predictions.clone();

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let predictions = Arc::clone(&predictions);
            let winner = if i % 2 == 0 { "H" } else { "V" };
            tokio::spawn(async move {
                predictions
                    .create_prediction(CreatePredictionRequest {
                        user_id: "alice".to_string(),
                        match_id: "m1".to_string(),
                        predicted_winner_id: winner.to_string(),
                    })
                    .await
            })
        })
        .collect();

    let mut created = 0;
    let mut duplicates = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::AlreadyExists(_)) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(duplicates, 31);
    assert_eq!(setup.store.len().await, 1);
}

#[tokio::test]
async fn resolving_twice_matches_resolving_once() {
    let setup = TestSetupBuilder::new().with_match("m1", "H", "V").build().await;
    for (user, winner) in [("a", "H"), ("b", "V"), ("c", "H")] {
        pick(&setup, user, "m1", winner).await.unwrap();
    }

    setup
        .predictions
        .transition_on_outcome("m1", &finished("H"))
        .await
        .unwrap();
    let once = setup.predictions.list_by_match("m1").await.unwrap().predictions;

    let replay = setup
        .predictions
        .transition_on_outcome("m1", &finished("H"))
        .await
        .unwrap();
    let twice = setup.predictions.list_by_match("m1").await.unwrap().predictions;

    assert_eq!(replay.resolved, 0);
    assert_eq!(once, twice);
}

#[tokio::test]
async fn concurrent_resolution_settles_each_prediction_once() {
    let setup = TestSetupBuilder::new().with_match("m1", "H", "V").build().await;
    for i in 0..20 {
        let winner = if i % 3 == 0 { "V" } else { "H" };
        pick(&setup, &format!("user-{i}"), "m1", winner).await.unwrap();
    }

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let predictions = setup.predictions.clone();
            tokio::spawn(async move {
                predictions
                    .transition_on_outcome("m1", &finished("H"))
                    .await
                    .unwrap()
                    .resolved
            })
        })
        .collect();

    let mut total_resolved = 0;
    for task in tasks {
        total_resolved += task.await.unwrap();
    }
    assert_eq!(total_resolved, 20);

    let listing = setup.predictions.list_by_match("m1").await.unwrap();
    assert_eq!(listing.pending, 0);
    for prediction in listing.predictions {
        let expected = if prediction.predicted_winner_id == "H" {
            (PredictionStatus::Correct, 1)
        } else {
            (PredictionStatus::Incorrect, 0)
        };
        assert_eq!((prediction.status, prediction.points), expected);
    }
}

#[tokio::test]
async fn settled_predictions_are_immutable() {
    let setup = TestSetupBuilder::new()
        .with_match("m1", "H", "V")
        .with_match("m2", "X", "Y")
        .build()
        .await;
    let won = pick(&setup, "a", "m1", "H").await.unwrap();
    let voided = pick(&setup, "a", "m2", "X").await.unwrap();

    setup
        .predictions
        .record_outcome("m1", finished("H"))
        .await
        .unwrap();
    setup
        .predictions
        .record_outcome("m2", MatchOutcome::Cancelled)
        .await
        .unwrap();

    for prediction in [&won, &voided] {
        let before = setup.predictions.get_prediction(&prediction.id).await.unwrap();

        for status in [
            PredictionStatus::Correct,
            PredictionStatus::Incorrect,
            PredictionStatus::Void,
        ] {
            assert!(matches!(
                setup.predictions.update_status(&prediction.id, status, None).await,
                Err(AppError::FailedPrecondition(_))
            ));
        }
        assert!(matches!(
            setup.predictions.delete_prediction(&prediction.id).await,
            Err(AppError::FailedPrecondition(_))
        ));

        // A conflicting outcome is refused and changes nothing
        let _ = setup
            .predictions
            .record_outcome(&before.match_id, MatchOutcome::Postponed)
            .await;

        let after = setup.predictions.get_prediction(&prediction.id).await.unwrap();
        assert_eq!(before, after);
    }
}

#[tokio::test]
async fn poll_resolution_picks_up_recorded_outcomes() {
    let setup = TestSetupBuilder::new()
        .with_match("m1", "H", "V")
        .with_match("m2", "X", "Y")
        .build()
        .await;
    pick(&setup, "a", "m1", "H").await.unwrap();
    pick(&setup, "a", "m2", "Y").await.unwrap();

    // The outcome lands in the schedule without going through the lifecycle
    setup
        .schedule
        .record_outcome("m2", finished("Y"))
        .await
        .unwrap();

    let resolved = resolve_pending_matches(&setup.predictions, 2).await.unwrap();
    assert_eq!(resolved, 1);
    assert_eq!(setup.predictions.pending_match_ids().await.unwrap(), vec!["m1"]);

    let listing = setup.predictions.list_by_user("a").await.unwrap();
    assert_eq!(listing.correct_picks, 1);
    assert_eq!(listing.pending_picks, 1);
}

#[tokio::test]
async fn withdrawn_prediction_frees_the_pair() {
    let setup = TestSetupBuilder::new().with_match("m1", "H", "V").build().await;

    let first = pick(&setup, "a", "m1", "H").await.unwrap();
    setup.predictions.delete_prediction(&first.id).await.unwrap();

    let second = pick(&setup, "a", "m1", "V").await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(setup.store.len().await, 1);
}

#[tokio::test]
async fn registered_users_are_required_when_directory_is_configured() {
    let setup = TestSetupBuilder::new()
        .with_match("m1", "H", "V")
        .with_registered_users(vec![("u-1", "alice")])
        .build()
        .await;

    pick(&setup, "u-1", "m1", "H").await.unwrap();
    assert!(matches!(
        pick(&setup, "u-404", "m1", "H").await,
        Err(AppError::NotFound(_))
    ));
}
