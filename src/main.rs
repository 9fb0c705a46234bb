use std::error::Error;
use std::sync::Arc;

use kickoff::{
    build_router,
    leaderboard::{InMemoryRankingSnapshotStore, LeaderboardRefreshSubscriber, LeaderboardService},
    prediction::{InMemoryPredictionStore, PostgresPredictionStore, PredictionService, PredictionStore},
    schedule::{start_resolution_task, InMemoryMatchOutcomeProvider, ResolutionConfig},
    user::InMemoryUserDirectory,
    AppConfig, AppState, EventBus, EventSubscription, MatchOutcomeProvider, UserDirectory,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_USERS: [(&str, &str); 3] = [
    ("user-1", "gridiron_guru"),
    ("user-2", "blitz_master"),
    ("user-3", "end_zone_oracle"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kickoff=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    info!(addr = %config.socket_addr(), "Starting prediction server");

    let store: Arc<dyn PredictionStore> = match &config.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url).await?;
            let store = PostgresPredictionStore::new(pool);
            store.ensure_schema().await?;
            info!("Using PostgreSQL prediction store");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set, predictions are kept in memory");
            Arc::new(InMemoryPredictionStore::new())
        }
    };

    let schedule: Arc<dyn MatchOutcomeProvider> = if config.seed_demo_data {
        Arc::new(InMemoryMatchOutcomeProvider::with_seed_schedule())
    } else {
        Arc::new(InMemoryMatchOutcomeProvider::new())
    };

    let directory = Arc::new(InMemoryUserDirectory::new());
    if config.seed_demo_data {
        for (user_id, username) in DEMO_USERS {
            directory.register_user(user_id, username).await?;
        }
        info!(users = directory.user_count().await, "Seeded demo users");
    }
    let users: Arc<dyn UserDirectory> = directory;

    let event_bus = EventBus::default();
    let mut predictions =
        PredictionService::builder(store.clone(), schedule.clone()).with_event_bus(event_bus.clone());
    if config.require_registered_users {
        predictions = predictions.with_user_directory(users.clone());
    }
    let prediction_service = Arc::new(predictions.build());

    let leaderboard_service = Arc::new(
        LeaderboardService::builder(store, Arc::new(InMemoryRankingSnapshotStore::new()))
            .with_user_directory(users)
            .build(),
    );

    // Subscribe before the first recalculation so no change slips between them
    EventSubscription::new(
        Arc::new(LeaderboardRefreshSubscriber::new(leaderboard_service.clone())),
        event_bus,
    )
    .start();
    leaderboard_service.recalculate().await?;

    if let Some(poll_interval) = config.outcome_poll_interval {
        tokio::spawn(start_resolution_task(
            prediction_service.clone(),
            ResolutionConfig {
                poll_interval,
                ..ResolutionConfig::default()
            },
        ));
    }

    let app_state = AppState::new(
        prediction_service,
        leaderboard_service,
        schedule,
        config.leaderboard_limits,
    );
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    info!("Server running on http://{}", config.socket_addr());
    axum::serve(listener, app).await?;

    Ok(())
}
