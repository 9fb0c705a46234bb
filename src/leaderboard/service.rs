use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, instrument};

use super::{
    aggregate::{aggregate_all, compute_user_aggregate, finished_match_count},
    models::{RankedEntry, RankingSnapshot, UserAggregate},
    ranking,
    repository::RankingSnapshotStore,
    types::{LeaderboardEntry, LeaderboardResponse, UserStatsResponse},
};
use crate::prediction::PredictionStore;
use crate::shared::{require_non_empty, AppError};
use crate::user::UserDirectory;

/// Aggregation and ranking over the authoritative prediction set.
///
/// All ranking reads are answered from one published [`RankingSnapshot`]
/// per call, so a page and a single user's rank taken from the same version
/// always agree. [`LeaderboardService::recalculate`] rebuilds the snapshot
/// from scratch and swaps it in.
pub struct LeaderboardService {
    store: Arc<dyn PredictionStore>,
    snapshots: Arc<dyn RankingSnapshotStore>,
    users: Option<Arc<dyn UserDirectory>>,
    recalculation: AsyncMutex<()>,
}

impl LeaderboardService {
    pub fn builder(
        store: Arc<dyn PredictionStore>,
        snapshots: Arc<dyn RankingSnapshotStore>,
    ) -> LeaderboardServiceBuilder {
        LeaderboardServiceBuilder::new(store, snapshots)
    }

    /// Counts a user's predictions by status straight from the store
    #[instrument(skip(self))]
    pub async fn compute_user_aggregate(&self, user_id: &str) -> Result<UserAggregate, AppError> {
        let user_id = require_non_empty("userId", user_id)?;
        let predictions = self.store.list_by_user(&user_id).await?;
        Ok(compute_user_aggregate(&user_id, &predictions))
    }

    /// Rebuilds every aggregate and the global order, then publishes the result.
    ///
    /// Recalculations are serialized; each reads one listing of the store and
    /// produces a snapshot with a strictly larger version than the last one.
    #[instrument(skip(self))]
    pub async fn recalculate(&self) -> Result<Arc<RankingSnapshot>, AppError> {
        let _guard = self.recalculation.lock().await;

        let previous = self.snapshots.current().await?;
        let predictions = self.store.list_all().await?;

        let entries = ranking::rank(aggregate_all(&predictions));
        let snapshot = RankingSnapshot {
            version: previous.version + 1,
            computed_at: Utc::now(),
            games_finished: finished_match_count(&predictions),
            entries,
        };

        let version = snapshot.version;
        let users = snapshot.total_users();
        if !self.snapshots.publish(snapshot).await? {
            // Only this lock publishes, so a newer version means another writer shares the store
            error!(version, "Ranking snapshot was superseded before publication");
            return Err(AppError::Internal(format!(
                "ranking snapshot version {} was superseded",
                version
            )));
        }

        info!(
            version,
            users,
            predictions = predictions.len(),
            "Ranking recalculated"
        );
        self.snapshots.current().await
    }

    pub async fn snapshot(&self) -> Result<Arc<RankingSnapshot>, AppError> {
        self.snapshots.current().await
    }

    /// Slice `[offset, offset + limit)` of the current ranking
    #[instrument(skip(self))]
    pub async fn page(&self, limit: usize, offset: usize) -> Result<LeaderboardResponse, AppError> {
        let snapshot = self.snapshots.current().await?;
        let entries = snapshot.page(limit, offset).to_vec();
        let usernames = self.usernames(&entries).await?;

        debug!(
            version = snapshot.version,
            returned = entries.len(),
            "Serving leaderboard page"
        );

        Ok(LeaderboardResponse {
            leaderboard: entries
                .into_iter()
                .map(|entry| LeaderboardEntry {
                    username: usernames.get(&entry.aggregate.user_id).cloned(),
                    entry,
                })
                .collect(),
            total_users: snapshot.total_users(),
            games_finished: snapshot.games_finished,
            limit,
            offset,
            version: snapshot.version,
            last_updated: snapshot.computed_at,
        })
    }

    pub async fn top(&self, n: usize) -> Result<LeaderboardResponse, AppError> {
        self.page(n, 0).await
    }

    /// A single user's entry in the current ranking
    #[instrument(skip(self))]
    pub async fn rank_of(&self, user_id: &str) -> Result<RankedEntry, AppError> {
        let user_id = require_non_empty("userId", user_id)?;
        let snapshot = self.snapshots.current().await?;
        snapshot
            .rank_of(&user_id)
            .ok_or_else(|| AppError::not_found(format!("user {} is not ranked", user_id)))
    }

    /// Live counters, ranking standing and predictions for one user
    #[instrument(skip(self))]
    pub async fn user_stats(&self, user_id: &str) -> Result<UserStatsResponse, AppError> {
        let user_id = require_non_empty("userId", user_id)?;
        let snapshot = self.snapshots.current().await?;
        let predictions = self.store.list_by_user(&user_id).await?;
        let aggregate = compute_user_aggregate(&user_id, &predictions);
        let standing = snapshot.rank_of(&user_id);

        if predictions.is_empty() && standing.is_none() {
            let known = match &self.users {
                Some(users) => users.user_exists(&user_id).await?,
                None => false,
            };
            if !known {
                return Err(AppError::not_found(format!("user {} has no predictions", user_id)));
            }
        }

        let username = match &self.users {
            Some(users) => users.display_name(&user_id).await?,
            None => None,
        };

        Ok(UserStatsResponse {
            aggregate,
            username,
            standing,
            ranking_version: snapshot.version,
            ranking_updated_at: snapshot.computed_at,
            predictions,
        })
    }

    async fn usernames(
        &self,
        entries: &[RankedEntry],
    ) -> Result<HashMap<String, String>, AppError> {
        let mut names = HashMap::new();
        if let Some(users) = &self.users {
            for entry in entries {
                let user_id = &entry.aggregate.user_id;
                if let Some(name) = users.display_name(user_id).await? {
                    names.insert(user_id.clone(), name);
                }
            }
        }
        Ok(names)
    }
}

pub struct LeaderboardServiceBuilder {
    store: Arc<dyn PredictionStore>,
    snapshots: Arc<dyn RankingSnapshotStore>,
    users: Option<Arc<dyn UserDirectory>>,
}

impl LeaderboardServiceBuilder {
    fn new(store: Arc<dyn PredictionStore>, snapshots: Arc<dyn RankingSnapshotStore>) -> Self {
        Self {
            store,
            snapshots,
            users: None,
        }
    }

    pub fn with_user_directory(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn build(self) -> LeaderboardService {
        LeaderboardService {
            store: self.store,
            snapshots: self.snapshots,
            users: self.users,
            recalculation: AsyncMutex::new(()),
        }
    }
}
