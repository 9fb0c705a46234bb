use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::models::RankingSnapshot;
use crate::shared::AppError;

/// Holds the currently published ranking.
///
/// Readers get the whole snapshot or nothing: a snapshot is swapped in as a
/// single value and never mutated after publication.
#[async_trait]
pub trait RankingSnapshotStore: Send + Sync {
    /// Publishes `snapshot` unless a snapshot with the same or a newer version is current.
    /// Returns whether the snapshot was published.
    async fn publish(&self, snapshot: RankingSnapshot) -> Result<bool, AppError>;

    async fn current(&self) -> Result<Arc<RankingSnapshot>, AppError>;
}

#[derive(Debug)]
pub struct InMemoryRankingSnapshotStore {
    current: RwLock<Arc<RankingSnapshot>>,
}

impl InMemoryRankingSnapshotStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(RankingSnapshot::empty())),
        }
    }
}

impl Default for InMemoryRankingSnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RankingSnapshotStore for InMemoryRankingSnapshotStore {
    async fn publish(&self, snapshot: RankingSnapshot) -> Result<bool, AppError> {
        let mut current = self.current.write().await;
        if snapshot.version <= current.version {
            warn!(
                current_version = current.version,
                stale_version = snapshot.version,
                "Discarding stale ranking snapshot"
            );
            return Ok(false);
        }

        debug!(
            version = snapshot.version,
            users = snapshot.total_users(),
            "Publishing ranking snapshot"
        );
        *current = Arc::new(snapshot);
        Ok(true)
    }

    async fn current(&self) -> Result<Arc<RankingSnapshot>, AppError> {
        Ok(self.current.read().await.clone())
    }
}
