use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::models::{Prediction, PredictionStatus};
use crate::shared::AppError;

/// Result of attempting to store a new prediction
#[derive(Debug, Clone, PartialEq)]
pub enum InsertResult {
    Inserted(Prediction),
    /// A prediction for the same (user, match) pair is already stored
    AlreadyExists { existing_id: String },
}

/// Result of a compare-and-set status change
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionResult {
    /// Status matched the expectation and the new status was written
    Applied(Prediction),
    /// Status no longer matched; the record is returned untouched
    StatusMismatch(Prediction),
    NotFound,
}

/// Result of attempting to withdraw a prediction
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteResult {
    Deleted(Prediction),
    NotPending(Prediction),
    NotFound,
}

/// Durable keyed collection of predictions.
///
/// Every mutating method is a single atomic step against the store: the
/// uniqueness check and the insert happen together, and status changes are
/// conditional on the status the caller observed.
#[async_trait]
pub trait PredictionStore: Send + Sync {
    async fn insert_if_absent(&self, prediction: &Prediction) -> Result<InsertResult, AppError>;

    async fn get(&self, prediction_id: &str) -> Result<Option<Prediction>, AppError>;

    /// Moves a prediction from `expected` to `next` only if it is still in `expected`
    async fn transition(
        &self,
        prediction_id: &str,
        expected: PredictionStatus,
        next: PredictionStatus,
        points: i32,
    ) -> Result<TransitionResult, AppError>;

    /// Removes a prediction only if it is still pending
    async fn delete_if_pending(&self, prediction_id: &str) -> Result<DeleteResult, AppError>;

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Prediction>, AppError>;

    async fn list_by_match(&self, match_id: &str) -> Result<Vec<Prediction>, AppError>;

    async fn list_all(&self) -> Result<Vec<Prediction>, AppError>;

    /// Distinct match ids that still have at least one pending prediction
    async fn pending_match_ids(&self) -> Result<Vec<String>, AppError>;
}

#[derive(Debug, Default)]
struct PredictionTable {
    predictions: HashMap<String, Prediction>,
    // (user_id, match_id) -> prediction id
    by_pair: HashMap<(String, String), String>,
}

impl PredictionTable {
    fn sorted(mut predictions: Vec<Prediction>) -> Vec<Prediction> {
        predictions.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        predictions
    }

    fn collect<F>(&self, filter: F) -> Vec<Prediction>
    where
        F: Fn(&Prediction) -> bool,
    {
        Self::sorted(
            self.predictions
                .values()
                .filter(|p| filter(p))
                .cloned()
                .collect(),
        )
    }
}

/// In-memory implementation of PredictionStore for development and testing
#[derive(Debug, Default)]
pub struct InMemoryPredictionStore {
    table: RwLock<PredictionTable>,
}

impl InMemoryPredictionStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(PredictionTable::default()),
        }
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.predictions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PredictionStore for InMemoryPredictionStore {
    #[instrument(skip(self, prediction), fields(prediction_id = %prediction.id))]
    async fn insert_if_absent(&self, prediction: &Prediction) -> Result<InsertResult, AppError> {
        let mut table = self.table.write().await;
        let key = (prediction.user_id.clone(), prediction.match_id.clone());

        if let Some(existing_id) = table.by_pair.get(&key) {
            debug!(existing_id = %existing_id, "Prediction already exists for pair");
            return Ok(InsertResult::AlreadyExists {
                existing_id: existing_id.clone(),
            });
        }
        if table.predictions.contains_key(&prediction.id) {
            warn!("Prediction id collision");
            return Err(AppError::DatabaseError(
                "Prediction id already exists".to_string(),
            ));
        }

        table.by_pair.insert(key, prediction.id.clone());
        table
            .predictions
            .insert(prediction.id.clone(), prediction.clone());

        debug!("Prediction stored in memory");
        Ok(InsertResult::Inserted(prediction.clone()))
    }

    async fn get(&self, prediction_id: &str) -> Result<Option<Prediction>, AppError> {
        let table = self.table.read().await;
        Ok(table.predictions.get(prediction_id).cloned())
    }

    #[instrument(skip(self))]
    async fn transition(
        &self,
        prediction_id: &str,
        expected: PredictionStatus,
        next: PredictionStatus,
        points: i32,
    ) -> Result<TransitionResult, AppError> {
        let mut table = self.table.write().await;
        let Some(prediction) = table.predictions.get_mut(prediction_id) else {
            return Ok(TransitionResult::NotFound);
        };

        if prediction.status != expected {
            debug!(current = %prediction.status, "Status changed underneath transition");
            return Ok(TransitionResult::StatusMismatch(prediction.clone()));
        }

        prediction.status = next;
        prediction.points = points;
        prediction.updated_at = Utc::now();

        Ok(TransitionResult::Applied(prediction.clone()))
    }

    #[instrument(skip(self))]
    async fn delete_if_pending(&self, prediction_id: &str) -> Result<DeleteResult, AppError> {
        let mut table = self.table.write().await;
        let Some(prediction) = table.predictions.get(prediction_id) else {
            return Ok(DeleteResult::NotFound);
        };
        if !prediction.is_pending() {
            return Ok(DeleteResult::NotPending(prediction.clone()));
        }

        let removed = table.predictions.remove(prediction_id);
        match removed {
            Some(prediction) => {
                table
                    .by_pair
                    .remove(&(prediction.user_id.clone(), prediction.match_id.clone()));
                Ok(DeleteResult::Deleted(prediction))
            }
            None => Ok(DeleteResult::NotFound),
        }
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Prediction>, AppError> {
        let table = self.table.read().await;
        Ok(table.collect(|p| p.user_id == user_id))
    }

    async fn list_by_match(&self, match_id: &str) -> Result<Vec<Prediction>, AppError> {
        let table = self.table.read().await;
        Ok(table.collect(|p| p.match_id == match_id))
    }

    async fn list_all(&self) -> Result<Vec<Prediction>, AppError> {
        let table = self.table.read().await;
        Ok(table.collect(|_| true))
    }

    async fn pending_match_ids(&self) -> Result<Vec<String>, AppError> {
        let table = self.table.read().await;
        let ids: BTreeSet<String> = table
            .predictions
            .values()
            .filter(|p| p.is_pending())
            .map(|p| p.match_id.clone())
            .collect();
        Ok(ids.into_iter().collect())
    }
}

/// Database row for the predictions table
#[derive(Debug, FromRow)]
struct PredictionRow {
    id: String,
    user_id: String,
    match_id: String,
    predicted_winner_id: String,
    status: String,
    points: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PredictionRow> for Prediction {
    type Error = AppError;

    fn try_from(row: PredictionRow) -> Result<Self, Self::Error> {
        let status = PredictionStatus::from_str(&row.status).map_err(|_| {
            AppError::DatabaseError(format!(
                "prediction {} has unknown status {}",
                row.id, row.status
            ))
        })?;

        Ok(Prediction {
            id: row.id,
            user_id: row.user_id,
            match_id: row.match_id,
            predicted_winner_id: row.predicted_winner_id,
            status,
            points: row.points,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, user_id, match_id, predicted_winner_id, status, points, created_at, updated_at FROM predictions";

/// PostgreSQL implementation of the prediction store.
///
/// Uniqueness of (user_id, match_id) is enforced by a unique constraint so
/// that concurrent inserts from several service instances stay exclusive.
pub struct PostgresPredictionStore {
    pool: PgPool,
}

impl PostgresPredictionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the predictions table and its indexes if they do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        let statements = [
            "CREATE TABLE IF NOT EXISTS predictions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                match_id TEXT NOT NULL,
                predicted_winner_id TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                points INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                CONSTRAINT predictions_user_match_key UNIQUE (user_id, match_id)
            )",
            "CREATE INDEX IF NOT EXISTS predictions_user_id_idx ON predictions (user_id)",
            "CREATE INDEX IF NOT EXISTS predictions_match_id_idx ON predictions (match_id)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;
        }

        info!("Predictions schema ready");
        Ok(())
    }

    async fn fetch_many(&self, sql: String, bind: Option<&str>) -> Result<Vec<Prediction>, AppError> {
        let query = sqlx::query_as::<_, PredictionRow>(&sql);
        let query = match bind {
            Some(value) => query.bind(value),
            None => query,
        };

        query
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(Prediction::try_from)
            .collect()
    }
}

fn db_error(e: sqlx::Error) -> AppError {
    warn!(error = %e, "Prediction store query failed");
    AppError::DatabaseError(e.to_string())
}

#[async_trait]
impl PredictionStore for PostgresPredictionStore {
    #[instrument(skip(self, prediction), fields(prediction_id = %prediction.id))]
    async fn insert_if_absent(&self, prediction: &Prediction) -> Result<InsertResult, AppError> {
        let result = sqlx::query(
            "INSERT INTO predictions (id, user_id, match_id, predicted_winner_id, status, points, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (user_id, match_id) DO NOTHING",
        )
        .bind(&prediction.id)
        .bind(&prediction.user_id)
        .bind(&prediction.match_id)
        .bind(&prediction.predicted_winner_id)
        .bind(prediction.status.as_ref())
        .bind(prediction.points)
        .bind(prediction.created_at)
        .bind(prediction.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 1 {
            debug!("Prediction stored in database");
            return Ok(InsertResult::Inserted(prediction.clone()));
        }

        let existing_id: Option<String> =
            sqlx::query_scalar("SELECT id FROM predictions WHERE user_id = $1 AND match_id = $2")
                .bind(&prediction.user_id)
                .bind(&prediction.match_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        match existing_id {
            Some(existing_id) => Ok(InsertResult::AlreadyExists { existing_id }),
            // The conflicting row was withdrawn between the two statements
            None => Err(AppError::DatabaseError(
                "insert conflicted with a prediction that no longer exists".to_string(),
            )),
        }
    }

    async fn get(&self, prediction_id: &str) -> Result<Option<Prediction>, AppError> {
        let row = sqlx::query_as::<_, PredictionRow>(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(prediction_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(Prediction::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn transition(
        &self,
        prediction_id: &str,
        expected: PredictionStatus,
        next: PredictionStatus,
        points: i32,
    ) -> Result<TransitionResult, AppError> {
        let row = sqlx::query_as::<_, PredictionRow>(
            "UPDATE predictions SET status = $1, points = $2, updated_at = $3
             WHERE id = $4 AND status = $5
             RETURNING id, user_id, match_id, predicted_winner_id, status, points, created_at, updated_at",
        )
        .bind(next.as_ref())
        .bind(points)
        .bind(Utc::now())
        .bind(prediction_id)
        .bind(expected.as_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        if let Some(row) = row {
            return Ok(TransitionResult::Applied(Prediction::try_from(row)?));
        }

        Ok(match self.get(prediction_id).await? {
            Some(current) => TransitionResult::StatusMismatch(current),
            None => TransitionResult::NotFound,
        })
    }

    #[instrument(skip(self))]
    async fn delete_if_pending(&self, prediction_id: &str) -> Result<DeleteResult, AppError> {
        let row = sqlx::query_as::<_, PredictionRow>(
            "DELETE FROM predictions WHERE id = $1 AND status = 'pending'
             RETURNING id, user_id, match_id, predicted_winner_id, status, points, created_at, updated_at",
        )
        .bind(prediction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        if let Some(row) = row {
            return Ok(DeleteResult::Deleted(Prediction::try_from(row)?));
        }

        Ok(match self.get(prediction_id).await? {
            Some(current) => DeleteResult::NotPending(current),
            None => DeleteResult::NotFound,
        })
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Prediction>, AppError> {
        self.fetch_many(
            format!("{} WHERE user_id = $1 ORDER BY created_at, id", SELECT_COLUMNS),
            Some(user_id),
        )
        .await
    }

    async fn list_by_match(&self, match_id: &str) -> Result<Vec<Prediction>, AppError> {
        self.fetch_many(
            format!("{} WHERE match_id = $1 ORDER BY created_at, id", SELECT_COLUMNS),
            Some(match_id),
        )
        .await
    }

    async fn list_all(&self) -> Result<Vec<Prediction>, AppError> {
        // One statement reads one consistent snapshot
        self.fetch_many(format!("{} ORDER BY created_at, id", SELECT_COLUMNS), None)
            .await
    }

    async fn pending_match_ids(&self) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar(
            "SELECT DISTINCT match_id FROM predictions WHERE status = 'pending' ORDER BY match_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn pick(user: &str, match_id: &str, winner: &str) -> Prediction {
        Prediction::new(user.to_string(), match_id.to_string(), winner.to_string())
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = InMemoryPredictionStore::new();
        let prediction = pick("alice", "1", "KC");

        let result = store.insert_if_absent(&prediction).await.unwrap();
        assert_eq!(result, InsertResult::Inserted(prediction.clone()));

        let stored = store.get(&prediction.id).await.unwrap().unwrap();
        assert_eq!(stored, prediction);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_insert_for_pair_reports_existing() {
        let store = InMemoryPredictionStore::new();
        let first = pick("alice", "1", "KC");
        store.insert_if_absent(&first).await.unwrap();

        let result = store.insert_if_absent(&pick("alice", "1", "SF")).await.unwrap();
        assert_eq!(
            result,
            InsertResult::AlreadyExists {
                existing_id: first.id.clone()
            }
        );
        assert_eq!(store.len().await, 1);

        // Same user, other match is fine
        let other = store.insert_if_absent(&pick("alice", "2", "BUF")).await.unwrap();
        assert!(matches!(other, InsertResult::Inserted(_)));
    }

    #[tokio::test]
    async fn concurrent_inserts_for_same_pair_admit_exactly_one() {
        let store = Arc::new(InMemoryPredictionStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let winner = if i % 2 == 0 { "KC" } else { "SF" };
                    store.insert_if_absent(&pick("alice", "1", winner)).await
                })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            if let InsertResult::Inserted(_) = handle.await.unwrap().unwrap() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn transition_is_conditional_on_expected_status() {
        let store = InMemoryPredictionStore::new();
        let prediction = pick("alice", "1", "KC");
        store.insert_if_absent(&prediction).await.unwrap();

        let applied = store
            .transition(
                &prediction.id,
                PredictionStatus::Pending,
                PredictionStatus::Correct,
                1,
            )
            .await
            .unwrap();
        let TransitionResult::Applied(updated) = applied else {
            panic!("expected transition to apply");
        };
        assert_eq!(updated.status, PredictionStatus::Correct);
        assert_eq!(updated.points, 1);
        assert!(updated.updated_at >= prediction.updated_at);

        let replay = store
            .transition(
                &prediction.id,
                PredictionStatus::Pending,
                PredictionStatus::Incorrect,
                0,
            )
            .await
            .unwrap();
        assert_eq!(replay, TransitionResult::StatusMismatch(updated));

        let missing = store
            .transition("nope", PredictionStatus::Pending, PredictionStatus::Void, 0)
            .await
            .unwrap();
        assert_eq!(missing, TransitionResult::NotFound);
    }

    #[tokio::test]
    async fn delete_only_removes_pending_and_frees_pair() {
        let store = InMemoryPredictionStore::new();
        let pending = pick("alice", "1", "KC");
        let settled = pick("bob", "1", "SF");
        store.insert_if_absent(&pending).await.unwrap();
        store.insert_if_absent(&settled).await.unwrap();
        store
            .transition(
                &settled.id,
                PredictionStatus::Pending,
                PredictionStatus::Incorrect,
                0,
            )
            .await
            .unwrap();

        assert!(matches!(
            store.delete_if_pending(&settled.id).await.unwrap(),
            DeleteResult::NotPending(_)
        ));
        assert!(matches!(
            store.delete_if_pending(&pending.id).await.unwrap(),
            DeleteResult::Deleted(_)
        ));
        assert_eq!(
            store.delete_if_pending(&pending.id).await.unwrap(),
            DeleteResult::NotFound
        );

        // Withdrawn pick can be placed again
        let again = store.insert_if_absent(&pick("alice", "1", "SF")).await.unwrap();
        assert!(matches!(again, InsertResult::Inserted(_)));
    }

    #[tokio::test]
    async fn listings_filter_and_pending_matches() {
        let store = InMemoryPredictionStore::new();
        let a1 = pick("alice", "1", "KC");
        let a2 = pick("alice", "2", "BUF");
        let b1 = pick("bob", "1", "SF");
        for p in [&a1, &a2, &b1] {
            store.insert_if_absent(p).await.unwrap();
        }
        store
            .transition(&a2.id, PredictionStatus::Pending, PredictionStatus::Void, 0)
            .await
            .unwrap();

        assert_eq!(store.list_by_user("alice").await.unwrap().len(), 2);
        assert_eq!(store.list_by_match("1").await.unwrap().len(), 2);
        assert_eq!(store.list_all().await.unwrap().len(), 3);
        assert_eq!(store.pending_match_ids().await.unwrap(), vec!["1".to_string()]);
        assert!(store.list_by_user("carol").await.unwrap().is_empty());
    }

    /// Runs against a real database when `TEST_DATABASE_URL` is set and is
    /// skipped otherwise. Every test uses fresh user and match ids, so they
    /// share one schema without interfering.
    mod postgres {
        use super::*;
        use uuid::Uuid;

        async fn store() -> Option<PostgresPredictionStore> {
            let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
                eprintln!("TEST_DATABASE_URL not set, skipping PostgreSQL store test");
                return None;
            };
            let pool = PgPool::connect(&url).await.unwrap();
            let store = PostgresPredictionStore::new(pool);
            store.ensure_schema().await.unwrap();
            Some(store)
        }

        fn unique(prefix: &str) -> String {
            format!("{}-{}", prefix, Uuid::new_v4())
        }

        #[tokio::test]
        async fn pair_uniqueness_is_enforced_by_the_table() {
            let Some(store) = store().await else { return };
            let (user, match_id) = (unique("user"), unique("match"));

            let first = pick(&user, &match_id, "KC");
            assert!(matches!(
                store.insert_if_absent(&first).await.unwrap(),
                InsertResult::Inserted(_)
            ));

            let second = pick(&user, &match_id, "SF");
            assert_eq!(
                store.insert_if_absent(&second).await.unwrap(),
                InsertResult::AlreadyExists {
                    existing_id: first.id.clone()
                }
            );

            let stored = store.list_by_match(&match_id).await.unwrap();
            assert_eq!(stored.len(), 1);
            assert_eq!(stored[0].predicted_winner_id, "KC");
        }

        #[tokio::test]
        async fn transition_only_applies_from_expected_status() {
            let Some(store) = store().await else { return };
            let prediction = pick(&unique("user"), &unique("match"), "KC");
            store.insert_if_absent(&prediction).await.unwrap();

            let applied = store
                .transition(
                    &prediction.id,
                    PredictionStatus::Pending,
                    PredictionStatus::Correct,
                    1,
                )
                .await
                .unwrap();
            let TransitionResult::Applied(updated) = applied else {
                panic!("expected the pending prediction to settle, got {applied:?}");
            };
            assert_eq!((updated.status, updated.points), (PredictionStatus::Correct, 1));

            let replay = store
                .transition(
                    &prediction.id,
                    PredictionStatus::Pending,
                    PredictionStatus::Incorrect,
                    0,
                )
                .await
                .unwrap();
            assert!(matches!(
                replay,
                TransitionResult::StatusMismatch(ref current) if current.status == PredictionStatus::Correct
            ));
            assert_eq!(
                store
                    .transition("missing", PredictionStatus::Pending, PredictionStatus::Void, 0)
                    .await
                    .unwrap(),
                TransitionResult::NotFound
            );
        }

        #[tokio::test]
        async fn only_pending_predictions_are_deleted() {
            let Some(store) = store().await else { return };
            let match_id = unique("match");
            let kept = pick(&unique("user"), &match_id, "KC");
            let withdrawn = pick(&unique("user"), &match_id, "SF");
            store.insert_if_absent(&kept).await.unwrap();
            store.insert_if_absent(&withdrawn).await.unwrap();
            store
                .transition(&kept.id, PredictionStatus::Pending, PredictionStatus::Void, 0)
                .await
                .unwrap();

            assert!(matches!(
                store.delete_if_pending(&withdrawn.id).await.unwrap(),
                DeleteResult::Deleted(ref p) if p.id == withdrawn.id
            ));
            assert_eq!(
                store.delete_if_pending(&withdrawn.id).await.unwrap(),
                DeleteResult::NotFound
            );
            assert!(matches!(
                store.delete_if_pending(&kept.id).await.unwrap(),
                DeleteResult::NotPending(ref p) if p.status == PredictionStatus::Void
            ));
            assert!(!store
                .pending_match_ids()
                .await
                .unwrap()
                .contains(&match_id));
        }
    }
}
