use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::shared::AppError;

/// Read-side view of the identity store.
///
/// Accounts are owned elsewhere; predictions only need to know whether a user
/// id exists and what to display for it on the leaderboard. An unreachable
/// store is an error, never a "no such user" answer.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, user_id: &str) -> Result<bool, AppError>;

    async fn display_name(&self, user_id: &str) -> Result<Option<String>, AppError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DirectoryError {
    #[error("User {user_id} is already registered as {existing_username}")]
    AlreadyRegistered {
        user_id: String,
        existing_username: String,
    },

    #[error("User id and username must be non-empty")]
    EmptyField,
}

/// In-memory stand-in for the identity store
pub struct InMemoryUserDirectory {
    usernames: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            usernames: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn register_user(
        &self,
        user_id: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<(), DirectoryError> {
        let user_id = user_id.into();
        let username = username.into();
        if user_id.trim().is_empty() || username.trim().is_empty() {
            return Err(DirectoryError::EmptyField);
        }

        let mut usernames = self.usernames.write().await;
        if let Some(existing) = usernames.get(&user_id) {
            warn!(user_id = %user_id, existing = %existing, "User already registered");
            return Err(DirectoryError::AlreadyRegistered {
                user_id,
                existing_username: existing.clone(),
            });
        }

        info!(user_id = %user_id, username = %username, "Registered user");
        usernames.insert(user_id, username);
        Ok(())
    }

    pub async fn user_count(&self) -> usize {
        self.usernames.read().await.len()
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn user_exists(&self, user_id: &str) -> Result<bool, AppError> {
        let exists = self.usernames.read().await.contains_key(user_id);
        debug!(user_id = %user_id, exists, "Checked user existence");
        Ok(exists)
    }

    async fn display_name(&self, user_id: &str) -> Result<Option<String>, AppError> {
        Ok(self.usernames.read().await.get(user_id).cloned())
    }
}
