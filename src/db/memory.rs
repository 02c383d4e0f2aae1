use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{InsertOutcome, USERS_COLLECTION, UserBackend, UserRecord};
use crate::error::AppError;

/// In-process user collection. Lookups scan in insertion order, so the
/// first matching record wins just like `find_one` on an unsorted collection.
#[derive(Default)]
pub struct MemoryUsers {
    records: RwLock<Vec<UserRecord>>,
    offline: bool,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<UserRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            offline: false,
        }
    }

    /// A backend whose every call fails, as if the database were unreachable.
    pub fn offline() -> Self {
        Self {
            records: RwLock::default(),
            offline: true,
        }
    }

    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    fn ensure_online(&self) -> Result<(), AppError> {
        if self.offline {
            return Err(AppError::Backend("user store is unreachable".to_string()));
        }
        Ok(())
    }

    async fn find_first(
        &self,
        matches: impl Fn(&UserRecord) -> bool,
    ) -> Result<Option<UserRecord>, AppError> {
        self.ensure_online()?;
        Ok(self.records.read().await.iter().find(|r| matches(r)).cloned())
    }
}

#[async_trait]
impl UserBackend for MemoryUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        self.find_first(|r| r.username == username).await
    }

    async fn find_by_password(&self, password: &str) -> Result<Option<UserRecord>, AppError> {
        self.find_first(|r| r.password == password).await
    }

    async fn insert(&self, record: UserRecord) -> Result<InsertOutcome, AppError> {
        self.ensure_online()?;
        self.records.write().await.push(record);
        Ok(InsertOutcome::Inserted)
    }

    async fn collection_names(&self) -> Result<Vec<String>, AppError> {
        self.ensure_online()?;
        Ok(vec![USERS_COLLECTION.to_string()])
    }
}
