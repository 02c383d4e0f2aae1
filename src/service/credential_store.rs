use std::sync::Arc;

use tracing::{debug, info};

use crate::db::{InsertOutcome, UserBackend, UserRecord};
use crate::error::AppError;

/// Owns the `users` collection: lookups, registration and credential checks.
///
/// Backend faults are returned to the caller untouched; nothing is retried.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn UserBackend>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn UserBackend>) -> Self {
        Self { backend }
    }

    /// Names of the collections in the backing database.
    pub async fn collection_names(&self) -> Result<Vec<String>, AppError> {
        self.backend.collection_names().await
    }

    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        self.backend.find_by_username(username).await
    }

    /// Reverse lookup on the stored password value.
    pub async fn find_user_by_password(
        &self,
        password: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        self.backend.find_by_password(password).await
    }

    /// Insert a record unless `username` is already taken.
    ///
    /// The existence check and the insert are two separate round trips, so
    /// concurrent registrations of one name can both pass the check. The
    /// MongoDB backend closes that gap with a unique index; its rejection is
    /// reported here as `false` too.
    pub async fn create_user(&self, username: &str, password: &str) -> Result<bool, AppError> {
        if self.find_user_by_username(username).await?.is_some() {
            debug!(%username, "username already registered");
            return Ok(false);
        }

        match self
            .backend
            .insert(UserRecord::new(username, password))
            .await?
        {
            InsertOutcome::Inserted => {
                info!(%username, "user created");
                Ok(true)
            }
            InsertOutcome::Duplicate => {
                debug!(%username, "insert rejected by unique index");
                Ok(false)
            }
        }
    }

    /// Look up a record by username and, independently, a record by password.
    ///
    /// Both halves must be present; they are not required to be the same
    /// record.
    pub async fn verify_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<(UserRecord, UserRecord)>, AppError> {
        let by_username = self.find_user_by_username(username).await?;
        let by_password = self.find_user_by_password(password).await?;
        Ok(by_username.zip(by_password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::db::MemoryUsers;

    /// Backend that loses the check-then-insert race: the name looks free,
    /// then the unique index rejects the insert.
    struct LosesInsertRace;

    #[async_trait]
    impl UserBackend for LosesInsertRace {
        async fn find_by_username(&self, _: &str) -> Result<Option<UserRecord>, AppError> {
            Ok(None)
        }

        async fn find_by_password(&self, _: &str) -> Result<Option<UserRecord>, AppError> {
            Ok(None)
        }

        async fn insert(&self, _: UserRecord) -> Result<InsertOutcome, AppError> {
            Ok(InsertOutcome::Duplicate)
        }

        async fn collection_names(&self) -> Result<Vec<String>, AppError> {
            Ok(Vec::new())
        }
    }

    fn store_with(backend: MemoryUsers) -> (CredentialStore, Arc<MemoryUsers>) {
        let backend = Arc::new(backend);
        (CredentialStore::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn lookups_on_empty_store_are_absent() {
        let (store, _) = store_with(MemoryUsers::new());
        assert_eq!(store.find_user_by_username("alice").await.unwrap(), None);
        assert_eq!(store.find_user_by_password("secret").await.unwrap(), None);
        assert_eq!(store.verify_user("alice", "secret").await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_then_find_returns_stored_password() {
        let (store, _) = store_with(MemoryUsers::new());

        assert!(store.create_user("alice", "secret").await.unwrap());

        let found = store.find_user_by_username("alice").await.unwrap();
        assert_eq!(found, Some(UserRecord::new("alice", "secret")));
    }

    #[tokio::test]
    async fn duplicate_username_is_refused_without_mutation() {
        let (store, backend) = store_with(MemoryUsers::new());

        assert!(store.create_user("alice", "secret").await.unwrap());
        assert!(!store.create_user("alice", "other").await.unwrap());

        assert_eq!(backend.record_count().await, 1);
        let found = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.password, "secret");
        assert_eq!(store.find_user_by_password("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn verify_requires_both_lookups() {
        let (store, _) = store_with(MemoryUsers::new());
        store.create_user("alice", "secret").await.unwrap();

        let pair = store.verify_user("alice", "secret").await.unwrap();
        assert_eq!(
            pair,
            Some((
                UserRecord::new("alice", "secret"),
                UserRecord::new("alice", "secret")
            ))
        );
        assert_eq!(store.verify_user("alice", "wrong").await.unwrap(), None);
        assert_eq!(store.verify_user("nobody", "secret").await.unwrap(), None);
    }

    #[tokio::test]
    async fn verify_accepts_halves_from_different_records() {
        let (store, _) = store_with(MemoryUsers::with_records(vec![
            UserRecord::new("alice", "secret"),
            UserRecord::new("bob", "hunter2"),
        ]));

        let (by_username, by_password) = store
            .verify_user("alice", "hunter2")
            .await
            .unwrap()
            .expect("both lookups match some record");
        assert_eq!(by_username.username, "alice");
        assert_eq!(by_password.username, "bob");
    }

    #[tokio::test]
    async fn first_match_wins_for_shared_passwords() {
        let (store, _) = store_with(MemoryUsers::with_records(vec![
            UserRecord::new("carol", "shared"),
            UserRecord::new("dave", "shared"),
        ]));

        let found = store.find_user_by_password("shared").await.unwrap().unwrap();
        assert_eq!(found.username, "carol");
    }

    #[tokio::test]
    async fn unique_index_rejection_reports_taken() {
        let store = CredentialStore::new(Arc::new(LosesInsertRace));
        assert!(!store.create_user("alice", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn backend_faults_propagate() {
        let (store, _) = store_with(MemoryUsers::offline());

        assert!(matches!(
            store.create_user("alice", "secret").await,
            Err(AppError::Backend(_))
        ));
        assert!(store.verify_user("alice", "secret").await.is_err());
        assert!(store.collection_names().await.is_err());
    }
}
