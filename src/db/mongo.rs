use async_trait::async_trait;
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tracing::{debug, info};

use super::{InsertOutcome, USERS_COLLECTION, UserBackend, UserRecord};
use crate::error::AppError;

/// MongoDB server code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoUsers {
    database: Database,
    users: Collection<UserRecord>,
}

impl MongoUsers {
    /// Parse `uri` and select its default database, or `fallback_database`
    /// when the URI names none. The driver connects lazily.
    pub async fn connect(uri: &str, fallback_database: &str) -> Result<Self, AppError> {
        let client = Client::with_uri_str(uri).await?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(fallback_database));
        debug!(database = %database.name(), "selected MongoDB database");
        Ok(Self::new(database))
    }

    pub fn new(database: Database) -> Self {
        let users = database.collection::<UserRecord>(USERS_COLLECTION);
        Self { database, users }
    }

    /// Create the `users` collection if missing, optionally seeding an example
    /// user into the fresh collection, and ensure `username` is unique.
    pub async fn init(&self, seed_example_user: bool) -> Result<(), AppError> {
        let existing = self.database.list_collection_names().await?;
        if !existing.iter().any(|name| name == USERS_COLLECTION) {
            self.database.create_collection(USERS_COLLECTION).await?;
            info!(collection = USERS_COLLECTION, "created collection");

            if seed_example_user {
                self.users
                    .insert_one(UserRecord::new("example", "example_password"))
                    .await?;
                info!("seeded example user");
            }
        }

        let index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users.create_index(index).await?;
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl UserBackend for MongoUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.find_one(doc! { "username": username }).await?)
    }

    async fn find_by_password(&self, password: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.find_one(doc! { "password": password }).await?)
    }

    async fn insert(&self, record: UserRecord) -> Result<InsertOutcome, AppError> {
        match self.users.insert_one(record).await {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) if is_duplicate_key(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn collection_names(&self) -> Result<Vec<String>, AppError> {
        Ok(self.database.list_collection_names().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn falls_back_when_uri_names_no_database() {
        let users = MongoUsers::connect("mongodb://localhost:27017", "Cluster0")
            .await
            .expect("client");
        assert_eq!(users.database.name(), "Cluster0");
        assert_eq!(users.users.name(), USERS_COLLECTION);
    }

    #[tokio::test]
    async fn uri_database_wins_over_fallback() {
        let users = MongoUsers::connect("mongodb://localhost:27017/accounts", "Cluster0")
            .await
            .expect("client");
        assert_eq!(users.database.name(), "accounts");
    }
}
