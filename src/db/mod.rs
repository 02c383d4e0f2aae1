//! Database module: user record storage backends.
//!
//! Layout:
//! - `models.rs`: the stored record and insert outcome
//! - `mongo.rs`: MongoDB-backed `users` collection
//! - `memory.rs`: in-process backend with the same lookup semantics

pub mod memory;
pub mod models;
pub mod mongo;

pub use memory::MemoryUsers;
pub use models::{InsertOutcome, UserRecord};
pub use mongo::MongoUsers;

use async_trait::async_trait;

use crate::error::AppError;

/// Name of the collection holding user records.
pub const USERS_COLLECTION: &str = "users";

/// Storage seam beneath the credential store.
///
/// Lookups return the first exact match or `None`; absence is not an error.
#[async_trait]
pub trait UserBackend: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError>;

    async fn find_by_password(&self, password: &str) -> Result<Option<UserRecord>, AppError>;

    async fn insert(&self, record: UserRecord) -> Result<InsertOutcome, AppError>;

    /// Names of the collections in the backing database.
    async fn collection_names(&self) -> Result<Vec<String>, AppError>;
}
