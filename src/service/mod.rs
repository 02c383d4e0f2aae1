pub mod cache;
pub mod credential_store;

pub use cache::{CacheProbe, RedisProbe};
pub use credential_store::CredentialStore;
