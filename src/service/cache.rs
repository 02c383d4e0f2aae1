use async_trait::async_trait;
use redis::Client;

use crate::error::AppError;

/// Connectivity check against the key-value cache.
#[async_trait]
pub trait CacheProbe: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;
}

/// Redis probe. Opening the client only parses the URL; a connection is
/// acquired per ping, so startup succeeds even when Redis is down.
pub struct RedisProbe {
    client: Client,
}

impl RedisProbe {
    pub fn open(redis_url: &str) -> Result<Self, AppError> {
        Ok(Self {
            client: Client::open(redis_url)?,
        })
    }
}

#[async_trait]
impl CacheProbe for RedisProbe {
    async fn ping(&self) -> Result<(), AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}
