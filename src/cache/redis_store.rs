// src/cache/redis_store.rs
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::{CacheKey, CacheStore};
use crate::errors::AppError;

/// Shared Redis cache. `ConnectionManager` reconnects on its own and is cheap
/// to clone per command.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(redis_url)?;
        let mut conn = ConnectionManager::new(client).await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        tracing::info!("Connected to Redis cache");
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, AppError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key.to_string()).await?;
        Ok(value)
    }

    async fn set(&self, key: &CacheKey, value: String) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key.to_string(), value).await?;
        Ok(())
    }

    async fn delete(&self, keys: &[CacheKey]) -> Result<(), AppError> {
        if keys.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = keys.iter().map(ToString::to_string).collect();
        let mut conn = self.conn.clone();
        let _: () = conn.del(names).await?;
        Ok(())
    }
}
