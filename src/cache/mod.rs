// src/cache/mod.rs

mod in_memory;
mod invalidation;
mod keys;
mod redis_store;

use std::future::Future;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::errors::AppError;

pub use in_memory::MemoryCache;
pub use invalidation::{Invalidation, invalidate_cache};
pub use keys::CacheKey;
pub use redis_store::RedisCache;

/// Key-value store holding JSON text. Values never expire on their own;
/// they live until an invalidation deletes them.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &CacheKey, value: String) -> Result<(), AppError>;

    /// Deletes every key in `keys`. Missing keys are ignored.
    async fn delete(&self, keys: &[CacheKey]) -> Result<(), AppError>;
}

/// Cache-aside read: return the cached value under `key`, or run `load`,
/// store its JSON form and return it. A failing `load` caches nothing.
pub async fn cached<T, F, Fut>(
    cache: &dyn CacheStore,
    key: CacheKey,
    load: F,
) -> Result<T, AppError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    if let Some(raw) = cache.get(&key).await? {
        match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                tracing::info!("Cache HIT for key: {}", key);
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable cached value for key {}: {}", key, e);
            }
        }
    }

    tracing::info!("Cache MISS for key: {}. Loading from store.", key);
    let value = load().await?;
    cache.set(&key, serde_json::to_string(&value)?).await?;
    Ok(value)
}
