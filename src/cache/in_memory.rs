// src/cache/in_memory.rs
use async_trait::async_trait;
use moka::future::Cache;

use super::{CacheKey, CacheStore};
use crate::errors::AppError;

/// In-process cache used when no Redis URL is configured. Entries have no
/// TTL; moka only evicts once `capacity` entries are held.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<String, String>,
}

impl MemoryCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(&key.to_string()).await)
    }

    async fn set(&self, key: &CacheKey, value: String) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), value).await;
        Ok(())
    }

    async fn delete(&self, keys: &[CacheKey]) -> Result<(), AppError> {
        for key in keys {
            self.entries.invalidate(&key.to_string()).await;
        }
        Ok(())
    }
}
