//! Key/value cache backends holding the term cache.
//!
//! The command set is the Redis subset the annotator needs: strings for the
//! instance pointer, hashes for dictionary and term records, lists for the
//! key index.

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_store;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use ontoscan_common::settings::CacheConfig;
use ontoscan_common::Result;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;

pub type Hash = BTreeMap<String, String>;

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn exists(&self, key: &str) -> Result<bool>;

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>>;
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()>;
    /// Empty map when the key does not exist.
    async fn hgetall(&self, key: &str) -> Result<Hash>;

    /// Fetch many hashes in one round-trip. Results are in `keys` order and
    /// every lookup is issued before any is consumed.
    async fn hgetall_many(&self, keys: &[String]) -> Result<Vec<Hash>> {
        try_join_all(keys.iter().map(|k| self.hgetall(k))).await
    }

    async fn rpush(&self, key: &str, values: &[String]) -> Result<()>;
    /// Inclusive range with Redis index semantics (negative counts from the end).
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>>;
    async fn llen(&self, key: &str) -> Result<usize>;

    async fn del(&self, keys: &[String]) -> Result<()>;
    async fn expire(&self, keys: &[String], seconds: u64) -> Result<()>;
}

/// Redis when `cache.redis_url` is set and the `redis` feature is on,
/// otherwise an in-process store.
pub async fn from_config(config: &CacheConfig) -> Result<Arc<dyn CacheStore>> {
    match &config.redis_url {
        #[cfg(feature = "redis")]
        Some(url) => Ok(Arc::new(RedisStore::connect(url).await?)),
        #[cfg(not(feature = "redis"))]
        Some(_) => Err(ontoscan_common::OntoscanError::Config(
            "cache.redis_url is set but ontoscan was built without the `redis` feature".into(),
        )),
        None => {
            tracing::info!("No cache.redis_url configured, using in-memory term cache");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
