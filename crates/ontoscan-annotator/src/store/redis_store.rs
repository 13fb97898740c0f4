//! Redis-backed cache store.

use async_trait::async_trait;
use ontoscan_common::{OntoscanError, Result};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;

use super::{CacheStore, Hash};

pub struct RedisStore {
    conn: MultiplexedConnection,
}

fn cache_err(e: redis::RedisError) -> OntoscanError {
    OntoscanError::Cache(e.to_string())
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(cache_err)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(cache_err)?;
        info!(url = %url, "Connected to Redis term cache");
        Ok(Self { conn })
    }

    fn conn(&self) -> MultiplexedConnection {
        self.conn.clone()
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn().get(key).await.map_err(cache_err)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn().set::<_, _, ()>(key, value).await.map_err(cache_err)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.conn().exists(key).await.map_err(cache_err)
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        self.conn().hget(key, field).await.map_err(cache_err)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        self.conn().hset::<_, _, _, ()>(key, field, value).await.map_err(cache_err)
    }

    async fn hgetall(&self, key: &str) -> Result<Hash> {
        self.conn().hgetall(key).await.map_err(cache_err)
    }

    /// One pipelined round-trip for all keys.
    async fn hgetall_many(&self, keys: &[String]) -> Result<Vec<Hash>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.hgetall(key);
        }
        let mut conn = self.conn();
        pipe.query_async(&mut conn).await.map_err(cache_err)
    }

    async fn rpush(&self, key: &str, values: &[String]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        self.conn().rpush::<_, _, ()>(key, values).await.map_err(cache_err)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        self.conn().lrange(key, start, stop).await.map_err(cache_err)
    }

    async fn llen(&self, key: &str) -> Result<usize> {
        self.conn().llen(key).await.map_err(cache_err)
    }

    async fn del(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        self.conn().del::<_, ()>(keys).await.map_err(cache_err)
    }

    async fn expire(&self, keys: &[String], seconds: u64) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.expire(key, seconds as i64).ignore();
        }
        let mut conn = self.conn();
        let _: () = pipe.query_async(&mut conn).await.map_err(cache_err)?;
        Ok(())
    }
}
