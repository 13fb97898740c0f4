//! In-process cache store with Redis-like semantics and key expiry.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use ontoscan_common::{OntoscanError, Result};
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::{CacheStore, Hash};

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Hash(Hash),
    List(Vec<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().await.values().filter(|e| e.live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Live keys starting with `prefix`, sorted.
    pub async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(k, e)| k.starts_with(prefix) && e.live(now))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Clone of a live value, expired entries are treated as missing.
    async fn read_value(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.get(key).filter(|e| e.live(now)).map(|e| e.value.clone())
    }
}

fn wrong_type(key: &str, expected: &str) -> OntoscanError {
    OntoscanError::Cache(format!("WRONGTYPE key {key} does not hold a {expected}"))
}

/// Drop the entry if it has expired, so writes start from a clean slot.
fn purge_expired(entries: &mut HashMap<String, Entry>, key: &str) {
    let now = Instant::now();
    if entries.get(key).is_some_and(|e| !e.live(now)) {
        entries.remove(key);
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.read_value(key).await {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(_) => Err(wrong_type(key, "string")),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry { value: Value::Str(value.to_string()), expires_at: None },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.read_value(key).await.is_some())
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        match self.read_value(key).await {
            None => Ok(None),
            Some(Value::Hash(h)) => Ok(h.get(field).cloned()),
            Some(_) => Err(wrong_type(key, "hash")),
        }
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry { value: Value::Hash(Hash::new()), expires_at: None });
        match &mut entry.value {
            Value::Hash(h) => {
                h.insert(field.to_string(), value.to_string());
                Ok(())
            }
            _ => Err(wrong_type(key, "hash")),
        }
    }

    async fn hgetall(&self, key: &str) -> Result<Hash> {
        match self.read_value(key).await {
            None => Ok(Hash::new()),
            Some(Value::Hash(h)) => Ok(h),
            Some(_) => Err(wrong_type(key, "hash")),
        }
    }

    async fn hgetall_many(&self, keys: &[String]) -> Result<Vec<Hash>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        keys.iter()
            .map(|key| match entries.get(key).filter(|e| e.live(now)) {
                None => Ok(Hash::new()),
                Some(Entry { value: Value::Hash(h), .. }) => Ok(h.clone()),
                Some(_) => Err(wrong_type(key, "hash")),
            })
            .collect()
    }

    async fn rpush(&self, key: &str, values: &[String]) -> Result<()> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry { value: Value::List(Vec::new()), expires_at: None });
        match &mut entry.value {
            Value::List(list) => {
                list.extend(values.iter().cloned());
                Ok(())
            }
            _ => Err(wrong_type(key, "list")),
        }
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let list = match self.read_value(key).await {
            None => return Ok(Vec::new()),
            Some(Value::List(list)) => list,
            Some(_) => return Err(wrong_type(key, "list")),
        };

        let len = list.len() as isize;
        let resolve = |i: isize| if i < 0 { len + i } else { i };
        let start = resolve(start).max(0);
        let stop = resolve(stop).min(len - 1);
        if start > stop {
            return Ok(Vec::new());
        }
        Ok(list[start as usize..=stop as usize].to_vec())
    }

    async fn llen(&self, key: &str) -> Result<usize> {
        match self.read_value(key).await {
            None => Ok(0),
            Some(Value::List(list)) => Ok(list.len()),
            Some(_) => Err(wrong_type(key, "list")),
        }
    }

    async fn del(&self, keys: &[String]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }

    async fn expire(&self, keys: &[String], seconds: u64) -> Result<()> {
        let at = Instant::now() + Duration::from_secs(seconds);
        let mut entries = self.entries.write().await;
        for key in keys {
            purge_expired(&mut entries, key);
            if seconds == 0 {
                entries.remove(key);
            } else if let Some(entry) = entries.get_mut(key) {
                entry.expires_at = Some(at);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_strings_and_hashes() {
        let store = MemoryStore::new();
        store.set("current_instance", "c1:").await.unwrap();
        assert_eq!(store.get("current_instance").await.unwrap().as_deref(), Some("c1:"));

        store.hset("c1:term:1", "cls", "{}").await.unwrap();
        assert!(store.exists("c1:term:1").await.unwrap());
        assert_eq!(store.hget("c1:term:1", "cls").await.unwrap().as_deref(), Some("{}"));
        assert!(store.hgetall("missing").await.unwrap().is_empty());

        let err = store.get("c1:term:1").await.unwrap_err();
        assert!(matches!(err, OntoscanError::Cache(_)));
    }

    #[tokio::test]
    async fn test_hgetall_many_keeps_order() {
        let store = MemoryStore::new();
        store.hset("a", "x", "1").await.unwrap();
        store.hset("b", "y", "2").await.unwrap();

        let keys = vec!["b".to_string(), "missing".to_string(), "a".to_string()];
        let hashes = store.hgetall_many(&keys).await.unwrap();
        assert_eq!(hashes.len(), 3);
        assert_eq!(hashes[0].get("y").map(String::as_str), Some("2"));
        assert!(hashes[1].is_empty());
        assert_eq!(hashes[2].get("x").map(String::as_str), Some("1"));
    }

    #[tokio::test]
    async fn test_list_ranges() {
        let store = MemoryStore::new();
        let values: Vec<String> = (0..5).map(|i| format!("k{i}")).collect();
        store.rpush("idx", &values).await.unwrap();

        assert_eq!(store.llen("idx").await.unwrap(), 5);
        assert_eq!(store.lrange("idx", 0, 1).await.unwrap(), vec!["k0", "k1"]);
        assert_eq!(store.lrange("idx", 3, 100).await.unwrap(), vec!["k3", "k4"]);
        assert_eq!(store.lrange("idx", 0, -1).await.unwrap().len(), 5);
        assert!(store.lrange("idx", 7, 9).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry() {
        let store = MemoryStore::new();
        store.hset("c2:dict", "1", "HEART").await.unwrap();
        store.expire(&["c2:dict".to_string()], 60).await.unwrap();
        assert!(store.exists("c2:dict").await.unwrap());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!store.exists("c2:dict").await.unwrap());
        assert!(store.is_empty().await);

        // A write after expiry starts a fresh, persistent key.
        store.hset("c2:dict", "2", "LUNG").await.unwrap();
        tokio::time::advance(Duration::from_secs(120)).await;
        assert_eq!(store.hgetall("c2:dict").await.unwrap().len(), 1);
    }
}
