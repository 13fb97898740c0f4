//! Blue/green cache instances.
//!
//! Two key prefixes alternate as the live term cache. A singleton pointer
//! key names the current one; rebuilds write into the other and a single
//! `set` flips readers over.

use std::sync::Arc;

use ontoscan_common::settings::CacheConfig;
use ontoscan_common::{OntoscanError, Result};
use tracing::info;

use crate::store::CacheStore;

#[derive(Clone)]
pub struct CacheInstances {
    store: Arc<dyn CacheStore>,
    pointer_key: String,
    prefix: String,
    alt_prefix: String,
}

impl CacheInstances {
    pub fn new(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            pointer_key: config.pointer_key.clone(),
            prefix: config.prefix.clone(),
            alt_prefix: config.alt_prefix.clone(),
        }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Live prefix; initializes the pointer to the primary prefix on first use.
    pub async fn current(&self) -> Result<String> {
        if let Some(current) = self.store.get(&self.pointer_key).await? {
            return Ok(current);
        }
        self.store.set(&self.pointer_key, &self.prefix).await?;
        Ok(self.prefix.clone())
    }

    /// The prefix that is not live.
    pub async fn alternate(&self) -> Result<String> {
        let current = self.current().await?;
        Ok(self.other(&current))
    }

    fn other(&self, instance: &str) -> String {
        if instance == self.alt_prefix {
            self.prefix.clone()
        } else {
            self.alt_prefix.clone()
        }
    }

    /// Point readers at `target`, or at the alternate when `None`.
    /// Returns the new live prefix.
    pub async fn switch(&self, target: Option<&str>) -> Result<String> {
        let previous = self.current().await?;
        let next = match target {
            Some(t) if t == self.prefix || t == self.alt_prefix => t.to_string(),
            Some(t) => {
                return Err(OntoscanError::InvalidArgument(format!(
                    "unknown cache instance {t:?}, expected {:?} or {:?}",
                    self.prefix, self.alt_prefix
                )))
            }
            None => self.other(&previous),
        };
        self.store.set(&self.pointer_key, &next).await?;
        info!("Swapping annotator cache instance from {} to {}", previous, next);
        Ok(next)
    }
}

// ── Key layout ──────────────────────────────────────────────────────────────

pub fn dict_key(instance: &str) -> String {
    format!("{instance}dict")
}

pub fn term_key(instance: &str, fingerprint: u32) -> String {
    format!("{instance}term:{fingerprint}")
}

pub fn index_key(instance: &str) -> String {
    format!("{instance}annotator:keys")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn instances() -> CacheInstances {
        CacheInstances::new(Arc::new(MemoryStore::new()), &CacheConfig::default())
    }

    #[tokio::test]
    async fn test_pointer_initialized_lazily() {
        let inst = instances();
        assert!(!inst.store().exists("current_instance").await.unwrap());
        assert_eq!(inst.current().await.unwrap(), "c1:");
        assert_eq!(inst.alternate().await.unwrap(), "c2:");
        assert!(inst.store().exists("current_instance").await.unwrap());
    }

    #[tokio::test]
    async fn test_switch_round_trip() {
        let inst = instances();
        assert_eq!(inst.switch(None).await.unwrap(), "c2:");
        assert_eq!(inst.current().await.unwrap(), "c2:");
        assert_eq!(inst.alternate().await.unwrap(), "c1:");
        assert_eq!(inst.switch(Some("c1:")).await.unwrap(), "c1:");

        let err = inst.switch(Some("c3:")).await.unwrap_err();
        assert!(matches!(err, OntoscanError::InvalidArgument(_)));
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(dict_key("c1:"), "c1:dict");
        assert_eq!(term_key("c2:", 42), "c2:term:42");
        assert_eq!(index_key("c1:"), "c1:annotator:keys");
    }
}
