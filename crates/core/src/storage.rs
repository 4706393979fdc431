//! Key/value storage seam.
//!
//! Both the persistent session store and the tab-scoped purchase draft
//! storage are string-keyed, string-valued maps. Callers own the key names
//! and the serialization; implementations only move strings.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::PortalResult;

/// Key/value store abstraction.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    async fn get(&self, key: &str) -> PortalResult<Option<String>>;

    /// Insert or overwrite a value.
    async fn set(&self, key: &str, value: &str) -> PortalResult<()>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> PortalResult<()>;

    /// Write several entries together.
    ///
    /// Implementations backed by a transactional store should override this
    /// so that either every entry lands or none does.
    async fn write_all(&self, entries: &[(&str, String)]) -> PortalResult<()> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }

    /// Remove several keys together.
    async fn remove_all(&self, keys: &[&str]) -> PortalResult<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}

/// In-memory store.
///
/// Used as tab-scoped ephemeral storage (one instance per tab lifetime) and
/// as the fake persistent store in tests. Cheap to clone; clones share data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with entries (handy for hydration tests).
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(Mutex::new(map)),
        }
    }

    /// Synchronous peek, for assertions.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.lock().clone()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> PortalResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortalResult<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortalResult<()> {
        self.lock().remove(key);
        Ok(())
    }

    async fn write_all(&self, entries: &[(&str, String)]) -> PortalResult<()> {
        let mut map = self.lock();
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove_all(&self, keys: &[&str]) -> PortalResult<()> {
        let mut map = self.lock();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}
