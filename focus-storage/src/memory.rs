//! In-memory preference store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{StorageError, StorageResult};
use crate::prefs::PrefsStore;

/// Process-local preference store keyed by string.
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the policy engine wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryPrefsStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryPrefsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given entries.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Returns a raw value without going through the async API.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.read().ok()?.get(key).cloned()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns true if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::Backend("memory store lock poisoned".to_string())
}

#[async_trait]
impl PrefsStore for MemoryPrefsStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(key);
        Ok(())
    }
}
