use crate::domain::ports::{KeyValueStore, StorageKey};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory key/value store.
///
/// Uses `Arc<RwLock<HashMap<StorageKey, Vec<u8>>>>` so clones share the same data.
/// Ideal for testing or throwaway sessions where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<StorageKey, Vec<u8>>>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn load(&self, key: StorageKey) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&key).cloned())
    }

    async fn save(&self, key: StorageKey, value: Vec<u8>) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key, value);
        Ok(())
    }
}
