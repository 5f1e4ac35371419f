use crate::domain::ports::{KeyValueStore, StorageKey};
use crate::error::Result;
use async_trait::async_trait;
use rocksdb::{DB, Options};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A persistent store implementation using RocksDB.
///
/// Each entity array lives under its storage key string in the default column
/// family.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DB::open(&opts, path)?;
        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl KeyValueStore for RocksDBStore {
    async fn load(&self, key: StorageKey) -> Result<Option<Vec<u8>>> {
        debug!(key = %key, "rocksdb load");
        Ok(self.db.get(key.as_str().as_bytes())?)
    }

    async fn save(&self, key: StorageKey, value: Vec<u8>) -> Result<()> {
        debug!(key = %key, bytes = value.len(), "rocksdb save");
        self.db.put(key.as_str().as_bytes(), value)?;
        Ok(())
    }
}
