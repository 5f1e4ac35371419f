use crate::domain::ports::{KeyValueStore, StorageKey};
use crate::error::Result;
use async_trait::async_trait;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temp file in the same directory and are renamed into
/// place, so a crash never leaves a half-written array behind.
#[derive(Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Opens the directory, creating it if missing.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn load(&self, key: StorageKey) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes = bytes.len(), "loaded");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: StorageKey, value: Vec<u8>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.path_for(key);
        let dir = self.dir.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&value)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            debug!(path = %path.display(), bytes = value.len(), "saved");
            Ok(())
        })
        .await
        .map_err(|e| crate::error::AdminError::InternalError(Box::new(e)))?
    }
}
