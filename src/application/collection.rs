use crate::domain::ports::{KeyValueStore, Record};
use crate::error::{AdminError, Result};
use std::marker::PhantomData;
use tracing::debug;

/// Typed view over the JSON array stored under `T::KEY`.
///
/// Every call reads or rewrites the whole array, matching the flat
/// one-array-per-key layout of the store.
pub struct Collection<'a, T: Record> {
    store: &'a dyn KeyValueStore,
    _record: PhantomData<T>,
}

impl<'a, T: Record> Collection<'a, T> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub async fn all(&self) -> Result<Vec<T>> {
        match self.store.load(T::KEY).await? {
            Some(bytes) => {
                let items: Vec<T> = serde_json::from_slice(&bytes)?;
                debug!(key = %T::KEY, count = items.len(), "loaded records");
                Ok(items)
            }
            None => Ok(Vec::new()),
        }
    }

    pub async fn find(&self, id: &str) -> Result<Option<T>> {
        Ok(self.all().await?.into_iter().find(|item| item.id() == id))
    }

    /// Like `find`, but a missing record is an error.
    pub async fn get(&self, id: &str) -> Result<T> {
        self.find(id)
            .await?
            .ok_or_else(|| AdminError::not_found(T::NAME, id))
    }

    pub async fn save_all(&self, items: &[T]) -> Result<()> {
        let bytes = serde_json::to_vec(items)?;
        self.store.save(T::KEY, bytes).await
    }

    /// Replaces the record with the same id, or appends it.
    pub async fn upsert(&self, item: T) -> Result<()> {
        let mut items = self.all().await?;
        match items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        self.save_all(&items).await
    }

    pub async fn extend(&self, new_items: Vec<T>) -> Result<()> {
        if new_items.is_empty() {
            return Ok(());
        }
        let mut items = self.all().await?;
        items.extend(new_items);
        self.save_all(&items).await
    }

    /// Keeps the records for which `keep` returns true and returns the removed ones.
    ///
    /// The array is only rewritten when something was removed.
    pub async fn retain<F>(&self, keep: F) -> Result<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        let (kept, removed): (Vec<T>, Vec<T>) =
            self.all().await?.into_iter().partition(|item| keep(item));
        if !removed.is_empty() {
            self.save_all(&kept).await?;
        }
        Ok(removed)
    }
}
