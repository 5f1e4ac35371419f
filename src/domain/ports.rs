use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// Fixed keys under which each entity array is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Consorcios,
    Unidades,
    Expensas,
    Pagos,
    Avisos,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        StorageKey::Consorcios,
        StorageKey::Unidades,
        StorageKey::Expensas,
        StorageKey::Pagos,
        StorageKey::Avisos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Consorcios => "adminConsorcio_consorcios",
            StorageKey::Unidades => "adminConsorcio_unidades",
            StorageKey::Expensas => "adminConsorcio_expensas",
            StorageKey::Pagos => "adminConsorcio_pagos",
            StorageKey::Avisos => "adminConsorcio_avisos",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw key/value persistence: one serialized JSON array per key.
///
/// A missing key reads as `None`, which callers treat as an empty array.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn load(&self, key: StorageKey) -> Result<Option<Vec<u8>>>;
    async fn save(&self, key: StorageKey, value: Vec<u8>) -> Result<()>;
}

pub type KeyValueStoreBox = Box<dyn KeyValueStore>;

/// An entity persisted as an element of the array stored under `KEY`.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KEY: StorageKey;
    /// Human-readable entity name used in errors and logs.
    const NAME: &'static str;

    fn id(&self) -> &str;
}
