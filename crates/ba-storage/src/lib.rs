use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Durable string slots keyed by a fixed identifier.
///
/// Mirrors browser `localStorage`: synchronous, last write wins, no
/// versioning. Each key holds exactly one value.
pub trait SlotStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Encode `value` as JSON and write it to `key`.
pub fn put_json<T: Serialize>(store: &dyn SlotStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Read and decode the JSON value at `key`. Decode failures are returned as errors.
pub fn get_json<T: DeserializeOwned>(store: &dyn SlotStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

#[derive(Default)]
pub struct InMemorySlotStore {
    slots: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls served so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SlotStore for InMemorySlotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .slots
            .read()
            .map_err(|_| anyhow::anyhow!("slot store lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self
            .slots
            .write()
            .map_err(|_| anyhow::anyhow!("slot store lock poisoned"))?;
        guard.insert(key.to_owned(), value.to_owned());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self
            .slots
            .write()
            .map_err(|_| anyhow::anyhow!("slot store lock poisoned"))?;
        guard.remove(key);
        Ok(())
    }
}

#[cfg(feature = "rocksdb")]
pub use rocks::RocksDbSlotStore;

#[cfg(feature = "rocksdb")]
mod rocks {
    use super::SlotStore;
    use anyhow::{Context, Result};
    use rocksdb::{DB, Options};
    use std::sync::Arc;

    /// Slot store persisted in a local RocksDB directory.
    pub struct RocksDbSlotStore {
        db: Arc<DB>,
    }

    impl RocksDbSlotStore {
        pub fn open_default(path: &str) -> Result<Self> {
            let mut options = Options::default();
            options.create_if_missing(true);
            let db = DB::open(&options, path)
                .with_context(|| format!("failed to open slot store at {path}"))?;
            Ok(Self { db: Arc::new(db) })
        }

        fn key_for_slot(key: &str) -> String {
            format!("slot:{key}")
        }
    }

    impl SlotStore for RocksDbSlotStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            let value = self.db.get(Self::key_for_slot(key).as_bytes())?;
            match value {
                Some(raw) => Ok(Some(
                    String::from_utf8(raw).context("slot value is not valid UTF-8")?,
                )),
                None => Ok(None),
            }
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.db.put(Self::key_for_slot(key).as_bytes(), value.as_bytes())?;
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.db.delete(Self::key_for_slot(key).as_bytes())?;
            Ok(())
        }
    }
}
