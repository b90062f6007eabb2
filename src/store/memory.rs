// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Volatile store used when no data directory is available, and in tests

use super::{Collection, MapStore, StoreError, StoredRecord, upsert};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory store with the same semantics as `FileStore`
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<StoredRecord>>>,
    opened: AtomicBool,
    #[cfg(test)]
    failing: Mutex<Option<Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every put into `collection` fail. Clearing still succeeds.
    #[cfg(test)]
    pub(crate) fn fail_writes_to(&self, collection: Option<Collection>) {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner()) = collection;
    }

    #[cfg(test)]
    fn check_writable(&self, collection: Collection) -> Result<(), StoreError> {
        let failing = *self.failing.lock().unwrap_or_else(|e| e.into_inner());
        if failing == Some(collection) {
            return Err(StoreError::Unavailable {
                collection,
                reason: "write rejected".to_string(),
            });
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_writable(&self, _collection: Collection) -> Result<(), StoreError> {
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.opened.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::NotOpen)
        }
    }

    fn with_collections<R>(&self, f: impl FnOnce(&mut HashMap<Collection, Vec<StoredRecord>>) -> R) -> R {
        let mut collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut collections)
    }
}

impl MapStore for MemoryStore {
    async fn open(&self) -> Result<(), StoreError> {
        self.with_collections(|collections| {
            for collection in Collection::ALL {
                collections.entry(collection).or_default();
            }
        });
        self.opened.store(true, Ordering::Release);
        Ok(())
    }

    async fn put_records(
        &self,
        collection: Collection,
        records: Vec<StoredRecord>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.check_writable(collection)?;
        self.with_collections(|collections| {
            upsert(collections.entry(collection).or_default(), records);
        });
        Ok(())
    }

    async fn get_records(&self, collection: Collection) -> Result<Vec<StoredRecord>, StoreError> {
        self.ensure_open()?;
        Ok(self.with_collections(|collections| {
            collections.get(&collection).cloned().unwrap_or_default()
        }))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.with_collections(|collections| {
            for records in collections.values_mut() {
                records.clear();
            }
        });
        Ok(())
    }
}
