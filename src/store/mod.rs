// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Durable storage for parsed map entities.
//!
//! A `MapStore` holds three independent collections ("nodes", "ways",
//! "relations"), each keyed by entity id. Backends only move opaque
//! `StoredRecord`s; the typed `put_all` / `get_all` helpers on the trait do
//! the per-item encoding. An item that fails to encode (or has no id) is
//! skipped with a warning and the rest of the batch is still written.
//! Every backend call is all-or-nothing for the collection it touches.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::model::{Node, Relation, Way};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// COLLECTIONS AND RECORDS
// ============================================================================

/// One of the three entity collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Nodes,
    Ways,
    Relations,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Nodes, Collection::Ways, Collection::Relations];

    /// Name of the collection on disk
    pub fn name(self) -> &'static str {
        match self {
            Self::Nodes => "nodes",
            Self::Ways => "ways",
            Self::Relations => "relations",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An encoded entity keyed by its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub value: serde_json::Value,
}

/// An entity that can be persisted
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    fn record_id(&self) -> &str;
}

impl Record for Node {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for Way {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for Relation {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Outcome of a bulk write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutSummary {
    pub stored: usize,
    pub skipped: usize,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Store failures, tagged with the collection involved where known
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store has not been opened")]
    NotOpen,
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error on collection '{collection}': {source}")]
    Io {
        collection: Collection,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode collection '{collection}': {source}")]
    Encode {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
    #[error("corrupt data in collection '{collection}': {source}")]
    Corrupt {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
    #[error("collection '{collection}' is unavailable: {reason}")]
    Unavailable {
        collection: Collection,
        reason: String,
    },
}

impl StoreError {
    /// The collection the failure happened in, if known
    pub fn collection(&self) -> Option<Collection> {
        match self {
            Self::NotOpen | Self::Open { .. } => None,
            Self::Io { collection, .. }
            | Self::Encode { collection, .. }
            | Self::Corrupt { collection, .. }
            | Self::Unavailable { collection, .. } => Some(*collection),
        }
    }
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// A durable keyed record store with three collections
pub trait MapStore: Send + Sync {
    /// Create the collections if they do not exist yet. Idempotent.
    fn open(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Upsert records by id, atomically for this collection
    fn put_records(
        &self,
        collection: Collection,
        records: Vec<StoredRecord>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// All records of a collection, in insertion order
    fn get_records(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<StoredRecord>, StoreError>> + Send;

    /// Empty every collection
    fn clear(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Encode and upsert a batch of entities, skipping items that fail to
    /// encode
    fn put_all<T: Record>(
        &self,
        collection: Collection,
        items: &[T],
    ) -> impl Future<Output = Result<PutSummary, StoreError>> + Send {
        let (records, skipped) = encode_records(collection, items);
        async move {
            let stored = records.len();
            self.put_records(collection, records).await?;
            tracing::debug!(
                "Stored {} records in '{}' ({} skipped)",
                stored,
                collection,
                skipped
            );
            Ok(PutSummary { stored, skipped })
        }
    }

    /// Read and decode every entity of a collection
    fn get_all<T: Record>(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<T>, StoreError>> + Send {
        async move {
            let records = self.get_records(collection).await?;
            records
                .into_iter()
                .map(|record| {
                    serde_json::from_value(record.value)
                        .map_err(|source| StoreError::Corrupt { collection, source })
                })
                .collect()
        }
    }
}

/// The store the application runs against
pub enum StoreBackend {
    File(FileStore),
    Memory(MemoryStore),
}

impl StoreBackend {
    /// File store in the platform data dir, or memory if there is none
    pub fn platform_default() -> Self {
        match FileStore::in_data_dir() {
            Some(store) => {
                tracing::info!("Using map store at {}", store.root().display());
                Self::File(store)
            }
            None => {
                tracing::warn!("No data directory available, map data will not persist");
                Self::Memory(MemoryStore::new())
            }
        }
    }
}

impl MapStore for StoreBackend {
    async fn open(&self) -> Result<(), StoreError> {
        match self {
            Self::File(store) => store.open().await,
            Self::Memory(store) => store.open().await,
        }
    }

    async fn put_records(
        &self,
        collection: Collection,
        records: Vec<StoredRecord>,
    ) -> Result<(), StoreError> {
        match self {
            Self::File(store) => store.put_records(collection, records).await,
            Self::Memory(store) => store.put_records(collection, records).await,
        }
    }

    async fn get_records(&self, collection: Collection) -> Result<Vec<StoredRecord>, StoreError> {
        match self {
            Self::File(store) => store.get_records(collection).await,
            Self::Memory(store) => store.get_records(collection).await,
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match self {
            Self::File(store) => store.clear().await,
            Self::Memory(store) => store.clear().await,
        }
    }
}

/// Per-item transform for bulk writes. Returns the records plus the number
/// of items that were skipped.
fn encode_records<T: Record>(collection: Collection, items: &[T]) -> (Vec<StoredRecord>, usize) {
    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for item in items {
        let id = item.record_id();
        if id.is_empty() {
            tracing::warn!("Skipping record without id in '{}'", collection);
            skipped += 1;
            continue;
        }
        match serde_json::to_value(item) {
            Ok(value) => records.push(StoredRecord {
                id: id.to_string(),
                value,
            }),
            Err(e) => {
                tracing::warn!("Skipping record '{}' in '{}': {}", id, collection, e);
                skipped += 1;
            }
        }
    }

    (records, skipped)
}

/// Upsert `incoming` into `existing`, replacing records with the same id in
/// place and appending new ones
fn upsert(existing: &mut Vec<StoredRecord>, incoming: Vec<StoredRecord>) {
    let mut index: std::collections::HashMap<String, usize> = existing
        .iter()
        .enumerate()
        .map(|(i, record)| (record.id.clone(), i))
        .collect();

    for record in incoming {
        match index.get(&record.id) {
            Some(&i) => existing[i] = record,
            None => {
                index.insert(record.id.clone(), existing.len());
                existing.push(record);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tags;

    /// A record whose serialization always fails
    struct Unencodable {
        id: String,
    }

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot encode"))
        }
    }

    impl<'de> Deserialize<'de> for Unencodable {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let id = String::deserialize(deserializer)?;
            Ok(Self { id })
        }
    }

    impl Record for Unencodable {
        fn record_id(&self) -> &str {
            &self.id
        }
    }

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            lat: 1.0,
            lon: 2.0,
            tags: Tags::new(),
        }
    }

    #[test]
    fn test_encode_skips_missing_ids() {
        let (records, skipped) = encode_records(Collection::Nodes, &[node("1"), node(""), node("3")]);
        assert_eq!(skipped, 1);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_encode_skips_failing_items() {
        let items = vec![
            Unencodable {
                id: "a".to_string(),
            },
            Unencodable {
                id: "b".to_string(),
            },
        ];
        let (records, skipped) = encode_records(Collection::Ways, &items);
        assert!(records.is_empty());
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let record = |id: &str, v: i32| StoredRecord {
            id: id.to_string(),
            value: serde_json::json!(v),
        };
        let mut existing = vec![record("a", 1), record("b", 2)];
        upsert(&mut existing, vec![record("b", 20), record("c", 3), record("c", 30)]);
        assert_eq!(existing, vec![record("a", 1), record("b", 20), record("c", 30)]);
    }

    #[test]
    fn test_collection_names() {
        let names: Vec<_> = Collection::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["nodes", "ways", "relations"]);
    }
}
