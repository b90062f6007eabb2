// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! JSON file store: one file per collection under a root directory.
//!
//! Writes go to a sibling temp file which is then renamed over the
//! collection file, so a reader never sees a half-written collection.

use super::{Collection, MapStore, StoreError, StoredRecord, upsert};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tokio::sync::Mutex;

/// Durable store backed by JSON files
pub struct FileStore {
    root: PathBuf,
    opened: AtomicBool,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            opened: AtomicBool::new(false),
            write_lock: Mutex::new(()),
        }
    }

    /// Store in the platform data directory, if one can be determined
    pub fn in_data_dir() -> Option<Self> {
        let dirs = ProjectDirs::from("org", "osm-canvas", "osm-canvas")?;
        Some(Self::new(dirs.data_dir().join("store")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: Collection) -> PathBuf {
        self.root.join(format!("{}.json", collection.name()))
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.opened.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::NotOpen)
        }
    }

    async fn read_collection(&self, collection: Collection) -> Result<Vec<StoredRecord>, StoreError> {
        let path = self.collection_path(collection);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { collection, source }),
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt { collection, source })
    }

    async fn write_collection(
        &self,
        collection: Collection,
        records: &[StoredRecord],
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(records)
            .map_err(|source| StoreError::Encode { collection, source })?;

        let path = self.collection_path(collection);
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, bytes)
            .await
            .map_err(|source| StoreError::Io { collection, source })?;
        fs::rename(&temp, &path)
            .await
            .map_err(|source| StoreError::Io { collection, source })
    }
}

impl MapStore for FileStore {
    async fn open(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StoreError::Open {
                path: self.root.clone(),
                source,
            })?;

        for collection in Collection::ALL {
            let path = self.collection_path(collection);
            let exists = fs::try_exists(&path)
                .await
                .map_err(|source| StoreError::Io { collection, source })?;
            if !exists {
                self.write_collection(collection, &[]).await?;
                tracing::debug!("Created collection '{}' at {}", collection, path.display());
            }
        }

        self.opened.store(true, Ordering::Release);
        tracing::info!("Opened map store at {}", self.root.display());
        Ok(())
    }

    async fn put_records(
        &self,
        collection: Collection,
        records: Vec<StoredRecord>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        let _guard = self.write_lock.lock().await;

        let mut existing = self.read_collection(collection).await?;
        upsert(&mut existing, records);
        self.write_collection(collection, &existing).await
    }

    async fn get_records(&self, collection: Collection) -> Result<Vec<StoredRecord>, StoreError> {
        self.ensure_open()?;
        let _guard = self.write_lock.lock().await;
        self.read_collection(collection).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.ensure_open()?;
        let _guard = self.write_lock.lock().await;

        for collection in Collection::ALL {
            self.write_collection(collection, &[]).await?;
        }
        tracing::info!("Cleared map store at {}", self.root.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, Tag, Tags, Way};

    fn node(id: &str, lat: f64, lon: f64) -> Node {
        Node {
            id: id.to_string(),
            lat,
            lon,
            tags: Tags::new(),
        }
    }

    async fn open_store(dir: &tempfile::TempDir) -> FileStore {
        let store = FileStore::new(dir.path().join("store"));
        store.open().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_node_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let summary = store
            .put_all(Collection::Nodes, &[node("1", 51.0, -0.1)])
            .await
            .unwrap();
        assert_eq!(summary.stored, 1);
        assert_eq!(summary.skipped, 0);

        let nodes: Vec<Node> = store.get_all(Collection::Nodes).await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "1");
        assert_eq!(nodes[0].lat, 51.0);
        assert_eq!(nodes[0].lon, -0.1);
        assert!(nodes[0].tags.is_empty());
    }

    #[tokio::test]
    async fn test_open_is_idempotent_and_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        store
            .put_all(Collection::Nodes, &[node("1", 1.0, 1.0)])
            .await
            .unwrap();

        store.open().await.unwrap();
        let reopened = open_store(&dir).await;
        let nodes: Vec<Node> = reopened.get_all(Collection::Nodes).await.unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_put_all_upserts_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        store
            .put_all(Collection::Nodes, &[node("1", 1.0, 1.0), node("2", 2.0, 2.0)])
            .await
            .unwrap();
        store
            .put_all(Collection::Nodes, &[node("2", 20.0, 20.0), node("3", 3.0, 3.0)])
            .await
            .unwrap();

        let nodes: Vec<Node> = store.get_all(Collection::Nodes).await.unwrap();
        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(nodes[1].lat, 20.0);
    }

    #[tokio::test]
    async fn test_collections_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;

        let way = Way {
            id: "10".to_string(),
            node_refs: vec!["1".to_string(), "2".to_string()],
            tags: Tags::from(vec![Tag::new("highway", "primary")]),
        };
        store.put_all(Collection::Ways, &[way.clone()]).await.unwrap();

        let nodes: Vec<Node> = store.get_all(Collection::Nodes).await.unwrap();
        let ways: Vec<Way> = store.get_all(Collection::Ways).await.unwrap();
        assert!(nodes.is_empty());
        assert_eq!(ways, vec![way]);
    }

    #[tokio::test]
    async fn test_clear_empties_every_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        store
            .put_all(Collection::Nodes, &[node("1", 1.0, 1.0)])
            .await
            .unwrap();

        store.clear().await.unwrap();

        let reopened = open_store(&dir).await;
        for collection in Collection::ALL {
            assert!(reopened.get_records(collection).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_operations_require_open() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let result = store.get_records(Collection::Nodes).await;
        assert!(matches!(result, Err(StoreError::NotOpen)));
    }

    #[tokio::test]
    async fn test_corrupt_collection_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        std::fs::write(store.root().join("ways.json"), b"{ not json").unwrap();

        let err = store.get_records(Collection::Ways).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(err.collection(), Some(Collection::Ways));
        assert!(err.to_string().contains("ways"));
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir).await;
        store
            .put_all(Collection::Nodes, &[node("1", 1.0, 1.0)])
            .await
            .unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(store.root())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
