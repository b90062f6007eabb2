// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Async pipelines between the remote source, the durable store and the
//! in-memory cache.
//!
//! None of these touch renderer state. The caller adopts the returned data
//! only when a pipeline succeeds, so a failure anywhere leaves the cache as
//! it was.

use crate::fetch::MapSource;
use crate::model::{BoundingBox, MapData, parse_osm, to_osm_xml};
use crate::store::{Collection, MapStore};
use anyhow::{Context, Result};
use std::path::Path;

pub struct MapLoader<S, M> {
    store: S,
    source: M,
}

impl<S: MapStore, M: MapSource> MapLoader<S, M> {
    pub fn new(store: S, source: M) -> Self {
        Self { store, source }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn open(&self) -> Result<()> {
        self.store.open().await.context("Failed to open map store")
    }

    /// Read every collection from the durable store
    pub async fn read_cached(&self) -> Result<MapData> {
        self.open().await?;
        let data = MapData {
            nodes: self.store.get_all(Collection::Nodes).await.context("Failed to read nodes")?,
            ways: self.store.get_all(Collection::Ways).await.context("Failed to read ways")?,
            relations: self
                .store
                .get_all(Collection::Relations)
                .await
                .context("Failed to read relations")?,
        };

        let counts = data.counts();
        tracing::info!(
            "Read cached map data: {} nodes, {} ways, {} relations",
            counts.nodes,
            counts.ways,
            counts.relations
        );
        Ok(data)
    }

    /// Fetch, parse and persist a region
    pub async fn fetch_region(&self, bbox: &BoundingBox) -> Result<MapData> {
        let xml = self
            .source
            .fetch(bbox)
            .await
            .with_context(|| format!("Failed to fetch region {}", bbox))?;
        let data = parse_osm(&xml).context("Failed to parse map data")?;
        self.persist(&data).await?;

        let counts = data.counts();
        tracing::info!(
            "Loaded region {}: {} nodes, {} ways, {} relations",
            bbox,
            counts.nodes,
            counts.ways,
            counts.relations
        );
        Ok(data)
    }

    /// Write all three collections.
    ///
    /// Loads only go into an empty store, so a failed write is rolled back
    /// by clearing whatever collections were already written.
    pub async fn persist(&self, data: &MapData) -> Result<()> {
        self.open().await?;
        let result = self.write_collections(data).await;
        if result.is_err()
            && let Err(e) = self.store.clear().await
        {
            tracing::error!("Failed to roll back partial region: {}", e);
        }
        result
    }

    async fn write_collections(&self, data: &MapData) -> Result<()> {
        self.store
            .put_all(Collection::Nodes, &data.nodes)
            .await
            .context("Failed to store nodes")?;
        self.store
            .put_all(Collection::Ways, &data.ways)
            .await
            .context("Failed to store ways")?;
        self.store
            .put_all(Collection::Relations, &data.relations)
            .await
            .context("Failed to store relations")?;
        Ok(())
    }

    /// Empty the durable store
    pub async fn clear(&self) -> Result<()> {
        self.open().await?;
        self.store.clear().await.context("Failed to clear map store")?;
        tracing::info!("Cleared map store");
        Ok(())
    }

    /// Write `data` as an OSM XML document
    pub async fn export(&self, data: &MapData, path: &Path) -> Result<()> {
        let xml = to_osm_xml(data).context("Failed to serialize map data")?;
        tokio::fs::write(path, xml)
            .await
            .with_context(|| format!("Failed to write {:?}", path))?;
        tracing::info!("Exported map data to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::model::Node;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const REGION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="51.0" lon="-0.1"/>
  <node id="2" lat="51.001" lon="-0.1"/>
  <way id="10">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="highway" v="residential"/>
  </way>
  <relation id="100">
    <member type="way" ref="10" role="outer"/>
  </relation>
</osm>"#;

    /// Serves a fixed document and counts requests
    struct FakeSource {
        body: &'static str,
        requests: AtomicUsize,
    }

    impl FakeSource {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                requests: AtomicUsize::new(0),
            }
        }
    }

    impl MapSource for FakeSource {
        async fn fetch(&self, bbox: &BoundingBox) -> Result<String, FetchError> {
            bbox.validate()?;
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.to_string())
        }
    }

    fn region() -> BoundingBox {
        "-0.11,50.99,-0.09,51.01".parse().unwrap()
    }

    #[tokio::test]
    async fn test_load_persists_and_reads_back() {
        let loader = MapLoader::new(MemoryStore::new(), FakeSource::new(REGION));
        let loaded = loader.fetch_region(&region()).await.unwrap();
        assert_eq!(loaded.counts().nodes, 2);
        assert_eq!(loaded.counts().ways, 1);
        assert_eq!(loaded.counts().relations, 1);

        let cached = loader.read_cached().await.unwrap();
        assert_eq!(cached, loaded);
        assert_eq!(
            cached.nodes[0],
            Node {
                id: "1".to_string(),
                lat: 51.0,
                lon: -0.1,
                tags: Default::default(),
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_region_never_reaches_source() {
        let loader = MapLoader::new(MemoryStore::new(), FakeSource::new(REGION));
        let too_large = BoundingBox {
            min_lon: 0.0,
            min_lat: 0.0,
            max_lon: 1.0,
            max_lat: 1.0,
        };
        assert!(loader.fetch_region(&too_large).await.is_err());
        assert_eq!(loader.source.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_parse_failure_stores_nothing() {
        let loader = MapLoader::new(MemoryStore::new(), FakeSource::new("<osm><node id=\"1\"/></osm>"));
        assert!(loader.fetch_region(&region()).await.is_err());
        assert!(loader.read_cached().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_fails_the_load() {
        let loader = MapLoader::new(MemoryStore::new(), FakeSource::new(REGION));
        loader.store().fail_writes_to(Some(Collection::Ways));

        let err = loader.fetch_region(&region()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("ways"));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_store_empty() {
        let loader = MapLoader::new(MemoryStore::new(), FakeSource::new(REGION));
        loader.store().fail_writes_to(Some(Collection::Ways));
        assert!(loader.fetch_region(&region()).await.is_err());

        // Nodes were written before ways failed, and must not survive
        loader.store().fail_writes_to(None);
        let cached = loader.read_cached().await.unwrap();
        assert!(cached.is_empty(), "partial region left behind: {:?}", cached.counts());

        // With the store empty again, a retry goes through
        let loaded = loader.fetch_region(&region()).await.unwrap();
        assert_eq!(loader.read_cached().await.unwrap(), loaded);
    }

    #[tokio::test]
    async fn test_clear_empties_store() {
        let loader = MapLoader::new(MemoryStore::new(), FakeSource::new(REGION));
        loader.fetch_region(&region()).await.unwrap();
        loader.clear().await.unwrap();
        assert!(loader.read_cached().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_writes_parseable_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region.osm");
        let loader = MapLoader::new(MemoryStore::new(), FakeSource::new(REGION));
        let data = loader.fetch_region(&region()).await.unwrap();

        loader.export(&data, &path).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(parse_osm(&written).unwrap(), data);
    }
}
