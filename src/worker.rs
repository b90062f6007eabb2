// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Background tasks: the loader worker and the frame ticker.
//!
//! Both run as Xilem `task_raw` futures and report back to the app state
//! through a `MessageProxy`. The loader handles one command at a time, in
//! the order they were sent.

use crate::data::MapLoader;
use crate::fetch::MapSource;
use crate::model::{BoundingBox, MapData};
use crate::settings;
use crate::store::MapStore;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use xilem::core::MessageProxy;

/// Work requested by the UI
#[derive(Debug, Clone)]
pub enum LoaderCommand {
    /// Warm the cache from the durable store
    ReadCached,
    /// Fetch, parse and store a region
    Load(BoundingBox),
    /// Empty the durable store
    Clear,
    /// Write the stored region as OSM XML
    Export(PathBuf),
}

/// Result of a `LoaderCommand`, delivered to the app state
#[derive(Debug)]
pub enum LoaderEvent {
    CacheRead(Result<MapData>),
    Loaded(Result<MapData>),
    Cleared(Result<()>),
    Exported(Result<PathBuf>),
}

/// Sent on every scheduler tick
#[derive(Debug)]
pub struct FrameTick;

/// Run one command to completion
pub async fn execute<S: MapStore, M: MapSource>(
    loader: &MapLoader<S, M>,
    command: LoaderCommand,
) -> LoaderEvent {
    match command {
        LoaderCommand::ReadCached => LoaderEvent::CacheRead(loader.read_cached().await),
        LoaderCommand::Load(bbox) => LoaderEvent::Loaded(loader.fetch_region(&bbox).await),
        LoaderCommand::Clear => LoaderEvent::Cleared(loader.clear().await),
        LoaderCommand::Export(path) => {
            let result = match loader.read_cached().await {
                Ok(data) => loader.export(&data, &path).await.map(|()| path),
                Err(e) => Err(e),
            };
            LoaderEvent::Exported(result)
        }
    }
}

/// Serve loader commands until the UI goes away
pub async fn run_loader<S: MapStore, M: MapSource>(
    proxy: MessageProxy<LoaderEvent>,
    inbox: Arc<Mutex<UnboundedReceiver<LoaderCommand>>>,
    loader: Arc<MapLoader<S, M>>,
) {
    let mut inbox = inbox.lock().await;
    while let Some(command) = inbox.recv().await {
        tracing::debug!("Running loader command {:?}", command);
        let event = execute(&loader, command).await;
        if proxy.message(event).is_err() {
            tracing::debug!("Loader worker stopping, app state is gone");
            break;
        }
    }
}

/// Tick at the frame interval so the scheduler can start pending renders
pub async fn frame_ticker(proxy: MessageProxy<FrameTick>) {
    let mut interval = tokio::time::interval(settings::performance::FRAME_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        if proxy.message(FrameTick).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::store::MemoryStore;

    struct Unreachable;

    impl MapSource for Unreachable {
        async fn fetch(&self, _bbox: &BoundingBox) -> std::result::Result<String, FetchError> {
            Err(FetchError::Status {
                status: 503,
                body: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_failed_load_reports_error() {
        let loader = MapLoader::new(MemoryStore::new(), Unreachable);
        let bbox = "-0.11,50.99,-0.09,51.01".parse().unwrap();
        let LoaderEvent::Loaded(Err(err)) = execute(&loader, LoaderCommand::Load(bbox)).await else {
            panic!("expected a failed load");
        };
        assert!(format!("{:#}", err).contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_read_and_clear_on_empty_store() {
        let loader = MapLoader::new(MemoryStore::new(), Unreachable);
        let LoaderEvent::CacheRead(Ok(data)) = execute(&loader, LoaderCommand::ReadCached).await else {
            panic!("expected an empty read");
        };
        assert!(data.is_empty());
        assert!(matches!(
            execute(&loader, LoaderCommand::Clear).await,
            LoaderEvent::Cleared(Ok(()))
        ));
    }

    #[tokio::test]
    async fn test_export_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.osm");
        let loader = MapLoader::new(MemoryStore::new(), Unreachable);
        let LoaderEvent::Exported(Ok(written)) = execute(&loader, LoaderCommand::Export(path.clone())).await
        else {
            panic!("expected export to succeed");
        };
        assert_eq!(written, path);
        assert!(path.exists());
    }
}
