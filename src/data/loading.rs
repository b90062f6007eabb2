// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Region loading, clearing and export for AppState

use super::AppState;
use crate::model::BoundingBox;
use crate::worker::{LoaderCommand, LoaderEvent};
use chrono::Local;
use std::path::PathBuf;

impl AppState {
    /// Warm the cache from the durable store, unless it is already warm
    pub fn read_cached(&mut self) {
        if self.renderer.begin_cache_read() && !self.send(LoaderCommand::ReadCached) {
            self.renderer.finish_fetch();
        }
    }

    /// Validate the region input and start fetching it.
    ///
    /// Invalid input is reported against the region field and never
    /// reaches the network. Loading is refused while cached data exists or
    /// another load is running.
    pub fn load_region(&mut self) {
        self.notice = None;
        let bbox = match self.region.parse::<BoundingBox>() {
            Ok(bbox) => bbox,
            Err(e) => {
                tracing::warn!("Rejected region {:?}: {}", self.region, e);
                self.region_error = Some(e);
                return;
            }
        };
        self.region_error = None;

        if let Err(refusal) = self.renderer.begin_load() {
            tracing::warn!("Load refused: {}", refusal);
            self.error_message = Some(refusal.to_string());
            return;
        }

        self.error_message = None;
        self.save_view_preferences();
        if !self.send(LoaderCommand::Load(bbox)) {
            self.renderer.finish_fetch();
        }
    }

    /// Empty the durable store; the cache follows once that succeeds
    pub fn clear_data(&mut self) {
        self.notice = None;
        if self.renderer.is_fetch_in_flight() {
            self.error_message = Some("Wait for the current load to finish".to_string());
            return;
        }
        self.send(LoaderCommand::Clear);
    }

    /// Ask for a destination and export the stored region there
    pub fn export_dialog(&mut self) {
        let path = rfd::FileDialog::new()
            .set_title("Export Region")
            .add_filter("OSM XML", &["osm"])
            .set_file_name("region.osm")
            .save_file();

        if let Some(path) = path {
            self.export_to(path);
        }
    }

    pub fn export_to(&mut self, path: PathBuf) {
        self.notice = None;
        self.send(LoaderCommand::Export(path));
    }

    /// Apply the result of a background pipeline
    pub fn on_loader_event(&mut self, event: LoaderEvent) {
        match event {
            LoaderEvent::CacheRead(Ok(data)) => {
                self.renderer.adopt(data);
            }
            LoaderEvent::Loaded(Ok(data)) => {
                self.renderer.adopt(data);
                self.last_loaded = Some(Local::now().format("%I:%M %p").to_string());
                self.error_message = None;
            }
            LoaderEvent::CacheRead(Err(e)) | LoaderEvent::Loaded(Err(e)) => {
                self.renderer.finish_fetch();
                self.report(e);
            }
            LoaderEvent::Cleared(Ok(())) => {
                self.renderer.clear_cache();
                self.last_loaded = None;
                self.error_message = None;
                self.notice = Some("Cleared stored map data".to_string());
            }
            LoaderEvent::Exported(Ok(path)) => {
                self.notice = Some(format!("Exported to {}", path.display()));
            }
            LoaderEvent::Cleared(Err(e)) | LoaderEvent::Exported(Err(e)) => {
                self.report(e);
            }
        }
    }

    fn report(&mut self, error: anyhow::Error) {
        let message = format!("{:#}", error);
        tracing::error!("{}", message);
        self.error_message = Some(message);
    }
}
