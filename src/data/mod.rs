// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Central application state (`AppState`) that drives the Xilem reactive UI.
//!
//! `AppState` owns the renderer state, the latest rendered frame, user
//! preferences and the channel to the background loader. Every UI rebuild
//! reads from `AppState`; mutations happen in event callbacks. Sub-modules
//! split the methods by domain: command dispatch and region loading.

mod commands;
mod loader;
mod loading;

pub use commands::{Command, command_for_key};
pub use loader::MapLoader;

use crate::fetch::OsmApi;
use crate::model::{BboxError, EntityKind};
use crate::preferences::{Preferences, ViewPreferences};
use crate::render::{CompositeStats, DisplayList, RendererState};
use crate::settings;
use crate::store::StoreBackend;
use crate::style::StyleTable;
use crate::worker::LoaderCommand;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use xilem::WindowId;

/// The loader the application runs with
pub type AppLoader = MapLoader<StoreBackend, OsmApi>;

/// Main application state
pub struct AppState {
    /// View transform, visibility, entity cache and render scheduling
    pub renderer: RendererState,

    pub styles: StyleTable,

    /// Most recently rendered frame, shared with the canvas widget
    pub frame: Arc<DisplayList>,

    /// What the most recent frame drew
    pub last_stats: CompositeStats,

    pub preferences: Preferences,

    /// Region text as typed (`min_lon,min_lat,max_lon,max_lat`)
    pub region: String,

    /// Validation failure of `region`, shown next to the input
    pub region_error: Option<BboxError>,

    /// Error message to display, if any
    pub error_message: Option<String>,

    /// Informational message (export finished, store cleared)
    pub notice: Option<String>,

    /// When a region was last loaded (formatted time string for UI)
    pub last_loaded: Option<String>,

    /// Whether the app should keep running
    pub running: bool,

    /// Main window ID (stable across rebuilds to prevent window
    /// recreation)
    pub main_window_id: WindowId,

    pub loader: Arc<AppLoader>,

    commands: UnboundedSender<LoaderCommand>,

    /// Receiving end of `commands`, taken by the loader worker
    pub inbox: Arc<Mutex<UnboundedReceiver<LoaderCommand>>>,
}

impl AppState {
    /// Create the state and queue a read of the cached region.
    ///
    /// `region` overrides the stored region preference.
    pub fn new(loader: Arc<AppLoader>, preferences: Preferences, region: Option<String>) -> Self {
        let view = ViewPreferences::read(&preferences);
        let region = region
            .or(view.region.clone())
            .unwrap_or_else(|| settings::region::DEFAULT.to_string());
        let (commands, inbox) = mpsc::unbounded_channel();

        let mut state = Self {
            renderer: RendererState::from_preferences(&view),
            styles: StyleTable::default(),
            frame: Arc::new(DisplayList::new()),
            last_stats: CompositeStats::default(),
            preferences,
            region,
            region_error: None,
            error_message: None,
            notice: None,
            last_loaded: None,
            running: true,
            main_window_id: WindowId::next(),
            loader,
            commands,
            inbox: Arc::new(Mutex::new(inbox)),
        };
        state.read_cached();
        state
    }

    /// Start a render if one is due and publish the result
    pub fn on_frame(&mut self) {
        if let Some((list, stats)) = self.renderer.poll_frame(&self.styles) {
            self.frame = Arc::new(list);
            self.last_stats = stats;
        }
    }

    /// Entity counts, a load indicator and the last load time
    pub fn status_line(&self) -> String {
        let counts = self.renderer.counts();
        let mut status = format!(
            "{} nodes · {} ways · {} relations",
            counts.nodes, counts.ways, counts.relations
        );
        if self.renderer.is_fetch_in_flight() {
            status.push_str(" · loading…");
        } else if let Some(time) = &self.last_loaded {
            status.push_str(&format!(" · loaded at {}", time));
        }
        status
    }

    /// Label for a visibility toggle
    pub fn visibility_label(&self, kind: EntityKind) -> String {
        let name = match kind {
            EntityKind::Node => "Nodes",
            EntityKind::Way => "Ways",
            EntityKind::Relation => "Relations",
        };
        let mark = if self.renderer.visibility().is_visible(kind) {
            "●"
        } else {
            "○"
        };
        format!("{} {}", mark, name)
    }

    /// Write zoom, pan, visibility and region to the preference file
    pub fn save_view_preferences(&mut self) {
        let mut view = self.renderer.view_preferences();
        view.region = Some(self.region.clone());
        view.write(&mut self.preferences);
        if let Err(e) = self.preferences.save() {
            tracing::warn!("Failed to save preferences: {:#}", e);
        }
    }

    fn send(&mut self, command: LoaderCommand) -> bool {
        if self.commands.send(command).is_err() {
            let error = "Background loader is not running".to_string();
            tracing::error!("{}", error);
            self.error_message = Some(error);
            return false;
        }
        true
    }
}

/// Implement the Xilem AppState trait
impl xilem::AppState for AppState {
    fn keep_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::store::MemoryStore;

    /// App state on a memory store, with the loader channel left
    /// unserved so tests can inspect queued commands
    pub fn app_state() -> AppState {
        let api = OsmApi::with_url("http://127.0.0.1:9/map").unwrap();
        let loader = MapLoader::new(StoreBackend::Memory(MemoryStore::new()), api);
        let mut state = AppState::new(Arc::new(loader), Preferences::in_memory(), None);
        // Drop the startup read
        queued(&mut state);
        state
    }

    /// Drain the loader channel
    pub fn queued(state: &mut AppState) -> Vec<LoaderCommand> {
        let mut inbox = state.inbox.try_lock().unwrap();
        let mut commands = Vec::new();
        while let Ok(command) = inbox.try_recv() {
            commands.push(command);
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{app_state, queued};
    use super::*;
    use crate::model::{MapData, Node, Tags};
    use crate::store::MemoryStore;

    #[test]
    fn test_startup_queues_cache_read() {
        let api = OsmApi::with_url("http://127.0.0.1:9/map").unwrap();
        let loader = MapLoader::new(StoreBackend::Memory(MemoryStore::new()), api);
        let mut state = AppState::new(Arc::new(loader), Preferences::in_memory(), None);

        let commands = queued(&mut state);
        assert!(matches!(commands.as_slice(), [LoaderCommand::ReadCached]));
        assert!(state.renderer.is_fetch_in_flight());
        assert_eq!(state.region, settings::region::DEFAULT);
    }

    #[test]
    fn test_region_argument_overrides_preference() {
        let mut prefs = Preferences::in_memory();
        prefs.set(crate::preferences::keys::REGION, "1,1,1.1,1.1");
        let api = OsmApi::with_url("http://127.0.0.1:9/map").unwrap();
        let loader = MapLoader::new(StoreBackend::Memory(MemoryStore::new()), api);

        let state = AppState::new(Arc::new(loader), prefs.clone(), None);
        assert_eq!(state.region, "1,1,1.1,1.1");

        let api = OsmApi::with_url("http://127.0.0.1:9/map").unwrap();
        let loader = MapLoader::new(StoreBackend::Memory(MemoryStore::new()), api);
        let state = AppState::new(Arc::new(loader), prefs, Some("2,2,2.1,2.1".to_string()));
        assert_eq!(state.region, "2,2,2.1,2.1");
    }

    #[test]
    fn test_on_frame_publishes_display_list() {
        let mut state = app_state();
        state.renderer.set_canvas_size(kurbo::Size::new(100.0, 100.0));
        state.renderer.adopt(MapData {
            nodes: vec![Node {
                id: "1".to_string(),
                lat: 51.0,
                lon: -0.1,
                tags: Tags::new(),
            }],
            ways: vec![],
            relations: vec![],
        });

        let before = state.frame.clone();
        state.on_frame();
        assert!(!Arc::ptr_eq(&before, &state.frame));
        assert_eq!(state.last_stats.nodes_drawn, 1);

        // Nothing changed, so the frame is kept
        let current = state.frame.clone();
        state.on_frame();
        assert!(Arc::ptr_eq(&current, &state.frame));
    }

    #[test]
    fn test_status_line() {
        let mut state = app_state();
        assert!(state.status_line().ends_with("loading…"));
        state.renderer.adopt(MapData::default());
        assert_eq!(state.status_line(), "0 nodes · 0 ways · 0 relations");
    }

    #[test]
    fn test_visibility_label() {
        let mut state = app_state();
        assert_eq!(state.visibility_label(EntityKind::Way), "● Ways");
        state.renderer.toggle_visible(EntityKind::Way);
        assert_eq!(state.visibility_label(EntityKind::Way), "○ Ways");
    }
}
