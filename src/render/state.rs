// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Renderer state and its transitions.
//!
//! Everything the renderer needs between frames lives here: the view
//! transform, per-kind visibility, the in-memory cache of loaded entities
//! and the render scheduler. Every change that affects the picture goes
//! through a named method that invalidates the scheduler.

use super::compositor::{CompositeStats, Compositor, Visibility};
use super::projection::{Viewport, project};
use super::scheduler::RenderScheduler;
use super::surface::DisplayList;
use crate::model::{EntityCounts, EntityKind, MapData};
use crate::preferences::ViewPreferences;
use crate::settings;
use crate::style::StyleTable;
use kurbo::{Size, Vec2};
use std::time::Instant;

/// Why a load request was not started
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoadRefusal {
    #[error("clear the cached data before loading a new region")]
    CacheNotEmpty,
    #[error("a load is already in progress")]
    FetchInFlight,
}

/// An in-progress drag, in screen pixels relative to the drag start
#[derive(Debug, Clone, Copy)]
struct DragPan {
    /// Offset currently shown
    applied: Vec2,
    /// Most recent pointer offset, applied on the next processed update
    latest: Vec2,
    last_update: Option<Instant>,
}

#[derive(Debug)]
pub struct RendererState {
    zoom: f64,
    /// Committed pan offset in map space (y up)
    pan: Vec2,
    drag: Option<DragPan>,
    canvas: Size,
    visibility: Visibility,
    cache: MapData,
    cache_ready: bool,
    fetch_in_flight: bool,
    scheduler: RenderScheduler,
}

impl Default for RendererState {
    fn default() -> Self {
        Self::from_preferences(&ViewPreferences::default())
    }
}

impl RendererState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_preferences(prefs: &ViewPreferences) -> Self {
        let mut state = Self {
            zoom: 1.0,
            pan: Vec2::new(prefs.pan_x, prefs.pan_y),
            drag: None,
            canvas: Size::ZERO,
            visibility: Visibility {
                nodes: prefs.show_nodes,
                ways: prefs.show_ways,
                relations: prefs.show_relations,
            },
            cache: MapData::default(),
            cache_ready: false,
            fetch_in_flight: false,
            scheduler: RenderScheduler::new(),
        };
        state.set_zoom(prefs.zoom);
        state.invalidate();
        state
    }

    /// The persisted subset of the state. `region` is owned by the app.
    pub fn view_preferences(&self) -> ViewPreferences {
        ViewPreferences {
            zoom: self.zoom,
            pan_x: self.pan.x,
            pan_y: self.pan.y,
            show_nodes: self.visibility.nodes,
            show_ways: self.visibility.ways,
            show_relations: self.visibility.relations,
            region: None,
        }
    }

    // ------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor, clamped to the configured range
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        let zoom = zoom.clamp(settings::view::MIN_ZOOM, settings::view::MAX_ZOOM);
        if zoom != self.zoom {
            self.zoom = zoom;
            self.invalidate();
        }
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.set_zoom(self.zoom * factor);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(settings::view::ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / settings::view::ZOOM_STEP);
    }

    /// Zoom 1, no pan
    pub fn reset_view(&mut self) {
        self.drag = None;
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
        self.invalidate();
    }

    /// Move the committed pan by a screen-space delta (y down)
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.pan += screen_to_map(Vec2::new(dx, dy));
        self.invalidate();
    }

    /// Committed pan plus any in-flight drag, in map space
    pub fn pan_offset(&self) -> Vec2 {
        let drag = self
            .drag
            .map(|drag| screen_to_map(drag.applied))
            .unwrap_or(Vec2::ZERO);
        self.pan + drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn begin_drag(&mut self) {
        self.drag = Some(DragPan {
            applied: Vec2::ZERO,
            latest: Vec2::ZERO,
            last_update: None,
        });
    }

    /// Record the drag offset since `begin_drag`, in screen pixels.
    ///
    /// Updates closer together than the pan throttle are coalesced: the
    /// offset is remembered but not shown until the next processed update
    /// or the release. Returns true if this update was processed.
    pub fn drag_to(&mut self, dx: f64, dy: f64, now: Instant) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        drag.latest = Vec2::new(dx, dy);

        let due = drag
            .last_update
            .is_none_or(|last| now.duration_since(last) >= settings::performance::PAN_THROTTLE);
        if !due {
            return false;
        }
        drag.applied = drag.latest;
        drag.last_update = Some(now);
        self.invalidate();
        true
    }

    /// Commit the latest drag offset into the pan
    pub fn end_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            self.pan += screen_to_map(drag.latest);
            self.invalidate();
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn set_visible(&mut self, kind: EntityKind, visible: bool) {
        if self.visibility.is_visible(kind) != visible {
            self.visibility.set(kind, visible);
            self.invalidate();
        }
    }

    pub fn toggle_visible(&mut self, kind: EntityKind) {
        self.set_visible(kind, !self.visibility.is_visible(kind));
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas
    }

    pub fn set_canvas_size(&mut self, size: Size) {
        if size != self.canvas {
            self.canvas = size;
            self.invalidate();
        }
    }

    /// The transform for the next render pass
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.canvas)
            .with_zoom(self.zoom)
            .with_pan(self.pan_offset())
    }

    // ------------------------------------------------------------------
    // Cache
    // ------------------------------------------------------------------

    pub fn cache(&self) -> &MapData {
        &self.cache
    }

    pub fn is_cache_ready(&self) -> bool {
        self.cache_ready
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    pub fn counts(&self) -> EntityCounts {
        self.cache.counts()
    }

    /// Claim the latch for reading the durable store into the cache.
    /// Returns false if the cache is already populated or a fetch is
    /// running, in which case nothing should be read.
    pub fn begin_cache_read(&mut self) -> bool {
        if self.cache_ready || self.fetch_in_flight {
            return false;
        }
        self.fetch_in_flight = true;
        true
    }

    /// Claim the latch for fetching a new region
    pub fn begin_load(&mut self) -> Result<(), LoadRefusal> {
        if self.fetch_in_flight {
            return Err(LoadRefusal::FetchInFlight);
        }
        if !self.cache.is_empty() {
            return Err(LoadRefusal::CacheNotEmpty);
        }
        self.fetch_in_flight = true;
        Ok(())
    }

    /// Release the latch after a failed read or load
    pub fn finish_fetch(&mut self) {
        self.fetch_in_flight = false;
    }

    /// Take over freshly read or loaded data and release the latch
    pub fn adopt(&mut self, data: MapData) {
        self.cache = data;
        self.cache_ready = true;
        self.fetch_in_flight = false;
        self.invalidate();
    }

    /// Forget all cached entities. Call only once the store is cleared.
    pub fn clear_cache(&mut self) {
        self.cache = MapData::default();
        self.cache_ready = false;
        self.invalidate();
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    pub fn invalidate(&mut self) {
        self.scheduler.invalidate();
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    /// Render a frame if one is due
    pub fn poll_frame(&mut self, styles: &StyleTable) -> Option<(DisplayList, CompositeStats)> {
        let viewport = self.viewport();
        let visibility = self.visibility;
        let cache = &self.cache;
        self.scheduler
            .run_frame(|| render_frame(cache, &viewport, visibility, styles))
    }
}

/// Project and composite one frame into a display list
pub fn render_frame(
    data: &MapData,
    viewport: &Viewport,
    visibility: Visibility,
    styles: &StyleTable,
) -> (DisplayList, CompositeStats) {
    let projection = project(&data.nodes, viewport);
    let mut list = DisplayList::new();
    let stats = Compositor::new(styles, &projection, viewport).composite(&mut list, data, visibility);
    tracing::debug!(
        "Rendered {} draw calls ({} ways, {} relation members, {} nodes)",
        list.len(),
        stats.ways_drawn,
        stats.relation_members_drawn,
        stats.nodes_drawn
    );
    if stats.dropped_refs > 0 {
        tracing::debug!("Dropped {} unresolved node references", stats.dropped_refs);
    }
    (list, stats)
}

/// Screen deltas grow downward, map space grows north
fn screen_to_map(delta: Vec2) -> Vec2 {
    Vec2::new(delta.x, -delta.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, Tags};
    use crate::render::Phase;
    use std::time::Duration;

    fn loaded() -> MapData {
        MapData {
            nodes: vec![Node {
                id: "1".to_string(),
                lat: 51.0,
                lon: -0.1,
                tags: Tags::new(),
            }],
            ways: vec![],
            relations: vec![],
        }
    }

    fn settled() -> RendererState {
        let mut state = RendererState::new();
        state.set_canvas_size(Size::new(100.0, 100.0));
        state.poll_frame(&StyleTable::default());
        state
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut state = RendererState::new();
        state.set_zoom(1000.0);
        assert_eq!(state.zoom(), settings::view::MAX_ZOOM);
        state.set_zoom(0.0);
        assert_eq!(state.zoom(), settings::view::MIN_ZOOM);
        state.set_zoom(f64::NAN);
        assert_eq!(state.zoom(), settings::view::MIN_ZOOM);
    }

    #[test]
    fn test_zoom_steps() {
        let mut state = RendererState::new();
        state.zoom_in();
        assert!((state.zoom() - 1.1).abs() < 1e-12);
        state.zoom_out();
        assert!((state.zoom() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_transitions_invalidate() {
        let mut state = settled();
        assert_eq!(state.scheduler().phase(), Phase::Idle);

        state.pan(5.0, 5.0);
        assert_eq!(state.scheduler().phase(), Phase::Pending);
        state.poll_frame(&StyleTable::default());

        state.set_visible(EntityKind::Way, false);
        assert_eq!(state.scheduler().phase(), Phase::Pending);
        state.poll_frame(&StyleTable::default());

        // No-op changes do not schedule a render
        state.set_visible(EntityKind::Way, false);
        state.set_zoom(1.0);
        assert_eq!(state.scheduler().phase(), Phase::Idle);
    }

    #[test]
    fn test_pan_is_flipped_into_map_space() {
        let mut state = RendererState::new();
        state.pan(10.0, 20.0);
        assert_eq!(state.pan_offset(), Vec2::new(10.0, -20.0));
    }

    #[test]
    fn test_drag_is_throttled_and_committed_on_release() {
        let mut state = RendererState::new();
        let start = Instant::now();
        state.begin_drag();

        assert!(state.drag_to(5.0, 0.0, start));
        assert_eq!(state.pan_offset(), Vec2::new(5.0, 0.0));

        // Too soon: remembered but not shown
        assert!(!state.drag_to(8.0, 0.0, start + Duration::from_millis(10)));
        assert_eq!(state.pan_offset(), Vec2::new(5.0, 0.0));

        let later = start + settings::performance::PAN_THROTTLE;
        assert!(state.drag_to(12.0, 4.0, later));
        assert_eq!(state.pan_offset(), Vec2::new(12.0, -4.0));

        assert!(!state.drag_to(20.0, 4.0, later + Duration::from_millis(1)));
        state.end_drag();
        assert!(!state.is_dragging());
        assert_eq!(state.pan_offset(), Vec2::new(20.0, -4.0));
    }

    #[test]
    fn test_drag_without_begin_is_ignored() {
        let mut state = RendererState::new();
        assert!(!state.drag_to(5.0, 5.0, Instant::now()));
        state.end_drag();
        assert_eq!(state.pan_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_reset_view() {
        let mut state = RendererState::new();
        state.zoom_by(3.0);
        state.pan(4.0, 4.0);
        state.reset_view();
        assert_eq!(state.zoom(), 1.0);
        assert_eq!(state.pan_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_cache_read_short_circuits_when_ready() {
        let mut state = RendererState::new();
        assert!(state.begin_cache_read());
        assert!(!state.begin_cache_read());
        state.adopt(loaded());
        assert!(state.is_cache_ready());
        assert!(!state.begin_cache_read());
    }

    #[test]
    fn test_load_refused_while_cache_populated_or_in_flight() {
        let mut state = RendererState::new();
        assert_eq!(state.begin_load(), Ok(()));
        assert_eq!(state.begin_load(), Err(LoadRefusal::FetchInFlight));

        state.adopt(loaded());
        assert_eq!(state.begin_load(), Err(LoadRefusal::CacheNotEmpty));

        state.clear_cache();
        assert_eq!(state.counts(), EntityCounts::default());
        assert!(!state.is_cache_ready());
        assert_eq!(state.begin_load(), Ok(()));
    }

    #[test]
    fn test_failed_fetch_leaves_cache_untouched() {
        // A populated cache survives a refused load and a failed fetch
        let mut state = RendererState::new();
        state.adopt(loaded());
        assert_eq!(state.begin_load(), Err(LoadRefusal::CacheNotEmpty));
        state.finish_fetch();
        assert_eq!(state.cache(), &loaded());
        assert!(state.is_cache_ready());

        // An empty but ready cache stays ready after a failed load
        let mut state = RendererState::new();
        state.adopt(MapData::default());
        assert!(state.begin_load().is_ok());
        assert!(state.is_fetch_in_flight());
        state.finish_fetch();
        assert!(state.cache().is_empty());
        assert!(state.is_cache_ready());
        assert!(!state.is_fetch_in_flight());
    }

    #[test]
    fn test_poll_frame_renders_once_per_invalidation() {
        let mut state = RendererState::new();
        state.set_canvas_size(Size::new(100.0, 100.0));
        state.adopt(loaded());

        let (list, stats) = state.poll_frame(&StyleTable::default()).unwrap();
        assert_eq!(stats.nodes_drawn, 1);
        assert_eq!(list.len(), 1);
        assert!(state.poll_frame(&StyleTable::default()).is_none());
    }

    #[test]
    fn test_preferences_round_trip() {
        let prefs = ViewPreferences {
            zoom: 2.0,
            pan_x: 3.0,
            pan_y: -4.0,
            show_nodes: false,
            show_ways: true,
            show_relations: false,
            region: None,
        };
        let state = RendererState::from_preferences(&prefs);
        assert_eq!(state.view_preferences(), prefs);
        assert!(!state.visibility().nodes);
    }
}
