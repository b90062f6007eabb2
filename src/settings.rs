// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Application settings and configuration constants.
//!
//! This module holds non-visual settings that stay stable across theme
//! changes. Visual styling (colors, sizes) belongs in `theme.rs`; per-user
//! state that survives restarts belongs in `preferences.rs`.

// ============================================================================
// PROJECTION SETTINGS
// ============================================================================
/// Fraction of sorted coordinates dropped from each end before computing
/// the bounding box used for scale and centre (outlier trimming)
const PROJECTION_TRIM_FRACTION: f64 = 0.02;

/// Empirical vertical stretch applied to latitude offsets
const PROJECTION_LATITUDE_STRETCH: f64 = 1.6;

// ============================================================================
// COMPOSITOR SETTINGS
// ============================================================================
/// Lowest z-index level drawn by the compositor
const COMPOSITOR_MIN_Z: i32 = 1;

/// Highest z-index level drawn by the compositor
const COMPOSITOR_MAX_Z: i32 = 4;

/// Casing stroke width relative to the main stroke
const COMPOSITOR_CASING_FACTOR: f64 = 1.2;

/// Base radius of a node marker before zoom (pixels)
const COMPOSITOR_POINT_RADIUS: f64 = 2.0;

/// Stroke width of node markers (pixels)
const COMPOSITOR_POINT_STROKE_WIDTH: f64 = 1.0;

// ============================================================================
// VIEW SETTINGS
// ============================================================================
/// Minimum zoom factor
const VIEW_MIN_ZOOM: f64 = 0.1;

/// Maximum zoom factor
const VIEW_MAX_ZOOM: f64 = 50.0;

/// Multiplicative step for one zoom notch (scroll or +/- key)
const VIEW_ZOOM_STEP: f64 = 1.1;

// ============================================================================
// PERFORMANCE SETTINGS
// ============================================================================
/// Polling cadence of the render scheduler (~60 frames per second)
const FRAME_INTERVAL_MS: u64 = 16;

/// Minimum time between two processed pan updates during a drag.
///
/// Pointer moves arriving faster than this are coalesced: the latest
/// offset is kept and applied by the next processed update or on release.
const PAN_THROTTLE_MS: u64 = 50;

// ============================================================================
// REGION SETTINGS
// ============================================================================
/// Largest request region accepted by the remote API (square degrees)
const REGION_MAX_AREA: f64 = 0.25;

/// Region requested when none has been configured yet
const REGION_DEFAULT: &str = "-0.1300,51.5000,-0.1100,51.5120";

// ============================================================================
// REMOTE SETTINGS
// ============================================================================
/// OSM API endpoint returning raw map data for a bounding box
const REMOTE_API_URL: &str = "https://api.openstreetmap.org/api/0.6/map";

/// User agent sent with every request (required by the OSM usage policy)
const REMOTE_USER_AGENT: &str = concat!("osm-canvas/", env!("CARGO_PKG_VERSION"));

/// Request timeout; a timed out request fails the load, there is no retry
const REMOTE_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Geographic to screen projection
pub mod projection {
    /// Fraction trimmed from each end of the sorted coordinate lists
    pub const TRIM_FRACTION: f64 = super::PROJECTION_TRIM_FRACTION;

    /// Vertical stretch applied to latitude offsets
    pub const LATITUDE_STRETCH: f64 = super::PROJECTION_LATITUDE_STRETCH;
}

/// Layered compositing
pub mod compositor {
    /// Lowest z-index level drawn
    pub const MIN_Z: i32 = super::COMPOSITOR_MIN_Z;

    /// Highest z-index level drawn
    pub const MAX_Z: i32 = super::COMPOSITOR_MAX_Z;

    /// Casing width = line width × this factor
    pub const CASING_FACTOR: f64 = super::COMPOSITOR_CASING_FACTOR;

    /// Node marker radius at zoom 1
    pub const POINT_RADIUS: f64 = super::COMPOSITOR_POINT_RADIUS;

    /// Node marker stroke width
    pub const POINT_STROKE_WIDTH: f64 = super::COMPOSITOR_POINT_STROKE_WIDTH;
}

/// Zoom limits
pub mod view {
    /// Minimum zoom factor
    pub const MIN_ZOOM: f64 = super::VIEW_MIN_ZOOM;

    /// Maximum zoom factor
    pub const MAX_ZOOM: f64 = super::VIEW_MAX_ZOOM;

    /// Zoom step per notch
    pub const ZOOM_STEP: f64 = super::VIEW_ZOOM_STEP;
}

/// Scheduling and interaction throttling
pub mod performance {
    use std::time::Duration;

    /// Scheduler polling interval
    pub const FRAME_INTERVAL: Duration = Duration::from_millis(super::FRAME_INTERVAL_MS);

    /// Minimum interval between processed pan updates
    pub const PAN_THROTTLE: Duration = Duration::from_millis(super::PAN_THROTTLE_MS);
}

/// Request region limits
pub mod region {
    /// Largest accepted area in square degrees
    pub const MAX_AREA: f64 = super::REGION_MAX_AREA;

    /// Default region string (`min_lon,min_lat,max_lon,max_lat`)
    pub const DEFAULT: &str = super::REGION_DEFAULT;
}

/// Remote data source
pub mod remote {
    /// OSM API map endpoint
    pub const API_URL: &str = super::REMOTE_API_URL;

    /// HTTP user agent
    pub const USER_AGENT: &str = super::REMOTE_USER_AGENT;

    /// Whole-request timeout
    pub const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(super::REMOTE_TIMEOUT_SECS);
}
