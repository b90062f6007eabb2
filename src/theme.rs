// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Theme colors and constants
//!
//! All colors use hexadecimal format: Color::from_rgb8(0xRR, 0xGG, 0xBB).
//! Map feature colors come from the style table, not from here.

use masonry::vello::peniko::Color;

// ============================================================================
// BASE COLORS -- Generic colors for UI, a dark to light gradient by default
// ============================================================================
const BASE_A: Color = Color::from_rgb8(0x10, 0x10, 0x10);
const BASE_B: Color = Color::from_rgb8(0x20, 0x20, 0x20);
const BASE_C: Color = Color::from_rgb8(0x30, 0x30, 0x30);
const BASE_F: Color = Color::from_rgb8(0x60, 0x60, 0x60);
const BASE_G: Color = Color::from_rgb8(0x70, 0x70, 0x70);
const BASE_I: Color = Color::from_rgb8(0x90, 0x90, 0x90);

// ============================================================================
// GLOBAL BACKGROUNDS
// ============================================================================
const APP_BACKGROUND: Color = BASE_B;

// ============================================================================
// UI TEXT AND LABELS
// ============================================================================
const PRIMARY_UI_TEXT: Color = BASE_I;
const SECONDARY_UI_TEXT: Color = BASE_G;
const ERROR_TEXT: Color = Color::from_rgb8(0xff, 0x6b, 0x6b);
const NOTICE_TEXT: Color = Color::from_rgb8(0x8c, 0xc8, 0x8c);

// ============================================================================
// UI PANELS (Toolbar, Status Bar)
// ============================================================================
const PANEL_BACKGROUND: Color = BASE_C;
const PANEL_OUTLINE: Color = BASE_F;
const INPUT_OUTLINE: Color = BASE_A;

// ============================================================================
// MAP CANVAS
// ============================================================================
// Land color behind all features
const MAP_BACKGROUND: Color = Color::from_rgb8(0xf2, 0xef, 0xe9);
// Node markers, drawn on top of everything
const MAP_NODE: Color = Color::from_rgb8(0x33, 0x33, 0x33);

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Application background
pub mod app {
    use super::Color;
    pub const BACKGROUND: Color = super::APP_BACKGROUND;
}

/// UI text colors
pub mod text {
    use super::Color;
    pub const PRIMARY: Color = super::PRIMARY_UI_TEXT;
    pub const SECONDARY: Color = super::SECONDARY_UI_TEXT;
    pub const ERROR: Color = super::ERROR_TEXT;
    pub const NOTICE: Color = super::NOTICE_TEXT;
}

/// Toolbar and status bar panels
pub mod panel {
    use super::Color;
    pub const BACKGROUND: Color = super::PANEL_BACKGROUND;
    pub const OUTLINE: Color = super::PANEL_OUTLINE;
    pub const INPUT_OUTLINE: Color = super::INPUT_OUTLINE;
}

/// Map canvas
pub mod map {
    use super::Color;
    pub const BACKGROUND: Color = super::MAP_BACKGROUND;
    pub const NODE: Color = super::MAP_NODE;
}

/// Sizes and spacing
pub mod size {
    /// Uniform gap between panels and outer padding
    pub const GAP: f64 = 6.0;
    /// Border thickness for buttons, inputs and panels
    pub const BORDER_WIDTH: f64 = 1.5;
    /// Rounded corner radius for buttons and inputs
    pub const BUTTON_RADIUS: f64 = 6.0;
    /// Rounded corner radius for all panels
    pub const PANEL_RADIUS: f64 = 11.0;
    /// Width of the region input
    pub const REGION_INPUT_WIDTH: f64 = 320.0;
}
