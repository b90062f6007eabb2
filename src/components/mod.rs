// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! UI components for the map renderer

pub mod map_canvas;

// Re-export commonly used widget views and types
pub use map_canvas::{MapCanvasWidget, map_canvas};
