// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! The rendering pipeline: projection, compositing and scheduling

pub mod compositor;
pub mod projection;
pub mod scheduler;
pub mod state;
pub mod surface;

pub use compositor::{CompositeStats, Compositor, Visibility};
pub use projection::{Extent, Fit, ProjectedPoint, Projection, Viewport, project};
pub use scheduler::{Phase, RenderScheduler};
pub use state::{LoadRefusal, RendererState, render_frame};
pub use surface::{DisplayList, DrawCommand, Surface};
