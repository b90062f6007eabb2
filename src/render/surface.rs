// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Drawing surfaces.
//!
//! The compositor draws through the `Surface` trait. `DisplayList` records
//! the calls so a finished frame can be handed to the canvas widget and
//! replayed into a Vello scene on paint.

use kurbo::{Affine, BezPath, Circle, Stroke};
use masonry::vello::Scene;
use masonry::vello::peniko::{Brush, Color};

/// Something the compositor can draw on
pub trait Surface {
    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64);
    fn fill_path(&mut self, path: &BezPath, color: Color);
    fn stroke_circle(&mut self, circle: Circle, color: Color, width: f64);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Stroke {
        path: BezPath,
        color: Color,
        width: f64,
    },
    Fill {
        path: BezPath,
        color: Color,
    },
    Circle {
        circle: Circle,
        color: Color,
        width: f64,
    },
}

/// A recorded frame, in surface coordinates (origin top-left)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Draw every recorded command into `scene`, in order
    pub fn replay(&self, scene: &mut Scene, transform: Affine) {
        for command in &self.commands {
            match command {
                DrawCommand::Stroke { path, color, width } => {
                    scene.stroke(
                        &Stroke::new(*width),
                        transform,
                        &Brush::Solid(*color),
                        None,
                        path,
                    );
                }
                DrawCommand::Fill { path, color } => {
                    scene.fill(peniko::Fill::NonZero, transform, &Brush::Solid(*color), None, path);
                }
                DrawCommand::Circle {
                    circle,
                    color,
                    width,
                } => {
                    scene.stroke(
                        &Stroke::new(*width),
                        transform,
                        &Brush::Solid(*color),
                        None,
                        circle,
                    );
                }
            }
        }
    }
}

impl Surface for DisplayList {
    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            color,
            width,
        });
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.commands.push(DrawCommand::Fill {
            path: path.clone(),
            color,
        });
    }

    fn stroke_circle(&mut self, circle: Circle, color: Color, width: f64) {
        self.commands.push(DrawCommand::Circle {
            circle,
            color,
            width,
        });
    }
}
