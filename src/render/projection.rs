// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Geographic to screen projection with outlier trimming.
//!
//! Scale and centre come from a *trimmed* extent of the point set: each
//! coordinate axis is sorted independently and a small fraction is dropped
//! from both ends, so a handful of stray far-away nodes cannot shrink the
//! rest of the map to a dot. Trimming only affects scale and centre; every
//! point is still projected.
//!
//! The result is in map space: y grows northward. The compositor flips it
//! for the top-left origin of the drawing surface.

use crate::model::{Node, Tags};
use crate::settings;
use kurbo::{Point, Size, Vec2};
use std::collections::HashMap;

/// Canvas size and view transform for one render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub size: Size,
    pub zoom: f64,
    /// Pan offset in map space (y up)
    pub pan: Vec2,
}

impl Viewport {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_pan(mut self, pan: Vec2) -> Self {
        self.pan = pan;
        self
    }

    fn center(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 2.0)
    }
}

/// Trimmed geographic extent of a point set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Extent {
    /// Extent after dropping `fraction` of the sorted values from each end
    /// of each axis. `None` for an empty point set.
    pub fn trimmed(nodes: &[Node], fraction: f64) -> Option<Self> {
        if nodes.is_empty() {
            return None;
        }
        let (min_lon, max_lon) = trimmed_range(nodes.iter().map(|n| n.lon).collect(), fraction);
        let (min_lat, max_lat) = trimmed_range(nodes.iter().map(|n| n.lat).collect(), fraction);
        Some(Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        })
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn mid_lon(&self) -> f64 {
        (self.min_lon + self.max_lon) / 2.0
    }

    pub fn mid_lat(&self) -> f64 {
        (self.min_lat + self.max_lat) / 2.0
    }
}

/// Sort, then drop `fraction` of the values from both ends.
/// `values` must not be empty.
fn trimmed_range(mut values: Vec<f64>, fraction: f64) -> (f64, f64) {
    values.sort_by(f64::total_cmp);
    let last = values.len() - 1;
    let cut = ((values.len() as f64 * fraction).floor() as usize).min(last / 2);
    (values[cut], values[last - cut])
}

/// Uniform scale and centre for a render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    /// Pixels per degree, zoom included
    pub scale: f64,
    pub mid_lon: f64,
    pub mid_lat: f64,
}

impl Fit {
    /// Fit the trimmed extent into the canvas, preserving aspect ratio.
    ///
    /// A zero-size axis does not constrain the scale; if both are zero the
    /// base scale is 1.
    pub fn new(extent: &Extent, viewport: &Viewport) -> Self {
        let scale_x = (extent.width() > 0.0).then(|| viewport.size.width / extent.width());
        let scale_y = (extent.height() > 0.0).then(|| viewport.size.height / extent.height());
        let base = match (scale_x, scale_y) {
            (Some(x), Some(y)) => x.min(y),
            (Some(s), None) | (None, Some(s)) => s,
            (None, None) => 1.0,
        };

        Self {
            scale: base * viewport.zoom,
            mid_lon: extent.mid_lon(),
            mid_lat: extent.mid_lat(),
        }
    }

    /// Map-space position of a coordinate
    pub fn apply(&self, lon: f64, lat: f64, viewport: &Viewport) -> Point {
        let center = viewport.center();
        Point::new(
            (lon - self.mid_lon) * self.scale + center.x + viewport.pan.x,
            (lat - self.mid_lat) * self.scale * settings::projection::LATITUDE_STRETCH
                + center.y
                + viewport.pan.y,
        )
    }
}

/// A node's position for one render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint<'a> {
    /// Map-space position (y up)
    pub position: Point,
    pub tags: &'a Tags,
}

/// Projected points keyed by node id
#[derive(Debug, Default)]
pub struct Projection<'a> {
    points: HashMap<&'a str, ProjectedPoint<'a>>,
    fit: Option<Fit>,
}

impl<'a> Projection<'a> {
    pub fn get(&self, id: &str) -> Option<&ProjectedPoint<'a>> {
        self.points.get(id)
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.points.get(id).map(|p| p.position)
    }

    /// The fit used for this pass, `None` if there were no points
    pub fn fit(&self) -> Option<Fit> {
        self.fit
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Project every node into map space
pub fn project<'a>(nodes: &'a [Node], viewport: &Viewport) -> Projection<'a> {
    let Some(extent) = Extent::trimmed(nodes, settings::projection::TRIM_FRACTION) else {
        return Projection::default();
    };
    let fit = Fit::new(&extent, viewport);

    let points = nodes
        .iter()
        .map(|node| {
            let projected = ProjectedPoint {
                position: fit.apply(node.lon, node.lat, viewport),
                tags: &node.tags,
            };
            (node.id.as_str(), projected)
        })
        .collect();

    Projection {
        points,
        fit: Some(fit),
    }
}
