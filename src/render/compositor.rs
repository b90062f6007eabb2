// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Layered compositing of map entities.
//!
//! Layering comes from z-index passes, not sorting: for each level from
//! `MIN_Z` to `MAX_Z`, relations at that level are drawn, then ways at that
//! level, each in collection order. Styles at level 0 (the catch-all) are
//! never drawn. Nodes go last, on top of everything, with one fixed look.
//!
//! A path counts as closed when its first and last *projected* points
//! coincide. Projection rounding can therefore open a geographically
//! closed ring or close an open one.

use super::projection::{Projection, Viewport};
use super::surface::Surface;
use crate::model::{EntityKind, MapData, Relation, Way};
use crate::settings;
use crate::style::{Paint, StyleDescriptor, StyleTable};
use crate::theme;
use kurbo::{BezPath, Circle, Point};
use std::collections::HashMap;

/// Which entity kinds are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub nodes: bool,
    pub ways: bool,
    pub relations: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            nodes: true,
            ways: true,
            relations: true,
        }
    }
}

impl Visibility {
    pub fn is_visible(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Node => self.nodes,
            EntityKind::Way => self.ways,
            EntityKind::Relation => self.relations,
        }
    }

    pub fn set(&mut self, kind: EntityKind, visible: bool) {
        match kind {
            EntityKind::Node => self.nodes = visible,
            EntityKind::Way => self.ways = visible,
            EntityKind::Relation => self.relations = visible,
        }
    }
}

/// What one compositing pass drew
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeStats {
    pub ways_drawn: usize,
    pub relation_members_drawn: usize,
    pub nodes_drawn: usize,
    /// Ways or members with fewer than two resolvable points
    pub paths_skipped: usize,
    /// Node references that did not resolve
    pub dropped_refs: usize,
}

/// A resolved style with its parsed colors
type Styled<'s> = (&'s StyleDescriptor, &'s Paint);

/// A way's resolved geometry in surface coordinates
struct WayPath {
    path: BezPath,
    closed: bool,
}

/// Draws entities onto a surface
pub struct Compositor<'a> {
    styles: &'a StyleTable,
    projection: &'a Projection<'a>,
    viewport: &'a Viewport,
    stats: CompositeStats,
}

impl<'a> Compositor<'a> {
    pub fn new(styles: &'a StyleTable, projection: &'a Projection<'a>, viewport: &'a Viewport) -> Self {
        Self {
            styles,
            projection,
            viewport,
            stats: CompositeStats::default(),
        }
    }

    /// Draw a full frame
    pub fn composite(
        mut self,
        surface: &mut impl Surface,
        data: &MapData,
        visibility: Visibility,
    ) -> CompositeStats {
        let styles = self.styles;
        let ways_by_id: HashMap<&str, &Way> =
            data.ways.iter().map(|way| (way.id.as_str(), way)).collect();

        let relations: Vec<(&Relation, Styled)> = if visibility.relations {
            data.relations
                .iter()
                .map(|relation| (relation, styles.resolve_with_paint(relation)))
                .collect()
        } else {
            Vec::new()
        };
        let ways: Vec<(&Way, Styled)> = if visibility.ways {
            data.ways
                .iter()
                .map(|way| (way, styles.resolve_with_paint(way)))
                .collect()
        } else {
            Vec::new()
        };

        for z in settings::compositor::MIN_Z..=settings::compositor::MAX_Z {
            for &(relation, styled) in relations.iter().filter(|(_, (style, _))| style.z_index == z) {
                self.draw_relation(surface, relation, styled, &ways_by_id);
            }
            for &(way, styled) in ways.iter().filter(|(_, (style, _))| style.z_index == z) {
                if self.draw_way(surface, way, styled) {
                    self.stats.ways_drawn += 1;
                }
            }
        }

        if visibility.nodes {
            self.draw_nodes(surface, data);
        }

        self.stats
    }

    /// Draw every way member of a relation with the relation's own style
    fn draw_relation(
        &mut self,
        surface: &mut impl Surface,
        relation: &Relation,
        styled: Styled<'_>,
        ways_by_id: &HashMap<&str, &Way>,
    ) {
        for member in relation.way_members() {
            let Some(way) = ways_by_id.get(member.reference.as_str()) else {
                continue;
            };
            if self.draw_way(surface, way, styled) {
                self.stats.relation_members_drawn += 1;
            }
        }
    }

    /// Returns false if the way had nothing drawable
    fn draw_way(&mut self, surface: &mut impl Surface, way: &Way, (style, paint): Styled<'_>) -> bool {
        let Some(WayPath { mut path, closed }) = self.way_path(way) else {
            self.stats.paths_skipped += 1;
            return false;
        };

        if style.casing
            && let Some(casing) = paint.casing
        {
            let width = style.line_width * settings::compositor::CASING_FACTOR;
            surface.stroke_path(&path, casing, width);
        }

        if style.fill
            && closed
            && let Some(fill) = paint.fill
        {
            path.close_path();
            surface.fill_path(&path, fill);
        }

        if let Some(stroke) = paint.stroke {
            surface.stroke_path(&path, stroke, style.line_width);
        }

        true
    }

    /// Resolve a way's references, dropping unknown nodes
    fn way_path(&mut self, way: &Way) -> Option<WayPath> {
        let points: Vec<Point> = way
            .node_refs
            .iter()
            .filter_map(|id| self.projection.position(id))
            .collect();
        self.stats.dropped_refs += way.node_refs.len() - points.len();

        let (first, rest) = points.split_first()?;
        let last = rest.last()?;
        let closed = first == last;

        let mut path = BezPath::new();
        path.move_to(self.to_surface(*first));
        for point in rest {
            path.line_to(self.to_surface(*point));
        }
        Some(WayPath { path, closed })
    }

    fn draw_nodes(&mut self, surface: &mut impl Surface, data: &MapData) {
        let radius = settings::compositor::POINT_RADIUS * self.viewport.zoom;
        for node in &data.nodes {
            let Some(point) = self.projection.get(&node.id) else {
                continue;
            };
            let circle = Circle::new(self.to_surface(point.position), radius);
            surface.stroke_circle(
                circle,
                theme::map::NODE,
                settings::compositor::POINT_STROKE_WIDTH,
            );
            self.stats.nodes_drawn += 1;
        }
    }

    /// Map space (y up) to surface space (y down)
    fn to_surface(&self, point: Point) -> Point {
        Point::new(point.x, self.viewport.size.height - point.y)
    }
}
