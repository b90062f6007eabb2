// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! The default style table.
//!
//! Rules are listed in priority order. Z-index levels:
//!   1 = land cover, 2 = water and leisure areas, 3 = buildings,
//!   4 = linear transport (roads, railways, paths)

use super::{Predicate, StyleDescriptor as S, StyleRule};
use crate::model::Tags;

const MOTORWAY: &str = "#e892a2";
const MOTORWAY_CASING: &str = "#de3d72";
const TRUNK: &str = "#f9b29c";
const TRUNK_CASING: &str = "#c84e2f";
const PRIMARY: &str = "#fcd6a4";
const PRIMARY_CASING: &str = "#a06b00";
const SECONDARY: &str = "#f7fabf";
const SECONDARY_CASING: &str = "#707d05";
const MINOR_ROAD: &str = "#ffffff";
const TERTIARY_CASING: &str = "#8f8f8f";
const MINOR_ROAD_CASING: &str = "#bbbbbb";
const WATER: &str = "#aad3df";

/// A highway mapped as an area (`area=yes`), e.g. a pedestrian square
fn is_highway_area(tags: &Tags) -> bool {
    tags.contains_key("highway") && tags.get("area") == Some("yes")
}

/// The built-in rule table, ending with the catch-all
pub fn default_rules() -> Vec<StyleRule> {
    use Predicate::*;

    vec![
        // Buildings
        StyleRule::new(Has("building"), S::area("#d9d0c9", "#c4b6ab", 3)),
        // Pedestrian squares and other highway areas
        StyleRule::new(Custom(is_highway_area), S::area("#dddde8", "#999999", 2)),
        // Roads, most important first
        StyleRule::new(Is("highway", "motorway"), S::line(MOTORWAY, 12.0, 4).cased(MOTORWAY_CASING)),
        StyleRule::new(Is("highway", "motorway_link"), S::line(MOTORWAY, 8.0, 4).cased(MOTORWAY_CASING)),
        StyleRule::new(Is("highway", "trunk"), S::line(TRUNK, 10.0, 4).cased(TRUNK_CASING)),
        StyleRule::new(Is("highway", "trunk_link"), S::line(TRUNK, 7.0, 4).cased(TRUNK_CASING)),
        StyleRule::new(Is("highway", "primary"), S::line(PRIMARY, 9.0, 4).cased(PRIMARY_CASING)),
        StyleRule::new(Is("highway", "primary_link"), S::line(PRIMARY, 6.0, 4).cased(PRIMARY_CASING)),
        StyleRule::new(Is("highway", "secondary"), S::line(SECONDARY, 8.0, 4).cased(SECONDARY_CASING)),
        StyleRule::new(Is("highway", "secondary_link"), S::line(SECONDARY, 5.0, 4).cased(SECONDARY_CASING)),
        StyleRule::new(Is("highway", "tertiary"), S::line(MINOR_ROAD, 7.0, 4).cased(TERTIARY_CASING)),
        StyleRule::new(Is("highway", "tertiary_link"), S::line(MINOR_ROAD, 4.0, 4).cased(TERTIARY_CASING)),
        StyleRule::new(
            OneOf("highway", &["residential", "unclassified", "living_street"]),
            S::line(MINOR_ROAD, 5.0, 4).cased(MINOR_ROAD_CASING),
        ),
        StyleRule::new(Is("highway", "service"), S::line(MINOR_ROAD, 3.0, 4).cased(MINOR_ROAD_CASING)),
        StyleRule::new(Is("highway", "pedestrian"), S::line("#dddde8", 4.0, 4).cased("#999999")),
        StyleRule::new(Is("highway", "track"), S::line("#996600", 2.0, 4)),
        StyleRule::new(Is("highway", "cycleway"), S::line("#0000ff", 1.5, 4)),
        StyleRule::new(OneOf("highway", &["footway", "path", "steps", "bridleway"]), S::line("#fa8072", 1.5, 4)),
        StyleRule::new(Has("highway"), S::line(MINOR_ROAD, 2.0, 4)),
        // Railways
        StyleRule::new(Is("railway", "rail"), S::line("#707070", 3.0, 4).cased("#ffffff")),
        StyleRule::new(OneOf("railway", &["tram", "light_rail", "subway"]), S::line("#444444", 2.0, 4)),
        StyleRule::new(Has("railway"), S::line("#999999", 1.5, 4)),
        // Waterways
        StyleRule::new(Is("waterway", "river"), S::line(WATER, 6.0, 2)),
        StyleRule::new(Is("waterway", "canal"), S::line(WATER, 5.0, 2)),
        StyleRule::new(Has("waterway"), S::line(WATER, 2.0, 2)),
        // Natural areas
        StyleRule::new(Is("natural", "water"), S::area(WATER, WATER, 2)),
        StyleRule::new(Is("natural", "wood"), S::area("#add19e", "#9fc490", 1)),
        StyleRule::new(Is("natural", "scrub"), S::area("#c8d7ab", "#b5c69a", 1)),
        StyleRule::new(OneOf("natural", &["grassland", "heath"]), S::area("#cdebb0", "#b9d89c", 1)),
        StyleRule::new(OneOf("natural", &["beach", "sand"]), S::area("#fff1ba", "#e8d9a0", 1)),
        // Land use
        StyleRule::new(OneOf("landuse", &["reservoir", "basin"]), S::area(WATER, WATER, 2)),
        StyleRule::new(Is("landuse", "forest"), S::area("#add19e", "#9fc490", 1)),
        StyleRule::new(
            OneOf("landuse", &["grass", "meadow", "village_green", "recreation_ground"]),
            S::area("#cdebb0", "#b9d89c", 1),
        ),
        StyleRule::new(Is("landuse", "residential"), S::area("#e0dfdf", "#d0cfcf", 1)),
        StyleRule::new(OneOf("landuse", &["commercial", "retail"]), S::area("#f2dad9", "#e4c5c3", 1)),
        StyleRule::new(Is("landuse", "industrial"), S::area("#ebdbe8", "#d9c7d5", 1)),
        StyleRule::new(Is("landuse", "farmland"), S::area("#eef0d5", "#dcdfbd", 1)),
        StyleRule::new(Has("landuse"), S::area("#e6e6e6", "#d6d6d6", 1)),
        // Leisure
        StyleRule::new(OneOf("leisure", &["park", "garden"]), S::area("#c8facc", "#b2e6b6", 2)),
        StyleRule::new(
            OneOf("leisure", &["pitch", "sports_centre", "stadium", "track"]),
            S::area("#aae0cb", "#88c9b0", 2),
        ),
        StyleRule::new(Is("leisure", "playground"), S::area("#dffce2", "#b6e3bb", 2)),
        StyleRule::new(Is("amenity", "parking"), S::area("#eeeeee", "#cccccc", 2)),
        // Everything else
        StyleRule::new(Always, S::DEFAULT),
    ]
}
