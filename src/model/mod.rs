// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Map data model: entities, request regions, and the OSM XML codec

pub mod bbox;
pub mod entity;
pub mod parser;
pub mod writer;

pub use bbox::{BboxError, BboxField, BoundingBox};
pub use entity::{
    EntityCounts, EntityKind, MapData, Member, MemberKind, Node, Relation, Tag, Tagged, Tags, Way,
};
pub use parser::{ParseError, parse_osm};
pub use writer::to_osm_xml;
