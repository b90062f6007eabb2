// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! OSM XML parsing
//!
//! The document is checked structurally first (non-blank, well-formed,
//! `<osm>` root) and then deserialized in one pass through `quick-xml`'s
//! serde support. Any missing or non-numeric required attribute fails the
//! whole parse; callers never see a partially parsed region.

use super::entity::{MapData, Member, MemberKind, Node, Relation, Tag, Tags, Way};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use thiserror::Error;

/// Why a document could not be turned into entities
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("document is empty")]
    Empty,
    #[error("expected an <osm> root element, found <{0}>")]
    UnexpectedRoot(String),
    #[error("malformed OSM document: {0}")]
    Malformed(String),
    #[error("failed to write OSM document: {0}")]
    Write(String),
}

// ============================================================================
// RAW DOCUMENT SHAPE
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "node", default)]
    nodes: Vec<RawNode>,
    #[serde(rename = "way", default)]
    ways: Vec<RawWay>,
    #[serde(rename = "relation", default)]
    relations: Vec<RawRelation>,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    #[serde(rename = "@k")]
    k: String,
    #[serde(rename = "@v")]
    v: String,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@lat")]
    lat: f64,
    #[serde(rename = "@lon")]
    lon: f64,
    #[serde(rename = "tag", default)]
    tags: Vec<RawTag>,
}

#[derive(Debug, Deserialize)]
struct RawNodeRef {
    #[serde(rename = "@ref")]
    reference: String,
}

#[derive(Debug, Deserialize)]
struct RawWay {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "nd", default)]
    node_refs: Vec<RawNodeRef>,
    #[serde(rename = "tag", default)]
    tags: Vec<RawTag>,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    #[serde(rename = "@type")]
    kind: String,
    #[serde(rename = "@ref")]
    reference: String,
    #[serde(rename = "@role", default)]
    role: String,
}

#[derive(Debug, Deserialize)]
struct RawRelation {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "member", default)]
    members: Vec<RawMember>,
    #[serde(rename = "tag", default)]
    tags: Vec<RawTag>,
}

fn convert_tags(raw: Vec<RawTag>) -> Tags {
    raw.into_iter().map(|tag| Tag::new(tag.k, tag.v)).collect::<Vec<_>>().into()
}

impl From<RawDocument> for MapData {
    fn from(doc: RawDocument) -> Self {
        let nodes = doc
            .nodes
            .into_iter()
            .map(|raw| Node {
                id: raw.id,
                lat: raw.lat,
                lon: raw.lon,
                tags: convert_tags(raw.tags),
            })
            .collect();

        let ways = doc
            .ways
            .into_iter()
            .map(|raw| Way {
                id: raw.id,
                node_refs: raw.node_refs.into_iter().map(|nd| nd.reference).collect(),
                tags: convert_tags(raw.tags),
            })
            .collect();

        let relations = doc
            .relations
            .into_iter()
            .map(|raw| Relation {
                id: raw.id,
                members: raw
                    .members
                    .into_iter()
                    .map(|member| Member {
                        kind: MemberKind::parse(&member.kind),
                        reference: member.reference,
                        role: member.role,
                    })
                    .collect(),
                tags: convert_tags(raw.tags),
            })
            .collect();

        MapData {
            nodes,
            ways,
            relations,
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse an OSM XML document into its three entity collections
pub fn parse_osm(input: &str) -> Result<MapData, ParseError> {
    check_root(input).inspect_err(|e| tracing::error!("[parser] rejected document: {}", e))?;

    tracing::debug!("[parser] start parsing ({} bytes)", input.len());

    let raw: RawDocument = quick_xml::de::from_str(input).map_err(|e| {
        tracing::error!("[parser] deserialization failed: {}", e);
        ParseError::Malformed(e.to_string())
    })?;

    check_coordinates(&raw.nodes).inspect_err(|e| tracing::error!("[parser] {}", e))?;

    Ok(MapData::from(raw))
}

/// Coordinates must be finite; `f64::from_str` also accepts "NaN" and "inf"
fn check_coordinates(nodes: &[RawNode]) -> Result<(), ParseError> {
    match nodes
        .iter()
        .find(|node| !node.lat.is_finite() || !node.lon.is_finite())
    {
        Some(node) => Err(ParseError::Malformed(format!(
            "node {} has a non-finite coordinate",
            node.id
        ))),
        None => Ok(()),
    }
}

/// Fail fast on blank input, broken markup, or a foreign root element
fn check_root(input: &str) -> Result<(), ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut reader = Reader::from_str(input);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                return if name == "osm" {
                    Ok(())
                } else {
                    Err(ParseError::UnexpectedRoot(name))
                };
            }
            Ok(Event::Eof) => return Err(ParseError::Empty),
            Ok(Event::Text(text)) => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    return Err(ParseError::Malformed(
                        "text content before the root element".to_string(),
                    ));
                }
            }
            // Declarations, comments, doctype, processing instructions
            Ok(_) => {}
            Err(e) => return Err(ParseError::Malformed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="test">
  <bounds minlat="51.0" minlon="-0.2" maxlat="51.1" maxlon="-0.1"/>
  <node id="1" lat="51.0" lon="-0.1"/>
  <node id="2" lat="51.05" lon="-0.15" visible="true">
    <tag k="amenity" v="cafe"/>
    <tag k="name" v="Corner &amp; Co"/>
  </node>
  <way id="10">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="highway" v="motorway"/>
  </way>
  <relation id="100">
    <member type="way" ref="10" role="outer"/>
    <member type="node" ref="2" role=""/>
    <tag k="type" v="multipolygon"/>
  </relation>
</osm>"#;

    #[test]
    fn test_parse_sample() {
        let data = parse_osm(SAMPLE).unwrap();
        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.ways.len(), 1);
        assert_eq!(data.relations.len(), 1);

        let node = &data.nodes[0];
        assert_eq!(node.id, "1");
        assert_eq!(node.lat, 51.0);
        assert_eq!(node.lon, -0.1);
        assert!(node.tags.is_empty());

        assert_eq!(data.nodes[1].tags.get("name"), Some("Corner & Co"));

        let way = &data.ways[0];
        assert_eq!(way.node_refs, vec!["1", "2"]);
        assert_eq!(way.tags.get("highway"), Some("motorway"));

        let relation = &data.relations[0];
        assert_eq!(relation.members.len(), 2);
        assert_eq!(relation.members[0].kind, MemberKind::Way);
        assert_eq!(relation.members[0].role, "outer");
        assert_eq!(relation.members[1].kind, MemberKind::Node);
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(matches!(parse_osm(""), Err(ParseError::Empty)));
        assert!(matches!(parse_osm("   \n\t"), Err(ParseError::Empty)));
    }

    #[test]
    fn test_parse_rejects_non_xml() {
        assert!(parse_osm("this is not xml").is_err());
        assert!(matches!(
            parse_osm("<html><body/></html>"),
            Err(ParseError::UnexpectedRoot(name)) if name == "html"
        ));
    }

    #[test]
    fn test_parse_missing_latitude_fails_whole_document() {
        let doc = r#"<osm>
            <node id="1" lat="51.0" lon="-0.1"/>
            <node id="2" lon="-0.1"/>
        </osm>"#;
        assert!(matches!(parse_osm(doc), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn test_parse_non_numeric_longitude_fails() {
        let doc = r#"<osm><node id="1" lat="51.0" lon="west"/></osm>"#;
        assert!(matches!(parse_osm(doc), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn test_parse_non_finite_coordinate_fails() {
        let doc = r#"<osm>
            <node id="1" lat="51.0" lon="-0.1"/>
            <node id="2" lat="51.01" lon="-0.11"/>
            <node id="3" lat="NaN" lon="inf"/>
        </osm>"#;
        assert!(matches!(
            parse_osm(doc),
            Err(ParseError::Malformed(message)) if message.contains("node 3")
        ));

        let doc = r#"<osm><node id="4" lat="51.0" lon="-inf"/></osm>"#;
        assert!(matches!(parse_osm(doc), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn test_parse_interleaved_elements() {
        let doc = r#"<osm>
            <node id="1" lat="1.0" lon="1.0"/>
            <way id="5"><nd ref="1"/></way>
            <node id="2" lat="2.0" lon="2.0"/>
        </osm>"#;
        let data = parse_osm(doc).unwrap();
        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.ways.len(), 1);
    }

    #[test]
    fn test_parse_empty_osm_root() {
        let data = parse_osm("<osm version=\"0.6\"/>").unwrap();
        assert!(data.is_empty());
    }
}
