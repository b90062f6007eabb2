// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! OSM XML writer
//!
//! Serializes the modeled fields of a `MapData` back into an OSM document
//! that `parse_osm` reads into an identical value.

use super::entity::{MapData, Tags};
use super::parser::ParseError;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use std::io::Cursor;

/// Write a region as an OSM 0.6 XML document
pub fn to_osm_xml(data: &MapData) -> Result<String, ParseError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("osm");
    root.push_attribute(("version", "0.6"));
    root.push_attribute(("generator", "osm-canvas"));
    write(&mut writer, Event::Start(root))?;

    for node in &data.nodes {
        let lat = node.lat.to_string();
        let lon = node.lon.to_string();
        let mut elem = BytesStart::new("node");
        elem.push_attribute(("id", node.id.as_str()));
        elem.push_attribute(("lat", lat.as_str()));
        elem.push_attribute(("lon", lon.as_str()));
        write_element(&mut writer, elem, &node.tags, false, |_| Ok(()))?;
    }

    for way in &data.ways {
        let mut elem = BytesStart::new("way");
        elem.push_attribute(("id", way.id.as_str()));
        let has_children = !way.node_refs.is_empty();
        write_element(&mut writer, elem, &way.tags, has_children, |writer| {
            for node_ref in &way.node_refs {
                let mut nd = BytesStart::new("nd");
                nd.push_attribute(("ref", node_ref.as_str()));
                write(writer, Event::Empty(nd))?;
            }
            Ok(())
        })?;
    }

    for relation in &data.relations {
        let mut elem = BytesStart::new("relation");
        elem.push_attribute(("id", relation.id.as_str()));
        let has_children = !relation.members.is_empty();
        write_element(&mut writer, elem, &relation.tags, has_children, |writer| {
            for member in &relation.members {
                let mut m = BytesStart::new("member");
                m.push_attribute(("type", member.kind.as_str()));
                m.push_attribute(("ref", member.reference.as_str()));
                m.push_attribute(("role", member.role.as_str()));
                write(writer, Event::Empty(m))?;
            }
            Ok(())
        })?;
    }

    write(&mut writer, Event::End(BytesEnd::new("osm")))?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| ParseError::Write(e.to_string()))
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), ParseError> {
    writer
        .write_event(event)
        .map_err(|e| ParseError::Write(e.to_string()))
}

/// Write an entity element with its children followed by its tags.
/// Childless, tagless entities are written as empty elements.
fn write_element(
    writer: &mut XmlWriter,
    elem: BytesStart<'_>,
    tags: &Tags,
    has_children: bool,
    children: impl FnOnce(&mut XmlWriter) -> Result<(), ParseError>,
) -> Result<(), ParseError> {
    let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();

    if !has_children && tags.is_empty() {
        return write(writer, Event::Empty(elem));
    }

    write(writer, Event::Start(elem))?;
    children(writer)?;
    for tag in tags {
        let mut t = BytesStart::new("tag");
        t.push_attribute(("k", tag.key.as_str()));
        t.push_attribute(("v", tag.value.as_str()));
        write(writer, Event::Empty(t))?;
    }
    write(writer, Event::End(BytesEnd::new(name)))
}
