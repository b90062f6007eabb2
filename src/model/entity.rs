// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Typed OSM entities: nodes, ways and relations.
//!
//! Entities are immutable once parsed. Ways and relations refer to other
//! entities by id rather than embedding them; references are resolved
//! against the currently loaded `MapData` at render time, and anything that
//! does not resolve is dropped there.

use serde::{Deserialize, Serialize};

// ============================================================================
// TAGS
// ============================================================================

/// A single `k=v` pair attached to an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The tag set of an entity, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<Tag>);

impl Tags {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Value of the first tag with this key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn push(&mut self, tag: Tag) {
        self.0.push(tag);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Tag>> for Tags {
    fn from(tags: Vec<Tag>) -> Self {
        Self(tags)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| Tag::new(k, v)).collect())
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Anything carrying a tag set can be matched against the style table
pub trait Tagged {
    fn tags(&self) -> &Tags;
}

// ============================================================================
// ENTITIES
// ============================================================================

/// A single geographic coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: Tags,
}

/// An ordered path of node references (a line, or an area when closed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Way {
    pub id: String,
    pub node_refs: Vec<String>,
    #[serde(default)]
    pub tags: Tags,
}

/// Kind of entity a relation member points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Node,
    Way,
    Relation,
    /// Anything this renderer does not know about; kept so it round-trips
    #[serde(untagged)]
    Other(String),
}

impl MemberKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "node" => Self::Node,
            "way" => Self::Way,
            "relation" => Self::Relation,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
            Self::Other(kind) => kind,
        }
    }
}

/// One typed member of a relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub kind: MemberKind,
    pub reference: String,
    pub role: String,
}

/// A named grouping of members (multipolygons, routes, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: String,
    pub members: Vec<Member>,
    #[serde(default)]
    pub tags: Tags,
}

impl Relation {
    /// Members that are rendered (only ways)
    pub fn way_members(&self) -> impl Iterator<Item = &Member> {
        self.members
            .iter()
            .filter(|member| member.kind == MemberKind::Way)
    }
}

impl Tagged for Node {
    fn tags(&self) -> &Tags {
        &self.tags
    }
}

impl Tagged for Way {
    fn tags(&self) -> &Tags {
        &self.tags
    }
}

impl Tagged for Relation {
    fn tags(&self) -> &Tags {
        &self.tags
    }
}

// ============================================================================
// COLLECTIONS
// ============================================================================

/// Which entity collection an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Node,
    Way,
    Relation,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Node, EntityKind::Way, EntityKind::Relation];
}

/// The three parsed entity collections of one region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapData {
    pub nodes: Vec<Node>,
    pub ways: Vec<Way>,
    pub relations: Vec<Relation>,
}

impl MapData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.ways.is_empty() && self.relations.is_empty()
    }

    pub fn counts(&self) -> EntityCounts {
        EntityCounts {
            nodes: self.nodes.len(),
            ways: self.ways.len(),
            relations: self.relations.len(),
        }
    }
}

/// Per-collection entity counts shown in the status line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub nodes: usize,
    pub ways: usize,
    pub relations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_get_first_match() {
        let tags: Tags = [("highway", "primary"), ("highway", "secondary")]
            .into_iter()
            .collect();
        assert_eq!(tags.get("highway"), Some("primary"));
        assert_eq!(tags.get("name"), None);
        assert!(tags.contains_key("highway"));
    }

    #[test]
    fn test_member_kind_parse() {
        assert_eq!(MemberKind::parse("way"), MemberKind::Way);
        assert_eq!(MemberKind::parse("node"), MemberKind::Node);
        assert_eq!(
            MemberKind::parse("area"),
            MemberKind::Other("area".to_string())
        );
        assert_eq!(MemberKind::parse("area").as_str(), "area");
    }

    #[test]
    fn test_way_members_ignores_other_kinds() {
        let relation = Relation {
            id: "r1".to_string(),
            members: vec![
                Member {
                    kind: MemberKind::Node,
                    reference: "n1".to_string(),
                    role: "label".to_string(),
                },
                Member {
                    kind: MemberKind::Way,
                    reference: "w1".to_string(),
                    role: "outer".to_string(),
                },
            ],
            tags: Tags::new(),
        };
        let refs: Vec<_> = relation.way_members().map(|m| m.reference.as_str()).collect();
        assert_eq!(refs, vec!["w1"]);
    }
}
