// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Rule-based style resolution.
//!
//! A `StyleTable` is an ordered list of `(Predicate, StyleDescriptor)`
//! pairs. Resolution walks the list in declaration order and returns the
//! first style whose predicate matches the entity's tags, so table order
//! encodes priority. The last rule is always a catch-all, which makes
//! resolution total.

pub mod color;
mod rules;

pub use color::{Paint, parse_hex_color};
pub use rules::default_rules;

use crate::model::{Tagged, Tags};

// ============================================================================
// PREDICATES
// ============================================================================

/// A test over an entity's tag set
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// Matches every entity
    Always,
    /// The key is present with any value
    Has(&'static str),
    /// The key has exactly this value
    Is(&'static str, &'static str),
    /// The key has one of these values
    OneOf(&'static str, &'static [&'static str]),
    /// Arbitrary test for combinations the variants above cannot express
    Custom(fn(&Tags) -> bool),
}

impl Predicate {
    pub fn matches(&self, tags: &Tags) -> bool {
        match *self {
            Self::Always => true,
            Self::Has(key) => tags.contains_key(key),
            Self::Is(key, value) => tags.get(key) == Some(value),
            Self::OneOf(key, values) => tags.get(key).is_some_and(|v| values.contains(&v)),
            Self::Custom(test) => test(tags),
        }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, Self::Always)
    }
}

// ============================================================================
// STYLE DESCRIPTORS
// ============================================================================

/// Resolved visual parameters for one entity
///
/// Colors are CSS-style hex strings; an empty string means "no color".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleDescriptor {
    /// Fill color, `None` for no fill
    pub fill_color: Option<&'static str>,
    pub stroke_color: &'static str,
    /// Whether closed paths are filled
    pub fill: bool,
    /// Layering order, lower drawn first
    pub z_index: i32,
    pub line_width: f64,
    /// Draw a wider background stroke beneath the main stroke
    pub casing: bool,
    pub casing_color: &'static str,
}

impl StyleDescriptor {
    /// Style of the catch-all rule: invisible at level 0
    pub const DEFAULT: Self = Self {
        fill_color: None,
        stroke_color: "",
        fill: false,
        z_index: 0,
        line_width: 1.0,
        casing: false,
        casing_color: "",
    };

    /// A filled area with a 1px outline
    pub const fn area(fill: &'static str, stroke: &'static str, z_index: i32) -> Self {
        Self {
            fill_color: Some(fill),
            stroke_color: stroke,
            fill: true,
            z_index,
            ..Self::DEFAULT
        }
    }

    /// An unfilled line
    pub const fn line(stroke: &'static str, line_width: f64, z_index: i32) -> Self {
        Self {
            stroke_color: stroke,
            z_index,
            line_width,
            ..Self::DEFAULT
        }
    }

    /// Add a casing stroke beneath the line
    pub const fn cased(self, casing_color: &'static str) -> Self {
        Self {
            casing: true,
            casing_color,
            ..self
        }
    }
}

impl Default for StyleDescriptor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ============================================================================
// RULE TABLE
// ============================================================================

/// One entry in the style table
#[derive(Debug, Clone, Copy)]
pub struct StyleRule {
    pub predicate: Predicate,
    pub style: StyleDescriptor,
}

impl StyleRule {
    pub const fn new(predicate: Predicate, style: StyleDescriptor) -> Self {
        Self { predicate, style }
    }
}

/// Ordered rule list with first-match semantics
#[derive(Debug, Clone)]
pub struct StyleTable {
    rules: Vec<StyleRule>,
    /// Parsed colors, one per rule
    paints: Vec<Paint>,
}

impl StyleTable {
    /// Build a table from rules in priority order.
    ///
    /// A catch-all rule with the default style is appended unless the
    /// last rule already matches everything.
    pub fn new(mut rules: Vec<StyleRule>) -> Self {
        let has_catch_all = rules
            .last()
            .is_some_and(|rule| rule.predicate.is_catch_all());
        if !has_catch_all {
            rules.push(StyleRule::new(Predicate::Always, StyleDescriptor::DEFAULT));
        }
        let paints = rules.iter().map(|rule| Paint::of(&rule.style)).collect();
        Self { rules, paints }
    }

    /// Resolve the style of an entity
    pub fn resolve<T: Tagged + ?Sized>(&self, entity: &T) -> &StyleDescriptor {
        self.resolve_tags(entity.tags())
    }

    /// Resolve the style of a bare tag set
    pub fn resolve_tags(&self, tags: &Tags) -> &StyleDescriptor {
        self.resolve_painted(tags).0
    }

    /// Resolve the style of an entity together with its parsed colors
    pub fn resolve_with_paint<T: Tagged + ?Sized>(&self, entity: &T) -> (&StyleDescriptor, &Paint) {
        self.resolve_painted(entity.tags())
    }

    fn resolve_painted(&self, tags: &Tags) -> (&StyleDescriptor, &Paint) {
        match self.rules.iter().position(|rule| rule.predicate.matches(tags)) {
            Some(index) => (&self.rules[index].style, &self.paints[index]),
            None => (&StyleDescriptor::DEFAULT, &Paint::NONE),
        }
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new(default_rules())
    }
}
