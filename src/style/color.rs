// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Hex color strings used by the style table

use super::StyleDescriptor;
use masonry::vello::peniko::Color;

/// The colors of a style, parsed once when the style table is built.
/// `None` means the part is not drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
    pub casing: Option<Color>,
}

impl Paint {
    pub const NONE: Self = Self {
        stroke: None,
        fill: None,
        casing: None,
    };

    pub fn of(style: &StyleDescriptor) -> Self {
        Self {
            stroke: parse_style_color(style.stroke_color),
            fill: style.fill_color.and_then(parse_style_color),
            casing: parse_style_color(style.casing_color),
        }
    }
}

fn parse_style_color(hex: &str) -> Option<Color> {
    let color = parse_hex_color(hex);
    if color.is_none() && !hex.is_empty() {
        tracing::warn!("Ignoring malformed style color {:?}", hex);
    }
    color
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into a color.
///
/// Returns `None` for the empty string (meaning "no color") and for
/// anything malformed.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    let short = |i: usize| {
        u8::from_str_radix(&digits[i..i + 1], 16)
            .ok()
            .map(|v| v * 17)
    };

    match digits.len() {
        3 => Some(Color::from_rgb8(short(0)?, short(1)?, short(2)?)),
        6 => Some(Color::from_rgb8(channel(0)?, channel(2)?, channel(4)?)),
        8 => Some(Color::from_rgba8(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)?,
        )),
        _ => None,
    }
}
