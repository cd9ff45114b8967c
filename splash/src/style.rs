// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rich styling support.

use alloc::sync::Arc;

/// An 8-bit RGBA color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
    /// Alpha component.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Font description handed to the shaping service.
///
/// The engine never interprets a font; it only uses it as a key for shaping
/// and metric lookups.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Font {
    /// Family name.
    pub family: Arc<str>,
    /// Size in device units.
    pub size: u32,
    /// Weight, 400 is regular.
    pub weight: u16,
    /// Italic flag.
    pub italic: bool,
}

impl Font {
    /// Creates a regular-weight, upright font.
    pub fn new(family: &str, size: u32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: 400,
            italic: false,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("sans-serif", 16)
    }
}

/// Determines where tab characters advance to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TabStopRuler {
    /// Distance between consecutive tab stops.
    pub pitch: i32,
    /// Minimum width of a tab. A tab that would be narrower than this
    /// advances to the following stop instead.
    pub min_width: i32,
}

impl TabStopRuler {
    /// Returns the position of the next tab stop after `x`.
    pub fn advance_to_next_tab_stop(&self, x: i32) -> i32 {
        let pitch = self.pitch.max(1);
        let mut next = (x.div_euclid(pitch) + 1) * pitch;
        if next - x < self.min_width {
            next += pitch;
        }
        next
    }
}

impl Default for TabStopRuler {
    fn default() -> Self {
        Self {
            pitch: 48,
            min_width: 2,
        }
    }
}

/// A formatting descriptor for a span of content.
///
/// Block-level properties (margins, indentation, wrapping, tab stops) are
/// taken from the style of the first run of a paragraph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Style {
    /// Font used for text.
    pub font: Font,
    /// Text color.
    pub color: Color,
    /// Left margin of the paragraph.
    pub left_margin: i32,
    /// Right margin of the paragraph.
    pub right_margin: i32,
    /// Additional indentation of the first line of the paragraph.
    pub first_line_indent: i32,
    /// Whether lines wrap at the layout width.
    pub word_wrap: bool,
    /// Tab stop positions.
    pub tab_stop_ruler: TabStopRuler,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font: Font::default(),
            color: Color::BLACK,
            left_margin: 0,
            right_margin: 0,
            first_line_indent: 0,
            word_wrap: true,
            tab_stop_ruler: TabStopRuler::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_stops() {
        let ruler = TabStopRuler {
            pitch: 40,
            min_width: 4,
        };
        assert_eq!(ruler.advance_to_next_tab_stop(0), 40);
        assert_eq!(ruler.advance_to_next_tab_stop(10), 40);
        assert_eq!(ruler.advance_to_next_tab_stop(37), 80);
        assert_eq!(ruler.advance_to_next_tab_stop(40), 80);
    }
}
