// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interface to the external shaping service.
//!
//! The engine does not itemize, shape or place text itself. It drives an
//! implementation of [`Shaper`], caches the results per paragraph, and lays
//! out the shaped output.

pub mod monospace;

use alloc::vec::Vec;

use smallvec::SmallVec;
use unicode_bidi::{BidiInfo, Level};

use crate::device::SurfaceHandle;
use crate::style::Font;

/// Script identifier reserved for "no particular script". Shapers must be
/// able to shape any text with it, typically with a fallback glyph.
pub const UNDEFINED_SCRIPT: u16 = 0;

/// Opaque analysis token produced by itemization and passed back to the
/// shaper for every item.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScriptAnalysis {
    /// Shaper-specific script identifier.
    pub script: u16,
    /// Bidirectional embedding level. Odd levels are right-to-left.
    pub bidi_level: u8,
}

impl ScriptAnalysis {
    /// Returns `true` if the item runs right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.bidi_level & 1 != 0
    }

    /// The same analysis with the script replaced by [`UNDEFINED_SCRIPT`].
    pub fn with_undefined_script(self) -> Self {
        Self {
            script: UNDEFINED_SCRIPT,
            ..self
        }
    }
}

/// A span of uniform script and direction, starting at `char_index` and
/// ending where the next item starts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptItem {
    /// Index of the first character of the item within the itemized text.
    pub char_index: usize,
    /// Analysis for the item.
    pub analysis: ScriptAnalysis,
}

/// Per-character break and caret properties.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LogicalAttributes(u8);

impl LogicalAttributes {
    const SOFT_BREAK: u8 = 1 << 0;
    const WHITESPACE: u8 = 1 << 1;
    const CHAR_STOP: u8 = 1 << 2;
    const WORD_STOP: u8 = 1 << 3;

    /// Creates attributes from individual flags.
    pub fn new(soft_break: bool, whitespace: bool, char_stop: bool, word_stop: bool) -> Self {
        let mut bits = 0;
        if soft_break {
            bits |= Self::SOFT_BREAK;
        }
        if whitespace {
            bits |= Self::WHITESPACE;
        }
        if char_stop {
            bits |= Self::CHAR_STOP;
        }
        if word_stop {
            bits |= Self::WORD_STOP;
        }
        Self(bits)
    }

    /// A line may be broken before this character.
    pub fn is_soft_break(self) -> bool {
        self.0 & Self::SOFT_BREAK != 0
    }

    /// The character is whitespace.
    pub fn is_whitespace(self) -> bool {
        self.0 & Self::WHITESPACE != 0
    }

    /// Either a break opportunity or whitespace.
    pub fn is_soft_break_or_whitespace(self) -> bool {
        self.0 & (Self::SOFT_BREAK | Self::WHITESPACE) != 0
    }

    /// A caret may be placed before this character.
    pub fn is_char_stop(self) -> bool {
        self.0 & Self::CHAR_STOP != 0
    }

    /// The character starts a word.
    pub fn is_word_stop(self) -> bool {
        self.0 & Self::WORD_STOP != 0
    }

    pub(crate) fn set_whitespace(&mut self) {
        self.0 |= Self::WHITESPACE;
    }

    /// Makes the character behave like a one-character word.
    pub(crate) fn set_word(&mut self) {
        self.0 = Self::SOFT_BREAK | Self::CHAR_STOP | Self::WORD_STOP;
    }
}

/// Opaque per-glyph attributes produced by shaping and consumed by placement.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphVisualAttributes(pub u16);

/// Placement offset of a glyph relative to its nominal pen position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphOffset {
    /// Horizontal offset.
    pub du: i32,
    /// Vertical offset.
    pub dv: i32,
}

/// Total advance of a run, split into leading, base and trailing parts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AbcWidth {
    /// Leading space before the run.
    pub a: i32,
    /// Width of the run itself.
    pub b: i32,
    /// Trailing space after the run.
    pub c: i32,
}

impl AbcWidth {
    /// The sum of all three components.
    pub fn total(&self) -> i32 {
        self.a + self.b + self.c
    }
}

/// Line metrics of a font on a given surface.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FontLineMetrics {
    /// Height of a line (ascent plus descent).
    pub height: i32,
    /// Distance from the baseline to the bottom of the line.
    pub descent: i32,
}

/// Failure reported by a [`Shaper`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShapeError {
    /// The output buffers were too small. The engine retries with larger
    /// buffers.
    BufferTooSmall,
    /// The font has no glyphs for the requested script. The engine retries
    /// once with [`UNDEFINED_SCRIPT`].
    ScriptNotInFont,
    /// Any other failure.
    Failed(&'static str),
}

impl core::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => f.write_str("output buffer too small"),
            Self::ScriptNotInFont => f.write_str("script not supported by font"),
            Self::Failed(reason) => f.write_str(reason),
        }
    }
}

impl core::error::Error for ShapeError {}

/// The external shaping service.
///
/// Cluster maps follow the usual convention: `clusters[i]` is the index,
/// relative to the shaped span, of the first glyph of the cluster containing
/// character `i`. Glyphs of right-to-left spans are stored in visual order, so
/// their cluster values decrease as the character index grows.
pub trait Shaper {
    /// Splits `chars` into items of uniform script and direction.
    ///
    /// Items must be non-empty, sorted, and the first must start at 0.
    /// Produces no items for empty input.
    fn itemize(
        &mut self,
        chars: &[char],
        right_to_left: bool,
        items: &mut Vec<ScriptItem>,
    ) -> Result<(), ShapeError>;

    /// Computes logical attributes for the characters of one item.
    fn break_text(
        &mut self,
        chars: &[char],
        analysis: &ScriptAnalysis,
        attributes: &mut [LogicalAttributes],
    ) -> Result<(), ShapeError>;

    /// Converts characters to glyphs, filling `clusters` (one entry per
    /// character) and returning the number of glyphs written.
    ///
    /// Returns [`ShapeError::BufferTooSmall`] if `glyphs` cannot hold the
    /// result.
    fn shape(
        &mut self,
        font: &Font,
        analysis: &ScriptAnalysis,
        chars: &[char],
        clusters: &mut [u16],
        glyphs: &mut [u16],
        visual_attributes: &mut [GlyphVisualAttributes],
    ) -> Result<usize, ShapeError>;

    /// Computes advances and offsets for shaped glyphs.
    fn place(
        &mut self,
        font: &Font,
        analysis: &ScriptAnalysis,
        glyphs: &[u16],
        visual_attributes: &[GlyphVisualAttributes],
        advances: &mut [i32],
        offsets: &mut [GlyphOffset],
    ) -> Result<AbcWidth, ShapeError>;

    /// Returns the line metrics of `font` on the given surface.
    fn font_line_metrics(
        &mut self,
        font: &Font,
        surface: SurfaceHandle,
    ) -> Result<FontLineMetrics, ShapeError>;

    /// Maps embedding levels of consecutive runs to a visual-to-logical order.
    fn visual_order(&mut self, levels: &[u8], visual_to_logical: &mut Vec<usize>) {
        let levels: SmallVec<[Level; 16]> = levels
            .iter()
            .map(|&level| Level::new(level).unwrap_or_else(|_| Level::ltr()))
            .collect();
        visual_to_logical.clear();
        visual_to_logical.extend(BidiInfo::reorder_visual(&levels));
    }
}
