// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic fixed-pitch shaper.
//!
//! Every character maps to exactly one glyph of the same advance. Hebrew and
//! Arabic characters are itemized as a separate right-to-left script. This is
//! useful for headless measurement and for testing layout without fonts.

use alloc::vec::Vec;

use super::{
    AbcWidth, FontLineMetrics, GlyphOffset, GlyphVisualAttributes, LogicalAttributes,
    ScriptAnalysis, ScriptItem, ShapeError, Shaper,
};
use crate::device::SurfaceHandle;
use crate::style::Font;

/// Script identifier used for left-to-right text.
pub const LATIN_SCRIPT: u16 = 1;
/// Script identifier used for right-to-left text.
pub const RTL_SCRIPT: u16 = 2;

/// Fixed-pitch [`Shaper`].
#[derive(Clone, Debug)]
pub struct MonospaceShaper {
    advance: i32,
    unsupported_script: Option<u16>,
    min_glyph_buffer: usize,
    shape_calls: usize,
    small_buffer_reports: usize,
    metric_queries: usize,
}

impl MonospaceShaper {
    /// Creates a shaper where every visible character advances by `advance`.
    pub fn new(advance: i32) -> Self {
        Self {
            advance,
            unsupported_script: None,
            min_glyph_buffer: 0,
            shape_calls: 0,
            small_buffer_reports: 0,
            metric_queries: 0,
        }
    }

    /// Makes [`Shaper::shape`] report [`ShapeError::ScriptNotInFont`] for
    /// `script`.
    pub fn with_unsupported_script(mut self, script: u16) -> Self {
        self.unsupported_script = Some(script);
        self
    }

    /// Makes [`Shaper::shape`] report [`ShapeError::BufferTooSmall`] unless
    /// the glyph buffer it is given holds at least `len` glyphs.
    pub fn with_min_glyph_buffer(mut self, len: usize) -> Self {
        self.min_glyph_buffer = len;
        self
    }

    /// Number of [`ShapeError::BufferTooSmall`] results so far.
    pub fn small_buffer_reports(&self) -> usize {
        self.small_buffer_reports
    }

    /// Number of successful [`Shaper::shape`] calls so far.
    pub fn shape_calls(&self) -> usize {
        self.shape_calls
    }

    /// Number of [`Shaper::font_line_metrics`] calls so far.
    pub fn metric_queries(&self) -> usize {
        self.metric_queries
    }

    fn is_rtl_char(ch: char) -> bool {
        matches!(ch, '\u{0590}'..='\u{08FF}' | '\u{FB1D}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}')
    }

    fn is_neutral(ch: char) -> bool {
        ch.is_whitespace() || ch.is_ascii_punctuation()
    }

    fn is_visible(ch: char) -> bool {
        !ch.is_control() || ch == '\t'
    }
}

impl Default for MonospaceShaper {
    fn default() -> Self {
        Self::new(8)
    }
}

impl Shaper for MonospaceShaper {
    fn itemize(
        &mut self,
        chars: &[char],
        right_to_left: bool,
        items: &mut Vec<ScriptItem>,
    ) -> Result<(), ShapeError> {
        items.clear();
        let base_level = u8::from(right_to_left);
        for (index, &ch) in chars.iter().enumerate() {
            let analysis = if Self::is_rtl_char(ch) {
                ScriptAnalysis {
                    script: RTL_SCRIPT,
                    bidi_level: 1,
                }
            } else if Self::is_neutral(ch) {
                match items.last() {
                    Some(item) => item.analysis,
                    None => ScriptAnalysis {
                        script: LATIN_SCRIPT,
                        bidi_level: base_level,
                    },
                }
            } else {
                ScriptAnalysis {
                    script: LATIN_SCRIPT,
                    bidi_level: if right_to_left { 2 } else { 0 },
                }
            };
            if items.last().map(|item| item.analysis) != Some(analysis) {
                items.push(ScriptItem {
                    char_index: index,
                    analysis,
                });
            }
        }
        Ok(())
    }

    fn break_text(
        &mut self,
        chars: &[char],
        _analysis: &ScriptAnalysis,
        attributes: &mut [LogicalAttributes],
    ) -> Result<(), ShapeError> {
        if attributes.len() < chars.len() {
            return Err(ShapeError::BufferTooSmall);
        }
        for (index, &ch) in chars.iter().enumerate() {
            // Tabs are not reported as whitespace.
            let whitespace = ch.is_whitespace() && ch != '\t';
            let after_space = index > 0 && chars[index - 1].is_whitespace();
            let soft_break = after_space && !ch.is_whitespace();
            attributes[index] =
                LogicalAttributes::new(soft_break, whitespace, true, index == 0 || soft_break);
        }
        Ok(())
    }

    fn shape(
        &mut self,
        _font: &Font,
        analysis: &ScriptAnalysis,
        chars: &[char],
        clusters: &mut [u16],
        glyphs: &mut [u16],
        visual_attributes: &mut [GlyphVisualAttributes],
    ) -> Result<usize, ShapeError> {
        if Some(analysis.script) == self.unsupported_script {
            return Err(ShapeError::ScriptNotInFont);
        }
        let count = chars.len();
        if glyphs.len() < count.max(self.min_glyph_buffer)
            || visual_attributes.len() < count
            || clusters.len() < count
        {
            self.small_buffer_reports += 1;
            return Err(ShapeError::BufferTooSmall);
        }
        if u16::try_from(count).is_err() {
            return Err(ShapeError::Failed("run too long"));
        }
        for (index, &ch) in chars.iter().enumerate() {
            // Glyphs of RTL runs are stored in visual order.
            let glyph_index = if analysis.is_rtl() {
                count - 1 - index
            } else {
                index
            };
            let visible = Self::is_visible(ch);
            glyphs[glyph_index] = if visible {
                u16::try_from(u32::from(ch)).unwrap_or(u16::MAX)
            } else {
                0
            };
            visual_attributes[glyph_index] = GlyphVisualAttributes(u16::from(visible));
            clusters[index] = u16::try_from(glyph_index).unwrap_or(u16::MAX);
        }
        self.shape_calls += 1;
        Ok(count)
    }

    fn place(
        &mut self,
        _font: &Font,
        _analysis: &ScriptAnalysis,
        glyphs: &[u16],
        visual_attributes: &[GlyphVisualAttributes],
        advances: &mut [i32],
        offsets: &mut [GlyphOffset],
    ) -> Result<AbcWidth, ShapeError> {
        if advances.len() < glyphs.len() || offsets.len() < glyphs.len() {
            return Err(ShapeError::BufferTooSmall);
        }
        let mut total = 0;
        for (index, attributes) in visual_attributes.iter().take(glyphs.len()).enumerate() {
            let advance = if attributes.0 != 0 { self.advance } else { 0 };
            advances[index] = advance;
            offsets[index] = GlyphOffset::default();
            total += advance;
        }
        Ok(AbcWidth {
            a: 0,
            b: total,
            c: 0,
        })
    }

    fn font_line_metrics(
        &mut self,
        font: &Font,
        _surface: SurfaceHandle,
    ) -> Result<FontLineMetrics, ShapeError> {
        self.metric_queries += 1;
        let size = i32::try_from(font.size).unwrap_or(i32::MAX / 2);
        Ok(FontLineMetrics {
            height: size + size / 4,
            descent: size / 4,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn itemize_splits_on_direction() {
        let mut shaper = MonospaceShaper::default();
        let mut items = vec![];
        shaper
            .itemize(&chars("ab \u{05D0}\u{05D1} cd"), false, &mut items)
            .unwrap();
        let starts: Vec<_> = items.iter().map(|item| item.char_index).collect();
        assert_eq!(starts, vec![0, 3, 6]);
        assert!(items[1].analysis.is_rtl());
        assert!(!items[2].analysis.is_rtl());
    }

    #[test]
    fn break_opportunities_follow_whitespace() {
        let mut shaper = MonospaceShaper::default();
        let text = chars("ab cd");
        let mut attributes = vec![LogicalAttributes::default(); text.len()];
        shaper
            .break_text(&text, &ScriptAnalysis::default(), &mut attributes)
            .unwrap();
        assert!(attributes[2].is_whitespace());
        assert!(attributes[3].is_soft_break());
        assert!(!attributes[1].is_soft_break_or_whitespace());
    }

    #[test]
    fn rtl_glyphs_are_reversed() {
        let mut shaper = MonospaceShaper::default();
        let text = chars("\u{05D0}\u{05D1}\u{05D2}");
        let analysis = ScriptAnalysis {
            script: RTL_SCRIPT,
            bidi_level: 1,
        };
        let mut clusters = [0_u16; 3];
        let mut glyphs = [0_u16; 3];
        let mut visual = [GlyphVisualAttributes::default(); 3];
        let count = shaper
            .shape(&Font::default(), &analysis, &text, &mut clusters, &mut glyphs, &mut visual)
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(clusters, [2, 1, 0]);
        assert_eq!(glyphs[0], 0x05D2);
    }

    #[test]
    fn small_buffers_are_reported() {
        let mut shaper = MonospaceShaper::default();
        let text = chars("abc");
        let mut clusters = [0_u16; 3];
        let mut glyphs = [0_u16; 2];
        let mut visual = [GlyphVisualAttributes::default(); 2];
        let result = shaper.shape(
            &Font::default(),
            &ScriptAnalysis::default(),
            &text,
            &mut clusters,
            &mut glyphs,
            &mut visual,
        );
        assert_eq!(result, Err(ShapeError::BufferTooSmall));
        assert_eq!(shaper.small_buffer_reports(), 1);
        assert_eq!(shaper.shape_calls(), 0);

        let mut shaper = MonospaceShaper::default().with_min_glyph_buffer(8);
        let mut glyphs = [0_u16; 4];
        let mut visual = [GlyphVisualAttributes::default(); 4];
        let result = shaper.shape(
            &Font::default(),
            &ScriptAnalysis::default(),
            &text,
            &mut clusters,
            &mut glyphs,
            &mut visual,
        );
        assert_eq!(result, Err(ShapeError::BufferTooSmall));
        assert_eq!(shaper.small_buffer_reports(), 1);
    }
}
