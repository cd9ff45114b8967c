// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing.

use core::ops::Range;

use super::Layout;
use crate::device::{DeviceContext, DrawingSurface};
use crate::document::Document;
use crate::error::Result;
use crate::geometry::Point;
use crate::script::{ScriptParagraph, ScriptRun};
use crate::shaping::Shaper;

/// How a point relates to the character it snapped to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SnapKind {
    /// The point is before the character, e.g. left of a line's start.
    Leading,
    /// The point is on the character.
    Exact,
    /// The point is after the character, e.g. past the end of a line or
    /// below the last line.
    Trailing,
}

/// The result of [`Layout::snap_position_at_point`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SnapPosition {
    /// How the point relates to the character.
    pub kind: SnapKind,
    /// Document index of the character.
    pub char_index: usize,
}

impl SnapPosition {
    const fn new(kind: SnapKind, char_index: usize) -> Self {
        Self { kind, char_index }
    }
}

impl Layout {
    /// Finds the character under `point` for a layout drawn at `origin`.
    ///
    /// The layout is brought up to date first. Points above the layout snap to
    /// the leading edge of the first character, points below or past the end
    /// of a line to the trailing edge of the last character they pass.
    pub fn snap_position_at_point<S: Shaper + ?Sized>(
        &mut self,
        document: &mut Document,
        shaper: &mut S,
        surface: &mut dyn DrawingSurface,
        origin: Point,
        point: Point,
    ) -> Result<SnapPosition> {
        let mut dc = DeviceContext::acquire(surface);
        self.refresh(document, shaper, &mut dc)?;

        let right_to_left = self.current_right_to_left;
        // Pixel columns are mirrored, so the rightmost column maps to 0.
        let x = if right_to_left {
            self.current_width - 1 - (point.x - origin.x)
        } else {
            point.x - origin.x
        };
        let y = point.y - origin.y;
        if y < 0 {
            return Ok(SnapPosition::new(SnapKind::Leading, 0));
        }
        let fallback = match document.char_count() {
            0 => SnapPosition::new(SnapKind::Leading, 0),
            count => SnapPosition::new(SnapKind::Trailing, count - 1),
        };
        let Some(line) = self.line_at_y(y).map(|index| self.lines()[index]) else {
            return Ok(fallback);
        };
        if line.script_run_count == 0 {
            return Ok(fallback);
        }

        let slot = self.laid_out_paragraph(document, line.paragraph_index, shaper, &mut dc)?;
        self.order_runs(slot, &line, shaper);
        let paragraph = &self.cache[slot];
        let runs = &paragraph.script_runs()[line.script_run_index..line.script_run_end()];
        let base = paragraph.char_index();
        if x < line.x {
            let char_index = runs[0].char_index_in_paragraph + line.truncated_leading;
            return Ok(SnapPosition::new(SnapKind::Leading, base + char_index));
        }

        let count = runs.len();
        let mut run_x = line.x;
        for visual in 0..count {
            let order = if right_to_left { count - 1 - visual } else { visual };
            let logical = self.visual_to_logical.get(order).copied().unwrap_or(order);
            let run = &runs[logical];
            let leading = if logical == 0 { line.truncated_leading } else { 0 };
            let trailing = if logical == count - 1 {
                line.truncated_trailing
            } else {
                0
            };
            let (width, glyphs) = if run.is_object() {
                (run.abc.total(), 0..0)
            } else {
                paragraph.measure_text_run(run, leading, trailing)
            };
            if x < run_x + width {
                let char_index = if run.is_object() {
                    run.char_index_in_paragraph
                } else {
                    let offset = x - run_x;
                    // Glyphs are stored left to right while `x` grows from
                    // the leading edge.
                    let offset = if right_to_left { width - 1 - offset } else { offset };
                    char_at_offset(paragraph, run, leading, trailing, glyphs, offset)
                };
                return Ok(SnapPosition::new(SnapKind::Exact, base + char_index));
            }
            run_x += width;
        }
        let last = &runs[count - 1];
        let char_index = last.char_end_in_paragraph() - 1 - line.truncated_trailing;
        Ok(SnapPosition::new(SnapKind::Trailing, base + char_index))
    }
}

/// Returns the paragraph index of the character whose glyphs cover `offset`,
/// measured from the left edge of the run's remaining glyphs.
fn char_at_offset(
    paragraph: &ScriptParagraph,
    run: &ScriptRun,
    leading: usize,
    trailing: usize,
    glyphs: Range<usize>,
    offset: i32,
) -> usize {
    let advances = paragraph.advances();
    let mut edge = 0;
    let mut hit = glyphs.start;
    for glyph in glyphs {
        hit = glyph;
        edge += advances[glyph];
        if offset < edge {
            break;
        }
    }
    let end = run.char_count() - trailing;
    let mut char = leading;
    while char < end {
        let (chars, cluster_glyphs) = paragraph.cluster_at(run, char);
        if cluster_glyphs.contains(&hit) {
            return run.char_index_in_paragraph + char;
        }
        char = chars.end;
    }
    run.char_index_in_paragraph + leading
}
