// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line breaking.

use crate::buffer::GrowableBuffer;
use crate::error::Result;
use crate::script::ScriptParagraph;
use crate::shaping::AbcWidth;
use crate::style::Style;

/// One visual line, covering part of one paragraph's script runs.
///
/// When a script run is split across lines, `truncated_leading` counts the
/// characters of the first run that belong to the previous line and
/// `truncated_trailing` counts the characters of the last run that belong to
/// the next line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptLine {
    /// Top of the line.
    pub y: i32,
    /// Start of the line, measured from the leading edge of the layout.
    pub x: i32,
    /// Height of the line.
    pub height: i32,
    /// Distance from the baseline to the bottom of the line.
    pub descent: i32,
    /// Index of the paragraph the line belongs to.
    pub paragraph_index: usize,
    /// First script run of the line, within the paragraph.
    pub script_run_index: usize,
    /// Number of script runs on the line. Zero for an empty paragraph.
    pub script_run_count: usize,
    /// Characters of the first run laid out on previous lines.
    pub truncated_leading: usize,
    /// Characters of the last run laid out on following lines.
    pub truncated_trailing: usize,
}

impl ScriptLine {
    /// Distance from the top of the line to the baseline.
    pub fn ascent(&self) -> i32 {
        self.height - self.descent
    }

    /// One past the last script run of the line.
    pub fn script_run_end(&self) -> usize {
        self.script_run_index + self.script_run_count
    }

    /// Bottom of the line (exclusive).
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// A position between characters: before character `char` of script run `run`.
/// The end of the paragraph is `run == run_count, char == 0`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Position {
    run: usize,
    char: usize,
}

pub(super) struct LineBreaker<'a> {
    pub(super) paragraph: &'a mut ScriptParagraph,
    pub(super) style: &'a Style,
    pub(super) paragraph_index: usize,
    pub(super) width: i32,
    pub(super) min_line_height: i32,
    pub(super) right_to_left: bool,
}

impl LineBreaker<'_> {
    /// Appends the lines of the paragraph, starting at `*y` and advancing it
    /// past the last line.
    pub(super) fn append_lines(
        &mut self,
        lines: &mut GrowableBuffer<ScriptLine>,
        y: &mut i32,
    ) -> Result<()> {
        let run_count = self.paragraph.script_runs().len();
        let style = self.style;
        let mut line = ScriptLine {
            y: *y,
            x: style.left_margin + style.first_line_indent,
            paragraph_index: self.paragraph_index,
            ..ScriptLine::default()
        };
        if run_count == 0 {
            line.height = self.min_line_height;
            *y += line.height;
            lines.push(line)?;
            return Ok(());
        }

        let max_x = self.width - style.right_margin - style.left_margin;
        if self.fits_on_one_line(max_x) {
            self.push_line(
                lines,
                y,
                line.x,
                Position { run: 0, char: 0 },
                Position {
                    run: run_count,
                    char: 0,
                },
            )?;
            return Ok(());
        }

        let mut start = Position { run: 0, char: 0 };
        let mut indent = style.first_line_indent;
        loop {
            let end = self.find_line_end(start, indent, max_x);
            self.push_line(lines, y, style.left_margin + indent, start, end)?;
            if end.run >= run_count {
                return Ok(());
            }
            start = end;
            indent = 0;
        }
    }

    fn fits_on_one_line(&self, max_x: i32) -> bool {
        let runs = self.paragraph.script_runs();
        if runs.iter().any(|run| run.requires_tab_expansion()) {
            return false;
        }
        if !self.style.word_wrap {
            return true;
        }
        let total: i32 = runs.iter().map(|run| run.abc.total()).sum();
        self.style.first_line_indent + total <= max_x
    }

    /// Walks clusters from `start` until the line overflows, returning where
    /// the next line starts.
    fn find_line_end(&mut self, start: Position, indent: i32, max_x: i32) -> Position {
        let run_count = self.paragraph.script_runs().len();
        let mut x = indent;
        let mut opportunity = None;
        let mut position = start;
        while position.run < run_count {
            if self.paragraph.script_runs()[position.run].requires_tab_expansion() {
                self.expand_tab(position.run, x);
            }
            let run = self.paragraph.script_runs()[position.run];
            while position.char < run.char_count() {
                let paragraph_char = run.char_index_in_paragraph + position.char;
                let (chars, width) = if run.is_object() {
                    (position.char..position.char + 1, run.abc.total())
                } else {
                    let (chars, glyphs) = self.paragraph.cluster_at(&run, position.char);
                    let width: i32 = self.paragraph.advances()[glyphs].iter().sum();
                    (chars, width)
                };
                let attributes = self.paragraph.logical_attributes();
                if position != start
                    && attributes[paragraph_char].is_soft_break_or_whitespace()
                    && !attributes[paragraph_char - 1].is_whitespace()
                {
                    opportunity = Some(position);
                }
                x += width;
                if self.style.word_wrap && x > max_x {
                    let end = match opportunity {
                        Some(opportunity) => opportunity,
                        // At least one cluster goes on every line.
                        None if position == start => self.normalize(Position {
                            run: position.run,
                            char: chars.end,
                        }),
                        None => position,
                    };
                    return self.skip_hanging_whitespace(end);
                }
                position.char = chars.end;
            }
            position = Position {
                run: position.run + 1,
                char: 0,
            };
        }
        position
    }

    /// Widens the tab of a tab run so that it ends on the next tab stop after
    /// `x`. Tabs running against the layout direction keep their width.
    fn expand_tab(&mut self, run_index: usize, x: i32) {
        let run = self.paragraph.script_runs()[run_index];
        if run.analysis.is_rtl() != self.right_to_left {
            return;
        }
        let width = self.style.tab_stop_ruler.advance_to_next_tab_stop(x) - x;
        let glyphs = run.glyph_index_in_paragraph..run.glyph_end_in_paragraph();
        if let Some((first, rest)) = self.paragraph.advances.as_mut_slice()[glyphs].split_first_mut() {
            *first = width;
            rest.fill(0);
        }
        self.paragraph.script_runs.as_mut_slice()[run_index].abc = AbcWidth {
            a: 0,
            b: width,
            c: 0,
        };
    }

    /// Moves a break past whitespace so that it hangs at the end of the line.
    fn skip_hanging_whitespace(&self, mut position: Position) -> Position {
        let runs = self.paragraph.script_runs();
        let attributes = self.paragraph.logical_attributes();
        while let Some(run) = runs.get(position.run) {
            if run.analysis.is_rtl() != self.right_to_left
                || !attributes[run.char_index_in_paragraph + position.char].is_whitespace()
            {
                break;
            }
            position = self.normalize(Position {
                run: position.run,
                char: position.char + 1,
            });
        }
        position
    }

    fn normalize(&self, position: Position) -> Position {
        match self.paragraph.script_runs().get(position.run) {
            Some(run) if position.char >= run.char_count() => Position {
                run: position.run + 1,
                char: 0,
            },
            _ => position,
        }
    }

    fn push_line(
        &self,
        lines: &mut GrowableBuffer<ScriptLine>,
        y: &mut i32,
        x: i32,
        start: Position,
        end: Position,
    ) -> Result<()> {
        let runs = self.paragraph.script_runs();
        let (last, truncated_trailing) = if end.char == 0 {
            (end.run - 1, 0)
        } else {
            (end.run, runs[end.run].char_count() - end.char)
        };
        let mut ascent = self.min_line_height;
        let mut descent = 0;
        for run in &runs[start.run..=last] {
            ascent = ascent.max(run.ascent() + run.top_margin);
            descent = descent.max(run.descent + run.bottom_margin);
        }
        let line = ScriptLine {
            y: *y,
            x,
            height: ascent + descent,
            descent,
            paragraph_index: self.paragraph_index,
            script_run_index: start.run,
            script_run_count: last + 1 - start.run,
            truncated_leading: start.char,
            truncated_trailing,
        };
        *y += line.height;
        lines.push(line)?;
        Ok(())
    }
}
