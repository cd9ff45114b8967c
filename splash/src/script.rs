// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shaped representation of paragraphs.

use core::ops::Range;

use crate::buffer::GrowableBuffer;
use crate::document::Run;
use crate::error::Result;
use crate::shaping::{AbcWidth, GlyphOffset, GlyphVisualAttributes, LogicalAttributes, ScriptAnalysis};

/// One shaped sub-span of a [`Run`].
///
/// Character and glyph positions are relative to the owning
/// [`ScriptParagraph`]. Sibling runs cover contiguous, non-overlapping
/// ranges.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptRun {
    run: Run,
    /// Analysis returned by itemization.
    pub analysis: ScriptAnalysis,
    /// First character of the run within its paragraph.
    pub char_index_in_paragraph: usize,
    /// First glyph of the run within its paragraph.
    pub glyph_index_in_paragraph: usize,
    /// Number of glyphs. Always 0 for object runs.
    pub glyph_count: usize,
    /// Height of the run's line box.
    pub height: i32,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: i32,
    /// Extra space above the line box.
    pub top_margin: i32,
    /// Extra space below the line box.
    pub bottom_margin: i32,
    /// Total advance, split into leading, base and trailing parts.
    pub abc: AbcWidth,
}

impl ScriptRun {
    pub(crate) fn new(
        run: Run,
        analysis: ScriptAnalysis,
        char_index_in_paragraph: usize,
        char_count: usize,
    ) -> Result<Self> {
        let mut run = run;
        if run.is_text() {
            run.set_char_count(char_count)?;
        }
        Ok(Self {
            run,
            analysis,
            char_index_in_paragraph,
            ..Self::default()
        })
    }

    /// The document run this script run was split from, with the character
    /// count of this part.
    pub fn run(&self) -> Run {
        self.run
    }

    /// Number of characters.
    pub fn char_count(&self) -> usize {
        self.run.char_count()
    }

    /// One past the last character within the paragraph.
    pub fn char_end_in_paragraph(&self) -> usize {
        self.char_index_in_paragraph + self.char_count()
    }

    /// One past the last glyph within the paragraph.
    pub fn glyph_end_in_paragraph(&self) -> usize {
        self.glyph_index_in_paragraph + self.glyph_count
    }

    /// Index of the run's style.
    pub fn style_index(&self) -> usize {
        self.run.style_index()
    }

    /// Returns `true` for embedded object runs.
    pub fn is_object(&self) -> bool {
        self.run.is_object()
    }

    /// Returns `true` if the run's tab is expanded during layout.
    pub fn requires_tab_expansion(&self) -> bool {
        self.run.requires_tab_expansion()
    }

    /// Distance from the top of the line box to the baseline.
    pub fn ascent(&self) -> i32 {
        self.height - self.descent
    }
}

/// Shaping output for one paragraph.
///
/// Per-character data (cluster map, logical attributes) and per-glyph data
/// (glyphs, visual attributes, advances, offsets) are stored in growable
/// buffers that are reused when the cache reassigns the paragraph.
/// Cluster values are relative to the first glyph of the owning script run.
#[derive(Clone, Debug)]
pub struct ScriptParagraph {
    pub(crate) char_index: usize,
    pub(crate) char_count: usize,
    pub(crate) clusters: GrowableBuffer<u16>,
    pub(crate) logical_attributes: GrowableBuffer<LogicalAttributes>,
    pub(crate) script_runs: GrowableBuffer<ScriptRun>,
    pub(crate) glyphs: GrowableBuffer<u16>,
    pub(crate) visual_attributes: GrowableBuffer<GlyphVisualAttributes>,
    pub(crate) advances: GrowableBuffer<i32>,
    pub(crate) offsets: GrowableBuffer<GlyphOffset>,
}

impl ScriptParagraph {
    /// Creates an empty paragraph. Nothing is allocated until it is shaped.
    pub fn new(initial_chars: usize, initial_script_runs: usize) -> Self {
        let initial_glyphs = initial_chars * 3 / 2 + 16;
        Self {
            char_index: 0,
            char_count: 0,
            clusters: GrowableBuffer::new(initial_chars),
            logical_attributes: GrowableBuffer::new(initial_chars),
            script_runs: GrowableBuffer::new(initial_script_runs),
            glyphs: GrowableBuffer::new(initial_glyphs),
            visual_attributes: GrowableBuffer::new(initial_glyphs),
            advances: GrowableBuffer::new(initial_glyphs),
            offsets: GrowableBuffer::new(initial_glyphs),
        }
    }

    /// Document index of the paragraph's first character.
    pub fn char_index(&self) -> usize {
        self.char_index
    }

    /// Number of characters.
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Number of glyphs over all runs.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// The script runs in logical order.
    pub fn script_runs(&self) -> &[ScriptRun] {
        self.script_runs.as_slice()
    }

    /// Cluster map, one entry per character.
    pub fn clusters(&self) -> &[u16] {
        self.clusters.as_slice()
    }

    /// Logical attributes, one entry per character.
    pub fn logical_attributes(&self) -> &[LogicalAttributes] {
        self.logical_attributes.as_slice()
    }

    /// Glyph identifiers.
    pub fn glyphs(&self) -> &[u16] {
        self.glyphs.as_slice()
    }

    /// Glyph advances. Tab glyphs hold their expanded width.
    pub fn advances(&self) -> &[i32] {
        self.advances.as_slice()
    }

    /// Glyph offsets.
    pub fn offsets(&self) -> &[GlyphOffset] {
        self.offsets.as_slice()
    }

    /// Forgets previous contents and prepares per-character storage for a
    /// paragraph.
    pub(crate) fn reset(&mut self, char_index: usize, char_count: usize) -> Result<()> {
        self.char_index = char_index;
        self.char_count = char_count;
        self.script_runs.truncate(0);
        self.glyphs.truncate(0);
        self.visual_attributes.truncate(0);
        self.advances.truncate(0);
        self.offsets.truncate(0);
        self.clusters.truncate(0);
        self.logical_attributes.truncate(0);
        self.clusters.grow_by(char_count)?;
        self.logical_attributes.grow_by(char_count)?;
        Ok(())
    }

    /// Releases all storage.
    pub(crate) fn free(&mut self) {
        self.char_index = 0;
        self.char_count = 0;
        self.clusters.clear();
        self.logical_attributes.clear();
        self.script_runs.clear();
        self.glyphs.clear();
        self.visual_attributes.clear();
        self.advances.clear();
        self.offsets.clear();
    }

    /// Makes room for `capacity` glyphs, keeping glyphs already shaped.
    pub(crate) fn ensure_glyph_capacity(&mut self, capacity: usize) -> Result<()> {
        self.glyphs.ensure_capacity(capacity)?;
        self.visual_attributes.ensure_capacity(capacity)?;
        self.advances.ensure_capacity(capacity)?;
        self.offsets.ensure_capacity(capacity)
    }

    /// Commits `count` glyphs written past the current glyph count.
    pub(crate) fn commit_glyphs(&mut self, count: usize) {
        let len = self.glyphs.len() + count;
        self.glyphs.set_len(len);
        self.visual_attributes.set_len(len);
        self.advances.set_len(len);
        self.offsets.set_len(len);
    }

    /// Returns the cluster containing character `char_offset` of `run`: the
    /// run-relative character range and the paragraph glyph range.
    pub fn cluster_at(&self, run: &ScriptRun, char_offset: usize) -> (Range<usize>, Range<usize>) {
        let clusters = &self.clusters()[run.char_index_in_paragraph..run.char_end_in_paragraph()];
        let value = clusters[char_offset];
        let mut start = char_offset;
        while start > 0 && clusters[start - 1] == value {
            start -= 1;
        }
        let mut end = char_offset + 1;
        while end < clusters.len() && clusters[end] == value {
            end += 1;
        }
        // Glyphs of right-to-left runs are stored in visual order, so the
        // cluster ends where the logically preceding cluster starts.
        let glyph_end = if run.analysis.is_rtl() {
            start.checked_sub(1).map(|prev| usize::from(clusters[prev]))
        } else {
            clusters.get(end).map(|&next| usize::from(next))
        };
        let glyph_start = usize::from(value).min(run.glyph_count);
        let glyph_end = glyph_end.unwrap_or(run.glyph_count).clamp(glyph_start, run.glyph_count);
        let base = run.glyph_index_in_paragraph;
        (start..end, base + glyph_start..base + glyph_end)
    }

    /// Measures a text run with characters cut off at either end, returning
    /// the width and the paragraph glyph range that remains.
    ///
    /// Untruncated runs report their total advance.
    pub fn measure_text_run(
        &self,
        run: &ScriptRun,
        truncated_leading: usize,
        truncated_trailing: usize,
    ) -> (i32, Range<usize>) {
        let full = run.glyph_index_in_paragraph..run.glyph_end_in_paragraph();
        if truncated_leading == 0 && truncated_trailing == 0 {
            return (run.abc.total(), full);
        }
        let char_count = run.char_count();
        let remaining = truncated_leading..char_count.saturating_sub(truncated_trailing);
        if remaining.is_empty() {
            return (0, full.start..full.start);
        }
        let (_, first) = self.cluster_at(run, remaining.start);
        let (_, last) = self.cluster_at(run, remaining.end - 1);
        let range = if run.analysis.is_rtl() {
            last.start..first.end
        } else {
            first.start..last.end
        };
        let range = range.start..range.end.max(range.start);
        let width = self.advances()[range.clone()].iter().sum();
        (width, range)
    }
}
