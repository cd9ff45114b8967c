// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use super::RecordingSurface;
use crate::document::Document;
use crate::geometry::{Point, Rect};
use crate::layout::{Layout, LayoutOptions, PaintOptions, SnapPosition};
use crate::shaping::monospace::MonospaceShaper;

/// Every character advances by this much in tests.
pub(crate) const ADVANCE: i32 = 10;

/// A document, a layout over it, and the services both need.
#[derive(Debug)]
pub(crate) struct TestEnv {
    pub(crate) document: Document,
    pub(crate) layout: Layout,
    pub(crate) shaper: MonospaceShaper,
    pub(crate) surface: RecordingSurface,
}

impl TestEnv {
    pub(crate) fn new(width: i32) -> Self {
        Self::with_options(LayoutOptions::default().with_width(width))
    }

    pub(crate) fn with_options(options: LayoutOptions) -> Self {
        Self {
            document: Document::new(),
            layout: Layout::new(options),
            shaper: MonospaceShaper::new(ADVANCE),
            surface: RecordingSurface::default(),
        }
    }

    pub(crate) fn with_text(width: i32, text: &str) -> Self {
        let mut env = Self::new(width);
        env.document.append_text(text).unwrap();
        env
    }

    pub(crate) fn update(&mut self) {
        self.layout
            .update(&mut self.document, &mut self.shaper, &mut self.surface)
            .unwrap();
    }

    pub(crate) fn paint(&mut self, clip: Rect, selection: Range<usize>) {
        self.paint_at(Point::new(0, 0), clip, selection);
    }

    pub(crate) fn paint_at(&mut self, origin: Point, clip: Rect, selection: Range<usize>) {
        self.layout
            .paint(
                &mut self.document,
                &mut self.shaper,
                &mut self.surface,
                origin,
                clip,
                &PaintOptions::default(),
                selection,
            )
            .unwrap();
    }

    pub(crate) fn snap(&mut self, x: i32, y: i32) -> SnapPosition {
        self.layout
            .snap_position_at_point(
                &mut self.document,
                &mut self.shaper,
                &mut self.surface,
                Point::new(0, 0),
                Point::new(x, y),
            )
            .unwrap()
    }

    /// Document character range of each line. Paragraphs must be cached.
    pub(crate) fn line_ranges(&self) -> Vec<Range<usize>> {
        self.layout
            .lines()
            .iter()
            .map(|line| {
                let paragraph = self
                    .layout
                    .cached_script_paragraph(line.paragraph_index)
                    .expect("paragraph of a line is cached");
                let base = paragraph.char_index();
                let runs = &paragraph.script_runs()[line.script_run_index..line.script_run_end()];
                match (runs.first(), runs.last()) {
                    (Some(first), Some(last)) => {
                        base + first.char_index_in_paragraph + line.truncated_leading
                            ..base + last.char_end_in_paragraph() - line.truncated_trailing
                    }
                    _ => base..base,
                }
            })
            .collect()
    }

    /// Text of each line, without the paragraph terminator.
    pub(crate) fn line_texts(&self) -> Vec<String> {
        self.line_ranges()
            .into_iter()
            .map(|range| {
                let text = self
                    .document
                    .text_range(range.start, range.len())
                    .unwrap();
                text.trim_end_matches('\n').into()
            })
            .collect()
    }
}
