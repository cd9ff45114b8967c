// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use crate::device::{DrawingSurface, GlyphRun, SurfaceHandle};
use crate::geometry::{Point, Rect};
use crate::style::{Color, Font};

/// A call made on a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Event {
    SelectFont(Font),
    SelectPen(Color),
    SelectBrush(Color),
    TextColor(Color),
    Clip(Option<Rect>),
    Fill(Rect),
    Glyphs { origin: Point, glyphs: Vec<u16> },
}

/// Records every drawing call and checks handle bookkeeping.
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub(crate) events: Vec<Event>,
    pub(crate) acquired: u32,
    pub(crate) released: u32,
    outstanding: Option<SurfaceHandle>,
}

impl RecordingSurface {
    pub(crate) fn fills(&self) -> Vec<Rect> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Fill(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn glyph_runs(&self) -> Vec<(Point, Vec<u16>)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Glyphs { origin, glyphs } => Some((*origin, glyphs.clone())),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }
}

impl DrawingSurface for RecordingSurface {
    fn acquire_handle(&mut self) -> SurfaceHandle {
        assert!(self.outstanding.is_none(), "handle acquired twice");
        self.acquired += 1;
        let handle = SurfaceHandle(u64::from(self.acquired));
        self.outstanding = Some(handle);
        handle
    }

    fn release_handle(&mut self, handle: SurfaceHandle) {
        assert_eq!(self.outstanding.take(), Some(handle), "released a foreign handle");
        self.released += 1;
    }

    fn select_font(&mut self, font: &Font) {
        self.events.push(Event::SelectFont(font.clone()));
    }

    fn select_pen(&mut self, color: Color) {
        self.events.push(Event::SelectPen(color));
    }

    fn select_brush(&mut self, color: Color) {
        self.events.push(Event::SelectBrush(color));
    }

    fn set_text_color(&mut self, color: Color) {
        self.events.push(Event::TextColor(color));
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.events.push(Event::Clip(clip));
    }

    fn fill_rect(&mut self, rect: Rect) {
        assert!(!rect.is_empty(), "filled an empty rectangle");
        self.events.push(Event::Fill(rect));
    }

    fn draw_glyph_run(&mut self, run: &GlyphRun<'_>) {
        assert!(!run.glyphs.is_empty(), "drew an empty glyph run");
        assert_eq!(run.glyphs.len(), run.advances.len(), "one advance per glyph");
        assert_eq!(run.glyphs.len(), run.offsets.len(), "one offset per glyph");
        self.events.push(Event::Glyphs {
            origin: run.origin,
            glyphs: run.glyphs.to_vec(),
        });
    }
}
