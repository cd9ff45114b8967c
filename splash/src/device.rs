// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing surface access for a single pass.

use core::fmt;

use hashbrown::HashMap;

use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::shaping::{FontLineMetrics, GlyphOffset, ScriptAnalysis, Shaper};
use crate::style::{Color, Font};

/// Opaque handle to a drawing surface, valid between acquisition and release.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// A positioned run of shaped glyphs.
#[derive(Copy, Clone, Debug)]
pub struct GlyphRun<'a> {
    /// Top-left corner of the run's line box.
    pub origin: Point,
    /// Analysis the glyphs were shaped with.
    pub analysis: ScriptAnalysis,
    /// Glyph identifiers, in visual order.
    pub glyphs: &'a [u16],
    /// Advance of each glyph.
    pub advances: &'a [i32],
    /// Placement offset of each glyph.
    pub offsets: &'a [GlyphOffset],
}

/// A device the engine can draw on.
///
/// Implemented by the hosting control. The engine only draws through a
/// [`DeviceContext`].
pub trait DrawingSurface {
    /// Acquires the device handle for the duration of a pass.
    fn acquire_handle(&mut self) -> SurfaceHandle;
    /// Releases a handle returned by [`acquire_handle`](Self::acquire_handle).
    fn release_handle(&mut self, handle: SurfaceHandle);
    /// Selects the font used by subsequent glyph runs.
    fn select_font(&mut self, font: &Font);
    /// Selects the pen color.
    fn select_pen(&mut self, color: Color);
    /// Selects the brush color used by [`fill_rect`](Self::fill_rect).
    fn select_brush(&mut self, color: Color);
    /// Sets the color of subsequent glyph runs.
    fn set_text_color(&mut self, color: Color);
    /// Restricts drawing to `clip`, or removes the restriction.
    fn set_clip(&mut self, clip: Option<Rect>);
    /// Fills a rectangle with the current brush.
    fn fill_rect(&mut self, rect: Rect);
    /// Draws a glyph run with the current font and text color.
    fn draw_glyph_run(&mut self, run: &GlyphRun<'_>);
}

/// A surface that draws nothing, for measurement-only passes.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSurface;

impl DrawingSurface for NullSurface {
    fn acquire_handle(&mut self) -> SurfaceHandle {
        SurfaceHandle::default()
    }
    fn release_handle(&mut self, _: SurfaceHandle) {}
    fn select_font(&mut self, _: &Font) {}
    fn select_pen(&mut self, _: Color) {}
    fn select_brush(&mut self, _: Color) {}
    fn set_text_color(&mut self, _: Color) {}
    fn set_clip(&mut self, _: Option<Rect>) {}
    fn fill_rect(&mut self, _: Rect) {}
    fn draw_glyph_run(&mut self, _: &GlyphRun<'_>) {}
}

/// Scoped access to a [`DrawingSurface`] for one layout or paint pass.
///
/// The surface handle is acquired on construction and released on drop, on
/// every exit path. Line metrics are cached per distinct font seen during the
/// pass.
pub struct DeviceContext<'a> {
    surface: &'a mut dyn DrawingSurface,
    handle: SurfaceHandle,
    metrics: HashMap<Font, FontLineMetrics>,
    selected_font: Option<Font>,
}

impl<'a> DeviceContext<'a> {
    /// Acquires `surface` for the lifetime of the returned context.
    pub fn acquire(surface: &'a mut dyn DrawingSurface) -> Self {
        let handle = surface.acquire_handle();
        Self {
            surface,
            handle,
            metrics: HashMap::new(),
            selected_font: None,
        }
    }

    /// The acquired handle.
    pub fn handle(&self) -> SurfaceHandle {
        self.handle
    }

    /// Returns line metrics of `font`, querying the shaper only the first
    /// time a font is seen in this pass.
    pub fn font_metrics<S: Shaper + ?Sized>(
        &mut self,
        font: &Font,
        shaper: &mut S,
    ) -> Result<FontLineMetrics> {
        if let Some(metrics) = self.metrics.get(font) {
            return Ok(*metrics);
        }
        let metrics = shaper.font_line_metrics(font, self.handle)?;
        self.metrics.insert(font.clone(), metrics);
        Ok(metrics)
    }

    /// Selects `font` on the surface if it isn't already, and returns its
    /// line metrics.
    pub fn select_font<S: Shaper + ?Sized>(
        &mut self,
        font: &Font,
        shaper: &mut S,
    ) -> Result<FontLineMetrics> {
        if self.selected_font.as_ref() != Some(font) {
            self.surface.select_font(font);
            self.selected_font = Some(font.clone());
        }
        self.font_metrics(font, shaper)
    }

    /// Sets the text color.
    pub fn set_text_color(&mut self, color: Color) {
        self.surface.set_text_color(color);
    }

    /// Selects the pen color.
    pub fn select_pen(&mut self, color: Color) {
        self.surface.select_pen(color);
    }

    /// Selects the brush color.
    pub fn select_brush(&mut self, color: Color) {
        self.surface.select_brush(color);
    }

    /// Sets or removes the clip rectangle.
    pub fn set_clip(&mut self, clip: Option<Rect>) {
        self.surface.set_clip(clip);
    }

    /// Fills `rect` with the current brush. Empty rectangles are skipped.
    pub fn fill_rect(&mut self, rect: Rect) {
        if !rect.is_empty() {
            self.surface.fill_rect(rect);
        }
    }

    /// Draws a glyph run. Runs without glyphs are skipped.
    pub fn draw_glyph_run(&mut self, run: &GlyphRun<'_>) {
        if !run.glyphs.is_empty() {
            self.surface.draw_glyph_run(run);
        }
    }

    /// The underlying surface, for handing to embedded objects.
    ///
    /// Whoever draws on it may change the selected font, so the next
    /// [`select_font`](Self::select_font) always reaches the surface.
    pub fn surface(&mut self) -> &mut dyn DrawingSurface {
        self.selected_font = None;
        &mut *self.surface
    }
}

impl fmt::Debug for DeviceContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceContext")
            .field("handle", &self.handle)
            .field("metrics", &self.metrics)
            .field("selected_font", &self.selected_font)
            .finish_non_exhaustive()
    }
}

impl Drop for DeviceContext<'_> {
    fn drop(&mut self) {
        self.surface.release_handle(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaping::monospace::MonospaceShaper;

    #[derive(Default)]
    struct CountingSurface {
        acquired: u32,
        released: u32,
        font_selections: u32,
        fills: u32,
    }

    impl DrawingSurface for CountingSurface {
        fn acquire_handle(&mut self) -> SurfaceHandle {
            self.acquired += 1;
            SurfaceHandle(7)
        }
        fn release_handle(&mut self, handle: SurfaceHandle) {
            assert_eq!(handle, SurfaceHandle(7), "released a foreign handle");
            self.released += 1;
        }
        fn select_font(&mut self, _: &Font) {
            self.font_selections += 1;
        }
        fn select_pen(&mut self, _: Color) {}
        fn select_brush(&mut self, _: Color) {}
        fn set_text_color(&mut self, _: Color) {}
        fn set_clip(&mut self, _: Option<Rect>) {}
        fn fill_rect(&mut self, _: Rect) {
            self.fills += 1;
        }
        fn draw_glyph_run(&mut self, _: &GlyphRun<'_>) {}
    }

    #[test]
    fn handle_released_on_drop() {
        let mut surface = CountingSurface::default();
        {
            let dc = DeviceContext::acquire(&mut surface);
            assert_eq!(dc.handle(), SurfaceHandle(7));
        }
        assert_eq!(surface.acquired, 1);
        assert_eq!(surface.released, 1);
    }

    #[test]
    fn metrics_are_cached_per_font() {
        let mut surface = CountingSurface::default();
        let mut shaper = MonospaceShaper::default();
        let small = Font::new("mono", 16);
        let large = Font::new("mono", 32);
        {
            let mut dc = DeviceContext::acquire(&mut surface);
            let first = dc.select_font(&small, &mut shaper).unwrap();
            assert_eq!(first, FontLineMetrics { height: 20, descent: 4 });
            dc.select_font(&small, &mut shaper).unwrap();
            dc.select_font(&large, &mut shaper).unwrap();
            dc.select_font(&small, &mut shaper).unwrap();
        }
        assert_eq!(shaper.metric_queries(), 2);
        assert_eq!(surface.font_selections, 3);
    }

    #[test]
    fn empty_rectangles_are_not_drawn() {
        let mut surface = CountingSurface::default();
        {
            let mut dc = DeviceContext::acquire(&mut surface);
            dc.fill_rect(Rect::new(0, 0, 0, 10));
            dc.fill_rect(Rect::new(0, 0, 10, 0));
            dc.fill_rect(Rect::new(0, 0, 1, 1));
        }
        assert_eq!(surface.fills, 1);
    }
}
