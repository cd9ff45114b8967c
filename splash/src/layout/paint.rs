// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Painting laid out lines onto a drawing surface.

use core::ops::Range;

use super::{Layout, PaintOptions, ScriptLine, analyze};
use crate::device::{DeviceContext, DrawingSurface, GlyphRun};
use crate::document::Document;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::shaping::Shaper;

/// State shared by all lines of one paint pass.
struct PaintPass<'a> {
    /// The whole layout, in device coordinates.
    rect: Rect,
    clip: Rect,
    /// Visible span, measured from the leading edge of the layout.
    x_range: Range<i32>,
    options: &'a PaintOptions,
    /// Selected document characters.
    selection: Range<usize>,
    right_to_left: bool,
}

impl Layout {
    /// Paints the lines intersecting `clip` for a layout drawn at `origin`.
    ///
    /// The layout is brought up to date first. Characters in `selection` are
    /// drawn with the selection colors of `options`; a reversed range selects
    /// the same characters as its normalized form. Embedded objects that are
    /// not on a painted line are hidden at the end of the pass.
    ///
    /// The pass runs under [`paint_guard`](Self::paint_guard).
    pub fn paint<S: Shaper + ?Sized>(
        &mut self,
        document: &mut Document,
        shaper: &mut S,
        surface: &mut dyn DrawingSurface,
        origin: Point,
        clip: Rect,
        options: &PaintOptions,
        selection: Range<usize>,
    ) -> Result<()> {
        let _scope = self.paint_guard.enter()?;
        let mut dc = DeviceContext::acquire(surface);
        self.refresh(document, shaper, &mut dc)?;

        for host in self.hosts.values_mut() {
            host.visited = false;
        }
        let result = self.paint_lines(document, shaper, &mut dc, origin, clip, options, selection);
        for host in self.hosts.values_mut() {
            if !host.visited {
                host.hide();
            }
        }
        result
    }

    fn paint_lines<S: Shaper + ?Sized>(
        &mut self,
        document: &Document,
        shaper: &mut S,
        dc: &mut DeviceContext<'_>,
        origin: Point,
        clip: Rect,
        options: &PaintOptions,
        selection: Range<usize>,
    ) -> Result<()> {
        let rect = Rect::new(
            origin.x,
            origin.y,
            self.current_width,
            self.current_height,
        );
        let visible = rect.intersect(&clip);
        if visible.is_empty() {
            return Ok(());
        }
        let right_to_left = self.current_right_to_left;
        let x_range = if right_to_left {
            rect.right() - visible.right()..rect.right() - visible.left()
        } else {
            visible.left() - rect.left()..visible.right() - rect.left()
        };
        let pass = PaintPass {
            rect,
            clip,
            x_range,
            options,
            selection: selection.start.min(selection.end)..selection.start.max(selection.end),
            right_to_left,
        };

        let top = visible.top() - rect.top();
        let bottom = visible.bottom() - rect.top();
        let first = self.lines().partition_point(|line| line.bottom() <= top);
        let mut painted = 0;
        for index in first..self.lines.len() {
            let line = self.lines.as_slice()[index];
            if line.y >= bottom {
                break;
            }
            if line.script_run_count == 0 {
                continue;
            }
            self.paint_line(document, shaper, dc, &pass, &line)?;
            painted += 1;
        }
        log::trace!("painted {painted} lines from line {first}");
        Ok(())
    }

    fn paint_line<S: Shaper + ?Sized>(
        &mut self,
        document: &Document,
        shaper: &mut S,
        dc: &mut DeviceContext<'_>,
        pass: &PaintPass<'_>,
        line: &ScriptLine,
    ) -> Result<()> {
        let slot = self.laid_out_paragraph(document, line.paragraph_index, shaper, dc)?;
        self.order_runs(slot, line, shaper);
        let paragraph = &self.cache[slot];
        let runs = &paragraph.script_runs()[line.script_run_index..line.script_run_end()];
        let base = paragraph.char_index();
        let line_top = pass.rect.top() + line.y;
        let baseline = line_top + line.ascent();
        let right_to_left = pass.right_to_left;

        let count = runs.len();
        let mut x = line.x;
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
            let run_x = x;
            x += width;
            if run_x + width <= pass.x_range.start {
                continue;
            }
            if run_x >= pass.x_range.end {
                break;
            }
            let left = if right_to_left {
                pass.rect.right() - run_x - width
            } else {
                pass.rect.left() + run_x
            };
            let top = baseline - run.ascent();

            // Selected characters of the visible part of the run.
            let chars = run.char_index_in_paragraph + leading..run.char_end_in_paragraph() - trailing;
            let selected_start = pass.selection.start.saturating_sub(base).max(chars.start);
            let selected_end = pass.selection.end.saturating_sub(base).min(chars.end);
            let selection_rect = (selected_start < selected_end).then(|| {
                if run.is_object() {
                    return Rect::new(left, line_top, width, line.height);
                }
                let (_, selected) = paragraph.measure_text_run(
                    run,
                    selected_start - run.char_index_in_paragraph,
                    run.char_end_in_paragraph() - selected_end,
                );
                let advances = paragraph.advances();
                let offset: i32 = advances[glyphs.start..selected.start.max(glyphs.start)]
                    .iter()
                    .sum();
                let selected_width: i32 = advances[selected].iter().sum();
                Rect::new(left + offset, line_top, selected_width, line.height)
            });
            if let Some(rect) = selection_rect {
                dc.select_brush(pass.options.selected_background_color);
                dc.fill_rect(rect.intersect(&pass.clip));
            }

            if run.is_object() {
                let Some(host) = self.hosts.get_mut(&(base + run.char_index_in_paragraph)) else {
                    continue;
                };
                let margin = if right_to_left { run.abc.c } else { run.abc.a };
                let bounds = Rect::new(left + margin, top, run.abc.b, run.height);
                host.visited = true;
                host.show(bounds, right_to_left);
                if host.requires_paint() {
                    host.paint(dc.surface(), pass.options, bounds, right_to_left);
                }
                continue;
            }
            if run.requires_tab_expansion() || glyphs.is_empty() {
                continue;
            }

            let style = analyze::style(document, run.style_index())?;
            dc.select_font(&style.font, shaper)?;
            let glyph_run = GlyphRun {
                origin: Point::new(left, top),
                analysis: run.analysis,
                glyphs: &paragraph.glyphs()[glyphs.clone()],
                advances: &paragraph.advances()[glyphs.clone()],
                offsets: &paragraph.offsets()[glyphs],
            };
            dc.set_text_color(style.color);
            dc.draw_glyph_run(&glyph_run);
            if let Some(rect) = selection_rect {
                let rect = rect.intersect(&pass.clip);
                if !rect.is_empty() {
                    dc.set_clip(Some(rect));
                    dc.set_text_color(pass.options.selected_text_color);
                    dc.draw_glyph_run(&glyph_run);
                    dc.set_clip(None);
                }
            }
        }
        Ok(())
    }
}
