// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paragraph analysis: itemization, breaking, shaping and placement.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::device::DeviceContext;
use crate::document::{Document, RunKind};
use crate::embedded::{EmbeddedObjectHost, EmbeddedObjectMeasurements, EmbeddedObjectSite};
use crate::error::{Error, Result};
use crate::script::{ScriptParagraph, ScriptRun};
use crate::shaping::{AbcWidth, ScriptAnalysis, ScriptItem, ShapeError, Shaper, UNDEFINED_SCRIPT};
use crate::style::Style;

/// Shapes the paragraph at `paragraph_index` into `paragraph`.
///
/// On failure the contents of `paragraph` are unspecified and the caller must
/// not keep it cached.
pub(super) fn analyze_paragraph<S: Shaper + ?Sized>(
    paragraph: &mut ScriptParagraph,
    document: &Document,
    paragraph_index: usize,
    shaper: &mut S,
    dc: &mut DeviceContext<'_>,
    hosts: &mut BTreeMap<usize, EmbeddedObjectHost>,
    items: &mut Vec<ScriptItem>,
    right_to_left: bool,
) -> Result<()> {
    let record = document
        .paragraph(paragraph_index)
        .copied()
        .ok_or(Error::OutOfBounds {
            index: paragraph_index,
            len: document.paragraph_count(),
        })?;
    paragraph.reset(record.char_index, record.char_count)?;
    let runs = document.runs(paragraph_index);
    if runs.is_empty() {
        return Ok(());
    }
    let chars = document.paragraph_chars(paragraph_index);

    shaper.itemize(chars, right_to_left, items)?;
    for (index, item) in items.iter().enumerate() {
        let end = item_end(items, index, chars.len());
        shaper.break_text(
            &chars[item.char_index..end],
            &item.analysis,
            &mut paragraph.logical_attributes.as_mut_slice()[item.char_index..end],
        )?;
    }
    split_runs(paragraph, document, paragraph_index, items)?;

    let paragraph_style = style(document, paragraph.script_runs()[0].style_index())?;
    for run_index in 0..paragraph.script_runs().len() {
        let mut run = paragraph.script_runs()[run_index];
        let style = style(document, run.style_index())?;
        match run.run().kind() {
            RunKind::Text { .. } | RunKind::Tab => {
                shape_run(paragraph, &mut run, chars, style, shaper, dc)?;
                if run.requires_tab_expansion() {
                    paragraph.logical_attributes.as_mut_slice()[run.char_index_in_paragraph]
                        .set_whitespace();
                }
            }
            RunKind::Object { object_index } => {
                let char_index = paragraph.char_index() + run.char_index_in_paragraph;
                let Some(object) = document.object(usize::from(object_index)) else {
                    return Err(Error::OutOfBounds {
                        index: usize::from(object_index),
                        len: document.object_count(),
                    });
                };
                if !hosts
                    .get(&char_index)
                    .is_some_and(|host| host.is_bound_to(object))
                {
                    let site = EmbeddedObjectSite {
                        paragraph_style: paragraph_style.clone(),
                        inline_style: style.clone(),
                        char_index,
                        parent_surface: dc.handle(),
                        right_to_left,
                    };
                    hosts.insert(char_index, EmbeddedObjectHost::new(object, site));
                }
                let measurements =
                    hosts
                        .get_mut(&char_index)
                        .map_or(EmbeddedObjectMeasurements::EMPTY, |host| {
                            host.bound = true;
                            host.measure()
                        });
                run.glyph_index_in_paragraph = paragraph.glyph_count();
                run.glyph_count = 0;
                run.height = measurements.size.height;
                run.descent = measurements.descent;
                run.top_margin = measurements.margin.top;
                run.bottom_margin = measurements.margin.bottom;
                run.abc = AbcWidth {
                    a: measurements.margin.left,
                    b: measurements.size.width,
                    c: measurements.margin.right,
                };
                paragraph.logical_attributes.as_mut_slice()[run.char_index_in_paragraph]
                    .set_word();
            }
        }
        paragraph.script_runs.as_mut_slice()[run_index] = run;
    }
    log::trace!(
        "analyzed paragraph {paragraph_index}: {} script runs, {} glyphs",
        paragraph.script_runs().len(),
        paragraph.glyph_count()
    );
    Ok(())
}

fn item_end(items: &[ScriptItem], index: usize, char_count: usize) -> usize {
    items
        .get(index + 1)
        .map_or(char_count, |next| next.char_index)
}

pub(super) fn style(document: &Document, style_index: usize) -> Result<&Style> {
    document.style(style_index).ok_or(Error::OutOfBounds {
        index: style_index,
        len: document.style_count(),
    })
}

/// Splits the paragraph's runs at item boundaries into script runs.
fn split_runs(
    paragraph: &mut ScriptParagraph,
    document: &Document,
    paragraph_index: usize,
    items: &[ScriptItem],
) -> Result<()> {
    let char_count = paragraph.char_count();
    let mut item = 0;
    let mut run_start = 0;
    for run in document.runs(paragraph_index) {
        let run_end = run_start + run.char_count();
        let mut start = run_start;
        while start < run_end {
            while item + 1 < items.len() && items[item + 1].char_index <= start {
                item += 1;
            }
            let analysis = items
                .get(item)
                .map_or(ScriptAnalysis::default(), |item| item.analysis);
            let end = run_end.min(item_end(items, item, char_count));
            let end = if end > start { end } else { run_end };
            paragraph
                .script_runs
                .push(ScriptRun::new(*run, analysis, start, end - start)?)?;
            start = end;
        }
        run_start = run_end;
    }
    Ok(())
}

/// Shapes and places one text or tab run, appending its glyphs.
fn shape_run<S: Shaper + ?Sized>(
    paragraph: &mut ScriptParagraph,
    run: &mut ScriptRun,
    chars: &[char],
    style: &Style,
    shaper: &mut S,
    dc: &mut DeviceContext<'_>,
) -> Result<()> {
    let metrics = dc.font_metrics(&style.font, shaper)?;
    let chars = &chars[run.char_index_in_paragraph..run.char_end_in_paragraph()];
    let glyph_start = paragraph.glyph_count();
    let mut capacity = chars.len() * 3 / 2 + 16;
    let mut analysis = run.analysis;
    let glyph_count = loop {
        paragraph.ensure_glyph_capacity(glyph_start + capacity)?;
        let result = shaper.shape(
            &style.font,
            &analysis,
            chars,
            &mut paragraph.clusters.as_mut_slice()
                [run.char_index_in_paragraph..run.char_end_in_paragraph()],
            paragraph.glyphs.spare_mut(glyph_start),
            paragraph.visual_attributes.spare_mut(glyph_start),
        );
        match result {
            Ok(count) => break count,
            Err(ShapeError::ScriptNotInFont) if analysis.script != UNDEFINED_SCRIPT => {
                log::debug!(
                    "script {} not in font {:?}, shaping with the undefined script",
                    analysis.script,
                    style.font.family
                );
                analysis = analysis.with_undefined_script();
            }
            Err(ShapeError::BufferTooSmall) => {
                capacity = capacity.checked_mul(2).ok_or(Error::OutOfMemory {
                    elements: usize::MAX,
                    element_size: paragraph.glyphs.element_size(),
                })?;
            }
            Err(err) => return Err(err.into()),
        }
    };
    paragraph.ensure_glyph_capacity(glyph_start + glyph_count)?;

    let glyphs = glyph_start..glyph_start + glyph_count;
    let abc = shaper.place(
        &style.font,
        &analysis,
        paragraph.glyphs.region(glyphs.clone()),
        paragraph.visual_attributes.region(glyphs.clone()),
        &mut paragraph.advances.spare_mut(glyph_start)[..glyph_count],
        &mut paragraph.offsets.spare_mut(glyph_start)[..glyph_count],
    )?;
    paragraph.commit_glyphs(glyph_count);

    run.analysis = analysis;
    run.glyph_index_in_paragraph = glyph_start;
    run.glyph_count = glyph_count;
    run.height = metrics.height;
    run.descent = metrics.descent;
    run.top_margin = 0;
    run.bottom_margin = 0;
    run.abc = abc;
    Ok(())
}
