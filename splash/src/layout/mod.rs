// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout of a document into lines.

mod analyze;
mod line;
mod options;
mod paint;
mod snap;

pub use line::ScriptLine;
pub use options::{LayoutOptions, PaintOptions};
pub use snap::{SnapKind, SnapPosition};

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::buffer::GrowableBuffer;
use crate::cache::{CacheSlot, ScriptParagraphCache};
use crate::device::{DeviceContext, DrawingSurface};
use crate::document::{Damage, Document};
use crate::embedded::EmbeddedObjectHost;
use crate::error::{Error, Result};
use crate::recursion::RecursionGuard;
use crate::script::ScriptParagraph;
use crate::shaping::{ScriptItem, Shaper};
use crate::style::Style;

use line::LineBreaker;

/// Lines of a [`Document`] laid out at a given width and direction.
///
/// The layout keeps shaped paragraphs in a bounded cache and recomputes lines
/// only from the first paragraph that changed. Changes are picked up from the
/// document's damage and from the desired width and direction on
/// [`update`](Self::update).
///
/// ```
/// use splash::shaping::monospace::MonospaceShaper;
/// use splash::{Document, Layout, LayoutOptions, NullSurface};
///
/// let mut document = Document::new();
/// document.append_text("Hello world\nGoodbye").unwrap();
///
/// let mut layout = Layout::new(LayoutOptions::default().with_width(80));
/// let mut shaper = MonospaceShaper::new(10);
/// layout.update(&mut document, &mut shaper, &mut NullSurface).unwrap();
///
/// assert_eq!(layout.lines().len(), 3);
/// assert_eq!(layout.lines()[1].truncated_leading, 6);
/// ```
pub struct Layout {
    options: LayoutOptions,
    cache: ScriptParagraphCache,
    lines: GrowableBuffer<ScriptLine>,
    hosts: BTreeMap<usize, EmbeddedObjectHost>,
    items: Vec<ScriptItem>,
    levels: Vec<u8>,
    visual_to_logical: Vec<usize>,
    layout_guard: RecursionGuard,
    paint_guard: RecursionGuard,
    desired_width: i32,
    current_width: i32,
    desired_right_to_left: bool,
    current_right_to_left: bool,
    current_height: i32,
    first_paragraph_to_itemize: Option<usize>,
    first_paragraph_to_layout: Option<usize>,
    first_host_to_rebind: Option<usize>,
    discard_hosts: bool,
}

impl Layout {
    /// Creates an empty layout. Nothing is laid out until the first
    /// [`update`](Self::update).
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            cache: ScriptParagraphCache::new(
                options.script_paragraph_cache_size,
                options.initial_paragraph_chars,
                options.initial_script_runs,
            ),
            lines: GrowableBuffer::new(options.initial_lines),
            hosts: BTreeMap::new(),
            items: Vec::new(),
            levels: Vec::new(),
            visual_to_logical: Vec::new(),
            layout_guard: RecursionGuard::new("layout"),
            paint_guard: RecursionGuard::new("paint"),
            desired_width: options.width.max(1),
            current_width: 0,
            desired_right_to_left: options.right_to_left,
            current_right_to_left: options.right_to_left,
            current_height: 0,
            first_paragraph_to_itemize: Some(0),
            first_paragraph_to_layout: Some(0),
            first_host_to_rebind: None,
            discard_hosts: false,
            options,
        }
    }

    /// The options the layout was created with.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// The laid out lines, in document order.
    pub fn lines(&self) -> &[ScriptLine] {
        self.lines.as_slice()
    }

    /// Width the lines were laid out at.
    pub fn current_width(&self) -> i32 {
        self.current_width
    }

    /// Total height of the laid out lines.
    pub fn current_height(&self) -> i32 {
        self.current_height
    }

    /// Direction the lines were laid out in.
    pub fn current_right_to_left(&self) -> bool {
        self.current_right_to_left
    }

    /// Width the next update lays out at.
    pub fn desired_width(&self) -> i32 {
        self.desired_width
    }

    /// Direction the next update lays out in.
    pub fn desired_right_to_left(&self) -> bool {
        self.desired_right_to_left
    }

    /// Sets the width for the next update.
    ///
    /// Fails with [`Error::InvalidLayoutWidth`] for widths below 1.
    pub fn set_desired_width(&mut self, width: i32) -> Result<()> {
        if width < 1 {
            return Err(Error::InvalidLayoutWidth { width });
        }
        if width != self.desired_width {
            self.desired_width = width;
            self.invalidate_layout(0);
        }
        Ok(())
    }

    /// Sets the direction for the next update.
    pub fn set_desired_right_to_left(&mut self, right_to_left: bool) {
        if right_to_left != self.desired_right_to_left {
            self.desired_right_to_left = right_to_left;
            // Clients were created for the old direction.
            self.discard_hosts = true;
            self.invalidate_itemization(0);
        }
    }

    /// Returns `true` if the next update has work to do.
    pub fn needs_update(&self) -> bool {
        self.first_paragraph_to_itemize.is_some() || self.first_paragraph_to_layout.is_some()
    }

    /// The shaped paragraph, if it is currently cached.
    pub fn cached_script_paragraph(&self, paragraph_index: usize) -> Option<&ScriptParagraph> {
        self.cache.get(paragraph_index)
    }

    /// Number of shaped paragraphs currently cached.
    pub fn cached_paragraph_count(&self) -> usize {
        self.cache.len()
    }

    /// Maximum number of shaped paragraphs kept cached.
    pub fn script_paragraph_cache_size(&self) -> usize {
        self.cache.size()
    }

    /// Guard held while the layout is being updated.
    ///
    /// Clones observe the update as running. A host that shares the layout
    /// through a `RefCell` can hand a clone to its embedded objects, which
    /// then get [`Error::Recursion`] from [`RecursionGuard::enter`] instead of
    /// a failed borrow when called back during an update.
    pub fn layout_guard(&self) -> &RecursionGuard {
        &self.layout_guard
    }

    /// Guard held while the layout is being painted. See
    /// [`layout_guard`](Self::layout_guard).
    pub fn paint_guard(&self) -> &RecursionGuard {
        &self.paint_guard
    }

    /// The host of the embedded object at `char_index`, if it was laid out.
    pub fn embedded_object_host(&self, char_index: usize) -> Option<&EmbeddedObjectHost> {
        self.hosts.get(&char_index)
    }

    /// Forgets all shaping results, lines and embedded object clients.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.lines.clear();
        self.hosts.clear();
        self.current_height = 0;
        self.first_paragraph_to_itemize = Some(0);
        self.first_paragraph_to_layout = Some(0);
        self.first_host_to_rebind = None;
        self.discard_hosts = false;
    }

    /// Brings the lines up to date with `document`.
    ///
    /// Consumes the document's damage, reshapes invalidated paragraphs and
    /// rebuilds lines from the first invalidated paragraph to the end.
    /// Embedded objects that kept their position keep their clients.
    pub fn update<S: Shaper + ?Sized>(
        &mut self,
        document: &mut Document,
        shaper: &mut S,
        surface: &mut dyn DrawingSurface,
    ) -> Result<()> {
        let mut dc = DeviceContext::acquire(surface);
        self.refresh(document, shaper, &mut dc)
    }

    fn refresh<S: Shaper + ?Sized>(
        &mut self,
        document: &mut Document,
        shaper: &mut S,
        dc: &mut DeviceContext<'_>,
    ) -> Result<()> {
        let _scope = self.layout_guard.enter()?;
        match document.take_damage() {
            Some(Damage::Cleared) => {
                self.discard_hosts = true;
                self.invalidate_itemization(0);
            }
            Some(Damage::ParagraphsFrom(first)) => self.invalidate_itemization(first),
            None => {}
        }
        self.update_itemization(document);
        let result = self.update_layout(document, shaper, dc);
        self.drop_unbound_hosts();
        result
    }

    /// Index of the line containing `y`, measured from the top of the layout.
    pub fn line_at_y(&self, y: i32) -> Option<usize> {
        let lines = self.lines();
        let index = lines.partition_point(|line| line.bottom() <= y);
        (index < lines.len() && lines[index].y <= y).then_some(index)
    }

    /// Index of the first line of a paragraph.
    pub fn first_line_of_paragraph(&self, paragraph_index: usize) -> Option<usize> {
        let lines = self.lines();
        let index = lines.partition_point(|line| line.paragraph_index < paragraph_index);
        (index < lines.len() && lines[index].paragraph_index == paragraph_index).then_some(index)
    }

    /// Index of the last line of a paragraph.
    pub fn last_line_of_paragraph(&self, paragraph_index: usize) -> Option<usize> {
        let lines = self.lines();
        let index = lines.partition_point(|line| line.paragraph_index <= paragraph_index);
        (index > 0 && lines[index - 1].paragraph_index == paragraph_index).then(|| index - 1)
    }

    fn invalidate_itemization(&mut self, paragraph_index: usize) {
        self.first_paragraph_to_itemize = Some(
            self.first_paragraph_to_itemize
                .map_or(paragraph_index, |first| first.min(paragraph_index)),
        );
        self.invalidate_layout(paragraph_index);
    }

    fn invalidate_layout(&mut self, paragraph_index: usize) {
        self.first_paragraph_to_layout = Some(
            self.first_paragraph_to_layout
                .map_or(paragraph_index, |first| first.min(paragraph_index)),
        );
    }

    fn update_itemization(&mut self, document: &Document) {
        let Some(first) = self.first_paragraph_to_itemize.take() else {
            return;
        };
        log::debug!("reitemizing from paragraph {first}");
        self.cache.remove_starting_from(first);
        if core::mem::take(&mut self.discard_hosts) {
            self.hosts.clear();
            self.first_host_to_rebind = None;
        } else {
            // Hosts from the first changed paragraph on survive only if
            // analysis finds their object at the same character again.
            let char_index = document
                .paragraph(first)
                .map_or(document.char_count(), |paragraph| paragraph.char_index);
            for host in self.hosts.range_mut(char_index..).map(|(_, host)| host) {
                host.bound = false;
            }
            self.first_host_to_rebind = Some(
                self.first_host_to_rebind
                    .map_or(char_index, |first| first.min(char_index)),
            );
        }
        self.current_right_to_left = self.desired_right_to_left;
    }

    /// Disposes hosts whose objects moved or were removed by the last edits.
    fn drop_unbound_hosts(&mut self) {
        let Some(first) = self.first_host_to_rebind.take() else {
            return;
        };
        let before = self.hosts.len();
        self.hosts
            .retain(|&char_index, host| char_index < first || host.bound);
        let dropped = before - self.hosts.len();
        if dropped != 0 {
            log::debug!("dropped {dropped} embedded object hosts from char {first}");
        }
    }

    fn update_layout<S: Shaper + ?Sized>(
        &mut self,
        document: &Document,
        shaper: &mut S,
        dc: &mut DeviceContext<'_>,
    ) -> Result<()> {
        let Some(mut first) = self.first_paragraph_to_layout.take() else {
            return Ok(());
        };
        self.current_width = self.desired_width;
        if first == 0 {
            self.current_height = 0;
            self.lines.truncate(0);
        } else if let Some(line) = self.first_line_of_paragraph(first) {
            self.current_height = self.lines.as_slice()[line].y;
            self.lines.truncate(line);
        } else if let Some(last) = self.lines.as_slice().last() {
            first = last.paragraph_index + 1;
        } else {
            first = 0;
            self.current_height = 0;
        }
        log::debug!(
            "laying out paragraphs {first}..{} at width {}",
            document.paragraph_count(),
            self.current_width
        );
        for paragraph_index in first..document.paragraph_count() {
            if let Err(err) = self.append_lines(document, paragraph_index, shaper, dc) {
                self.invalidate_layout(paragraph_index);
                return Err(err);
            }
        }
        Ok(())
    }

    fn append_lines<S: Shaper + ?Sized>(
        &mut self,
        document: &Document,
        paragraph_index: usize,
        shaper: &mut S,
        dc: &mut DeviceContext<'_>,
    ) -> Result<()> {
        let slot = self.script_paragraph(document, paragraph_index, shaper, dc)?;
        break_paragraph(
            &mut self.cache[slot],
            document,
            paragraph_index,
            self.current_width,
            self.options.min_line_height,
            self.current_right_to_left,
            &mut self.lines,
            &mut self.current_height,
        )
    }

    /// Like [`script_paragraph`](Self::script_paragraph), for a paragraph that
    /// already has lines. Tabs of a reshaped paragraph are expanded again.
    fn laid_out_paragraph<S: Shaper + ?Sized>(
        &mut self,
        document: &Document,
        paragraph_index: usize,
        shaper: &mut S,
        dc: &mut DeviceContext<'_>,
    ) -> Result<CacheSlot> {
        let resident = self.cache.get(paragraph_index).is_some();
        let slot = self.script_paragraph(document, paragraph_index, shaper, dc)?;
        let paragraph = &mut self.cache[slot];
        if !resident
            && paragraph
                .script_runs()
                .iter()
                .any(|run| run.requires_tab_expansion())
        {
            let mut lines = GrowableBuffer::new(4);
            let mut y = 0;
            break_paragraph(
                paragraph,
                document,
                paragraph_index,
                self.current_width,
                self.options.min_line_height,
                self.current_right_to_left,
                &mut lines,
                &mut y,
            )?;
        }
        Ok(slot)
    }

    /// Returns the cache slot holding the shaped paragraph, shaping it first
    /// if it isn't cached.
    fn script_paragraph<S: Shaper + ?Sized>(
        &mut self,
        document: &Document,
        paragraph_index: usize,
        shaper: &mut S,
        dc: &mut DeviceContext<'_>,
    ) -> Result<CacheSlot> {
        let (found, slot) = self.cache.try_get(paragraph_index);
        if found {
            return Ok(slot);
        }
        let result = analyze::analyze_paragraph(
            &mut self.cache[slot],
            document,
            paragraph_index,
            shaper,
            dc,
            &mut self.hosts,
            &mut self.items,
            self.current_right_to_left,
        );
        if let Err(err) = result {
            log::debug!("analysis of paragraph {paragraph_index} failed: {err}");
            self.cache.invalidate(slot);
            return Err(err);
        }
        Ok(slot)
    }

    /// Fills `visual_to_logical` with the visual order of a line's runs.
    fn order_runs<S: Shaper + ?Sized>(
        &mut self,
        slot: CacheSlot,
        line: &ScriptLine,
        shaper: &mut S,
    ) {
        let runs = &self.cache[slot].script_runs()[line.script_run_index..line.script_run_end()];
        self.levels.clear();
        self.levels.extend(runs.iter().map(|run| run.analysis.bidi_level));
        shaper.visual_order(&self.levels, &mut self.visual_to_logical);
    }
}

/// Breaks a shaped paragraph into lines appended to `lines`, starting at `*y`.
fn break_paragraph(
    paragraph: &mut ScriptParagraph,
    document: &Document,
    paragraph_index: usize,
    width: i32,
    min_line_height: i32,
    right_to_left: bool,
    lines: &mut GrowableBuffer<ScriptLine>,
    y: &mut i32,
) -> Result<()> {
    // Block properties come from the paragraph's first run.
    let style_index = paragraph
        .script_runs()
        .first()
        .map_or(0, |run| run.style_index());
    let default_style = Style::default();
    let style = document.style(style_index).unwrap_or(&default_style);
    LineBreaker {
        paragraph,
        style,
        paragraph_index,
        width,
        min_line_height,
        right_to_left,
    }
    .append_lines(lines, y)
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(LayoutOptions::default())
    }
}

impl core::fmt::Debug for Layout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Layout")
            .field("options", &self.options)
            .field("cache", &self.cache)
            .field("lines", &self.lines.as_slice())
            .field("hosts", &self.hosts)
            .field("desired_width", &self.desired_width)
            .field("current_width", &self.current_width)
            .field("desired_right_to_left", &self.desired_right_to_left)
            .field("current_right_to_left", &self.current_right_to_left)
            .field("current_height", &self.current_height)
            .field("first_paragraph_to_itemize", &self.first_paragraph_to_itemize)
            .field("first_paragraph_to_layout", &self.first_paragraph_to_layout)
            .field("first_host_to_rebind", &self.first_host_to_rebind)
            .finish_non_exhaustive()
    }
}
