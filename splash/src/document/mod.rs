// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document record model.

mod annotation;
mod run;

pub use annotation::AnnotationKey;
pub use run::{Paragraph, Run, RunKind};

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

use hashbrown::HashMap;

use crate::buffer::GrowableBuffer;
use crate::embedded::EmbeddedObject;
use crate::error::{Error, Result};
use crate::lookup_table::LookupTable;
use crate::style::Style;

use annotation::{AnnotationTable, ErasedAnnotationTable};

/// Maximum number of distinct styles in a document.
pub const MAX_STYLES: usize = 256;
/// Maximum number of distinct embedded objects in a document.
pub const MAX_OBJECTS: usize = 65535;
/// Maximum number of characters in one text run.
pub const MAX_CHARS_PER_RUN: usize = 65535;

/// Character stored in the text for each embedded object.
const OBJECT_PLACEHOLDER: char = ' ';

const INITIAL_CHARS: usize = 4096;
const INITIAL_PARAGRAPHS: usize = 64;
const INITIAL_RUNS: usize = 128;

/// Parts of a document changed since the last layout update.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Damage {
    /// The document was cleared.
    Cleared,
    /// Paragraphs from this index onward changed or were renumbered.
    ParagraphsFrom(usize),
}

/// An embedded object compared by identity.
#[derive(Clone)]
struct ObjectRef(Rc<dyn EmbeddedObject>);

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).cast::<()>().hash(state);
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// A styled document made of paragraphs, runs and embedded objects.
///
/// Content is appended at the end, under the style and annotations that are
/// current at that point. The last paragraph is always open for appending and
/// may be empty.
pub struct Document {
    styles: LookupTable<Style>,
    objects: LookupTable<ObjectRef>,
    annotations: HashMap<(&'static str, TypeId), Box<dyn ErasedAnnotationTable>>,
    style_stack: Vec<u8>,
    chars: GrowableBuffer<char>,
    paragraphs: GrowableBuffer<Paragraph>,
    runs: GrowableBuffer<Run>,
    damage: Option<Damage>,
}

impl Document {
    /// Creates an empty document with the default style.
    pub fn new() -> Self {
        let mut document = Self {
            styles: LookupTable::new(MAX_STYLES, "styles"),
            objects: LookupTable::new(MAX_OBJECTS, "objects"),
            annotations: HashMap::new(),
            style_stack: Vec::new(),
            chars: GrowableBuffer::new(INITIAL_CHARS),
            paragraphs: GrowableBuffer::new(INITIAL_PARAGRAPHS),
            runs: GrowableBuffer::new(INITIAL_RUNS),
            damage: None,
        };
        document.reset();
        document
    }

    /// Removes all content, styles, objects and annotations.
    pub fn clear(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.styles.clear();
        self.objects.clear();
        self.annotations.clear();
        self.style_stack.clear();
        self.chars.clear();
        self.paragraphs.clear();
        self.runs.clear();
        // An empty table has room for the default style at index 0, and one
        // empty paragraph fits in the initial capacity.
        self.style_stack.push(0);
        let default_style = self.styles.assign_index(&Style::default());
        debug_assert_eq!(default_style, Ok(0), "default style is interned first");
        let sentinel = self.paragraphs.push(Paragraph::default());
        debug_assert_eq!(sentinel, Ok(0), "sentinel paragraph is allocated");
        self.damage = Some(Damage::Cleared);
    }

    /// Number of paragraphs. Always at least 1.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Number of characters.
    pub fn char_count(&self) -> usize {
        self.chars.len()
    }

    /// Number of runs.
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Number of distinct styles, including the default style.
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Number of distinct embedded objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// All characters of the document.
    pub fn chars(&self) -> &[char] {
        self.chars.as_slice()
    }

    /// All paragraphs of the document.
    pub fn paragraphs(&self) -> &[Paragraph] {
        self.paragraphs.as_slice()
    }

    /// The paragraph at `index`.
    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.as_slice().get(index)
    }

    /// The runs of the paragraph at `paragraph_index`.
    pub fn runs(&self, paragraph_index: usize) -> &[Run] {
        match self.paragraph(paragraph_index) {
            Some(paragraph) => &self.runs.as_slice()[paragraph.run_index..paragraph.run_end()],
            None => &[],
        }
    }

    /// The characters of the paragraph at `paragraph_index`.
    pub fn paragraph_chars(&self, paragraph_index: usize) -> &[char] {
        match self.paragraph(paragraph_index) {
            Some(paragraph) => &self.chars.as_slice()[paragraph.char_index..paragraph.char_end()],
            None => &[],
        }
    }

    /// The style with the given table index.
    pub fn style(&self, style_index: usize) -> Option<&Style> {
        self.styles.get(style_index)
    }

    /// The embedded object with the given table index.
    pub fn object(&self, object_index: usize) -> Option<&Rc<dyn EmbeddedObject>> {
        self.objects.get(object_index).map(|object| &object.0)
    }

    /// The style that appended content currently receives.
    pub fn current_style(&self) -> &Style {
        &self.styles[usize::from(self.current_style_index())]
    }

    /// Changes since the last call to [`take_damage`](Self::take_damage).
    pub fn damage(&self) -> Option<Damage> {
        self.damage
    }

    /// Returns and resets the accumulated changes.
    pub fn take_damage(&mut self) -> Option<Damage> {
        self.damage.take()
    }

    /// Returns the text of a character range.
    pub fn text_range(&self, start: usize, len: usize) -> Result<String> {
        let doc_len = self.char_count();
        match start.checked_add(len) {
            Some(end) if end <= doc_len => Ok(self.chars.as_slice()[start..end].iter().collect()),
            _ => Err(Error::InvalidRange {
                start,
                len,
                doc_len,
            }),
        }
    }

    /// Returns the index of the paragraph containing `char_index`.
    ///
    /// The end of the document belongs to the last paragraph.
    pub fn paragraph_index_at(&self, char_index: usize) -> Result<usize> {
        let len = self.char_count();
        if char_index > len {
            return Err(Error::OutOfBounds {
                index: char_index,
                len,
            });
        }
        Ok(self.paragraph_index_of(char_index))
    }

    /// Returns the style of the character at `index`.
    pub fn style_at(&self, index: usize) -> Result<&Style> {
        let run = self.run_at(index)?;
        Ok(&self.styles[run.style_index()])
    }

    /// Returns the embedded object at `index`, if that character is an object
    /// placeholder.
    pub fn object_at(&self, index: usize) -> Result<Option<&Rc<dyn EmbeddedObject>>> {
        let run = self.run_at(index)?;
        match run.kind() {
            RunKind::Object { object_index } => Ok(self.object(usize::from(object_index))),
            _ => Ok(None),
        }
    }

    /// Returns the value of an annotation at character `index`.
    pub fn annotation_at<T: Clone + 'static>(
        &self,
        key: AnnotationKey<T>,
        index: usize,
    ) -> Result<Option<&T>> {
        self.validate_index(index)?;
        Ok(self.annotation_table(key).and_then(|table| table.value_at(index)))
    }

    /// Returns the innermost annotation value currently being appended.
    pub fn current_annotation<T: Clone + 'static>(&self, key: AnnotationKey<T>) -> Option<&T> {
        self.annotation_table(key)?.current()
    }

    /// Pushes a style. Appended content uses it until [`end_style`](Self::end_style).
    ///
    /// Fails if the document would exceed [`MAX_STYLES`] distinct styles.
    pub fn begin_style(&mut self, style: &Style) -> Result<()> {
        let index = self.styles.assign_index(style)?;
        let index = u8::try_from(index).map_err(|_| Error::CapacityExceeded {
            what: "styles",
            max: MAX_STYLES,
        })?;
        self.style_stack.push(index);
        Ok(())
    }

    /// Pops the current style.
    ///
    /// Fails if only the default style remains.
    pub fn end_style(&mut self) -> Result<()> {
        if self.style_stack.len() <= 1 {
            return Err(Error::StyleStackUnderflow);
        }
        self.style_stack.pop();
        Ok(())
    }

    /// Pushes an annotation value. Appended content acquires it until
    /// [`end_annotation`](Self::end_annotation). Each key has its own stack.
    pub fn begin_annotation<T: Clone + 'static>(&mut self, key: AnnotationKey<T>, value: T) {
        let index = self.char_count();
        let table = self
            .annotations
            .entry((key.name(), TypeId::of::<T>()))
            .or_insert_with(|| Box::new(AnnotationTable::<T>::new()));
        if let Some(table) = table.as_any_mut().downcast_mut::<AnnotationTable<T>>() {
            table.begin(index, value);
        }
    }

    /// Pops the current value of an annotation.
    pub fn end_annotation<T: Clone + 'static>(&mut self, key: AnnotationKey<T>) -> Result<()> {
        let index = self.char_count();
        let ended = self
            .annotations
            .get_mut(&(key.name(), TypeId::of::<T>()))
            .and_then(|table| table.as_any_mut().downcast_mut::<AnnotationTable<T>>())
            .is_some_and(|table| table.end(index));
        if ended {
            Ok(())
        } else {
            Err(Error::NoCurrentAnnotation { key: key.name() })
        }
    }

    /// Appends text.
    ///
    /// `'\n'` ends the current paragraph, `'\t'` becomes a tab run and all
    /// other control characters are discarded.
    pub fn append_text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let style_index = self.current_style_index();
        self.mark_changed(self.current_paragraph_index());

        let mut mark = 0;
        for (offset, ch) in text.char_indices() {
            if !ch.is_control() {
                continue;
            }
            let next = offset + ch.len_utf8();
            match ch {
                '\n' => {
                    self.append_chars(style_index, &text[mark..next])?;
                    self.start_paragraph()?;
                }
                '\t' => {
                    self.append_chars(style_index, &text[mark..offset])?;
                    self.append_tab(style_index)?;
                }
                _ => self.append_chars(style_index, &text[mark..offset])?,
            }
            mark = next;
        }
        self.append_chars(style_index, &text[mark..])
    }

    /// Ends the current paragraph.
    pub fn append_line(&mut self) -> Result<()> {
        let style_index = self.current_style_index();
        self.mark_changed(self.current_paragraph_index());
        self.append_chars(style_index, "\n")?;
        self.start_paragraph()
    }

    /// Appends an embedded object.
    ///
    /// Objects are interned by identity; fails if the document would exceed
    /// [`MAX_OBJECTS`] distinct objects.
    pub fn append_object(&mut self, object: Rc<dyn EmbeddedObject>) -> Result<()> {
        let style_index = self.current_style_index();
        let object_index = self.objects.assign_index(&ObjectRef(object))?;
        let object_index = u16::try_from(object_index).map_err(|_| Error::CapacityExceeded {
            what: "objects",
            max: MAX_OBJECTS,
        })?;
        self.mark_changed(self.current_paragraph_index());
        self.append_single(Run::object(style_index, object_index), OBJECT_PLACEHOLDER)
    }

    /// Splits the paragraph containing `char_index` by inserting a newline
    /// before that character.
    pub fn insert_paragraph_break(&mut self, char_index: usize) -> Result<()> {
        let paragraph_index = self.paragraph_index_at(char_index)?;
        self.chars.ensure_capacity(self.chars.len() + 1)?;
        self.runs.ensure_capacity(self.runs.len() + 2)?;
        self.paragraphs.ensure_capacity(self.paragraphs.len() + 1)?;
        self.mark_changed(paragraph_index);

        let paragraph = self.paragraphs.as_slice()[paragraph_index];
        let offset = char_index - paragraph.char_index;
        let mut added_runs = 0;

        // Find the first run starting at `offset`, splitting a text run that
        // straddles it.
        let mut boundary = paragraph.run_index;
        let mut run_start = 0;
        while boundary < paragraph.run_end() {
            let run = self.runs.as_slice()[boundary];
            let run_end = run_start + run.char_count();
            if offset <= run_start {
                break;
            }
            if offset < run_end {
                let mut head = run;
                head.set_char_count(offset - run_start)?;
                let mut tail = run;
                tail.set_char_count(run_end - offset)?;
                self.runs.splice(boundary..boundary + 1, &[head, tail])?;
                added_runs += 1;
                boundary += 1;
                break;
            }
            run_start = run_end;
            boundary += 1;
        }

        // The newline joins the preceding text run when there is room.
        let previous = (boundary > paragraph.run_index).then(|| self.runs.as_slice()[boundary - 1]);
        match previous {
            Some(run) if run.is_text() && run.char_count() < MAX_CHARS_PER_RUN => {
                self.runs.as_mut_slice()[boundary - 1].set_char_count(run.char_count() + 1)?;
            }
            _ => {
                let style_index = match previous {
                    Some(run) => run.style_index,
                    None if paragraph.run_count + added_runs > 0 => {
                        self.runs.as_slice()[boundary].style_index
                    }
                    None => self.current_style_index(),
                };
                self.runs.insert(boundary, Run::text(style_index, 1))?;
                added_runs += 1;
                boundary += 1;
            }
        }
        self.chars.insert(char_index, '\n')?;

        let total_runs = paragraph.run_count + added_runs;
        let paragraphs = self.paragraphs.as_mut_slice();
        paragraphs[paragraph_index].char_count = offset + 1;
        paragraphs[paragraph_index].run_count = boundary - paragraph.run_index;
        for later in &mut paragraphs[paragraph_index + 1..] {
            later.char_index += 1;
            later.run_index += added_runs;
        }
        let tail = Paragraph {
            char_index: char_index + 1,
            char_count: paragraph.char_count - offset,
            run_index: boundary,
            run_count: paragraph.run_index + total_runs - boundary,
        };
        self.paragraphs.insert(paragraph_index + 1, tail)?;
        self.shift_annotations(char_index, 1);
        Ok(())
    }

    /// Merges the paragraph at `paragraph_index` with its successor by
    /// removing the newline between them.
    pub fn remove_paragraph_break(&mut self, paragraph_index: usize) -> Result<()> {
        let count = self.paragraph_count();
        if paragraph_index + 1 >= count {
            return Err(Error::OutOfBounds {
                index: paragraph_index,
                len: count - 1,
            });
        }
        self.mark_changed(paragraph_index);

        let head = self.paragraphs.as_slice()[paragraph_index];
        let tail = self.paragraphs.as_slice()[paragraph_index + 1];
        let newline_index = head.char_end() - 1;
        debug_assert_eq!(
            self.chars.as_slice()[newline_index],
            '\n',
            "paragraphs other than the last end with a newline"
        );

        let mut removed_runs = 0;
        let last_run_index = head.run_end() - 1;
        let last_run = self.runs.as_slice()[last_run_index];
        if last_run.char_count() == 1 {
            self.runs.remove(last_run_index);
            removed_runs += 1;
        } else {
            self.runs.as_mut_slice()[last_run_index].set_char_count(last_run.char_count() - 1)?;
        }

        // Coalesce text runs of the same style across the old boundary.
        let head_runs = head.run_count - removed_runs;
        if head_runs > 0 && tail.run_count > 0 {
            let left_index = head.run_index + head_runs - 1;
            let left = self.runs.as_slice()[left_index];
            let right = self.runs.as_slice()[left_index + 1];
            let merged = left.char_count() + right.char_count();
            if left.is_text()
                && right.is_text()
                && left.style_index == right.style_index
                && merged <= MAX_CHARS_PER_RUN
            {
                self.runs.as_mut_slice()[left_index].set_char_count(merged)?;
                self.runs.remove(left_index + 1);
                removed_runs += 1;
            }
        }
        self.chars.remove(newline_index);

        let paragraphs = self.paragraphs.as_mut_slice();
        paragraphs[paragraph_index].char_count = head.char_count - 1 + tail.char_count;
        paragraphs[paragraph_index].run_count = head.run_count + tail.run_count - removed_runs;
        for later in &mut paragraphs[paragraph_index + 2..] {
            later.char_index -= 1;
            later.run_index -= removed_runs;
        }
        self.paragraphs.remove(paragraph_index + 1);
        self.shift_annotations(newline_index, -1);
        Ok(())
    }

    fn current_style_index(&self) -> u8 {
        self.style_stack.last().copied().unwrap_or(0)
    }

    fn current_paragraph_index(&self) -> usize {
        self.paragraphs.len() - 1
    }

    fn current_paragraph_mut(&mut self) -> &mut Paragraph {
        let index = self.current_paragraph_index();
        &mut self.paragraphs.as_mut_slice()[index]
    }

    /// The run that appended text may extend.
    fn open_run(&self) -> Option<Run> {
        let paragraph = self.paragraphs.as_slice()[self.current_paragraph_index()];
        (paragraph.run_count > 0).then(|| self.runs.as_slice()[paragraph.run_end() - 1])
    }

    fn mark_changed(&mut self, paragraph_index: usize) {
        self.damage = Some(match self.damage {
            Some(Damage::Cleared) => Damage::Cleared,
            Some(Damage::ParagraphsFrom(first)) => {
                Damage::ParagraphsFrom(first.min(paragraph_index))
            }
            None => Damage::ParagraphsFrom(paragraph_index),
        });
    }

    fn start_paragraph(&mut self) -> Result<()> {
        self.paragraphs.push(Paragraph {
            char_index: self.chars.len(),
            char_count: 0,
            run_index: self.runs.len(),
            run_count: 0,
        })?;
        Ok(())
    }

    fn start_text_run(&mut self, style_index: u8) -> Result<()> {
        self.runs.push(Run::text(style_index, 0))?;
        self.current_paragraph_mut().run_count += 1;
        Ok(())
    }

    fn append_chars(&mut self, style_index: u8, text: &str) -> Result<()> {
        let count = text.chars().count();
        if count == 0 {
            return Ok(());
        }
        match self.open_run() {
            Some(run) if run.is_text() && run.style_index == style_index => {}
            _ => self.start_text_run(style_index)?,
        }
        for (slot, ch) in self.chars.grow_by(count)?.iter_mut().zip(text.chars()) {
            *slot = ch;
        }
        self.current_paragraph_mut().char_count += count;

        let mut remaining = count;
        loop {
            let last = self.runs.len() - 1;
            let run = &mut self.runs.as_mut_slice()[last];
            let taken = remaining.min(MAX_CHARS_PER_RUN - run.char_count());
            run.set_char_count(run.char_count() + taken)?;
            remaining -= taken;
            if remaining == 0 {
                return Ok(());
            }
            self.start_text_run(style_index)?;
        }
    }

    fn append_tab(&mut self, style_index: u8) -> Result<()> {
        self.append_single(Run::tab(style_index), '\t')
    }

    fn append_single(&mut self, run: Run, ch: char) -> Result<()> {
        self.runs.push(run)?;
        self.chars.push(ch)?;
        let paragraph = self.current_paragraph_mut();
        paragraph.run_count += 1;
        paragraph.char_count += 1;
        Ok(())
    }

    fn paragraph_index_of(&self, char_index: usize) -> usize {
        self.paragraphs
            .as_slice()
            .partition_point(|paragraph| paragraph.char_index <= char_index)
            .saturating_sub(1)
    }

    fn validate_index(&self, index: usize) -> Result<()> {
        let len = self.char_count();
        if index < len {
            Ok(())
        } else {
            Err(Error::OutOfBounds { index, len })
        }
    }

    fn run_at(&self, index: usize) -> Result<Run> {
        self.validate_index(index)?;
        let paragraph_index = self.paragraph_index_of(index);
        let mut offset = index - self.paragraphs.as_slice()[paragraph_index].char_index;
        for run in self.runs(paragraph_index) {
            if offset < run.char_count() {
                return Ok(*run);
            }
            offset -= run.char_count();
        }
        Err(Error::OutOfBounds {
            index,
            len: self.char_count(),
        })
    }

    fn annotation_table<T: Clone + 'static>(
        &self,
        key: AnnotationKey<T>,
    ) -> Option<&AnnotationTable<T>> {
        self.annotations
            .get(&(key.name(), TypeId::of::<T>()))?
            .as_any()
            .downcast_ref()
    }

    fn shift_annotations(&mut self, index: usize, delta: isize) {
        for table in self.annotations.values_mut() {
            table.shift(index, delta);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.as_slice().iter().try_for_each(|ch| fmt::Write::write_char(f, *ch))
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("styles", &self.styles)
            .field("objects", &self.objects)
            .field("style_stack", &self.style_stack)
            .field("chars", &self.chars.len())
            .field("paragraphs", &self.paragraphs.as_slice())
            .field("runs", &self.runs.as_slice())
            .field("damage", &self.damage)
            .finish_non_exhaustive()
    }
}
