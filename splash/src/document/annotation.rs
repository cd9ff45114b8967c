// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;

/// Names an annotation and the type of its values.
///
/// ```
/// use splash::{AnnotationKey, Document};
///
/// const HREF: AnnotationKey<&str> = AnnotationKey::new("href");
///
/// let mut document = Document::new();
/// document.append_text("see ").unwrap();
/// document.begin_annotation(HREF, "https://linebender.org");
/// document.append_text("here").unwrap();
/// document.end_annotation(HREF).unwrap();
///
/// assert_eq!(document.annotation_at(HREF, 0).unwrap(), None);
/// assert_eq!(document.annotation_at(HREF, 5).unwrap(), Some(&"https://linebender.org"));
/// ```
pub struct AnnotationKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AnnotationKey<T> {
    /// Creates a key.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The key's name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for AnnotationKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AnnotationKey<T> {}

impl<T> fmt::Debug for AnnotationKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnnotationKey").field(&self.name).finish()
    }
}

/// Values of one annotation key over the document.
///
/// `boundaries` is sorted by character index. Each entry holds the value
/// that applies from its index up to the next entry; `None` marks a span
/// without annotation.
pub(crate) struct AnnotationTable<T> {
    stack: Vec<T>,
    boundaries: Vec<(usize, Option<T>)>,
}

impl<T: Clone> AnnotationTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            stack: Vec::new(),
            boundaries: Vec::new(),
        }
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.stack.last()
    }

    pub(crate) fn value_at(&self, index: usize) -> Option<&T> {
        let end = self.boundaries.partition_point(|(start, _)| *start <= index);
        self.boundaries[..end].last()?.1.as_ref()
    }

    pub(crate) fn begin(&mut self, index: usize, value: T) {
        self.stack.push(value.clone());
        self.remove_empty_span(index);
        self.boundaries.push((index, Some(value)));
    }

    /// Returns `false` if there was nothing to end.
    pub(crate) fn end(&mut self, index: usize) -> bool {
        if self.stack.pop().is_none() {
            return false;
        }
        self.remove_empty_span(index);
        match self.stack.last() {
            Some(outer) => self.boundaries.push((index, Some(outer.clone()))),
            None if index != 0 => self.boundaries.push((index, None)),
            None => {}
        }
        true
    }

    /// Drops the last boundary if it starts at `index`, since nothing was
    /// appended under it.
    fn remove_empty_span(&mut self, index: usize) {
        if self.boundaries.last().is_some_and(|(start, _)| *start == index) {
            self.boundaries.pop();
        }
    }
}

/// Type-erased access to an [`AnnotationTable`].
pub(crate) trait ErasedAnnotationTable {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Moves boundaries after `index` by `delta` characters.
    fn shift(&mut self, index: usize, delta: isize);
}

impl<T: Clone + 'static> ErasedAnnotationTable for AnnotationTable<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn shift(&mut self, index: usize, delta: isize) {
        for (start, _) in &mut self.boundaries {
            if *start > index {
                *start = start.saturating_add_signed(delta);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_values() {
        let mut table = AnnotationTable::new();
        table.begin(0, 'a');
        table.begin(3, 'b');
        table.end(5);
        table.end(8);
        assert_eq!(table.value_at(0), Some(&'a'));
        assert_eq!(table.value_at(3), Some(&'b'));
        assert_eq!(table.value_at(5), Some(&'a'));
        assert_eq!(table.value_at(8), None);
        assert_eq!(table.current(), None);
    }

    #[test]
    fn empty_spans_are_dropped() {
        let mut table = AnnotationTable::new();
        table.begin(2, 1);
        table.begin(2, 2);
        assert_eq!(table.current(), Some(&2));
        assert_eq!(table.value_at(2), Some(&2));
        assert!(!AnnotationTable::<u8>::new().end(0));
    }

    #[test]
    fn shifting_moves_later_boundaries() {
        let mut table = AnnotationTable::new();
        table.begin(2, "x");
        table.end(4);
        table.shift(1, 1);
        assert_eq!(table.value_at(2), None);
        assert_eq!(table.value_at(3), Some(&"x"));
        assert_eq!(table.value_at(5), None);
    }
}
