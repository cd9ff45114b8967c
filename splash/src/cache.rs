// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::script::ScriptParagraph;

const NIL: usize = usize::MAX;

/// Handle to a cache slot, valid until the next lookup or invalidation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct CacheSlot(usize);

struct Slot {
    paragraph_index: Option<usize>,
    prev: usize,
    next: usize,
    paragraph: ScriptParagraph,
}

/// A least-recently-used cache of shaped paragraphs keyed by paragraph index.
///
/// Slots form a doubly linked list ordered by recency, most recently used at
/// the head. Lookup uses a linear scan of the slots, so the cache is meant to
/// hold tens of paragraphs rather than thousands. Invalidated slots move to the
/// tail and are reused before any resident paragraph is evicted.
pub(crate) struct ScriptParagraphCache {
    slots: Vec<Slot>,
    head: usize,
    tail: usize,
    size: usize,
    initial_chars: usize,
    initial_script_runs: usize,
}

impl ScriptParagraphCache {
    pub(crate) fn new(size: usize, initial_chars: usize, initial_script_runs: usize) -> Self {
        Self {
            slots: Vec::new(),
            head: NIL,
            tail: NIL,
            size: size.max(1),
            initial_chars,
            initial_script_runs,
        }
    }

    /// Maximum number of resident paragraphs.
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    /// Number of resident paragraphs.
    pub(crate) fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.paragraph_index.is_some())
            .count()
    }

    /// Returns the slot for `paragraph_index` and whether it already held that
    /// paragraph. The paragraph itself is reached by indexing the cache with
    /// the slot.
    ///
    /// On a miss the returned paragraph must be repopulated by the caller. It
    /// is taken from an invalidated slot, a fresh slot while the cache is not
    /// full, or else by evicting the least recently used paragraph. Either way
    /// the slot becomes the most recently used.
    pub(crate) fn try_get(&mut self, paragraph_index: usize) -> (bool, CacheSlot) {
        if let Some(index) = self.find(paragraph_index) {
            self.move_to_front(index);
            return (true, CacheSlot(index));
        }
        let index = if self.tail != NIL && self.slots[self.tail].paragraph_index.is_none() {
            self.tail
        } else if self.slots.len() < self.size {
            self.slots.push(Slot {
                paragraph_index: None,
                prev: NIL,
                next: NIL,
                paragraph: ScriptParagraph::new(self.initial_chars, self.initial_script_runs),
            });
            let index = self.slots.len() - 1;
            self.push_front(index);
            index
        } else {
            let index = self.tail;
            let slot = &mut self.slots[index];
            log::trace!(
                "evicting script paragraph {:?} for paragraph {paragraph_index}",
                slot.paragraph_index
            );
            slot.paragraph.free();
            index
        };
        self.slots[index].paragraph_index = Some(paragraph_index);
        self.move_to_front(index);
        (false, CacheSlot(index))
    }

    /// Returns the paragraph if it is resident. Does not affect recency.
    pub(crate) fn get(&self, paragraph_index: usize) -> Option<&ScriptParagraph> {
        self.find(paragraph_index)
            .map(|index| &self.slots[index].paragraph)
    }

    /// Marks a slot as holding no paragraph, e.g. after its analysis failed.
    pub(crate) fn invalidate(&mut self, slot: CacheSlot) {
        self.slots[slot.0].paragraph_index = None;
        self.move_to_back(slot.0);
    }

    /// Invalidates every paragraph at or after `paragraph_index`. Invalidating
    /// from 0 clears the cache.
    pub(crate) fn remove_starting_from(&mut self, paragraph_index: usize) {
        if paragraph_index == 0 {
            self.clear();
            return;
        }
        let mut removed = 0;
        for index in 0..self.slots.len() {
            if self.slots[index]
                .paragraph_index
                .is_some_and(|resident| resident >= paragraph_index)
            {
                self.slots[index].paragraph_index = None;
                self.move_to_back(index);
                removed += 1;
            }
        }
        log::trace!("invalidated {removed} script paragraphs from paragraph {paragraph_index}");
    }

    /// Frees every resident paragraph.
    pub(crate) fn clear(&mut self) {
        if !self.slots.is_empty() {
            log::trace!("clearing {} script paragraphs", self.slots.len());
        }
        // Dropping the slots releases their buffers.
        self.slots.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    fn find(&self, paragraph_index: usize) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.paragraph_index == Some(paragraph_index))
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = (self.slots[index].prev, self.slots[index].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.slots[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.slots[next].prev = prev;
        }
        self.slots[index].prev = NIL;
        self.slots[index].next = NIL;
    }

    fn push_front(&mut self, index: usize) {
        self.slots[index].next = self.head;
        if self.head == NIL {
            self.tail = index;
        } else {
            self.slots[self.head].prev = index;
        }
        self.head = index;
    }

    fn push_back(&mut self, index: usize) {
        self.slots[index].prev = self.tail;
        if self.tail == NIL {
            self.head = index;
        } else {
            self.slots[self.tail].next = index;
        }
        self.tail = index;
    }

    fn move_to_front(&mut self, index: usize) {
        if self.head != index {
            self.unlink(index);
            self.push_front(index);
        }
    }

    fn move_to_back(&mut self, index: usize) {
        if self.tail != index {
            self.unlink(index);
            self.push_back(index);
        }
    }
}

impl Index<CacheSlot> for ScriptParagraphCache {
    type Output = ScriptParagraph;

    fn index(&self, slot: CacheSlot) -> &ScriptParagraph {
        &self.slots[slot.0].paragraph
    }
}

impl IndexMut<CacheSlot> for ScriptParagraphCache {
    fn index_mut(&mut self, slot: CacheSlot) -> &mut ScriptParagraph {
        &mut self.slots[slot.0].paragraph
    }
}

impl core::fmt::Debug for ScriptParagraphCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut order = Vec::with_capacity(self.slots.len());
        let mut index = self.head;
        while index != NIL {
            order.push(self.slots[index].paragraph_index);
            index = self.slots[index].next;
        }
        f.debug_struct("ScriptParagraphCache")
            .field("size", &self.size)
            .field("recency", &order)
            .finish_non_exhaustive()
    }
}
