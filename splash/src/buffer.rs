// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Growable record storage.

use alloc::vec::Vec;
use core::ops::Range;

use crate::error::{Error, Result};

/// A growable region of fixed-size records with explicit capacity management.
///
/// The buffer distinguishes the number of live elements (`len`) from the
/// allocated element count (`capacity`). The whole capacity is addressable
/// through [`spare_mut`](Self::spare_mut) so that external services can write
/// records past `len` before the buffer commits them with
/// [`set_len`](Self::set_len).
///
/// Capacity grows by doubling and never shrinks except through
/// [`set_capacity`](Self::set_capacity) or [`clear`](Self::clear). Allocation
/// failures are reported as [`Error::OutOfMemory`] and leave the buffer as it
/// was before the call. Memory is released when the buffer is dropped.
#[derive(Clone, Debug)]
pub struct GrowableBuffer<T> {
    /// Backing storage. Either empty (nothing allocated) or exactly
    /// `capacity` elements long.
    storage: Vec<T>,
    len: usize,
    capacity: usize,
    initial_capacity: usize,
}

impl<T: Copy + Default> GrowableBuffer<T> {
    /// Creates an empty buffer. Nothing is allocated until the first
    /// element is requested.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            storage: Vec::new(),
            len: 0,
            capacity: initial_capacity.max(1),
            initial_capacity: initial_capacity.max(1),
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no live elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the buffer can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        size_of::<T>()
    }

    /// Returns `true` if backing memory is currently allocated.
    pub fn is_allocated(&self) -> bool {
        !self.storage.is_empty()
    }

    /// The live elements.
    pub fn as_slice(&self) -> &[T] {
        &self.storage[..self.len]
    }

    /// The live elements, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.storage[..self.len]
    }

    /// The whole allocated region starting at `start`, including elements
    /// past `len`.
    ///
    /// Call [`ensure_capacity`](Self::ensure_capacity) first; the slice is
    /// empty if nothing is allocated.
    pub fn spare_mut(&mut self, start: usize) -> &mut [T] {
        let start = start.min(self.storage.len());
        &mut self.storage[start..]
    }

    /// A range of the allocated region, including elements past `len`.
    pub fn region(&self, range: Range<usize>) -> &[T] {
        &self.storage[range]
    }

    /// Makes room for at least `capacity` elements.
    ///
    /// Capacity doubles until it is large enough. Live elements are preserved
    /// across reallocation. When the buffer holds no live elements the old
    /// region is dropped and a fresh one is allocated instead of copied.
    pub fn ensure_capacity(&mut self, capacity: usize) -> Result<()> {
        if self.capacity >= capacity {
            return self.allocate_if_needed();
        }
        let mut new_capacity = self.capacity;
        while new_capacity < capacity {
            new_capacity = new_capacity.checked_mul(2).ok_or(Error::OutOfMemory {
                elements: capacity,
                element_size: size_of::<T>(),
            })?;
        }
        self.reallocate(new_capacity)
    }

    /// Ensures room for `additional` more elements, then extends `len` by that
    /// many default-initialized elements. Returns the newly added elements.
    pub fn grow_by(&mut self, additional: usize) -> Result<&mut [T]> {
        let start = self.len;
        let end = start.checked_add(additional).ok_or(Error::OutOfMemory {
            elements: usize::MAX,
            element_size: size_of::<T>(),
        })?;
        self.ensure_capacity(end)?;
        self.storage[start..end].fill(T::default());
        self.len = end;
        Ok(&mut self.storage[start..end])
    }

    /// Appends one element and returns its index.
    pub fn push(&mut self, value: T) -> Result<usize> {
        let index = self.len;
        self.grow_by(1)?[0] = value;
        Ok(index)
    }

    /// Appends a slice of elements.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        self.grow_by(values.len())?.copy_from_slice(values);
        Ok(())
    }

    /// Replaces the live elements in `range` with `values`, shifting the tail.
    pub fn splice(&mut self, range: Range<usize>, values: &[T]) -> Result<()> {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "splice range {range:?} out of bounds for len {}",
            self.len
        );
        let new_len = self.len - range.len() + values.len();
        self.ensure_capacity(new_len)?;
        let tail = range.end..self.len;
        let new_tail_start = range.start + values.len();
        self.storage.copy_within(tail, new_tail_start);
        self.storage[range.start..new_tail_start].copy_from_slice(values);
        self.len = new_len;
        Ok(())
    }

    /// Inserts one element at `index`, shifting the tail.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        self.splice(index..index, &[value])
    }

    /// Removes the element at `index`, shifting the tail.
    pub fn remove(&mut self, index: usize) -> T {
        let value = self.as_slice()[index];
        self.storage.copy_within(index + 1..self.len, index);
        self.len -= 1;
        value
    }

    /// Commits elements written through [`spare_mut`](Self::spare_mut).
    pub fn set_len(&mut self, len: usize) {
        assert!(
            len <= self.storage.len(),
            "len {len} exceeds allocated capacity {}",
            self.storage.len()
        );
        self.len = len;
    }

    /// Drops live elements past `len`. Capacity is unchanged.
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// Resizes the allocated region to exactly `capacity` elements.
    ///
    /// If `capacity` is smaller than `len`, `len` is clamped down to
    /// `capacity` and the excess elements are discarded. A zero capacity still
    /// keeps room for one element.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        if capacity < self.len {
            log::trace!(
                "truncating buffer from {} to {} elements on capacity change",
                self.len,
                capacity
            );
            self.len = capacity;
        }
        let capacity = capacity.max(1);
        if self.storage.len() == capacity {
            self.capacity = capacity;
            return Ok(());
        }
        self.reallocate(capacity)
    }

    /// Releases the allocated region and resets to the initial capacity.
    pub fn clear(&mut self) {
        self.storage = Vec::new();
        self.len = 0;
        self.capacity = self.initial_capacity;
    }

    fn allocate_if_needed(&mut self) -> Result<()> {
        if self.storage.is_empty() {
            self.reallocate(self.capacity)
        } else {
            Ok(())
        }
    }

    fn reallocate(&mut self, capacity: usize) -> Result<()> {
        let oom = |_| Error::OutOfMemory {
            elements: capacity,
            element_size: size_of::<T>(),
        };
        if self.len != 0 {
            if capacity > self.storage.len() {
                self.storage
                    .try_reserve_exact(capacity - self.storage.len())
                    .map_err(oom)?;
            }
            self.storage.resize(capacity, T::default());
            self.storage.shrink_to(capacity);
        } else {
            // Nothing live to preserve: drop the old region before allocating.
            self.storage = Vec::new();
            let mut fresh = Vec::new();
            fresh.try_reserve_exact(capacity).map_err(oom)?;
            fresh.resize(capacity, T::default());
            self.storage = fresh;
        }
        self.capacity = capacity;
        Ok(())
    }
}

impl<T: Copy + Default> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::new(1)
    }
}
