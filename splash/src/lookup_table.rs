// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::error::{Error, Result};

/// Interns values into a dense index space.
///
/// The first occurrence of a value is assigned the next sequential index and
/// later lookups of an equal value return the same index. Records store these
/// indices in narrow fields, so the number of distinct values is bounded.
#[derive(Clone, Debug)]
pub(crate) struct LookupTable<T> {
    indices: HashMap<T, usize>,
    values: Vec<T>,
    max: usize,
    what: &'static str,
}

impl<T: Clone + Eq + Hash> LookupTable<T> {
    pub(crate) fn new(max: usize, what: &'static str) -> Self {
        Self {
            indices: HashMap::new(),
            values: Vec::new(),
            max,
            what,
        }
    }

    /// Returns the index of `value`, assigning a new one on first sight.
    pub(crate) fn assign_index(&mut self, value: &T) -> Result<usize> {
        if let Some(&index) = self.indices.get(value) {
            return Ok(index);
        }
        let index = self.values.len();
        if index >= self.max {
            return Err(Error::CapacityExceeded {
                what: self.what,
                max: self.max,
            });
        }
        self.indices.insert(value.clone(), index);
        self.values.push(value.clone());
        Ok(index)
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn clear(&mut self) {
        self.indices.clear();
        self.values.clear();
    }
}

impl<T> core::ops::Index<usize> for LookupTable<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.values[index]
    }
}
