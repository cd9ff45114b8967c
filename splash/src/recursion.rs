// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;
use core::cell::Cell;

use crate::error::{Error, Result};

/// Detects reentrant invocation of a single logical operation.
///
/// Clones share the same state, so a clone handed to a callback observes the
/// operation as running.
#[derive(Clone, Debug)]
pub struct RecursionGuard {
    operation: &'static str,
    active: Rc<Cell<bool>>,
}

impl RecursionGuard {
    /// Creates a guard for the named operation.
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            active: Rc::new(Cell::new(false)),
        }
    }

    /// The name of the guarded operation.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Returns `true` while the operation is running.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Marks the operation as running until the returned scope is dropped.
    ///
    /// Fails with [`Error::Recursion`] if the operation is already running.
    pub fn enter(&self) -> Result<RecursionScope> {
        if self.active.replace(true) {
            return Err(Error::Recursion {
                operation: self.operation,
            });
        }
        Ok(RecursionScope {
            active: Rc::clone(&self.active),
        })
    }

    /// Runs `f` inside the guard.
    pub fn run<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _scope = self.enter()?;
        f()
    }
}

/// Marks a guarded operation as running. Dropping it ends the operation.
#[derive(Debug)]
#[must_use = "the operation ends when the scope is dropped"]
pub struct RecursionScope {
    active: Rc<Cell<bool>>,
}

impl Drop for RecursionScope {
    fn drop(&mut self) {
        self.active.set(false);
    }
}
