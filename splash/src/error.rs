// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::shaping::ShapeError;

/// Error type for layout engine operations.
///
/// Errors that originate from the engine's own invariants (table capacity,
/// reentrancy, memory) are surfaced to the caller. Failures of externally
/// supplied embedded objects never show up here: they are contained and logged
/// at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A lookup table ran out of index space.
    CapacityExceeded {
        /// What the table stores, e.g. `"styles"`.
        what: &'static str,
        /// The configured maximum number of distinct values.
        max: usize,
    },
    /// A guarded operation was re-entered while it was already running.
    Recursion {
        /// Name of the guarded operation.
        operation: &'static str,
    },
    /// A buffer could not be grown.
    OutOfMemory {
        /// The requested capacity, in elements.
        elements: usize,
        /// The size of one element in bytes.
        element_size: usize,
    },
    /// A run accessor was used on a run of the wrong kind.
    UnsupportedRunKind {
        /// The kind of the run that was accessed.
        kind: &'static str,
        /// The attempted operation.
        operation: &'static str,
    },
    /// A character index was outside of the document.
    OutOfBounds {
        /// The offending index.
        index: usize,
        /// The length it was checked against.
        len: usize,
    },
    /// A character range was not contained in the document.
    InvalidRange {
        /// Start of the requested range.
        start: usize,
        /// Length of the requested range.
        len: usize,
        /// Number of characters in the document.
        doc_len: usize,
    },
    /// Attempted to pop the default style.
    StyleStackUnderflow,
    /// Attempted to end an annotation that was never begun.
    NoCurrentAnnotation {
        /// The annotation key name.
        key: &'static str,
    },
    /// The requested layout width was smaller than one device unit.
    InvalidLayoutWidth {
        /// The rejected width.
        width: i32,
    },
    /// The shaping service failed in a way the engine cannot recover from.
    Shaping(ShapeError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CapacityExceeded { what, max } => write!(
                f,
                "this implementation only supports at most {max} distinct {what}"
            ),
            Self::Recursion { operation } => {
                write!(f, "inappropriate recursion in {operation}")
            }
            Self::OutOfMemory {
                elements,
                element_size,
            } => write!(
                f,
                "failed to allocate a buffer of {elements} elements of {element_size} bytes"
            ),
            Self::UnsupportedRunKind { kind, operation } => {
                write!(f, "{operation} is not supported for {kind} runs")
            }
            Self::OutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for len {len}")
            }
            Self::InvalidRange {
                start,
                len,
                doc_len,
            } => write!(
                f,
                "range starting at {start} with length {len} exceeds document length {doc_len}"
            ),
            Self::StyleStackUnderflow => f.write_str(
                "the style stack only contains the default style which cannot be popped",
            ),
            Self::NoCurrentAnnotation { key } => {
                write!(f, "there is no current annotation with key '{key}'")
            }
            Self::InvalidLayoutWidth { width } => {
                write!(f, "layout width must be at least 1, got {width}")
            }
            Self::Shaping(err) => write!(f, "shaping failed: {err}"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Shaping(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShapeError> for Error {
    fn from(err: ShapeError) -> Self {
        Self::Shaping(err)
    }
}

/// Result type for layout engine operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;
