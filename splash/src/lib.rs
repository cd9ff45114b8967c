// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rich text layout on top of an external shaping service.
//!
//! A [`Document`] holds styled text, tabs and embedded objects split into
//! paragraphs. A [`Layout`] shapes the document's paragraphs through a
//! [`Shaper`](shaping::Shaper), keeps the results in a bounded cache, breaks
//! them into lines at a given width and direction, and paints those lines onto
//! a [`DrawingSurface`](device::DrawingSurface).
//!
//! Edits to the document only invalidate work from the first changed
//! paragraph onward; earlier shaping results and lines are kept.
//!
//! ```
//! use splash::geometry::{Point, Rect};
//! use splash::shaping::monospace::MonospaceShaper;
//! use splash::{Document, Layout, LayoutOptions, NullSurface, PaintOptions, SnapKind};
//!
//! let mut document = Document::new();
//! document.append_text("The quick brown fox").unwrap();
//!
//! let mut layout = Layout::new(LayoutOptions::default().with_width(100));
//! let mut shaper = MonospaceShaper::new(10);
//! let mut surface = NullSurface;
//! layout
//!     .paint(
//!         &mut document,
//!         &mut shaper,
//!         &mut surface,
//!         Point::new(0, 0),
//!         Rect::new(0, 0, 100, 100),
//!         &PaintOptions::default(),
//!         0..0,
//!     )
//!     .unwrap();
//! assert_eq!(layout.lines().len(), 2);
//!
//! let position = layout
//!     .snap_position_at_point(
//!         &mut document,
//!         &mut shaper,
//!         &mut surface,
//!         Point::new(0, 0),
//!         Point::new(25, 5),
//!     )
//!     .unwrap();
//! assert_eq!(position.kind, SnapKind::Exact);
//! assert_eq!(position.char_index, 2);
//! ```

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod buffer;
mod cache;
mod error;
mod lookup_table;
mod recursion;
mod script;

pub mod device;
pub mod document;
pub mod embedded;
pub mod geometry;
pub mod layout;
pub mod shaping;
pub mod style;

#[cfg(test)]
mod tests;

pub use buffer::GrowableBuffer;
pub use error::{Error, Result};
pub use recursion::{RecursionGuard, RecursionScope};
pub use script::{ScriptParagraph, ScriptRun};

pub use device::NullSurface;
pub use document::{AnnotationKey, Document};
pub use layout::{Layout, LayoutOptions, PaintOptions, ScriptLine, SnapKind, SnapPosition};
pub use style::{Color, Font, Style, TabStopRuler};
