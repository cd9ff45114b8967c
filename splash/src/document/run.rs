// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::document::MAX_CHARS_PER_RUN;
use crate::error::{Error, Result};

/// Kind-dependent payload of a [`Run`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunKind {
    /// A single tab character, expanded to the next tab stop during layout.
    #[default]
    Tab,
    /// Plain text.
    Text {
        /// Number of characters in the run.
        char_count: u16,
    },
    /// A single embedded object occupying one placeholder character.
    Object {
        /// Index into the document's object table.
        object_index: u16,
    },
}

impl RunKind {
    fn name(self) -> &'static str {
        match self {
            Self::Tab => "tab",
            Self::Text { .. } => "text",
            Self::Object { .. } => "object",
        }
    }
}

/// The smallest styled unit of a document.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Run {
    pub(super) style_index: u8,
    kind: RunKind,
}

impl Run {
    pub(crate) fn text(style_index: u8, char_count: u16) -> Self {
        Self {
            style_index,
            kind: RunKind::Text { char_count },
        }
    }

    pub(crate) fn tab(style_index: u8) -> Self {
        Self {
            style_index,
            kind: RunKind::Tab,
        }
    }

    pub(crate) fn object(style_index: u8, object_index: u16) -> Self {
        Self {
            style_index,
            kind: RunKind::Object { object_index },
        }
    }

    /// Index of the run's style in the document's style table.
    pub fn style_index(&self) -> usize {
        usize::from(self.style_index)
    }

    /// The kind of the run, with its payload.
    pub fn kind(&self) -> RunKind {
        self.kind
    }

    /// Returns `true` for text runs.
    pub fn is_text(&self) -> bool {
        matches!(self.kind, RunKind::Text { .. })
    }

    /// Returns `true` for embedded object runs.
    pub fn is_object(&self) -> bool {
        matches!(self.kind, RunKind::Object { .. })
    }

    /// Returns `true` if the run contains a tab that is expanded during layout.
    pub fn requires_tab_expansion(&self) -> bool {
        matches!(self.kind, RunKind::Tab)
    }

    /// Number of characters covered by the run. Tab and object runs cover one
    /// character each.
    pub fn char_count(&self) -> usize {
        match self.kind {
            RunKind::Text { char_count } => usize::from(char_count),
            RunKind::Tab | RunKind::Object { .. } => 1,
        }
    }

    /// Sets the number of characters of a text run.
    ///
    /// Fails with [`Error::UnsupportedRunKind`] for other kinds.
    pub fn set_char_count(&mut self, count: usize) -> Result<()> {
        match &mut self.kind {
            RunKind::Text { char_count } => {
                *char_count = u16::try_from(count).map_err(|_| Error::CapacityExceeded {
                    what: "characters per run",
                    max: MAX_CHARS_PER_RUN,
                })?;
                Ok(())
            }
            kind => Err(Error::UnsupportedRunKind {
                kind: kind.name(),
                operation: "setting the character count",
            }),
        }
    }

    /// Index of the embedded object of an object run.
    ///
    /// Fails with [`Error::UnsupportedRunKind`] for other kinds.
    pub fn object_index(&self) -> Result<usize> {
        match self.kind {
            RunKind::Object { object_index } => Ok(usize::from(object_index)),
            kind => Err(Error::UnsupportedRunKind {
                kind: kind.name(),
                operation: "reading the object index",
            }),
        }
    }
}

/// A contiguous span of the document between paragraph breaks.
///
/// `char_count` always equals the sum of the character counts of the
/// paragraph's runs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Paragraph {
    /// Index of the first character.
    pub char_index: usize,
    /// Number of characters, including the terminating newline if any.
    pub char_count: usize,
    /// Index of the first run.
    pub run_index: usize,
    /// Number of runs.
    pub run_count: usize,
}

impl Paragraph {
    /// One past the last character.
    pub fn char_end(&self) -> usize {
        self.char_index + self.char_count
    }

    /// One past the last run.
    pub fn run_end(&self) -> usize {
        self.run_index + self.run_count
    }
}
