// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::style::Color;

/// Configuration of a [`Layout`](super::Layout).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Maximum number of shaped paragraphs kept in memory.
    pub script_paragraph_cache_size: usize,
    /// Smallest ascent of a line, and the height of a line without runs.
    pub min_line_height: i32,
    /// Initial desired layout width.
    pub width: i32,
    /// Initial desired reading direction.
    pub right_to_left: bool,
    /// Initial capacity of the line buffer.
    pub initial_lines: usize,
    /// Initial capacity of each paragraph's script run buffer.
    pub initial_script_runs: usize,
    /// Initial capacity of each paragraph's character buffers.
    pub initial_paragraph_chars: usize,
}

impl LayoutOptions {
    /// Sets the cache size.
    #[inline]
    pub fn with_script_paragraph_cache_size(mut self, size: usize) -> Self {
        self.script_paragraph_cache_size = size;
        self
    }

    /// Sets the minimum line height.
    #[inline]
    pub fn with_min_line_height(mut self, height: i32) -> Self {
        self.min_line_height = height;
        self
    }

    /// Sets the initial desired width.
    #[inline]
    pub fn with_width(mut self, width: i32) -> Self {
        self.width = width;
        self
    }

    /// Sets the initial reading direction.
    #[inline]
    pub fn with_right_to_left(mut self, right_to_left: bool) -> Self {
        self.right_to_left = right_to_left;
        self
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            script_paragraph_cache_size: 64,
            min_line_height: 1,
            width: 400,
            right_to_left: false,
            initial_lines: 64,
            initial_script_runs: 8,
            initial_paragraph_chars: 128,
        }
    }
}

/// Colors used when painting a layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PaintOptions {
    /// Background of the layout area. Painted by the host; embedded objects
    /// may use it.
    pub background_color: Color,
    /// Color of selected text.
    pub selected_text_color: Color,
    /// Background of selected text.
    pub selected_background_color: Color,
}

impl Default for PaintOptions {
    fn default() -> Self {
        Self {
            background_color: Color::WHITE,
            selected_text_color: Color::WHITE,
            selected_background_color: Color::rgb(0, 120, 215),
        }
    }
}
