//! Layout cursor
//!
//! The cursor is threaded through the tree walk by mutable reference, so
//! every indent save/restore is visible at its call site.

use crate::config::PunctuationMode;

/// A grid cell on a specific page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellPos {
    pub page: usize,
    pub col: usize,
    pub row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Column on the current page, counted across both halves
    pub col: usize,
    pub row: usize,
    /// Rows reserved at the top of each column by the enclosing paragraph
    pub indent: usize,
    /// Set by an elevation for the rest of its column
    pub ignore_indent: bool,
    pub punctuation: PunctuationMode,
    /// Most recently filled cell, anchor for detached judou marks
    pub last_cell: CellPos,
}

impl Cursor {
    pub fn new(punctuation: PunctuationMode) -> Self {
        Self {
            col: 0,
            row: 0,
            indent: 0,
            ignore_indent: false,
            punctuation,
            last_cell: CellPos::default(),
        }
    }

    /// Usable rows in the current column, never less than one
    pub fn capacity(&self, rows_per_column: usize) -> usize {
        let reserved = if self.ignore_indent { 0 } else { self.indent };
        rows_per_column.saturating_sub(reserved).max(1)
    }

    /// Usable rows in the next column, where an elevation no longer applies
    pub fn fresh_capacity(&self, rows_per_column: usize) -> usize {
        rows_per_column.saturating_sub(self.indent).max(1)
    }

    /// Rows still free in the current column
    pub fn remaining(&self, rows_per_column: usize) -> usize {
        self.capacity(rows_per_column).saturating_sub(self.row)
    }

    /// Move to the top of the next column on the same page
    pub(crate) fn next_column(&mut self) {
        self.col += 1;
        self.row = 0;
        self.ignore_indent = false;
    }

    /// Move to the first column of a fresh page
    pub(crate) fn next_page(&mut self) {
        self.col = 0;
        self.row = 0;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(PunctuationMode::default())
    }
}
