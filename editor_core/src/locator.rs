//! Mapping between flat offsets and 1-based (line, column) positions.
//!
//! The column arithmetic matches what a browser text input reports: the
//! line is one plus the number of `\n` before the offset, the column is the
//! distance from the last `\n` before the offset plus one, both counted in
//! UTF-16 code units.

use crate::buffer::TextBuffer;

/// A position in the buffer as (line, column). Both are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, col: 1 }
    }
}

/// Converts an offset to a 1-based position. Offsets past the end report the
/// final position of the document.
pub fn offset_to_line_col(buffer: &TextBuffer, offset: usize) -> Position {
    let offset = buffer.snap(offset);
    let line = buffer.line_of(offset);
    Position::new(line + 1, offset - buffer.line_start(line) + 1)
}

/// Converts a 1-based position to an offset, clamping the line into the
/// document and the column into the line (the end of a line is column
/// `len + 1`).
pub fn line_col_to_offset(buffer: &TextBuffer, line: usize, col: usize) -> usize {
    let line = line.clamp(1, buffer.len_lines()) - 1;
    let col = col.max(1) - 1;
    buffer.snap(buffer.line_start(line) + col.min(buffer.line_len(line)))
}
