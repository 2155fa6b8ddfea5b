//! Text buffer implementation using ropey.
//!
//! Every offset taken or returned by this module is a UTF-16 code unit
//! index, the coordinate space a browser text input uses for
//! `selectionStart`/`selectionEnd`. Lines are separated by `\n` only.

use ropey::Rope;
use std::fmt;

/// A text buffer backed by a rope data structure.
///
/// Alongside the current content it keeps the clean snapshot taken when the
/// document was loaded or last saved; comparing the two yields the
/// modified flag.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    clean: Rope,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl TextBuffer {
    /// Creates a new empty text buffer.
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            clean: Rope::new(),
        }
    }

    /// Creates a clean text buffer from a string.
    pub fn from_str(text: &str) -> Self {
        let rope = Rope::from_str(text);
        Self {
            clean: rope.clone(),
            rope,
        }
    }

    /// Returns the underlying rope.
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Replaces the content and the clean snapshot (document opened).
    pub fn load(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.clean = self.rope.clone();
    }

    /// Replaces the content unconditionally. The clean snapshot is untouched.
    pub fn set_content(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Replaces the content with an existing rope (undo/redo restore).
    pub(crate) fn set_rope(&mut self, rope: Rope) {
        self.rope = rope;
    }

    /// Returns true if the content differs from the clean snapshot.
    pub fn is_modified(&self) -> bool {
        self.rope != self.clean
    }

    /// Takes the current content as the new clean snapshot.
    pub fn mark_saved(&mut self) {
        self.clean = self.rope.clone();
    }

    /// Takes `text` as the clean snapshot. Used when the text that reached
    /// storage is older than the current content.
    pub fn mark_saved_as(&mut self, text: &str) {
        self.clean = Rope::from_str(text);
    }

    /// Returns the clean snapshot as a string.
    pub fn clean_text(&self) -> String {
        self.clean.to_string()
    }

    /// Returns the length of the buffer in UTF-16 code units.
    pub fn len_utf16(&self) -> usize {
        self.rope.len_utf16_cu()
    }

    /// Returns the total number of characters in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the number of lines (1 + number of `\n`).
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Converts a UTF-16 offset to a char index. Offsets past the end clamp,
    /// offsets inside a surrogate pair round down to the pair.
    pub fn offset_to_char(&self, offset: usize) -> usize {
        self.rope.utf16_cu_to_char(offset.min(self.len_utf16()))
    }

    /// Converts a char index to a UTF-16 offset.
    pub fn char_to_offset(&self, char_idx: usize) -> usize {
        self.rope.char_to_utf16_cu(char_idx.min(self.len_chars()))
    }

    /// Converts a byte index into the buffer's UTF-8 text to a UTF-16 offset.
    pub fn byte_to_offset(&self, byte_idx: usize) -> usize {
        let char_idx = self.rope.byte_to_char(byte_idx.min(self.rope.len_bytes()));
        self.rope.char_to_utf16_cu(char_idx)
    }

    /// Snaps an offset onto a char boundary inside the buffer.
    pub fn snap(&self, offset: usize) -> usize {
        self.char_to_offset(self.offset_to_char(offset))
    }

    /// Returns the 0-indexed line containing the offset.
    pub fn line_of(&self, offset: usize) -> usize {
        self.rope.char_to_line(self.offset_to_char(offset))
    }

    /// Returns the offset of the start of a line.
    pub fn line_start(&self, line: usize) -> usize {
        if line >= self.len_lines() {
            self.len_utf16()
        } else {
            self.char_to_offset(self.rope.line_to_char(line))
        }
    }

    /// Returns the offset of the end of a line (before its newline).
    pub fn line_end(&self, line: usize) -> usize {
        if line >= self.len_lines() {
            self.len_utf16()
        } else {
            self.line_start(line) + self.line_len(line)
        }
    }

    /// Returns the length of a line in UTF-16 code units (excluding newline).
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let mut len = slice.len_utf16_cu();
        if slice.len_chars() > 0 && slice.char(slice.len_chars() - 1) == '\n' {
            len -= 1;
        }
        len
    }

    /// Returns the line at the given index without its newline.
    pub fn line(&self, line: usize) -> Option<String> {
        if line >= self.len_lines() {
            None
        } else {
            let mut s = self.rope.line(line).to_string();
            if s.ends_with('\n') {
                s.pop();
            }
            Some(s)
        }
    }

    /// Returns the lines in `first..=last` without their newlines.
    pub fn lines_range(&self, first: usize, last: usize) -> Vec<String> {
        (first..=last).filter_map(|i| self.line(i)).collect()
    }

    /// Returns the text between two offsets.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let start = self.offset_to_char(start);
        let end = self.offset_to_char(end).max(start);
        self.rope.slice(start..end).to_string()
    }
}

/// Returns the length of a string in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}
