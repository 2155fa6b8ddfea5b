//! Line-oriented structural edits.
//!
//! Every transform reads the buffer and a selection and returns the complete
//! new text plus a selection valid within it, or `None` when the operation
//! would leave the text unchanged. Transforms never touch history; the
//! caller records the undo step before committing the result.

use crate::buffer::{utf16_len, TextBuffer};
use crate::config::EditorConfig;
use crate::cursor::Selection;
use crate::error::FormatError;
use std::cmp::Ordering;

/// The outcome of a transform: the new buffer text and selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    pub text: String,
    pub selection: Selection,
}

impl Transform {
    pub fn new(text: String, selection: Selection) -> Self {
        let selection = selection.clamped(utf16_len(&text));
        Self { text, selection }
    }
}

/// The selection widened to whole lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBlock {
    /// First line (0-indexed).
    pub first: usize,
    /// Last line (0-indexed, inclusive).
    pub last: usize,
    /// Offset of the start of the first line.
    pub start: usize,
    /// Offset of the end of the last line, before its newline.
    pub end: usize,
}

impl LineBlock {
    pub fn line_count(&self) -> usize {
        self.last - self.first + 1
    }
}

/// Expands a selection to the lines it touches.
pub fn line_block(buffer: &TextBuffer, selection: Selection) -> LineBlock {
    let (start, end) = selection.range();
    let first = buffer.line_of(start);
    let last = buffer.line_of(end);
    LineBlock {
        first,
        last,
        start: buffer.line_start(first),
        end: buffer.line_end(last),
    }
}

/// A single-line edit: drop `remove` units at column `at`, then insert.
#[derive(Debug, Clone)]
struct LineEdit {
    at: usize,
    remove: usize,
    insert: String,
}

impl LineEdit {
    fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            at,
            remove: 0,
            insert: text.into(),
        }
    }

    fn remove(at: usize, len: usize) -> Self {
        Self {
            at,
            remove: len,
            insert: String::new(),
        }
    }

    fn apply(&self, line: &str) -> String {
        let at = utf16_to_byte(line, self.at);
        let to = utf16_to_byte(line, self.at + self.remove);
        let mut out = String::with_capacity(line.len() + self.insert.len());
        out.push_str(&line[..at]);
        out.push_str(&self.insert);
        out.push_str(&line[to..]);
        out
    }

    fn map_col(&self, col: usize) -> usize {
        if col < self.at {
            col
        } else if col < self.at + self.remove {
            self.at
        } else {
            col - self.remove + utf16_len(&self.insert)
        }
    }
}

/// Converts a UTF-16 column within `line` to a byte index.
fn utf16_to_byte(line: &str, col: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in line.char_indices() {
        if units >= col {
            return idx;
        }
        units += ch.len_utf16();
    }
    line.len()
}

/// Number of leading space/tab units on a line.
fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// Rewrites every line of `block` with its edit (if any) and maps the
/// selection through the edits. Returns None if no line changes.
fn apply_line_edits(
    buffer: &TextBuffer,
    block: LineBlock,
    selection: Selection,
    edits: &[Option<LineEdit>],
) -> Option<Transform> {
    if edits.iter().all(Option::is_none) {
        return None;
    }

    let lines = buffer.lines_range(block.first, block.last);
    let mut new_lines = Vec::with_capacity(lines.len());
    let mut new_starts = Vec::with_capacity(lines.len());
    let mut pos = block.start;
    for (line, edit) in lines.iter().zip(edits) {
        let new_line = match edit {
            Some(edit) => edit.apply(line),
            None => line.clone(),
        };
        new_starts.push(pos);
        pos += utf16_len(&new_line) + 1;
        new_lines.push(new_line);
    }

    let map = |offset: usize| -> usize {
        let line = buffer.line_of(offset);
        let col = offset - buffer.line_start(line);
        let idx = line - block.first;
        let col = match &edits[idx] {
            Some(edit) => edit.map_col(col),
            None => col,
        };
        new_starts[idx] + col
    };

    let (start, end) = selection.range();
    let text = splice(buffer, block.start, block.end, &new_lines.join("\n"));
    Some(Transform::new(text, Selection::with_range(map(start), map(end))))
}

/// Returns the buffer text with `start..end` replaced by `replacement`.
pub fn splice(buffer: &TextBuffer, start: usize, end: usize, replacement: &str) -> String {
    let mut text = buffer.slice(0, start);
    text.push_str(replacement);
    text.push_str(&buffer.slice(end, buffer.len_utf16()));
    text
}

/// Prefixes every line of the line-expanded selection with one indent unit.
pub fn indent(
    buffer: &TextBuffer,
    selection: Selection,
    config: &EditorConfig,
) -> Option<Transform> {
    if config.indent_width == 0 {
        return None;
    }
    let block = line_block(buffer, selection);
    let unit = config.indent_unit();
    let edits: Vec<_> = (0..block.line_count())
        .map(|_| Some(LineEdit::insert(0, unit.as_str())))
        .collect();
    apply_line_edits(buffer, block, selection, &edits)
}

/// Removes one level of indentation from every line of the block: a leading
/// tab, or up to `indent_width` leading spaces.
pub fn outdent(
    buffer: &TextBuffer,
    selection: Selection,
    config: &EditorConfig,
) -> Option<Transform> {
    let block = line_block(buffer, selection);
    let edits: Vec<_> = buffer
        .lines_range(block.first, block.last)
        .iter()
        .map(|line| {
            if line.starts_with('\t') {
                return Some(LineEdit::remove(0, 1));
            }
            let spaces = line
                .chars()
                .take(config.indent_width)
                .take_while(|c| *c == ' ')
                .count();
            (spaces > 0).then(|| LineEdit::remove(0, spaces))
        })
        .collect();
    apply_line_edits(buffer, block, selection, &edits)
}

/// Comments every line of the block, or uncomments them all when every line
/// already carries the comment token after its indentation.
pub fn toggle_comment(
    buffer: &TextBuffer,
    selection: Selection,
    config: &EditorConfig,
) -> Option<Transform> {
    let token = config.comment_token.as_str();
    if token.is_empty() {
        return None;
    }
    let block = line_block(buffer, selection);
    let lines = buffer.lines_range(block.first, block.last);

    let commented = lines.iter().all(|line| {
        let ws = leading_whitespace(line);
        line[ws..].starts_with(token)
    });

    let token_len = utf16_len(token);
    let edits: Vec<_> = lines
        .iter()
        .map(|line| {
            let ws = leading_whitespace(line);
            if commented {
                let space = line[ws..][token.len()..].starts_with(' ');
                Some(LineEdit::remove(ws, token_len + usize::from(space)))
            } else {
                Some(LineEdit::insert(ws, format!("{token} ")))
            }
        })
        .collect();
    apply_line_edits(buffer, block, selection, &edits)
}

/// Removes the lines of the block together with the newline that ends them.
/// The final line has no newline, so only its text goes.
pub fn delete_line(buffer: &TextBuffer, selection: Selection) -> Option<Transform> {
    let block = line_block(buffer, selection);
    let end = if block.last + 1 < buffer.len_lines() {
        buffer.line_start(block.last + 1)
    } else {
        block.end
    };
    if block.start == end {
        return None;
    }
    let text = splice(buffer, block.start, end, "");
    Some(Transform::new(text, Selection::new(block.start)))
}

/// Inserts a copy of the block right below it and moves the selection onto
/// the copy, keeping its columns.
pub fn duplicate_line(buffer: &TextBuffer, selection: Selection) -> Option<Transform> {
    let block = line_block(buffer, selection);
    let block_text = buffer.slice(block.start, block.end);
    let text = splice(buffer, block.end, block.end, &format!("\n{block_text}"));
    let shift = block.end - block.start + 1;
    let (start, end) = selection.range();
    Some(Transform::new(
        text,
        Selection::with_range(start + shift, end + shift),
    ))
}

/// Swaps the block with the line above it. No-op on the first line.
pub fn move_line_up(buffer: &TextBuffer, selection: Selection) -> Option<Transform> {
    let block = line_block(buffer, selection);
    if block.first == 0 {
        return None;
    }
    let prev = block.first - 1;
    let prev_text = buffer.line(prev)?;
    let block_text = buffer.slice(block.start, block.end);
    let text = splice(
        buffer,
        buffer.line_start(prev),
        block.end,
        &format!("{block_text}\n{prev_text}"),
    );
    let shift = utf16_len(&prev_text) + 1;
    let (start, end) = selection.range();
    Some(Transform::new(
        text,
        Selection::with_range(start - shift, end - shift),
    ))
}

/// Swaps the block with the line below it. No-op on the last line.
pub fn move_line_down(buffer: &TextBuffer, selection: Selection) -> Option<Transform> {
    let block = line_block(buffer, selection);
    if block.last + 1 >= buffer.len_lines() {
        return None;
    }
    let next = block.last + 1;
    let next_text = buffer.line(next)?;
    let block_text = buffer.slice(block.start, block.end);
    let text = splice(
        buffer,
        block.start,
        buffer.line_end(next),
        &format!("{next_text}\n{block_text}"),
    );
    let shift = utf16_len(&next_text) + 1;
    let (start, end) = selection.range();
    Some(Transform::new(
        text,
        Selection::with_range(start + shift, end + shift),
    ))
}

/// Collation used by sort lines: case-insensitive first, lowercase before
/// uppercase on ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Sorts the lines of the block. An empty selection sorts the whole
/// document. The sort is stable.
pub fn sort_lines(buffer: &TextBuffer, selection: Selection) -> Option<Transform> {
    let block = if selection.has_selection() {
        line_block(buffer, selection)
    } else {
        line_block(buffer, Selection::with_range(0, buffer.len_utf16()))
    };
    let lines = buffer.lines_range(block.first, block.last);
    let mut sorted = lines.clone();
    sorted.sort_by(|a, b| locale_cmp(a, b));
    if sorted == lines {
        return None;
    }
    let text = splice(buffer, block.start, block.end, &sorted.join("\n"));
    Some(Transform::new(text, selection))
}

fn convert_case(
    buffer: &TextBuffer,
    selection: Selection,
    convert: impl Fn(&str) -> String,
) -> Option<Transform> {
    let (start, end) = selection.selected_range()?;
    let selected = buffer.slice(start, end);
    let converted = convert(&selected);
    if converted == selected {
        return None;
    }
    let text = splice(buffer, start, end, &converted);
    let end = start + utf16_len(&converted);
    Some(Transform::new(text, Selection::with_range(start, end)))
}

/// Uppercases exactly the selected text.
pub fn to_upper_case(buffer: &TextBuffer, selection: Selection) -> Option<Transform> {
    convert_case(buffer, selection, str::to_uppercase)
}

/// Lowercases exactly the selected text.
pub fn to_lower_case(buffer: &TextBuffer, selection: Selection) -> Option<Transform> {
    convert_case(buffer, selection, str::to_lowercase)
}

/// Strips trailing whitespace from every line of the document. Selection
/// ends stay on their lines, pulled back if they sat in removed whitespace.
pub fn trim_whitespace(buffer: &TextBuffer, selection: Selection) -> Option<Transform> {
    let last = buffer.len_lines() - 1;
    let lines = buffer.lines_range(0, last);
    let trimmed: Vec<&str> = lines.iter().map(|line| line.trim_end()).collect();
    if lines.iter().zip(&trimmed).all(|(a, b)| a.len() == b.len()) {
        return None;
    }

    let mut starts = Vec::with_capacity(trimmed.len());
    let mut pos = 0;
    for line in &trimmed {
        starts.push(pos);
        pos += utf16_len(line) + 1;
    }
    let map = |offset: usize| {
        let line = buffer.line_of(offset);
        let col = offset - buffer.line_start(line);
        starts[line] + col.min(utf16_len(trimmed[line]))
    };

    let (start, end) = selection.range();
    Some(Transform::new(
        trimmed.join("\n"),
        Selection::with_range(map(start), map(end)),
    ))
}

/// Parses the whole document as JSON and re-emits it with 2-space
/// indentation, keeping key order. Unchanged output yields `Ok(None)`.
pub fn format_structured_data(
    buffer: &TextBuffer,
    selection: Selection,
) -> Result<Option<Transform>, FormatError> {
    let text = buffer.to_string();
    let value: serde_json::Value = serde_json::from_str(&text)?;
    let formatted = serde_json::to_string_pretty(&value)?;
    if formatted == text {
        return Ok(None);
    }
    Ok(Some(Transform::new(formatted, selection)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(text: &str) -> TextBuffer {
        TextBuffer::from_str(text)
    }

    fn config() -> EditorConfig {
        EditorConfig::default()
    }

    #[test]
    fn test_line_block() {
        let b = buf("ab\ncd\nef");
        let block = line_block(&b, Selection::with_range(4, 1));
        assert_eq!((block.first, block.last, block.start, block.end), (0, 1, 0, 5));
        // An end at column 1 still includes that line.
        let block = line_block(&b, Selection::with_range(0, 6));
        assert_eq!(block.last, 2);
    }

    #[test]
    fn test_indent_block() {
        let b = buf("a\nb\nc");
        let t = indent(&b, Selection::with_range(0, 5), &config()).unwrap();
        assert_eq!(t.text, "  a\n  b\n  c");
        assert_eq!(t.selection, Selection::with_range(2, 11));
    }

    #[test]
    fn test_indent_cursor_only_current_line() {
        let b = buf("a\nb");
        let t = indent(&b, Selection::new(3), &config()).unwrap();
        assert_eq!(t.text, "a\n  b");
        assert_eq!(t.selection, Selection::new(5));
    }

    #[test]
    fn test_outdent() {
        let b = buf("    a\n b\nc\n\td");
        let t = outdent(&b, Selection::with_range(0, b.len_utf16()), &config()).unwrap();
        assert_eq!(t.text, "  a\nb\nc\nd");
        assert_eq!(t.selection, Selection::with_range(0, t.text.len()));
    }

    #[test]
    fn test_outdent_noop_without_indentation() {
        let b = buf("a\nb");
        assert!(outdent(&b, Selection::with_range(0, 3), &config()).is_none());
    }

    #[test]
    fn test_outdent_cursor_inside_indent() {
        let b = buf("    abc");
        let t = outdent(&b, Selection::new(1), &config()).unwrap();
        assert_eq!(t.text, "  abc");
        assert_eq!(t.selection, Selection::new(0));
    }

    #[test]
    fn test_toggle_comment_adds_after_indent() {
        let b = buf("fn a() {\n    x();\n}");
        let t = toggle_comment(&b, Selection::with_range(0, b.len_utf16()), &config()).unwrap();
        assert_eq!(t.text, "// fn a() {\n    // x();\n// }");
    }

    #[test]
    fn test_toggle_comment_removes_when_all_commented() {
        let b = buf("  // a\n//b");
        let t = toggle_comment(&b, Selection::with_range(0, b.len_utf16()), &config()).unwrap();
        assert_eq!(t.text, "  a\nb");
    }

    #[test]
    fn test_toggle_comment_mixed_block_adds_to_all() {
        let b = buf("// a\nb");
        let t = toggle_comment(&b, Selection::with_range(0, 6), &config()).unwrap();
        assert_eq!(t.text, "// // a\n// b");
    }

    #[test]
    fn test_toggle_comment_twice_restores() {
        let original = "if x {\n\n  y();\n}";
        let b = buf(original);
        let sel = Selection::with_range(0, b.len_utf16());
        let once = toggle_comment(&b, sel, &config()).unwrap();
        let b2 = buf(&once.text);
        let twice = toggle_comment(&b2, once.selection, &config()).unwrap();
        assert_eq!(twice.text, original);
    }

    #[test]
    fn test_delete_line() {
        let b = buf("a\nb\nc");
        let t = delete_line(&b, Selection::new(2)).unwrap();
        assert_eq!(t.text, "a\nc");
        assert_eq!(t.selection, Selection::new(2));
    }

    #[test]
    fn test_delete_last_line_keeps_previous_newline() {
        let b = buf("a\nb");
        let t = delete_line(&b, Selection::new(3)).unwrap();
        assert_eq!(t.text, "a\n");
        assert_eq!(t.selection, Selection::new(2));
    }

    #[test]
    fn test_delete_line_on_empty_document() {
        assert!(delete_line(&buf(""), Selection::new(0)).is_none());
    }

    #[test]
    fn test_duplicate_line() {
        let b = buf("ab\ncd");
        let t = duplicate_line(&b, Selection::new(1)).unwrap();
        assert_eq!(t.text, "ab\nab\ncd");
        assert_eq!(t.selection, Selection::new(4));

        let t = duplicate_line(&b, Selection::new(4)).unwrap();
        assert_eq!(t.text, "ab\ncd\ncd");
        assert_eq!(t.selection, Selection::new(7));
    }

    #[test]
    fn test_move_line_down() {
        let b = buf("x\ny\nz");
        let t = move_line_down(&b, Selection::new(0)).unwrap();
        assert_eq!(t.text, "y\nx\nz");
        assert_eq!(t.selection, Selection::new(2));
        assert!(move_line_down(&b, Selection::new(4)).is_none());
    }

    #[test]
    fn test_move_line_up() {
        let b = buf("x\nyy\nz");
        let t = move_line_up(&b, Selection::new(3)).unwrap();
        assert_eq!(t.text, "yy\nx\nz");
        assert_eq!(t.selection, Selection::new(1));
        assert!(move_line_up(&b, Selection::new(0)).is_none());
    }

    #[test]
    fn test_move_block_down() {
        let b = buf("a\nb\nc\nd");
        let t = move_line_down(&b, Selection::with_range(0, 3)).unwrap();
        assert_eq!(t.text, "c\na\nb\nd");
        assert_eq!(t.selection, Selection::with_range(2, 5));
    }

    #[test]
    fn test_sort_lines() {
        let b = buf("banana\napple\ncherry");
        let t = sort_lines(&b, Selection::with_range(0, b.len_utf16())).unwrap();
        assert_eq!(t.text, "apple\nbanana\ncherry");
    }

    #[test]
    fn test_sort_lines_case_insensitive() {
        let b = buf("b\nB\na\nC");
        let t = sort_lines(&b, Selection::new(0)).unwrap();
        assert_eq!(t.text, "a\nb\nB\nC");
    }

    #[test]
    fn test_sort_lines_block_only() {
        let b = buf("z\nb\na\ny");
        let t = sort_lines(&b, Selection::with_range(2, 5)).unwrap();
        assert_eq!(t.text, "z\na\nb\ny");
        assert!(sort_lines(&buf("a\nb"), Selection::new(0)).is_none());
    }

    #[test]
    fn test_case_transforms() {
        let b = buf("hello world");
        let t = to_upper_case(&b, Selection::with_range(6, 11)).unwrap();
        assert_eq!(t.text, "hello WORLD");
        assert_eq!(t.selection, Selection::with_range(6, 11));
        assert!(to_upper_case(&b, Selection::new(3)).is_none());

        let b = buf("ABC straße");
        let t = to_lower_case(&b, Selection::with_range(0, 3)).unwrap();
        assert_eq!(t.text, "abc straße");

        let t = to_upper_case(&b, Selection::with_range(4, 10)).unwrap();
        assert_eq!(t.text, "ABC STRASSE");
        assert_eq!(t.selection, Selection::with_range(4, 11));
    }

    #[test]
    fn test_trim_whitespace() {
        let b = buf("a  \nb\t\n  \nc");
        let t = trim_whitespace(&b, Selection::new(3)).unwrap();
        assert_eq!(t.text, "a\nb\n\nc");
        assert_eq!(t.selection, Selection::new(1));
        assert!(trim_whitespace(&buf(&t.text), t.selection).is_none());
    }

    #[test]
    fn test_format_structured_data() {
        let b = buf(r#"{"b":1,"a":[true,null]}"#);
        let t = format_structured_data(&b, Selection::new(3)).unwrap().unwrap();
        assert_eq!(t.text, "{\n  \"b\": 1,\n  \"a\": [\n    true,\n    null\n  ]\n}");
        assert_eq!(t.selection, Selection::new(3));
    }

    #[test]
    fn test_format_structured_data_invalid() {
        let err = format_structured_data(&buf("{ nope"), Selection::new(0)).unwrap_err();
        assert_eq!(err.line, 1);
        assert!(format_structured_data(&buf(""), Selection::new(0)).is_err());
    }

    #[test]
    fn test_format_already_formatted() {
        let b = buf("{\n  \"a\": 1\n}");
        assert_eq!(format_structured_data(&b, Selection::new(0)).unwrap(), None);
    }

    #[test]
    fn test_selections_stay_in_bounds() {
        let texts = ["", "a", "a\n", "  x\n\ty  \n// z", "one\ntwo\nthree\n"];
        for text in texts {
            let b = buf(text);
            let len = b.len_utf16();
            for start in 0..=len {
                for end in start..=len {
                    let sel = Selection::with_range(start, end);
                    let results = [
                        indent(&b, sel, &config()),
                        outdent(&b, sel, &config()),
                        toggle_comment(&b, sel, &config()),
                        delete_line(&b, sel),
                        duplicate_line(&b, sel),
                        move_line_up(&b, sel),
                        move_line_down(&b, sel),
                        sort_lines(&b, sel),
                        to_upper_case(&b, sel),
                        trim_whitespace(&b, sel),
                    ];
                    for t in results.into_iter().flatten() {
                        let (s, e) = t.selection.range();
                        assert!(s <= e && e <= utf16_len(&t.text), "{text:?} {sel:?}");
                    }
                }
            }
        }
    }
}
