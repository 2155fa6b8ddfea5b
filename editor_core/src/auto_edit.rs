//! Keystroke-driven edits: typed characters, bracket wrapping, Enter with
//! auto-indent, Tab and Shift+Tab, and the plain deletion keys.

use crate::buffer::{utf16_len, TextBuffer};
use crate::config::EditorConfig;
use crate::cursor::Selection;
use crate::transform::{self, splice, Transform};

/// Opening characters and the closer used to wrap a selection.
pub const DEFAULT_PAIRS: &[(char, char)] = &[
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('\'', '\''),
    ('"', '"'),
    ('`', '`'),
];

/// Returns the closing character for an opener.
pub fn closer_for(ch: char) -> Option<char> {
    DEFAULT_PAIRS
        .iter()
        .find(|(open, _)| *open == ch)
        .map(|(_, close)| *close)
}

/// Replaces the selection with `text` and leaves a caret after it.
pub fn insert_text(buffer: &TextBuffer, selection: Selection, text: &str) -> Option<Transform> {
    let (start, end) = selection.range();
    if text.is_empty() && start == end {
        return None;
    }
    let new_text = splice(buffer, start, end, text);
    Some(Transform::new(new_text, Selection::new(start + utf16_len(text))))
}

/// Wraps a non-empty selection in `open`/`close`, keeping the inner text
/// selected. Returns None for an empty selection.
pub fn wrap_selection(
    buffer: &TextBuffer,
    selection: Selection,
    open: char,
    close: char,
) -> Option<Transform> {
    let (start, end) = selection.selected_range()?;
    let inner = buffer.slice(start, end);
    let text = splice(buffer, start, end, &format!("{open}{inner}{close}"));
    let shift = open.len_utf16();
    Some(Transform::new(
        text,
        Selection::with_range(start + shift, end + shift),
    ))
}

/// A typed character. An opening bracket or quote over a non-empty
/// selection wraps it; anything else replaces the selection literally.
/// No closing character is ever inserted for an empty selection.
pub fn type_char(
    buffer: &TextBuffer,
    selection: Selection,
    ch: char,
    config: &EditorConfig,
) -> Option<Transform> {
    if config.auto_close_pairs && selection.has_selection() {
        if let Some(close) = closer_for(ch) {
            return wrap_selection(buffer, selection, ch, close);
        }
    }
    insert_text(buffer, selection, ch.encode_utf8(&mut [0; 4]))
}

/// Enter: replaces the selection with a newline followed by the leading
/// whitespace of the line being split, copied verbatim. The copied
/// whitespace never extends past the cursor column.
pub fn newline(
    buffer: &TextBuffer,
    selection: Selection,
    config: &EditorConfig,
) -> Option<Transform> {
    let start = selection.start();
    let mut text = String::from("\n");
    if config.auto_indent {
        let line = buffer.line_of(start);
        let col = start - buffer.line_start(line);
        let content = buffer.line(line).unwrap_or_default();
        text.extend(
            content
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .take(col),
        );
    }
    insert_text(buffer, selection, &text)
}

/// Tab: indents the line-expanded block when text is selected, otherwise
/// inserts one indent unit at the cursor.
pub fn tab(buffer: &TextBuffer, selection: Selection, config: &EditorConfig) -> Option<Transform> {
    if selection.has_selection() {
        transform::indent(buffer, selection, config)
    } else {
        insert_text(buffer, selection, &config.indent_unit())
    }
}

/// Shift+Tab: outdents the line-expanded block.
pub fn shift_tab(
    buffer: &TextBuffer,
    selection: Selection,
    config: &EditorConfig,
) -> Option<Transform> {
    transform::outdent(buffer, selection, config)
}

/// Backspace: removes the selection, or the character before the caret.
pub fn delete_backward(buffer: &TextBuffer, selection: Selection) -> Option<Transform> {
    if selection.has_selection() {
        return insert_text(buffer, selection, "");
    }
    let pos = selection.head;
    let ch = buffer.offset_to_char(pos);
    if ch == 0 {
        return None;
    }
    let prev = buffer.char_to_offset(ch - 1);
    insert_text(buffer, Selection::with_range(prev, buffer.char_to_offset(ch)), "")
}

/// Delete: removes the selection, or the character after the caret.
pub fn delete_forward(buffer: &TextBuffer, selection: Selection) -> Option<Transform> {
    if selection.has_selection() {
        return insert_text(buffer, selection, "");
    }
    let ch = buffer.offset_to_char(selection.head);
    if ch >= buffer.len_chars() {
        return None;
    }
    let start = buffer.char_to_offset(ch);
    insert_text(buffer, Selection::with_range(start, buffer.char_to_offset(ch + 1)), "")
}
