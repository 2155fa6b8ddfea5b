//! Main editor logic.
//!
//! An [`Editor`] is the engine for one open document: it owns the buffer,
//! the selection, the undo history and the search state. Nothing is shared
//! between editors, so every open tab has its own history. All operations
//! are synchronous; loading and saving happen in the host, which hands the
//! text over with [`Editor::load_content`] and reports success with
//! [`Editor::mark_saved`].

use crate::auto_edit;
use crate::buffer::TextBuffer;
use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::cursor::Selection;
use crate::error::FormatError;
use crate::history::{EditKind, History, Snapshot};
use crate::locator::{self, Position};
use crate::search::{Search, SearchMatch};
use crate::syntax::{Highlighter, Language, PlainText};
use crate::transform::{self, Transform};
use std::path::Path;
use std::time::Duration;

/// The main editor state.
#[derive(Debug)]
pub struct Editor {
    /// The text buffer, including the clean snapshot.
    buffer: TextBuffer,
    /// The selection, in UTF-16 offsets.
    selection: Selection,
    /// Undo/redo history.
    history: History,
    /// Find/replace state.
    search: Search,
    config: EditorConfig,
    /// Language of the open document.
    language: Language,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Creates a new empty editor with default settings.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Creates a new empty editor.
    pub fn with_config(config: EditorConfig) -> Self {
        let mut history = History::new(config.history_limit);
        history.set_coalesce_enabled(config.coalesce_typing);
        history.set_coalesce_window(Duration::from_millis(config.coalesce_window_ms));
        Self {
            buffer: TextBuffer::new(),
            selection: Selection::default(),
            history,
            search: Search::new(),
            config,
            language: Language::PlainText,
        }
    }

    /// Returns the active settings.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // ==================== Document ====================

    /// Loads freshly fetched text. The text becomes the clean snapshot,
    /// history is cleared and the caret goes to the start.
    pub fn load_content(&mut self, text: &str) {
        self.buffer.load(text);
        self.selection = Selection::default();
        self.history.clear();
        self.refresh_search();
        log::debug!("loaded {} code units", self.buffer.len_utf16());
    }

    /// Sets the language from a file name or path.
    pub fn detect_language<P: AsRef<Path>>(&mut self, path: P) {
        self.language = Language::from_path(path.as_ref());
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Returns a reference to the buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Returns the whole content.
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Returns whether the content differs from the last load or save.
    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    /// Records a successful save of the current content.
    pub fn mark_saved(&mut self) {
        self.buffer.mark_saved();
    }

    /// Records a successful save of `text`, which may be older than the
    /// current content if edits happened while the save was in flight.
    pub fn mark_saved_as(&mut self, text: &str) {
        self.buffer.mark_saved_as(text);
    }

    /// Returns display markup for the content, using the host's highlighter
    /// when one is supplied.
    pub fn render(&self, highlighter: Option<&dyn Highlighter>) -> String {
        let text = self.buffer.to_string();
        match highlighter {
            Some(h) => h.highlight(&text, self.language),
            None => PlainText.highlight(&text, self.language),
        }
    }

    // ==================== Selection ====================

    /// Returns the selection, ordered.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Sets the selection as reported by the host, clamped into the buffer.
    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        let len = self.buffer.len_utf16();
        let sel = Selection::with_range(anchor, head).clamped(len);
        self.selection =
            Selection::with_range(self.buffer.snap(sel.anchor), self.buffer.snap(sel.head));
    }

    /// Selects all text.
    pub fn select_all(&mut self) {
        self.selection = Selection::with_range(0, self.buffer.len_utf16());
    }

    /// Returns the selected text, if any.
    pub fn selected_text(&self) -> Option<String> {
        self.selection
            .selected_range()
            .map(|(start, end)| self.buffer.slice(start, end))
    }

    /// Returns the caret position as a 1-based (line, column).
    pub fn cursor_position(&self) -> Position {
        locator::offset_to_line_col(&self.buffer, self.selection.head)
    }

    /// Moves the caret to the start of `line` (1-based), clamped to the
    /// document.
    pub fn go_to_line(&mut self, line: usize) -> Position {
        self.go_to(line, 1)
    }

    /// Moves the caret to a 1-based (line, column), clamped to the document.
    pub fn go_to(&mut self, line: usize, col: usize) -> Position {
        let offset = locator::line_col_to_offset(&self.buffer, line, col);
        self.selection = Selection::new(offset);
        self.cursor_position()
    }

    // ==================== Committing edits ====================

    /// Records the pre-edit state and installs the transform's result.
    /// A result equal to the current text only moves the selection.
    fn commit(&mut self, transform: Transform, kind: EditKind, what: &str) -> bool {
        let Transform { text, selection } = transform;
        if *self.buffer.rope() == text.as_str() {
            self.set_selection(selection.anchor, selection.head);
            self.refresh_search();
            return false;
        }
        let before = Snapshot::new(self.buffer.rope().clone(), self.selection);
        self.history.record(before, kind);
        self.buffer.set_content(&text);
        self.set_selection(selection.anchor, selection.head);
        self.refresh_search();
        log::debug!(
            "{what}: {} code units, selection {:?}",
            self.buffer.len_utf16(),
            self.selection.range()
        );
        true
    }

    fn apply(&mut self, transform: Option<Transform>, what: &str) -> bool {
        match transform {
            Some(t) => self.commit(t, EditKind::Discrete, what),
            None => false,
        }
    }

    fn refresh_search(&mut self) {
        if self.search.is_active() {
            self.search.refresh(&self.buffer, self.selection.start());
        }
    }

    /// Replaces the content with text produced by the host's own input
    /// handling. The selection is clamped into the new text.
    pub fn apply_edit(&mut self, new_text: &str) -> bool {
        let selection = self.selection;
        self.apply_input(new_text, selection)
    }

    /// Like [`Editor::apply_edit`], with the selection the host reported
    /// after the input. The selection is snapped onto char boundaries.
    pub fn apply_input(&mut self, new_text: &str, selection: Selection) -> bool {
        self.commit(
            Transform::new(new_text.to_string(), selection),
            EditKind::Discrete,
            "input",
        )
    }

    // ==================== Undo/Redo ====================

    /// Undoes the last edit. No-op on an empty history.
    pub fn undo(&mut self) -> bool {
        let current = Snapshot::new(self.buffer.rope().clone(), self.selection);
        match self.history.undo(current) {
            Some(snapshot) => {
                self.restore(snapshot);
                log::debug!("undo ({} left)", self.history.undo_len());
                true
            }
            None => false,
        }
    }

    /// Redoes the last undone edit. No-op when nothing was undone.
    pub fn redo(&mut self) -> bool {
        let current = Snapshot::new(self.buffer.rope().clone(), self.selection);
        match self.history.redo(current) {
            Some(snapshot) => {
                self.restore(snapshot);
                log::debug!("redo ({} left)", self.history.redo_len());
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.buffer.set_rope(snapshot.text);
        self.selection = snapshot.selection.clamped(self.buffer.len_utf16());
        self.refresh_search();
    }

    /// Returns true if undo is available.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if redo is available.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ==================== Line Operations ====================

    pub fn indent(&mut self) -> bool {
        let t = transform::indent(&self.buffer, self.selection, &self.config);
        self.apply(t, "indent")
    }

    pub fn outdent(&mut self) -> bool {
        let t = transform::outdent(&self.buffer, self.selection, &self.config);
        self.apply(t, "outdent")
    }

    pub fn delete_line(&mut self) -> bool {
        let t = transform::delete_line(&self.buffer, self.selection);
        self.apply(t, "delete line")
    }

    pub fn duplicate_line(&mut self) -> bool {
        let t = transform::duplicate_line(&self.buffer, self.selection);
        self.apply(t, "duplicate line")
    }

    /// Moves the current line up. No-op on the first line.
    pub fn move_line_up(&mut self) -> bool {
        let t = transform::move_line_up(&self.buffer, self.selection);
        self.apply(t, "move line up")
    }

    /// Moves the current line down. No-op on the last line.
    pub fn move_line_down(&mut self) -> bool {
        let t = transform::move_line_down(&self.buffer, self.selection);
        self.apply(t, "move line down")
    }

    pub fn toggle_comment(&mut self) -> bool {
        let t = transform::toggle_comment(&self.buffer, self.selection, &self.config);
        self.apply(t, "toggle comment")
    }

    pub fn sort_lines(&mut self) -> bool {
        let t = transform::sort_lines(&self.buffer, self.selection);
        self.apply(t, "sort lines")
    }

    pub fn to_upper_case(&mut self) -> bool {
        let t = transform::to_upper_case(&self.buffer, self.selection);
        self.apply(t, "upper case")
    }

    pub fn to_lower_case(&mut self) -> bool {
        let t = transform::to_lower_case(&self.buffer, self.selection);
        self.apply(t, "lower case")
    }

    pub fn trim_whitespace(&mut self) -> bool {
        let t = transform::trim_whitespace(&self.buffer, self.selection);
        self.apply(t, "trim whitespace")
    }

    /// Whether the host should offer structured-data formatting.
    pub fn can_format_structured_data(&self) -> bool {
        self.language.is_structured_data()
    }

    /// Reformats the document as JSON. On a parse error the content is left
    /// alone and no undo step is recorded.
    pub fn format_structured_data(&mut self) -> Result<bool, FormatError> {
        match transform::format_structured_data(&self.buffer, self.selection) {
            Ok(t) => Ok(self.apply(t, "format")),
            Err(err) => {
                log::warn!("format rejected: {err}");
                Err(err)
            }
        }
    }

    // ==================== Keystrokes ====================

    /// Inserts a typed character, wrapping the selection for brackets and
    /// quotes.
    pub fn type_char(&mut self, ch: char) -> bool {
        let Some(t) = auto_edit::type_char(&self.buffer, self.selection, ch, &self.config) else {
            return false;
        };
        let kind = if t.selection.has_selection() {
            EditKind::Discrete
        } else {
            let at = self.selection.start();
            EditKind::Typing {
                at,
                end: t.selection.head,
                newline: false,
            }
        };
        self.commit(t, kind, "type")
    }

    /// Inserts text (paste or IME commit) over the selection.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let t = auto_edit::insert_text(&self.buffer, self.selection, text);
        self.apply(t, "insert")
    }

    /// Enter, with auto-indent.
    pub fn insert_newline(&mut self) -> bool {
        let Some(t) = auto_edit::newline(&self.buffer, self.selection, &self.config) else {
            return false;
        };
        let kind = EditKind::Typing {
            at: self.selection.start(),
            end: t.selection.head,
            newline: true,
        };
        self.commit(t, kind, "newline")
    }

    pub fn tab(&mut self) -> bool {
        let t = auto_edit::tab(&self.buffer, self.selection, &self.config);
        self.apply(t, "tab")
    }

    pub fn shift_tab(&mut self) -> bool {
        let t = auto_edit::shift_tab(&self.buffer, self.selection, &self.config);
        self.apply(t, "shift tab")
    }

    /// Deletes the selection or the character before the caret (backspace).
    pub fn delete_backward(&mut self) -> bool {
        let t = auto_edit::delete_backward(&self.buffer, self.selection);
        self.apply(t, "delete backward")
    }

    /// Deletes the selection or the character after the caret (delete key).
    pub fn delete_forward(&mut self) -> bool {
        let t = auto_edit::delete_forward(&self.buffer, self.selection);
        self.apply(t, "delete forward")
    }

    // ==================== Clipboard ====================

    /// Copies the selection. Returns false if nothing was copied.
    pub fn copy(&self, clipboard: &mut dyn Clipboard) -> bool {
        let Some(text) = self.selected_text() else {
            return false;
        };
        match clipboard.set_text(&text) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("copy ignored: {err}");
                false
            }
        }
    }

    /// Copies and removes the selection. The text stays if the clipboard
    /// refuses it.
    pub fn cut(&mut self, clipboard: &mut dyn Clipboard) -> bool {
        if !self.copy(clipboard) {
            return false;
        }
        let t = auto_edit::insert_text(&self.buffer, self.selection, "");
        self.apply(t, "cut")
    }

    /// Pastes the clipboard text over the selection.
    pub fn paste(&mut self, clipboard: &mut dyn Clipboard) -> bool {
        match clipboard.get_text() {
            Ok(text) => self.insert_text(&text),
            Err(err) => {
                log::debug!("paste ignored: {err}");
                false
            }
        }
    }

    // ==================== Find/Replace ====================

    /// Sets the literal find query. Returns the number of matches.
    pub fn set_find_query(&mut self, query: &str) -> usize {
        self.search
            .set_query(query, &self.buffer, self.selection.start())
    }

    /// Clears the find query and matches.
    pub fn clear_find(&mut self) {
        self.search.clear();
    }

    pub fn find_query(&self) -> &str {
        self.search.query()
    }

    pub fn match_count(&self) -> usize {
        self.search.match_count()
    }

    /// 0-based index of the active match, None without matches.
    pub fn active_match_index(&self) -> Option<usize> {
        self.search.active_match_index()
    }

    pub fn matches(&self) -> &[SearchMatch] {
        self.search.matches()
    }

    /// Advances to the next match (wrapping) and selects it.
    pub fn find_next(&mut self) -> Option<SearchMatch> {
        let m = self.search.next_match()?;
        self.selection = m.selection();
        Some(m)
    }

    /// Retreats to the previous match (wrapping) and selects it.
    pub fn find_previous(&mut self) -> Option<SearchMatch> {
        let m = self.search.prev_match()?;
        self.selection = m.selection();
        Some(m)
    }

    /// Replaces the active match. The next active match is the first one
    /// after the inserted text.
    pub fn replace_active(&mut self, replacement: &str) -> bool {
        let t = self.search.replace_active(&self.buffer, replacement);
        self.apply(t, "replace")
    }

    /// Replaces every match in one undo step. Returns the number replaced.
    pub fn replace_all(&mut self, replacement: &str) -> usize {
        let count = self.search.match_count();
        let t = self
            .search
            .replace_all(&self.buffer, replacement, self.selection);
        if self.apply(t, "replace all") {
            count
        } else {
            0
        }
    }
}
