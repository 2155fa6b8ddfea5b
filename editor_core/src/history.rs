//! Undo/Redo history system.
//!
//! History is linear: two bounded stacks of whole-buffer snapshots. Rope
//! clones share their chunks, so a snapshot costs little more than a
//! pointer until the buffer diverges.

use crate::cursor::Selection;
use ropey::Rope;
use std::time::{Duration, Instant};

/// Default bound on each stack.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Default time window for coalescing typed characters (in milliseconds).
pub const COALESCE_WINDOW_MS: u64 = 300;

/// Buffer content and selection captured before a mutation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub text: Rope,
    pub selection: Selection,
}

impl Snapshot {
    pub fn new(text: Rope, selection: Selection) -> Self {
        Self { text, selection }
    }
}

/// What kind of mutation is about to be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// A single typed character inserted at `at`, leaving the caret at `end`.
    Typing { at: usize, end: usize, newline: bool },
    /// Anything else: paste, transforms, replace, whole-text edits.
    Discrete,
}

/// Tracks the last typed run so the next keystroke can join it.
#[derive(Debug, Clone, Copy)]
struct TypingRun {
    end: usize,
    newline: bool,
    last_edit_time: Instant,
}

/// Manages undo/redo history.
#[derive(Debug)]
pub struct History {
    /// Stack of snapshots that can be restored by undo.
    undo_stack: Vec<Snapshot>,
    /// Stack of snapshots that can be restored by redo.
    redo_stack: Vec<Snapshot>,
    /// Maximum number of entries per stack.
    max_size: usize,
    /// Time window for coalescing edits.
    coalesce_window: Duration,
    /// Whether coalescing is enabled.
    coalesce_enabled: bool,
    /// The typing run the last recorded edit belonged to.
    typing_run: Option<TypingRun>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Creates a new history with the given maximum size.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
            coalesce_window: Duration::from_millis(COALESCE_WINDOW_MS),
            coalesce_enabled: false,
            typing_run: None,
        }
    }

    /// Sets the coalesce window duration.
    pub fn set_coalesce_window(&mut self, window: Duration) {
        self.coalesce_window = window;
    }

    /// Enables or disables coalescing of typed characters.
    pub fn set_coalesce_enabled(&mut self, enabled: bool) {
        self.coalesce_enabled = enabled;
        self.typing_run = None;
    }

    /// Returns true if a typed character at `at` may join the previous entry.
    fn can_coalesce(&self, at: usize) -> bool {
        if !self.coalesce_enabled || self.undo_stack.is_empty() {
            return false;
        }
        match self.typing_run {
            Some(run) => {
                run.last_edit_time.elapsed() <= self.coalesce_window
                    && run.end == at
                    // Don't coalesce after newline
                    && !run.newline
            }
            None => false,
        }
    }

    /// Records the state before a mutation. Pushes `before` onto the undo
    /// stack (evicting the oldest entry past the bound) and clears redo.
    /// A typed character that continues the current run is folded into the
    /// existing entry when coalescing is enabled.
    pub fn record(&mut self, before: Snapshot, kind: EditKind) {
        self.redo_stack.clear();
        match kind {
            EditKind::Typing { at, end, newline } => {
                if !self.can_coalesce(at) {
                    self.push_undo(before);
                }
                self.typing_run = Some(TypingRun {
                    end,
                    newline,
                    last_edit_time: Instant::now(),
                });
            }
            EditKind::Discrete => {
                self.push_undo(before);
                self.typing_run = None;
            }
        }
    }

    /// Pushes a snapshot to the undo stack, enforcing the size limit.
    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }

    /// Returns true if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of entries on the undo stack.
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of entries on the redo stack.
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Pops the last snapshot for undo, stashing `current` for redo.
    /// Returns the snapshot to restore, or None on an empty stack.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        while self.redo_stack.len() > self.max_size {
            self.redo_stack.remove(0);
        }
        self.typing_run = None;
        Some(snapshot)
    }

    /// Pops the last undone snapshot for redo, stashing `current` for undo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let snapshot = self.redo_stack.pop()?;
        self.push_undo(current);
        self.typing_run = None;
        Some(snapshot)
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.typing_run = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(text: &str) -> Snapshot {
        Snapshot::new(Rope::from_str(text), Selection::new(0))
    }

    #[test]
    fn test_undo_redo() {
        let mut history = History::new(100);

        history.record(snap(""), EditKind::Discrete);
        assert!(history.can_undo());
        assert!(!history.can_redo());

        let restored = history.undo(snap("hello")).unwrap();
        assert_eq!(restored.text, "");
        assert!(!history.can_undo());
        assert!(history.can_redo());

        let restored = history.redo(snap("")).unwrap();
        assert_eq!(restored.text, "hello");
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = History::default();
        assert!(history.undo(snap("x")).is_none());
        assert!(history.redo(snap("x")).is_none());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_redo_cleared_on_new_edit() {
        let mut history = History::new(100);
        history.record(snap("a"), EditKind::Discrete);
        history.undo(snap("ab"));
        assert!(history.can_redo());

        history.record(snap("a"), EditKind::Discrete);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_size_limit_evicts_oldest() {
        let mut history = History::new(3);
        for text in ["0", "1", "2", "3", "4"] {
            history.record(snap(text), EditKind::Discrete);
        }
        assert_eq!(history.undo_len(), 3);
        assert_eq!(history.undo(snap("5")).unwrap().text, "4");
        assert_eq!(history.undo(snap("4")).unwrap().text, "3");
        assert_eq!(history.undo(snap("3")).unwrap().text, "2");
        assert!(history.undo(snap("2")).is_none());
    }

    #[test]
    fn test_typing_not_coalesced_by_default() {
        let mut history = History::new(100);
        history.record(snap(""), EditKind::Typing { at: 0, end: 1, newline: false });
        history.record(snap("a"), EditKind::Typing { at: 1, end: 2, newline: false });
        history.record(snap("ab"), EditKind::Typing { at: 2, end: 3, newline: false });
        assert_eq!(history.undo_len(), 3);
    }

    #[test]
    fn test_coalescing_consecutive_inserts() {
        let mut history = History::new(100);
        history.set_coalesce_enabled(true);
        history.set_coalesce_window(Duration::from_millis(1000));

        history.record(snap(""), EditKind::Typing { at: 0, end: 1, newline: false });
        history.record(snap("a"), EditKind::Typing { at: 1, end: 2, newline: false });
        history.record(snap("ab"), EditKind::Typing { at: 2, end: 3, newline: false });

        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.undo(snap("abc")).unwrap().text, "");
    }

    #[test]
    fn test_coalescing_breaks_on_newline_and_jumps() {
        let mut history = History::new(100);
        history.set_coalesce_enabled(true);
        history.set_coalesce_window(Duration::from_millis(1000));

        history.record(snap(""), EditKind::Typing { at: 0, end: 1, newline: false });
        // Newline joins the run but ends it.
        history.record(snap("a"), EditKind::Typing { at: 1, end: 2, newline: true });
        history.record(snap("a\n"), EditKind::Typing { at: 2, end: 3, newline: false });
        // Caret moved elsewhere: new entry.
        history.record(snap("a\nb"), EditKind::Typing { at: 0, end: 1, newline: false });

        assert_eq!(history.undo_len(), 3);
    }

    #[test]
    fn test_discrete_edit_ends_typing_run() {
        let mut history = History::new(100);
        history.set_coalesce_enabled(true);
        history.set_coalesce_window(Duration::from_millis(1000));

        history.record(snap(""), EditKind::Typing { at: 0, end: 1, newline: false });
        history.record(snap("a"), EditKind::Discrete);
        history.record(snap("  a"), EditKind::Typing { at: 3, end: 4, newline: false });
        assert_eq!(history.undo_len(), 3);
    }
}
