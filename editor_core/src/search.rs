//! Search and replace functionality.
//!
//! Queries are literal: the text is escaped before being compiled into a
//! case-insensitive pattern, so compilation cannot fail on user input.
//! Matches are reported in UTF-16 offsets and are recomputed from the
//! buffer every time the query or the content changes.

use crate::buffer::{utf16_len, TextBuffer};
use crate::cursor::Selection;
use crate::transform::{splice, Transform};
use regex::{NoExpand, Regex, RegexBuilder};

/// A search match in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl SearchMatch {
    /// Creates a new search match.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The match as a selection.
    pub fn selection(&self) -> Selection {
        Selection::with_range(self.start, self.end)
    }
}

/// Search state for incremental search.
#[derive(Debug, Clone, Default)]
pub struct Search {
    /// The current search query, unescaped.
    query: String,
    /// The compiled pattern; None while the query is empty.
    pattern: Option<Regex>,
    /// All matches in the buffer.
    matches: Vec<SearchMatch>,
    /// Index of the current (highlighted) match.
    current_match: Option<usize>,
}

/// Compiles a literal query into a case-insensitive pattern.
fn compile(query: &str) -> Option<Regex> {
    if query.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .ok()
}

impl Search {
    /// Creates a new empty search state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current search query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Sets the search query and searches the buffer. The active match is
    /// the first one at or after `cursor`, wrapping to the first match.
    /// Returns the number of matches found.
    pub fn set_query(&mut self, query: &str, buffer: &TextBuffer, cursor: usize) -> usize {
        self.query = query.to_string();
        self.pattern = compile(query);
        self.refresh(buffer, cursor);
        log::debug!("search {:?}: {} matches", self.query, self.matches.len());
        self.matches.len()
    }

    /// Recomputes the matches after the buffer has changed.
    pub fn refresh(&mut self, buffer: &TextBuffer, cursor: usize) {
        self.find_all(buffer);
        self.find_nearest(cursor);
    }

    /// Returns all matches.
    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    /// Returns the number of matches.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Returns the 0-based index of the active match.
    pub fn active_match_index(&self) -> Option<usize> {
        self.current_match
    }

    /// Returns the current match, if any.
    pub fn current_match(&self) -> Option<SearchMatch> {
        self.current_match.and_then(|i| self.matches.get(i).copied())
    }

    /// Clears the search state.
    pub fn clear(&mut self) {
        self.query.clear();
        self.pattern = None;
        self.matches.clear();
        self.current_match = None;
    }

    /// Returns true if there are any matches.
    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Returns true if the search is active (has a non-empty query).
    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    /// Finds all matches in the buffer.
    fn find_all(&mut self, buffer: &TextBuffer) {
        self.matches.clear();
        self.current_match = None;

        let Some(pattern) = &self.pattern else {
            return;
        };
        let text = buffer.to_string();
        self.matches = pattern
            .find_iter(&text)
            .map(|m| {
                SearchMatch::new(buffer.byte_to_offset(m.start()), buffer.byte_to_offset(m.end()))
            })
            .collect();
    }

    /// Moves to the next match, wrapping around.
    /// Returns the new current match position if any.
    pub fn next_match(&mut self) -> Option<SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }

        let next = match self.current_match {
            Some(i) => (i + 1) % self.matches.len(),
            None => 0,
        };
        self.current_match = Some(next);
        Some(self.matches[next])
    }

    /// Moves to the previous match, wrapping around.
    /// Returns the new current match position if any.
    pub fn prev_match(&mut self) -> Option<SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }

        let prev = match self.current_match {
            Some(i) if i > 0 => i - 1,
            _ => self.matches.len() - 1,
        };
        self.current_match = Some(prev);
        Some(self.matches[prev])
    }

    /// Makes the first match at or after `cursor` active, wrapping to the
    /// first match if none follows the cursor.
    pub fn find_nearest(&mut self, cursor: usize) -> Option<SearchMatch> {
        if self.matches.is_empty() {
            self.current_match = None;
            return None;
        }

        let idx = self
            .matches
            .iter()
            .position(|m| m.start >= cursor)
            .unwrap_or(0);

        self.current_match = Some(idx);
        Some(self.matches[idx])
    }

    /// Builds the text with only the active match replaced. The selection
    /// is a caret after the inserted text.
    pub fn replace_active(&self, buffer: &TextBuffer, replacement: &str) -> Option<Transform> {
        let m = self.current_match()?;
        let text = splice(buffer, m.start, m.end, replacement);
        let caret = m.start + utf16_len(replacement);
        Some(Transform::new(text, Selection::new(caret)))
    }

    /// Builds the text with every match replaced in one pass. The
    /// replacement is inserted literally.
    pub fn replace_all(
        &self,
        buffer: &TextBuffer,
        replacement: &str,
        selection: Selection,
    ) -> Option<Transform> {
        if self.matches.is_empty() {
            return None;
        }
        let pattern = self.pattern.as_ref()?;
        let text = pattern
            .replace_all(&buffer.to_string(), NoExpand(replacement))
            .into_owned();
        Some(Transform::new(text, selection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_basic() {
        let buffer = TextBuffer::from_str("hello world hello");
        let mut search = Search::new();

        let count = search.set_query("hello", &buffer, 0);
        assert_eq!(count, 2);
        assert_eq!(search.match_count(), 2);

        let first = search.current_match().unwrap();
        assert_eq!(first, SearchMatch::new(0, 5));

        let second = search.next_match().unwrap();
        assert_eq!(second, SearchMatch::new(12, 17));

        // Wrap around
        let wrapped = search.next_match().unwrap();
        assert_eq!(wrapped.start, 0);
    }

    #[test]
    fn test_search_case_insensitive() {
        let buffer = TextBuffer::from_str("Hello HELLO hello");
        let mut search = Search::new();
        assert_eq!(search.set_query("hello", &buffer, 0), 3);
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let buffer = TextBuffer::from_str("a.b axb (x) [x] $1");
        let mut search = Search::new();
        assert_eq!(search.set_query("a.b", &buffer, 0), 1);
        assert_eq!(search.set_query("(x)", &buffer, 0), 1);
        assert_eq!(search.set_query("[x]", &buffer, 0), 1);
        assert_eq!(search.set_query("$1", &buffer, 0), 1);
        assert_eq!(search.set_query("(", &buffer, 0), 1);
    }

    #[test]
    fn test_search_prev() {
        let buffer = TextBuffer::from_str("a b a c a");
        let mut search = Search::new();

        search.set_query("a", &buffer, 0);
        assert_eq!(search.match_count(), 3);
        assert_eq!(search.active_match_index(), Some(0));

        // Go to last match (wrap)
        let prev = search.prev_match().unwrap();
        assert_eq!(prev.start, 8);
        assert_eq!(search.active_match_index(), Some(2));

        let prev = search.prev_match().unwrap();
        assert_eq!(prev.start, 4);
    }

    #[test]
    fn test_search_empty_query() {
        let buffer = TextBuffer::from_str("hello world");
        let mut search = Search::new();

        assert_eq!(search.set_query("", &buffer, 0), 0);
        assert!(!search.is_active());
        assert_eq!(search.active_match_index(), None);
        assert!(search.next_match().is_none());
        assert!(search.prev_match().is_none());
        assert!(search.replace_active(&buffer, "x").is_none());
        assert!(search.replace_all(&buffer, "x", Selection::new(0)).is_none());
    }

    #[test]
    fn test_search_no_matches() {
        let buffer = TextBuffer::from_str("hello world");
        let mut search = Search::new();

        assert_eq!(search.set_query("xyz", &buffer, 0), 0);
        assert!(search.is_active());
        assert!(!search.has_matches());
        assert_eq!(search.active_match_index(), None);
    }

    #[test]
    fn test_active_match_follows_cursor() {
        let buffer = TextBuffer::from_str("a  a  a  a");
        let mut search = Search::new();
        search.set_query("a", &buffer, 5);
        assert_eq!(search.current_match().unwrap().start, 6);

        // Nothing after the cursor: wrap to the first match.
        search.set_query("a", &buffer, 10);
        assert_eq!(search.active_match_index(), Some(0));
    }

    #[test]
    fn test_matches_use_utf16_offsets() {
        let buffer = TextBuffer::from_str("😀 Foo é foo");
        let mut search = Search::new();
        search.set_query("FOO", &buffer, 0);
        assert_eq!(search.matches(), &[SearchMatch::new(3, 6), SearchMatch::new(9, 12)]);
    }

    #[test]
    fn test_replace_active() {
        let buffer = TextBuffer::from_str("foo bar foo");
        let mut search = Search::new();
        search.set_query("foo", &buffer, 1);
        let t = search.replace_active(&buffer, "quux").unwrap();
        assert_eq!(t.text, "foo bar quux");
        assert_eq!(t.selection, Selection::new(12));
    }

    #[test]
    fn test_replace_all_literal() {
        let buffer = TextBuffer::from_str("foo bar FOO");
        let mut search = Search::new();
        search.set_query("foo", &buffer, 0);
        let t = search.replace_all(&buffer, "$0x", Selection::new(0)).unwrap();
        assert_eq!(t.text, "$0x bar $0x");
    }

    #[test]
    fn test_refresh_after_edit() {
        let mut buffer = TextBuffer::from_str("foo foo");
        let mut search = Search::new();
        search.set_query("foo", &buffer, 0);
        buffer.set_content("foo");
        search.refresh(&buffer, 0);
        assert_eq!(search.match_count(), 1);
    }
}
