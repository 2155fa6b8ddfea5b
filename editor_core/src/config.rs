//! Editing behaviour settings.
//!
//! Hosts usually deserialize this from a settings file; every field has a
//! default so partial tables are accepted and unknown keys are ignored.

use crate::history::{COALESCE_WINDOW_MS, DEFAULT_HISTORY_LIMIT};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditorConfig {
    /// Spaces added by indent/Tab and removed by outdent.
    #[serde(default = "EditorConfig::default_indent_width")]
    pub indent_width: usize,
    /// Bound of the undo and redo stacks.
    #[serde(default = "EditorConfig::default_history_limit")]
    pub history_limit: usize,
    /// Line comment prefix used by toggle comment.
    #[serde(default = "EditorConfig::default_comment_token")]
    pub comment_token: String,
    /// Wrap a non-empty selection when an opening bracket or quote is typed.
    #[serde(default = "EditorConfig::default_true")]
    pub auto_close_pairs: bool,
    /// Copy the leading whitespace of the current line on Enter.
    #[serde(default = "EditorConfig::default_true")]
    pub auto_indent: bool,
    /// Merge runs of typed characters into one undo step.
    #[serde(default)]
    pub coalesce_typing: bool,
    #[serde(default = "EditorConfig::default_coalesce_window_ms")]
    pub coalesce_window_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent_width: Self::default_indent_width(),
            history_limit: Self::default_history_limit(),
            comment_token: Self::default_comment_token(),
            auto_close_pairs: true,
            auto_indent: true,
            coalesce_typing: false,
            coalesce_window_ms: Self::default_coalesce_window_ms(),
        }
    }
}

impl EditorConfig {
    const fn default_indent_width() -> usize {
        2
    }
    const fn default_history_limit() -> usize {
        DEFAULT_HISTORY_LIMIT
    }
    fn default_comment_token() -> String {
        "//".to_string()
    }
    const fn default_true() -> bool {
        true
    }
    const fn default_coalesce_window_ms() -> u64 {
        COALESCE_WINDOW_MS
    }

    /// The string inserted for one level of indentation.
    pub fn indent_unit(&self) -> String {
        " ".repeat(self.indent_width)
    }
}
