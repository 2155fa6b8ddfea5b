//! Editor Core - Pure text editing engine.
//!
//! This crate contains the document state and every editing behavior of the
//! console's text editor, without any dependency on a window, a terminal or
//! a network transport. Offsets crossing the API are UTF-16 code units, the
//! unit browser text inputs report selections in.

pub mod auto_edit;
pub mod buffer;
pub mod clipboard;
pub mod command;
pub mod config;
pub mod cursor;
pub mod editor;
pub mod error;
pub mod history;
pub mod locator;
pub mod search;
pub mod syntax;
pub mod transform;

pub use buffer::TextBuffer;
pub use clipboard::{Clipboard, MemoryClipboard};
pub use command::{execute_command, CommandOutcome, EditorCommand, ParseCommandError};
pub use config::EditorConfig;
pub use cursor::Selection;
pub use editor::Editor;
pub use error::{ClipboardError, FormatError};
pub use history::History;
pub use locator::Position;
pub use search::SearchMatch;
pub use syntax::{Highlighter, Language};
