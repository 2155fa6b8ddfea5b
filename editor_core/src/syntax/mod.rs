//! Language detection and the highlighting seam.
//!
//! Highlighting itself is supplied by the host; the engine only needs to
//! know which language a document is in.

mod highlighter;
mod language;

pub use highlighter::{Highlighter, PlainText};
pub use language::Language;
