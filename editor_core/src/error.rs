//! Error types surfaced by the engine.
//!
//! Ordinary edits never fail; the only reported failure is a structured
//! data parse error. Clipboard errors are produced by host clipboards and
//! swallowed by the engine.

use thiserror::Error;

/// The content could not be parsed as structured data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid JSON at line {line}, column {column}: {message}")]
pub struct FormatError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        // serde_json appends " at line X column Y" to its Display output.
        let message = err.to_string();
        let message = match message.rfind(" at line ") {
            Some(idx) => message[..idx].to_string(),
            None => message,
        };
        Self {
            line: err.line(),
            column: err.column(),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard access denied")]
    Denied,
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}
