//! Clipboard access for copy, cut and paste.
//!
//! Hosts plug in their platform clipboard through [`Clipboard`]. A browser
//! may refuse clipboard access at any time; the editor treats every
//! [`ClipboardError`] as "nothing happened".

use crate::error::ClipboardError;

pub trait Clipboard {
    fn get_text(&mut self) -> Result<String, ClipboardError>;
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// An in-process clipboard. Can be switched to deny every request.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    denied: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that refuses all access.
    pub fn denied() -> Self {
        Self {
            contents: None,
            denied: true,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> Result<String, ClipboardError> {
        if self.denied {
            return Err(ClipboardError::Denied);
        }
        self.contents
            .clone()
            .ok_or_else(|| ClipboardError::Unavailable("clipboard is empty".to_string()))
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.denied {
            return Err(ClipboardError::Denied);
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert!(clipboard.get_text().is_err());
        clipboard.set_text("abc").unwrap();
        assert_eq!(clipboard.get_text().unwrap(), "abc");
        assert_eq!(clipboard.contents(), Some("abc"));
    }

    #[test]
    fn test_denied_clipboard() {
        let mut clipboard = MemoryClipboard::denied();
        assert_eq!(clipboard.set_text("x"), Err(ClipboardError::Denied));
        assert_eq!(clipboard.get_text(), Err(ClipboardError::Denied));
    }
}
