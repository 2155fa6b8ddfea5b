//! Highlighter collaborator.

use super::Language;

/// Turns text into markup for display. Implementations must be pure: the
/// same text and language always produce the same markup.
pub trait Highlighter {
    fn highlight(&self, text: &str, language: Language) -> String;
}

/// Fallback used when the host supplies no highlighter: the text as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl Highlighter for PlainText {
    fn highlight(&self, text: &str, _language: Language) -> String {
        text.to_string()
    }
}

impl<F> Highlighter for F
where
    F: Fn(&str, Language) -> String,
{
    fn highlight(&self, text: &str, language: Language) -> String {
        self(text, language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(PlainText.highlight("<a>", Language::Html), "<a>");
    }

    #[test]
    fn test_closure_highlighter() {
        let h = |text: &str, language: Language| format!("[{}]{}", language.name(), text);
        assert_eq!(h.highlight("x", Language::Json), "[JSON]x");
    }
}
