//! Named editor commands.
//!
//! Hosts bind keys, menu entries and scripted input to [`EditorCommand`]s
//! and run them through [`execute_command`]. Every command also has a
//! textual form (`move-line-up`, `find foo`, `goto 12`) so commands can be
//! read from scripts or a command palette.

use crate::clipboard::Clipboard;
use crate::editor::Editor;
use crate::error::FormatError;
use crate::locator::Position;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Editor commands that can be triggered by keybindings or scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    // Text input
    Type(String),
    Insert(String),
    InsertNewline,
    Tab,
    ShiftTab,

    // Deletion
    DeleteBackward,
    DeleteForward,

    // Selection and navigation
    Select(usize, usize),
    SelectAll,
    GoToLine(usize),
    GoTo(usize, usize),

    // Clipboard
    Copy,
    Cut,
    Paste,

    // Undo/Redo
    Undo,
    Redo,

    // Line transforms
    Indent,
    Outdent,
    DeleteLine,
    DuplicateLine,
    MoveLineUp,
    MoveLineDown,
    ToggleComment,
    SortLines,
    UpperCase,
    LowerCase,
    TrimWhitespace,
    FormatDocument,

    // Find/replace
    Find(String),
    FindNext,
    FindPrevious,
    Replace(String),
    ReplaceAll(String),
}

/// What running a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The content changed.
    Edited,
    /// Nothing changed (no-op, or only the selection moved).
    Unchanged,
    /// The caret moved to this position.
    Moved(Position),
    /// Search state after a find command.
    Matches { count: usize, active: Option<usize> },
    /// Every match was replaced.
    Replaced(usize),
    /// Formatting rejected the content.
    Rejected(FormatError),
}

impl CommandOutcome {
    fn edited(changed: bool) -> Self {
        if changed {
            Self::Edited
        } else {
            Self::Unchanged
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{command}`: invalid argument `{value}`")]
    InvalidArgument { command: &'static str, value: String },
}

/// Expands `\n`, `\t` and `\\` in a text argument.
fn unescape(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut chars = arg.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn text_arg(command: &'static str, arg: Option<&str>) -> Result<String, ParseCommandError> {
    match arg {
        Some(arg) if !arg.is_empty() => Ok(unescape(arg)),
        _ => Err(ParseCommandError::MissingArgument(command)),
    }
}

fn numbers<const N: usize>(
    command: &'static str,
    arg: Option<&str>,
) -> Result<[usize; N], ParseCommandError> {
    let arg = arg.ok_or(ParseCommandError::MissingArgument(command))?;
    let invalid = || ParseCommandError::InvalidArgument {
        command,
        value: arg.to_string(),
    };
    let parsed = arg
        .split_whitespace()
        .map(|n| n.parse::<usize>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    parsed.try_into().map_err(|_| invalid())
}

impl FromStr for EditorCommand {
    type Err = ParseCommandError;

    /// Parses `name [argument]`. Text arguments are taken verbatim after the
    /// first space, with `\n`, `\t` and `\\` escapes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start();
        let (name, arg) = match s.split_once(' ') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s.trim_end(), None),
        };
        let command = match name {
            "" => return Err(ParseCommandError::Empty),
            "type" => Self::Type(text_arg("type", arg)?),
            "insert" => Self::Insert(text_arg("insert", arg)?),
            "newline" => Self::InsertNewline,
            "tab" => Self::Tab,
            "shift-tab" => Self::ShiftTab,
            "backspace" => Self::DeleteBackward,
            "delete" => Self::DeleteForward,
            "select" => {
                let [anchor, head] = numbers::<2>("select", arg)?;
                Self::Select(anchor, head)
            }
            "select-all" => Self::SelectAll,
            "goto" => match arg.map(|a| a.split_whitespace().count()) {
                Some(2) => {
                    let [line, col] = numbers::<2>("goto", arg)?;
                    Self::GoTo(line, col)
                }
                _ => {
                    let [line] = numbers::<1>("goto", arg)?;
                    Self::GoToLine(line)
                }
            },
            "copy" => Self::Copy,
            "cut" => Self::Cut,
            "paste" => Self::Paste,
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "indent" => Self::Indent,
            "outdent" => Self::Outdent,
            "delete-line" => Self::DeleteLine,
            "duplicate-line" => Self::DuplicateLine,
            "move-line-up" => Self::MoveLineUp,
            "move-line-down" => Self::MoveLineDown,
            "toggle-comment" => Self::ToggleComment,
            "sort-lines" => Self::SortLines,
            "upper-case" => Self::UpperCase,
            "lower-case" => Self::LowerCase,
            "trim-whitespace" => Self::TrimWhitespace,
            "format" => Self::FormatDocument,
            "find" => Self::Find(arg.map(unescape).unwrap_or_default()),
            "find-next" => Self::FindNext,
            "find-previous" => Self::FindPrevious,
            // An empty replacement deletes the match.
            "replace" => Self::Replace(arg.map(unescape).unwrap_or_default()),
            "replace-all" => Self::ReplaceAll(arg.map(unescape).unwrap_or_default()),
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

impl fmt::Display for EditorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let escape = |s: &str| {
            s.replace('\\', "\\\\")
                .replace('\n', "\\n")
                .replace('\t', "\\t")
        };
        match self {
            Self::Type(text) => write!(f, "type {}", escape(text)),
            Self::Insert(text) => write!(f, "insert {}", escape(text)),
            Self::InsertNewline => f.write_str("newline"),
            Self::Tab => f.write_str("tab"),
            Self::ShiftTab => f.write_str("shift-tab"),
            Self::DeleteBackward => f.write_str("backspace"),
            Self::DeleteForward => f.write_str("delete"),
            Self::Select(anchor, head) => write!(f, "select {anchor} {head}"),
            Self::SelectAll => f.write_str("select-all"),
            Self::GoToLine(line) => write!(f, "goto {line}"),
            Self::GoTo(line, col) => write!(f, "goto {line} {col}"),
            Self::Copy => f.write_str("copy"),
            Self::Cut => f.write_str("cut"),
            Self::Paste => f.write_str("paste"),
            Self::Undo => f.write_str("undo"),
            Self::Redo => f.write_str("redo"),
            Self::Indent => f.write_str("indent"),
            Self::Outdent => f.write_str("outdent"),
            Self::DeleteLine => f.write_str("delete-line"),
            Self::DuplicateLine => f.write_str("duplicate-line"),
            Self::MoveLineUp => f.write_str("move-line-up"),
            Self::MoveLineDown => f.write_str("move-line-down"),
            Self::ToggleComment => f.write_str("toggle-comment"),
            Self::SortLines => f.write_str("sort-lines"),
            Self::UpperCase => f.write_str("upper-case"),
            Self::LowerCase => f.write_str("lower-case"),
            Self::TrimWhitespace => f.write_str("trim-whitespace"),
            Self::FormatDocument => f.write_str("format"),
            Self::Find(query) => write!(f, "find {}", escape(query)),
            Self::FindNext => f.write_str("find-next"),
            Self::FindPrevious => f.write_str("find-previous"),
            Self::Replace(text) => write!(f, "replace {}", escape(text)),
            Self::ReplaceAll(text) => write!(f, "replace-all {}", escape(text)),
        }
    }
}

fn matches(editor: &Editor) -> CommandOutcome {
    CommandOutcome::Matches {
        count: editor.match_count(),
        active: editor.active_match_index(),
    }
}

/// Executes an editor command.
pub fn execute_command(
    editor: &mut Editor,
    command: EditorCommand,
    clipboard: &mut dyn Clipboard,
) -> CommandOutcome {
    log::trace!("command: {command}");
    match command {
        EditorCommand::Type(text) => {
            let mut changed = false;
            for ch in text.chars() {
                changed |= if ch == '\n' {
                    editor.insert_newline()
                } else {
                    editor.type_char(ch)
                };
            }
            CommandOutcome::edited(changed)
        }
        EditorCommand::Insert(text) => CommandOutcome::edited(editor.insert_text(&text)),
        EditorCommand::InsertNewline => CommandOutcome::edited(editor.insert_newline()),
        EditorCommand::Tab => CommandOutcome::edited(editor.tab()),
        EditorCommand::ShiftTab => CommandOutcome::edited(editor.shift_tab()),

        EditorCommand::DeleteBackward => CommandOutcome::edited(editor.delete_backward()),
        EditorCommand::DeleteForward => CommandOutcome::edited(editor.delete_forward()),

        EditorCommand::Select(anchor, head) => {
            editor.set_selection(anchor, head);
            CommandOutcome::Moved(editor.cursor_position())
        }
        EditorCommand::SelectAll => {
            editor.select_all();
            CommandOutcome::Moved(editor.cursor_position())
        }
        EditorCommand::GoToLine(line) => CommandOutcome::Moved(editor.go_to_line(line)),
        EditorCommand::GoTo(line, col) => CommandOutcome::Moved(editor.go_to(line, col)),

        EditorCommand::Copy => {
            editor.copy(clipboard);
            CommandOutcome::Unchanged
        }
        EditorCommand::Cut => CommandOutcome::edited(editor.cut(clipboard)),
        EditorCommand::Paste => CommandOutcome::edited(editor.paste(clipboard)),

        EditorCommand::Undo => CommandOutcome::edited(editor.undo()),
        EditorCommand::Redo => CommandOutcome::edited(editor.redo()),

        EditorCommand::Indent => CommandOutcome::edited(editor.indent()),
        EditorCommand::Outdent => CommandOutcome::edited(editor.outdent()),
        EditorCommand::DeleteLine => CommandOutcome::edited(editor.delete_line()),
        EditorCommand::DuplicateLine => CommandOutcome::edited(editor.duplicate_line()),
        EditorCommand::MoveLineUp => CommandOutcome::edited(editor.move_line_up()),
        EditorCommand::MoveLineDown => CommandOutcome::edited(editor.move_line_down()),
        EditorCommand::ToggleComment => CommandOutcome::edited(editor.toggle_comment()),
        EditorCommand::SortLines => CommandOutcome::edited(editor.sort_lines()),
        EditorCommand::UpperCase => CommandOutcome::edited(editor.to_upper_case()),
        EditorCommand::LowerCase => CommandOutcome::edited(editor.to_lower_case()),
        EditorCommand::TrimWhitespace => CommandOutcome::edited(editor.trim_whitespace()),
        EditorCommand::FormatDocument => match editor.format_structured_data() {
            Ok(changed) => CommandOutcome::edited(changed),
            Err(err) => CommandOutcome::Rejected(err),
        },

        EditorCommand::Find(query) => {
            editor.set_find_query(&query);
            matches(editor)
        }
        EditorCommand::FindNext => {
            editor.find_next();
            matches(editor)
        }
        EditorCommand::FindPrevious => {
            editor.find_previous();
            matches(editor)
        }
        EditorCommand::Replace(text) => CommandOutcome::edited(editor.replace_active(&text)),
        EditorCommand::ReplaceAll(text) => match editor.replace_all(&text) {
            0 => CommandOutcome::Unchanged,
            n => CommandOutcome::Replaced(n),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;

    fn run(editor: &mut Editor, script: &[&str]) -> Vec<CommandOutcome> {
        let mut clipboard = MemoryClipboard::new();
        script
            .iter()
            .map(|line| {
                let command: EditorCommand = line.parse().unwrap();
                execute_command(editor, command, &mut clipboard)
            })
            .collect()
    }

    #[test]
    fn test_parse_simple() {
        assert_eq!("undo".parse::<EditorCommand>(), Ok(EditorCommand::Undo));
        assert_eq!("move-line-up".parse::<EditorCommand>(), Ok(EditorCommand::MoveLineUp));
        assert_eq!("  format ".parse::<EditorCommand>(), Ok(EditorCommand::FormatDocument));
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(
            "find foo bar".parse::<EditorCommand>(),
            Ok(EditorCommand::Find("foo bar".into()))
        );
        assert_eq!("type a\\nb".parse::<EditorCommand>(), Ok(EditorCommand::Type("a\nb".into())));
        assert_eq!("replace".parse::<EditorCommand>(), Ok(EditorCommand::Replace(String::new())));
        assert_eq!("goto 12".parse::<EditorCommand>(), Ok(EditorCommand::GoToLine(12)));
        assert_eq!("goto 3 4".parse::<EditorCommand>(), Ok(EditorCommand::GoTo(3, 4)));
        assert_eq!("select 1 5".parse::<EditorCommand>(), Ok(EditorCommand::Select(1, 5)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<EditorCommand>(), Err(ParseCommandError::Empty));
        assert_eq!(
            "frobnicate".parse::<EditorCommand>(),
            Err(ParseCommandError::Unknown("frobnicate".into()))
        );
        assert_eq!(
            "type".parse::<EditorCommand>(),
            Err(ParseCommandError::MissingArgument("type"))
        );
        assert!(matches!(
            "goto x".parse::<EditorCommand>(),
            Err(ParseCommandError::InvalidArgument { command: "goto", .. })
        ));
        assert!("select 1".parse::<EditorCommand>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        let commands = [
            EditorCommand::Type("a\tb\\".into()),
            EditorCommand::GoTo(2, 7),
            EditorCommand::ReplaceAll("x".into()),
            EditorCommand::MoveLineDown,
        ];
        for command in commands {
            assert_eq!(command.to_string().parse::<EditorCommand>(), Ok(command));
        }
    }

    #[test]
    fn test_script() {
        let mut editor = Editor::new();
        editor.load_content("b\na\nc");
        let outcomes = run(
            &mut editor,
            &["select-all", "sort-lines", "goto 1", "toggle-comment", "find C"],
        );
        assert_eq!(editor.text(), "// a\nb\nc");
        assert_eq!(outcomes[0], CommandOutcome::Moved(Position::new(3, 2)));
        assert_eq!(outcomes[1], CommandOutcome::Edited);
        assert_eq!(
            outcomes[4],
            CommandOutcome::Matches {
                count: 1,
                active: Some(0)
            }
        );
    }

    #[test]
    fn test_noop_reports_unchanged() {
        let mut editor = Editor::new();
        editor.load_content("only");
        let outcomes = run(&mut editor, &["move-line-up", "undo", "replace-all x"]);
        assert!(outcomes.iter().all(|o| *o == CommandOutcome::Unchanged));
    }

    #[test]
    fn test_format_rejected() {
        let mut editor = Editor::new();
        editor.load_content("{");
        let outcomes = run(&mut editor, &["format"]);
        assert!(matches!(outcomes[0], CommandOutcome::Rejected(_)));
        assert_eq!(editor.text(), "{");
    }

    #[test]
    fn test_type_and_replace_all() {
        let mut editor = Editor::new();
        editor.load_content("");
        let outcomes = run(&mut editor, &["type ab ab", "find AB", "replace-all cd"]);
        assert_eq!(outcomes[2], CommandOutcome::Replaced(2));
        assert_eq!(editor.text(), "cd cd");
    }
}
