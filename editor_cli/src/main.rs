//! sftpad - headless host for the editing engine.
//!
//! Usage: sftpad FILE [--cmd CMD]... [--script PATH] [--save] [--print]
//!
//! Opens FILE, runs editor commands against it (`indent`, `find foo`,
//! `goto 12`, ...) and optionally saves or prints the result.

mod config;
mod provider;
mod session;

use anyhow::{bail, Context, Result};
use clap::Parser;
use provider::LocalFileProvider;
use session::DocumentSession;
use sftpad_core::{execute_command, CommandOutcome, EditorCommand, MemoryClipboard};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sftpad", version, about = "Edit a file with scripted editor commands")]
struct Args {
    /// File to open
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Settings file (defaults to ./sftpad.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Command to run, may be repeated
    #[arg(short, long = "cmd", value_name = "CMD")]
    commands: Vec<String>,

    /// File with one command per line, run after --cmd
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,

    /// Save the document if it was modified
    #[arg(short, long)]
    save: bool,

    /// Print the resulting text to stdout
    #[arg(short, long)]
    print: bool,
}

/// Collects commands from the arguments and the script file. Blank lines
/// and lines starting with `#` are skipped.
fn read_commands(args: &Args) -> Result<Vec<EditorCommand>> {
    let mut lines: Vec<(String, String)> = args
        .commands
        .iter()
        .enumerate()
        .map(|(i, cmd)| (format!("--cmd #{}", i + 1), cmd.clone()))
        .collect();

    if let Some(script) = &args.script {
        let content = std::fs::read_to_string(script)
            .with_context(|| format!("failed to read script {}", script.display()))?;
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            lines.push((format!("{}:{}", script.display(), i + 1), line.to_string()));
        }
    }

    lines
        .into_iter()
        .map(|(origin, line)| {
            line.parse::<EditorCommand>()
                .with_context(|| format!("{origin}: cannot parse `{line}`"))
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = config::load(args.config.as_deref())?;
    let commands = read_commands(&args)?;

    let Some(id) = args.file.to_str() else {
        bail!("file path is not valid UTF-8: {}", args.file.display());
    };
    let provider = LocalFileProvider::new(".");
    let mut session = DocumentSession::open(provider, id, settings.editor)
        .await
        .with_context(|| format!("failed to open {id}"))?;

    let mut clipboard = MemoryClipboard::new();
    for command in commands {
        let label = command.to_string();
        match execute_command(session.editor_mut(), command, &mut clipboard) {
            CommandOutcome::Rejected(err) => log::warn!("{label}: {err}"),
            CommandOutcome::Matches { count, active } => {
                let active = active.map_or(0, |i| i + 1);
                log::info!("{label}: match {active} of {count}");
            }
            CommandOutcome::Replaced(n) => log::info!("{label}: replaced {n}"),
            CommandOutcome::Moved(pos) => log::debug!("{label}: Ln {}, Col {}", pos.line, pos.col),
            CommandOutcome::Unchanged => log::debug!("{label}: no change"),
            CommandOutcome::Edited => {}
        }
    }

    let editor = session.editor();
    let pos = editor.cursor_position();
    log::info!(
        "{}: Ln {}, Col {}{}",
        session.id(),
        pos.line,
        pos.col,
        if editor.is_modified() { " (modified)" } else { "" }
    );

    if args.save {
        if session.editor().is_modified() {
            session
                .save()
                .await
                .with_context(|| format!("failed to save {id}"))?;
        } else {
            log::info!("{id}: nothing to save");
        }
    }

    if args.print {
        print!("{}", session.editor().text());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["sftpad", "file.txt"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_args() {
        let args = args(&["-c", "indent", "--cmd", "find foo", "--save"]);
        assert_eq!(args.file, PathBuf::from("file.txt"));
        assert_eq!(args.commands, vec!["indent", "find foo"]);
        assert!(args.save);
        assert!(!args.print);
    }

    #[test]
    fn test_read_commands_with_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("edit.txt");
        std::fs::write(&script, "# tidy up\nsort-lines\n\ngoto 2\n").unwrap();

        let mut args = args(&["--cmd", "select-all"]);
        args.script = Some(script);
        let commands = read_commands(&args).unwrap();
        assert_eq!(
            commands,
            vec![
                EditorCommand::SelectAll,
                EditorCommand::SortLines,
                EditorCommand::GoToLine(2)
            ]
        );
    }

    #[test]
    fn test_read_commands_reports_origin() {
        let args = args(&["--cmd", "undo", "--cmd", "explode"]);
        let err = read_commands(&args).unwrap_err();
        assert!(err.to_string().contains("--cmd #2"));
    }
}
