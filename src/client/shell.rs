//! Interactive shell
//!
//! Turns typed lines into validated token lists and drives the
//! request/reply cycle from a `rustyline` prompt.

use std::path::{Path, PathBuf};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{CaskError, Result};
use crate::protocol::{lookup, Reply, Status};

use super::Client;

/// Keyword that ends the session. Not a registered command.
pub const EXIT_KEYWORD: &str = "quit";

/// History file, shared by every session on this machine
pub fn history_path() -> PathBuf {
    std::env::temp_dir().join("caskkv-cli.history")
}

/// What to do with one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    /// Blank line
    Skip,
    /// The exit keyword
    Exit,
    /// Refused locally; nothing is sent
    Reject(String),
    /// Validated tokens, command name first
    Execute(Vec<String>),
}

/// Split a line on whitespace and lowercase the command name
pub fn parse_line(line: &str) -> Vec<String> {
    let mut tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    if let Some(first) = tokens.first_mut() {
        *first = first.to_lowercase();
    }
    tokens
}

/// Parse and validate one line
pub fn classify(line: &str) -> ShellAction {
    let tokens = parse_line(line);
    let Some(name) = tokens.first() else {
        return ShellAction::Skip;
    };
    if name == EXIT_KEYWORD {
        return ShellAction::Exit;
    }

    let Some(spec) = lookup(name) else {
        return ShellAction::Reject(CaskError::UnknownCommand(name.clone()).to_string());
    };
    if !spec.arity.accepts(tokens.len()) {
        return ShellAction::Reject(
            CaskError::WrongArity {
                name: name.clone(),
                count: tokens.len(),
            }
            .to_string(),
        );
    }
    ShellAction::Execute(tokens)
}

/// Text shown for a reply
pub fn render_reply(reply: &Reply) -> String {
    match reply.status() {
        Some(Status::Error) => format!("(error) {}", reply.text()),
        _ => reply.text(),
    }
}

/// Run the prompt loop until the exit keyword, EOF, or a transport error
///
/// History is loaded from `history` first and written back on every exit
/// path. A transport error is returned after the history is saved; the
/// connection is unusable at that point.
pub fn run(client: &mut Client, prompt: &str, history: &Path) -> Result<()> {
    let mut editor = open_editor(history)?;

    let result = prompt_loop(client, prompt, &mut editor);

    if let Err(e) = save_history(&mut editor, history) {
        println!("writing cmd history err: {}", e);
    }
    result
}

/// Create a line editor preloaded with the entries saved at `history`
///
/// A missing or unreadable file just starts an empty history.
pub fn open_editor(history: &Path) -> Result<DefaultEditor> {
    let mut editor = DefaultEditor::new().map_err(readline_error)?;
    if editor.load_history(history).is_err() {
        tracing::debug!("No history at {}", history.display());
    }
    Ok(editor)
}

/// Append one line to the in-memory history
pub fn record(editor: &mut DefaultEditor, line: &str) {
    if let Err(e) = editor.add_history_entry(line) {
        tracing::debug!("Could not record history entry: {}", e);
    }
}

/// Rewrite the history file with every entry the editor holds
pub fn save_history(editor: &mut DefaultEditor, history: &Path) -> Result<()> {
    editor.save_history(history).map_err(readline_error)
}

fn prompt_loop(client: &mut Client, prompt: &str, editor: &mut DefaultEditor) -> Result<()> {
    loop {
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
            Err(e) => return Err(readline_error(e)),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        record(editor, line);

        match classify(line) {
            ShellAction::Skip => continue,
            ShellAction::Exit => return Ok(()),
            ShellAction::Reject(reason) => println!("{}", reason),
            ShellAction::Execute(tokens) => match client.execute(&tokens) {
                Ok(reply) => println!("{}", render_reply(&reply)),
                Err(e) if e.is_transport() => return Err(e),
                Err(e) => println!("{}", e),
            },
        }
    }
}

fn readline_error(e: ReadlineError) -> CaskError {
    CaskError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}
