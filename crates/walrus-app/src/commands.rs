//! Interactive session commands.
//!
//! A line starting with `:` is a command. Anything else is submitted as the
//! workshop description.

use std::path::PathBuf;

/// One parsed line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Submit this text as the prompt.
    Submit(String),
    /// Print the current result again.
    Show,
    /// Copy the activities to the clipboard.
    Copy,
    /// Export the activities as CSV, optionally into a given directory.
    Csv(Option<PathBuf>),
    /// Reorder cards. Indices are zero-based here, one-based on screen.
    Move { from: usize, to: usize },
    Help,
    Quit,
    /// Unknown command or bad arguments, with a message for the user.
    Invalid(String),
}

pub const HELP_TEXT: &str = "\
Type a workshop description and press Enter to submit it.

Commands:
  :show              print the current result again
  :copy              copy activities to the clipboard
  :csv [dir]         write workshop_activities.csv (default: export_dir)
  :move <from> <to>  move card <from> to position <to> (1-based)
  :help              show this help
  :quit              leave the session";

/// Parse one line of input.
pub fn parse_command(line: &str) -> SessionCommand {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix(':') else {
        return SessionCommand::Submit(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();

    match (name, args.as_slice()) {
        ("show", []) => SessionCommand::Show,
        ("copy", []) => SessionCommand::Copy,
        ("csv", []) => SessionCommand::Csv(None),
        ("csv", [dir]) => SessionCommand::Csv(Some(PathBuf::from(dir))),
        ("move", [from, to]) => parse_move(from, to),
        ("help" | "h" | "?", []) => SessionCommand::Help,
        ("quit" | "q" | "exit", []) => SessionCommand::Quit,
        ("move", _) => SessionCommand::Invalid("Usage: :move <from> <to>".to_string()),
        _ => SessionCommand::Invalid(format!("Unknown command ':{}'. Try :help", rest)),
    }
}

fn parse_move(from: &str, to: &str) -> SessionCommand {
    match (from.parse::<usize>(), to.parse::<usize>()) {
        (Ok(from), Ok(to)) if from >= 1 && to >= 1 => SessionCommand::Move {
            from: from - 1,
            to: to - 1,
        },
        _ => SessionCommand::Invalid("Card positions start at 1".to_string()),
    }
}
