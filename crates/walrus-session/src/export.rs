//! Clipboard and CSV exports of the current activity list.

use std::path::{Path, PathBuf};

use walrus_core::Activity;

use crate::error::SessionError;

/// File name of the CSV export.
pub const CSV_FILE_NAME: &str = "workshop_activities.csv";

/// `title: description` blocks separated by blank lines.
pub fn clipboard_text(activities: &[Activity]) -> String {
    activities
        .iter()
        .map(|a| format!("{}: {}", a.title, a.description))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One quoted `"title","description"` row per activity, newline separated.
pub fn to_csv(activities: &[Activity]) -> String {
    activities
        .iter()
        .map(|a| format!("{},{}", csv_field(&a.title), csv_field(&a.description)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Quote a CSV field, doubling embedded quotes.
pub fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Write the CSV export into `dir`, creating it if needed.
pub fn write_csv(dir: &Path, activities: &[Activity]) -> Result<PathBuf, SessionError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(CSV_FILE_NAME);
    std::fs::write(&path, to_csv(activities))?;
    tracing::info!(path = %path.display(), rows = activities.len(), "CSV exported");
    Ok(path)
}

/// Destination for clipboard exports.
pub trait Clipboard {
    fn set_text(&self, text: &str) -> Result<(), SessionError>;
}

/// The operating system clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), SessionError> {
        cli_clipboard::set_contents(text.to_string())
            .map_err(|e| SessionError::Clipboard(e.to_string()))
    }
}
