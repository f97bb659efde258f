//! Report persistence
//!
//! Text and HTML reports are rendered to a `String` first and written in one
//! call; JSON is streamed straight into the writer.

pub mod json;

pub use json::write_json;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::ReportError;

/// Create (or truncate) `path` and write `contents` to it.
///
/// The file handle is closed on every return path.
///
/// # Errors
/// Returns [`ReportError::WriteFailed`] if the file cannot be created, written
/// or flushed.
pub fn write_report(path: impl AsRef<Path>, contents: &str) -> Result<(), ReportError> {
    let path = path.as_ref();
    let failed = |source| ReportError::WriteFailed { path: path.to_path_buf(), source };

    let file = File::create(path).map_err(failed)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(contents.as_bytes()).map_err(failed)?;
    writer.flush().map_err(failed)
}
