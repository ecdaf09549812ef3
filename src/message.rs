//! Message body and required input files

use crate::error::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read a file that must exist. Absence maps to `Error::MissingFile`.
pub fn read_required_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::MissingFile {
            path: path.to_path_buf(),
            source: e,
        },
        _ => Error::Io(e),
    })
}

/// Read the message body, trimmed. Shared by every recipient in the run.
pub fn read_message(path: &Path) -> Result<String> {
    Ok(read_required_file(path)?.trim().to_string())
}
