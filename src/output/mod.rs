//! Output writers for CPU distribution data.
//!
//! This module handles writing data to disk in various formats:
//! - CSV bucketed table and per-process summary
//! - JSON reports

pub mod csv;
pub mod json;

use crate::utils::error::OutputError;
use log::debug;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

// Re-export main functions
pub use csv::{write_summary, write_summary_file, write_table, write_table_to};
pub use json::{read_report, write_report};

/// Validate that output path is writable
///
/// **Public** - shared by every writer
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if we're trying to overwrite a directory
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Validate `path`, create missing parent directories and open it for writing
pub(crate) fn create_output(path: &Path) -> Result<BufWriter<File>, OutputError> {
    validate_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(path).map_err(OutputError::WriteFailed)?;
    Ok(BufWriter::new(file))
}
