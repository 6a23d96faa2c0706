//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while extracting events from trace lines
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid {field} value '{value}': {source}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Invalid line pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors that can occur while replaying scheduling events
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("Switch to thread {tid} which was never created")]
    UnknownThread { tid: u32 },

    #[error("Core {core} is out of range (tracking {cores} cores)")]
    CoreOutOfRange { core: usize, cores: usize },

    #[error("Thread {tid} closed at {timestamp_ns}ns before its slice started at {slice_start_ns}ns")]
    TimeWentBackwards {
        tid: u32,
        slice_start_ns: u64,
        timestamp_ns: u64,
    },

    #[error("Bucket {bucket} exceeds the configured bucket count {bucket_count}")]
    BucketOutOfRange { bucket: usize, bucket_count: usize },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
