//! Trace line extraction and report schema definitions.
//!
//! This module handles:
//! - Decoding raw trace lines into typed events
//! - Mapping timestamps onto buckets
//! - Defining the JSON report schema

pub mod event;
pub mod schema;

// Re-export main types
pub use event::{BucketClock, LineExtractor, Pid, Stamp, Tid, TimedEvent, TraceEvent};
pub use schema::{DiagnosticsSummary, ProcessRecord, Report, RunStats};
