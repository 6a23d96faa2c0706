//! Output JSON schema definitions for CPU distribution reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Trace file the report was computed from
    pub trace: String,

    /// Width of one bucket in nanoseconds
    pub bucket_ns: u64,

    /// Index of the bucket holding the last processed event
    pub last_bucket: Option<usize>,

    /// Input statistics
    pub stats: RunStats,

    /// Anomalies observed while replaying the trace
    pub diagnostics: DiagnosticsSummary,

    /// One record per (possibly merged) process, in registration order
    pub processes: Vec<ProcessRecord>,

    /// Timestamp when report was generated
    pub generated_at: String,
}

/// Counters from one pass over the trace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub lines_read: u64,
    pub events_applied: u64,
    pub lines_skipped: u64,
    /// Processing stopped early (duration cutoff or bucket bound)
    pub truncated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsSummary {
    /// Slices that crossed more than one bucket boundary
    pub skipped_bucket_slices: u64,

    /// Total number of buckets those slices jumped over
    pub skipped_buckets: u64,
}

/// CPU usage of one process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub total_cpu_ns: u64,
    pub tids: Vec<u32>,

    /// CPU nanoseconds per bucket, up to and including `last_bucket`
    pub buckets: Vec<u64>,
}
