//! Aggregation of replayed scheduling state into reports.
//!
//! This module transforms the engine's per-thread histograms into:
//! - Ranked per-process (or per-thread) series
//! - The bucketed top-N + "Misc" table
//! - Per-process totals and the JSON report

pub mod series;
pub mod summary;
pub mod table;

// Re-export main types and functions
pub use series::{process_series, rank, thread_series, Series};
pub use summary::{summary, to_report, SummaryRow};
pub use table::{build_table, CpuTable, TableColumn};
