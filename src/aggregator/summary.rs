//! Per-process totals and the JSON report.

use crate::kernel::Engine;
use crate::parser::schema::{DiagnosticsSummary, ProcessRecord, Report, RunStats};
use crate::parser::Pid;
use crate::utils::config::{NS_PER_SEC, SCHEMA_VERSION};

/// Total CPU time of one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub pid: Pid,
    pub name: String,
    pub total_ns: u64,
}

impl SummaryRow {
    pub fn total_secs(&self) -> f64 {
        self.total_ns as f64 / NS_PER_SEC as f64
    }
}

/// One row per live process, in registration order (unranked)
pub fn summary(engine: &Engine) -> Vec<SummaryRow> {
    engine
        .registry()
        .processes()
        .iter()
        .map(|p| SummaryRow {
            pid: p.pid,
            name: p.label(),
            total_ns: p.total_cpu_ns,
        })
        .collect()
}

/// Convert the engine state into the JSON report
///
/// **Public** - used by commands to create the final output
pub fn to_report(engine: &Engine, trace: &str, stats: RunStats) -> Report {
    use chrono::Utc;

    let rows = engine.last_bucket().map_or(0, |b| b + 1);
    let processes = super::series::process_series(engine)
        .into_iter()
        .zip(engine.registry().processes())
        .map(|(series, process)| ProcessRecord {
            pid: process.pid,
            name: series.label,
            total_cpu_ns: series.total_ns,
            tids: process.tids.iter().copied().collect(),
            buckets: series.buckets.into_iter().take(rows).collect(),
        })
        .collect();

    let diagnostics = engine.diagnostics();

    Report {
        version: SCHEMA_VERSION.to_string(),
        trace: trace.to_string(),
        bucket_ns: engine.config().bucket_ns,
        last_bucket: engine.last_bucket(),
        stats,
        diagnostics: DiagnosticsSummary {
            skipped_bucket_slices: diagnostics.skipped_bucket_slices,
            skipped_buckets: diagnostics.skipped_buckets,
        },
        processes,
        generated_at: Utc::now().to_rfc3339(),
    }
}
