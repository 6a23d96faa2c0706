use crate::output::read_report;
use crate::utils::config::{NS_PER_SEC, SCHEMA_VERSION};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Validate a JSON report file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)
        .with_context(|| format!("Failed to read report {}", file_path.display()))?;

    let total_ns: u64 = report.processes.iter().map(|p| p.total_cpu_ns).sum();

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Trace: {}", report.trace);
    println!("  Bucket: {}ns", report.bucket_ns);
    println!("  Processes: {}", report.processes.len());
    println!("  Total CPU: {:.3}s", total_ns as f64 / NS_PER_SEC as f64);
    println!(
        "  Skipped-bucket slices: {}",
        report.diagnostics.skipped_bucket_slices
    );

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("schedtrace v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Per-process CPU time distribution from kernel scheduling traces.");
}
