//! Configuration and constants for the CLI.

/// Current JSON report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Nanoseconds in one second
pub const NS_PER_SEC: u64 = 1_000_000_000;

// Defaults for the analyze command
// 10^8 ns = 0.1 s per bucket, 2000 buckets = 200 s of trace
pub const DEFAULT_BUCKET_NS: u64 = 100_000_000;
pub const DEFAULT_BUCKET_COUNT: usize = 2000;
pub const DEFAULT_PROCESS_COUNT: usize = 100;
pub const DEFAULT_CORES: usize = 8;

/// The kernel's idle ("swapper") task
pub const IDLE_PID: u32 = 0;

/// Column label for everything outside the top-N
pub const MISC_LABEL: &str = "Misc";

/// Header of the time column in the bucketed table
pub const TIME_COLUMN_LABEL: &str = "Time(s)";
