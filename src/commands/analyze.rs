//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads the trace and replays its events
//! 2. Optionally merges same-named processes
//! 3. Ranks processes (or threads) and builds the bucketed table
//! 4. Writes output files

use crate::aggregator::{build_table, process_series, rank, summary, thread_series, to_report};
use crate::kernel::{duration_ns, CreationPolicy, Engine, EngineConfig, SkipStrategy};
use crate::output::{write_report, write_summary_file, write_table_to};
use crate::parser::{BucketClock, LineExtractor, RunStats};
use crate::utils::config::{DEFAULT_BUCKET_NS, DEFAULT_CORES, DEFAULT_PROCESS_COUNT};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Trace log to read
    pub trace: PathBuf,

    /// Nanoseconds per bucket
    pub bucket_ns: u64,

    /// Stop after this many seconds of trace time
    pub duration: Option<f64>,

    /// Number of processes shown individually before "Misc"
    pub process_count: usize,

    /// Fold processes sharing a name before ranking
    pub merge: bool,

    /// Number of cores to track
    pub cores: usize,

    /// Per-process summary output (optional)
    pub output_summary: Option<PathBuf>,

    /// Bucketed table output; stdout when unset
    pub output_table: Option<PathBuf>,

    /// JSON report output (optional)
    pub output_json: Option<PathBuf>,

    /// Rank threads instead of processes
    pub per_thread: bool,

    /// Leave the idle process out of the table
    pub exclude_idle: bool,

    /// Close slices still running at the end of the trace
    pub flush: bool,

    pub creation_policy: CreationPolicy,
    pub skip_strategy: SkipStrategy,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            trace: PathBuf::new(),
            bucket_ns: DEFAULT_BUCKET_NS,
            duration: None,
            process_count: DEFAULT_PROCESS_COUNT,
            merge: false,
            cores: DEFAULT_CORES,
            output_summary: None,
            output_table: None,
            output_json: None,
            per_thread: false,
            exclude_idle: false,
            flush: false,
            creation_policy: CreationPolicy::default(),
            skip_strategy: SkipStrategy::default(),
        }
    }
}

impl AnalyzeArgs {
    /// Engine configuration implied by these arguments
    pub fn engine_config(&self) -> EngineConfig {
        let config = EngineConfig {
            bucket_ns: self.bucket_ns,
            cores: self.cores,
            creation_policy: self.creation_policy,
            skip_strategy: self.skip_strategy,
            ..Default::default()
        };
        match self.duration {
            Some(seconds) => config.with_duration(seconds),
            None => config,
        }
    }
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.trace.as_os_str().is_empty() {
        anyhow::bail!("Trace path cannot be empty");
    }

    if args.bucket_ns == 0 {
        anyhow::bail!("Bucket width must be greater than 0");
    }

    if args.cores == 0 {
        anyhow::bail!("Core count must be greater than 0");
    }

    if args.process_count == 0 {
        anyhow::bail!("Process count must be greater than 0");
    }

    if let Some(duration) = args.duration {
        if !duration.is_finite() || duration <= 0.0 {
            anyhow::bail!("Duration must be a positive number of seconds");
        }
    }

    Ok(())
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Trace file cannot be read
/// * A line carries an event the engine cannot apply
/// * Output files cannot be written
pub fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Analyzing trace: {}", args.trace.display());

    // Step 1: Replay the trace
    info!("Step 1/4: Replaying scheduling events...");
    let file = File::open(&args.trace)
        .with_context(|| format!("Failed to open trace {}", args.trace.display()))?;

    let mut engine = Engine::new(args.engine_config());
    let cutoff_ns = args.duration.map(duration_ns);
    let stats = replay_trace(BufReader::new(file), &mut engine, cutoff_ns)
        .with_context(|| format!("Failed to replay trace {}", args.trace.display()))?;

    if args.flush {
        let closed = engine.flush().context("Failed to close trailing slices")?;
        debug!("Closed {} slices still running at end of trace", closed);
    }

    // Step 2: Merge
    if args.merge {
        info!("Step 2/4: Merging processes by name...");
        let folded = engine.merge_by_name();
        info!("Merged {} processes into same-named ones", folded);
    } else {
        info!("Step 2/4: Skipping merge (not requested)");
    }

    // Step 3: Rank and tabulate
    info!("Step 3/4: Ranking and building the CPU table...");
    let series = if args.per_thread {
        thread_series(&engine)
    } else {
        process_series(&engine)
    };
    let ranked = rank(series, args.exclude_idle);

    debug!("Top 3:");
    for (i, s) in ranked.iter().take(3).enumerate() {
        debug!("  {}. {} ({}ns)", i + 1, s.label, s.total_ns);
    }

    let table = build_table(
        &ranked,
        args.process_count,
        engine.last_bucket(),
        engine.config().bucket_ns,
    );

    // Step 4: Write outputs
    info!("Step 4/4: Writing outputs...");
    write_table_to(&table, args.output_table.as_deref())
        .context("Failed to write CPU table")?;

    if let Some(path) = &args.output_summary {
        write_summary_file(&summary(&engine), path).context("Failed to write summary")?;
        info!("✓ Summary written to: {}", path.display());
    }

    if let Some(path) = &args.output_json {
        let report = to_report(&engine, &args.trace.display().to_string(), stats.clone());
        write_report(&report, path).context("Failed to write JSON report")?;
        info!("✓ Report written to: {}", path.display());
    }

    let diagnostics = engine.diagnostics();
    if diagnostics.skipped_bucket_slices > 0 {
        warn!(
            "{} slice(s) jumped over {} bucket(s) without a switch event",
            diagnostics.skipped_bucket_slices, diagnostics.skipped_buckets
        );
    }

    info!(
        "{} lines, {} events, {} skipped, {} processes, {} threads",
        stats.lines_read,
        stats.events_applied,
        stats.lines_skipped,
        engine.registry().len(),
        engine.threads().len()
    );
    info!(
        "Analysis completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Feed every line of `reader` through the engine
///
/// **Public** - the single pass over a trace, usable on any reader
///
/// Lines matching no event are skipped. Processing stops at the first event
/// at or after `cutoff_ns`, or whose bucket exceeds the engine's bucket
/// count. Any other failure aborts with the offending line number.
pub fn replay_trace<R: BufRead>(
    reader: R,
    engine: &mut Engine,
    cutoff_ns: Option<u64>,
) -> Result<RunStats> {
    let extractor = LineExtractor::new(BucketClock::new(engine.config().bucket_ns))?;
    let bucket_count = engine.config().bucket_count;
    let mut stats = RunStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
        stats.lines_read += 1;

        let Some(event) = extractor
            .extract(&line)
            .with_context(|| format!("Invalid event on line {}", line_no))?
        else {
            stats.lines_skipped += 1;
            continue;
        };

        if cutoff_ns.is_some_and(|cutoff| event.stamp.timestamp_ns >= cutoff) {
            info!("Duration cutoff reached at line {}", line_no);
            stats.truncated = true;
            break;
        }

        if event.stamp.bucket > bucket_count {
            warn!(
                "Line {} falls in bucket {}, beyond the {} configured buckets; truncating",
                line_no, event.stamp.bucket, bucket_count
            );
            stats.truncated = true;
            break;
        }

        engine
            .apply(&event)
            .with_context(|| format!("Failed to apply event on line {}", line_no))?;
        stats.events_applied += 1;
    }

    debug!("Skipped {} lines without an event", stats.lines_skipped);

    Ok(stats)
}
