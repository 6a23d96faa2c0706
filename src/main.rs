//! schedtrace CLI
//!
//! Turns a kernel scheduling trace into a bucketed table of CPU occupancy
//! per process, plus optional per-process totals and a JSON report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use schedtrace::commands::{
    display_version, execute_analyze, validate_args, validate_report_file, AnalyzeArgs,
};
use schedtrace::kernel::{CreationPolicy, SkipStrategy};
use schedtrace::utils::config::{DEFAULT_BUCKET_NS, DEFAULT_CORES, DEFAULT_PROCESS_COUNT};

/// schedtrace - CPU time distribution from scheduling traces
#[derive(Parser, Debug)]
#[command(name = "schedtrace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trace and report CPU time per process
    Analyze {
        /// Trace log with creation and switch events
        trace: PathBuf,

        /// Nanoseconds per bucket
        #[arg(short, long, default_value_t = DEFAULT_BUCKET_NS)]
        bucket: u64,

        /// Stop after this many seconds of trace time
        #[arg(short, long)]
        duration: Option<f64>,

        /// Processes shown individually before "Misc"
        #[arg(short, long, default_value_t = DEFAULT_PROCESS_COUNT)]
        pcount: usize,

        /// Merge processes with the same name
        #[arg(short, long)]
        merge: bool,

        /// Number of cores in the traced system
        #[arg(short, long, default_value_t = DEFAULT_CORES)]
        cores: usize,

        /// Output path for per-process CPU totals
        #[arg(short, long)]
        summary: Option<PathBuf>,

        /// Output path for the bucketed CSV table (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output path for a JSON report
        #[arg(long)]
        json: Option<PathBuf>,

        /// Report threads instead of processes
        #[arg(long)]
        per_thread: bool,

        /// Leave the idle (swapper) process out of the table
        #[arg(long)]
        exclude_idle: bool,

        /// Close slices still running at the end of the trace
        #[arg(long)]
        flush: bool,

        /// Whether a thread's creation counts as being scheduled in
        #[arg(long, value_enum, default_value_t = CreationPolicy::ImpliesSchedule)]
        creation: CreationPolicy,

        /// How slices jumping over whole buckets are attributed
        #[arg(long, value_enum, default_value_t = SkipStrategy::Fold)]
        skip_strategy: SkipStrategy,
    },

    /// Validate a JSON report file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Analyze {
            trace,
            bucket,
            duration,
            pcount,
            merge,
            cores,
            summary,
            output,
            json,
            per_thread,
            exclude_idle,
            flush,
            creation,
            skip_strategy,
        } => {
            let args = AnalyzeArgs {
                trace,
                bucket_ns: bucket,
                duration,
                process_count: pcount,
                merge,
                cores,
                output_summary: summary,
                output_table: output,
                output_json: json,
                per_thread,
                exclude_idle,
                flush,
                creation_policy: creation,
                skip_strategy,
            };

            // Validate args first
            validate_args(&args)?;

            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
