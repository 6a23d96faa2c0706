//! Scheduling reconstruction.
//!
//! This module replays creation and context-switch events and keeps:
//! - Per-thread bucketed CPU time (the thread ledger)
//! - Process membership and per-process CPU totals (the registry)
//! - The thread currently occupying each core

pub mod cores;
pub mod engine;
pub mod registry;
pub mod thread;

pub use cores::CoreSlots;
pub use engine::{Diagnostics, Engine};
pub use registry::{Process, ProcessRegistry};
pub use thread::{SliceClose, Thread, ThreadId, ThreadLedger};

use crate::utils::config::{DEFAULT_BUCKET_COUNT, DEFAULT_BUCKET_NS, DEFAULT_CORES, NS_PER_SEC};
use clap::ValueEnum;

/// What a thread's first creation event means for its run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CreationPolicy {
    /// Creation opens a slice at the creation time; the first switch-in
    /// on a core continues it
    #[default]
    ImpliesSchedule,

    /// Only a switch event opens a slice
    RequireSwitch,
}

/// How a slice that jumps over whole buckets is attributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SkipStrategy {
    /// Everything before the closing bucket goes to the slice's origin bucket
    #[default]
    Fold,

    /// Skipped buckets receive a full bucket each
    Distribute,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Width of one bucket in nanoseconds
    pub bucket_ns: u64,

    /// Highest usable bucket index; histograms hold `bucket_count + 1` entries
    pub bucket_count: usize,

    /// Number of core slots
    pub cores: usize,

    pub creation_policy: CreationPolicy,
    pub skip_strategy: SkipStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bucket_ns: DEFAULT_BUCKET_NS,
            bucket_count: DEFAULT_BUCKET_COUNT,
            cores: DEFAULT_CORES,
            creation_policy: CreationPolicy::default(),
            skip_strategy: SkipStrategy::default(),
        }
    }
}

impl EngineConfig {
    /// Bound the bucket count by a trace duration in seconds
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.bucket_count = buckets_for_duration(duration_ns(seconds), self.bucket_ns);
        self
    }
}

/// Convert a duration in seconds to nanoseconds
pub fn duration_ns(seconds: f64) -> u64 {
    (seconds * NS_PER_SEC as f64).round() as u64
}

fn buckets_for_duration(duration_ns: u64, bucket_ns: u64) -> usize {
    let bucket_ns = bucket_ns.max(1);
    usize::try_from(duration_ns.div_ceil(bucket_ns)).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_duration_rounds_up() {
        let config = EngineConfig::default().with_duration(1.05);
        assert_eq!(config.bucket_count, 11);

        let config = EngineConfig::default().with_duration(2.0);
        assert_eq!(config.bucket_count, 20);
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.bucket_ns, 100_000_000);
        assert_eq!(config.bucket_count, 2000);
        assert_eq!(config.cores, 8);
        assert_eq!(config.creation_policy, CreationPolicy::ImpliesSchedule);
        assert_eq!(config.skip_strategy, SkipStrategy::Fold);
    }
}
