//! Event extraction from trace log lines.
//!
//! Two line shapes are recognised:
//! - `[<ns>ns]@<pid>:<tid>><name>`  thread/process creation
//! - `[<ns>ns]#<core>><tid>`        context switch on a core
//!
//! Anything else is not an event and is skipped by the caller.

use crate::utils::error::ParseError;
use regex::Regex;
use std::str::FromStr;

/// Process identifier as reported by the traced kernel
pub type Pid = u32;

/// Thread identifier as reported by the traced kernel
pub type Tid = u32;

/// Maps timestamps onto fixed-width buckets counted from time zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketClock {
    bucket_ns: u64,
}

impl BucketClock {
    /// Create a clock with the given bucket width (clamped to at least 1ns)
    pub fn new(bucket_ns: u64) -> Self {
        Self {
            bucket_ns: bucket_ns.max(1),
        }
    }

    pub fn bucket_ns(&self) -> u64 {
        self.bucket_ns
    }

    /// Bucket index containing `timestamp_ns`
    pub fn bucket_of(&self, timestamp_ns: u64) -> usize {
        usize::try_from(timestamp_ns / self.bucket_ns).unwrap_or(usize::MAX)
    }

    /// Start time of `bucket` in nanoseconds
    pub fn bucket_start(&self, bucket: usize) -> u64 {
        (bucket as u64).saturating_mul(self.bucket_ns)
    }

    /// Stamp a timestamp with its bucket and the bucket's start time
    pub fn stamp(&self, timestamp_ns: u64) -> Stamp {
        Stamp {
            timestamp_ns,
            bucket: self.bucket_of(timestamp_ns),
            bucket_start_ns: timestamp_ns - timestamp_ns % self.bucket_ns,
        }
    }
}

/// A timestamp together with the bucket it falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub timestamp_ns: u64,
    pub bucket: usize,
    pub bucket_start_ns: u64,
}

/// A decoded scheduling event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A thread was introduced (or renamed); `name` may be empty
    ThreadCreate { pid: Pid, tid: Tid, name: String },

    /// `tid` starts running on `core`
    ScheduleSwitch { core: usize, tid: Tid },
}

/// An event with its bucketed timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent {
    pub stamp: Stamp,
    pub event: TraceEvent,
}

/// Turns raw trace lines into [`TimedEvent`]s
///
/// **Public** - the single decoding point for trace lines
#[derive(Debug, Clone)]
pub struct LineExtractor {
    clock: BucketClock,
    create_re: Regex,
    switch_re: Regex,
}

impl LineExtractor {
    /// Compile the line patterns for the given clock
    pub fn new(clock: BucketClock) -> Result<Self, ParseError> {
        Ok(Self {
            clock,
            create_re: Regex::new(r"^\[(\d+)ns\]@(\d+):(\d+)>(.*)$")?,
            switch_re: Regex::new(r"^\[(\d+)ns\]#(\d+)>(\d+)\s*$")?,
        })
    }

    pub fn clock(&self) -> BucketClock {
        self.clock
    }

    /// Decode one line
    ///
    /// # Returns
    /// * `Ok(Some(event))` - the line is a creation or switch event
    /// * `Ok(None)` - the line matches neither shape
    ///
    /// # Errors
    /// * `ParseError::InvalidNumber` - a numeric field overflows its type
    pub fn extract(&self, line: &str) -> Result<Option<TimedEvent>, ParseError> {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(caps) = self.create_re.captures(line) {
            let timestamp_ns = parse_field::<u64>("timestamp", &caps[1])?;
            let event = TraceEvent::ThreadCreate {
                pid: parse_field("pid", &caps[2])?,
                tid: parse_field("tid", &caps[3])?,
                name: caps[4].to_string(),
            };
            return Ok(Some(TimedEvent {
                stamp: self.clock.stamp(timestamp_ns),
                event,
            }));
        }

        if let Some(caps) = self.switch_re.captures(line) {
            let timestamp_ns = parse_field::<u64>("timestamp", &caps[1])?;
            let event = TraceEvent::ScheduleSwitch {
                core: parse_field("core", &caps[2])?,
                tid: parse_field("tid", &caps[3])?,
            };
            return Ok(Some(TimedEvent {
                stamp: self.clock.stamp(timestamp_ns),
                event,
            }));
        }

        Ok(None)
    }
}

fn parse_field<T>(field: &'static str, value: &str) -> Result<T, ParseError>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    value.parse::<T>().map_err(|source| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
        source,
    })
}
