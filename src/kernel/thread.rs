//! Per-thread slice accounting.
//!
//! A thread accumulates CPU time into a fixed-length histogram, one entry
//! per bucket. A run slice is opened by `schedule_in` and closed by
//! `schedule_out`; a slice crossing a bucket boundary is split between the
//! buckets it touches.

use super::SkipStrategy;
use crate::parser::{BucketClock, Pid, Stamp, Tid};
use crate::utils::error::EngineError;
use std::collections::HashMap;

/// Index of a thread inside the [`ThreadLedger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadId(usize);

/// An open run slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slice {
    start_ns: u64,
    bucket: usize,
    /// Opened by creation, not yet seen on a core
    pending: bool,
}

/// Result of closing a slice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceClose {
    /// Wall time from slice start to close
    pub elapsed_ns: u64,

    /// Bucket the slice was opened in
    pub origin_bucket: usize,

    /// Whole buckets the slice jumped over without a switch event
    pub skipped_buckets: usize,
}

#[derive(Debug, Clone)]
pub struct Thread {
    tid: Tid,
    pid: Pid,
    start_ns: u64,
    names: Vec<String>,
    buckets: Vec<u64>,
    total_ns: u64,
    slice: Option<Slice>,
}

impl Thread {
    /// Create a thread with `bucket_count + 1` empty buckets
    pub fn new(pid: Pid, tid: Tid, start_ns: u64, name: &str, bucket_count: usize) -> Self {
        let mut thread = Self {
            tid,
            pid,
            start_ns,
            names: Vec::new(),
            buckets: vec![0; bucket_count.saturating_add(1)],
            total_ns: 0,
            slice: None,
        };
        thread.add_name(name);
        thread
    }

    pub fn tid(&self) -> Tid {
        self.tid
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn start_ns(&self) -> u64 {
        self.start_ns
    }

    /// All distinct non-empty names seen for this thread, oldest first
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Most recently seen name
    pub fn display_name(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    /// CPU nanoseconds per bucket
    pub fn buckets(&self) -> &[u64] {
        &self.buckets
    }

    /// Total CPU nanoseconds over all closed slices
    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }

    pub fn has_open_slice(&self) -> bool {
        self.slice.is_some()
    }

    /// Open slice comes from creation and no core has claimed it yet
    pub fn has_pending_slice(&self) -> bool {
        self.slice.is_some_and(|s| s.pending)
    }

    /// Record a name; a renamed thread keeps its older names too
    pub fn add_name(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        if let Some(pos) = self.names.iter().position(|n| n == name) {
            // Most recent name last
            let existing = self.names.remove(pos);
            self.names.push(existing);
        } else {
            self.names.push(name.to_string());
        }
    }

    /// Open a run slice at `stamp`
    pub fn schedule_in(&mut self, stamp: &Stamp) {
        self.slice = Some(Slice {
            start_ns: stamp.timestamp_ns,
            bucket: stamp.bucket,
            pending: false,
        });
    }

    /// Open a slice at creation time, before any core runs the thread
    pub fn schedule_pending(&mut self, stamp: &Stamp) {
        self.slice = Some(Slice {
            start_ns: stamp.timestamp_ns,
            bucket: stamp.bucket,
            pending: true,
        });
    }

    /// Let a core take over the pending slice, keeping its start time
    pub fn claim_pending(&mut self) {
        if let Some(slice) = self.slice.as_mut() {
            slice.pending = false;
        }
    }

    /// Close the open run slice at `stamp` and attribute its time to buckets
    ///
    /// Closing a thread without an open slice is a no-op returning zero.
    ///
    /// # Errors
    /// * `EngineError::TimeWentBackwards` - `stamp` precedes the slice start
    /// * `EngineError::BucketOutOfRange` - `stamp` is past the histogram
    pub fn schedule_out(
        &mut self,
        stamp: &Stamp,
        clock: &BucketClock,
        strategy: SkipStrategy,
    ) -> Result<SliceClose, EngineError> {
        let Some(slice) = self.slice else {
            return Ok(SliceClose::default());
        };

        if stamp.timestamp_ns < slice.start_ns {
            return Err(EngineError::TimeWentBackwards {
                tid: self.tid,
                slice_start_ns: slice.start_ns,
                timestamp_ns: stamp.timestamp_ns,
            });
        }
        if stamp.bucket >= self.buckets.len() {
            return Err(EngineError::BucketOutOfRange {
                bucket: stamp.bucket,
                bucket_count: self.buckets.len() - 1,
            });
        }

        self.slice = None;

        let mut start = slice.start_ns;
        if stamp.bucket != slice.bucket {
            match strategy {
                SkipStrategy::Fold => {
                    self.buckets[slice.bucket] += stamp.bucket_start_ns - start;
                }
                SkipStrategy::Distribute => {
                    for bucket in slice.bucket..stamp.bucket {
                        let end = clock.bucket_start(bucket + 1);
                        self.buckets[bucket] += end - start;
                        start = end;
                    }
                }
            }
            start = stamp.bucket_start_ns;
        }
        self.buckets[stamp.bucket] += stamp.timestamp_ns - start;

        let elapsed_ns = stamp.timestamp_ns - slice.start_ns;
        self.total_ns += elapsed_ns;

        Ok(SliceClose {
            elapsed_ns,
            origin_bucket: slice.bucket,
            skipped_buckets: stamp.bucket.saturating_sub(slice.bucket + 1),
        })
    }
}

/// Owns every thread seen in the trace
#[derive(Debug, Default)]
pub struct ThreadLedger {
    threads: Vec<Thread>,
    index: HashMap<Tid, ThreadId>,
}

impl ThreadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `tid`, creating the thread if unseen
    ///
    /// Returns the id and whether the thread was created by this call.
    pub fn get_or_create(
        &mut self,
        pid: Pid,
        tid: Tid,
        stamp: &Stamp,
        name: &str,
        bucket_count: usize,
    ) -> (ThreadId, bool) {
        if let Some(&id) = self.index.get(&tid) {
            self.threads[id.0].add_name(name);
            return (id, false);
        }

        let id = ThreadId(self.threads.len());
        self.threads
            .push(Thread::new(pid, tid, stamp.timestamp_ns, name, bucket_count));
        self.index.insert(tid, id);
        (id, true)
    }

    pub fn lookup(&self, tid: Tid) -> Option<ThreadId> {
        self.index.get(&tid).copied()
    }

    pub fn get(&self, id: ThreadId) -> &Thread {
        &self.threads[id.0]
    }

    pub fn get_mut(&mut self, id: ThreadId) -> &mut Thread {
        &mut self.threads[id.0]
    }

    /// Thread by kernel tid
    pub fn by_tid(&self, tid: Tid) -> Option<&Thread> {
        self.lookup(tid).map(|id| self.get(id))
    }

    /// Threads in order of first sighting
    pub fn iter(&self) -> impl Iterator<Item = &Thread> {
        self.threads.iter()
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}
