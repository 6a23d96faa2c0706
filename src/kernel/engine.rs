//! The replay engine.
//!
//! Owns the thread ledger, process registry and core slots for one run and
//! applies events to them in trace order.

use super::cores::CoreSlots;
use super::registry::ProcessRegistry;
use super::thread::{ThreadId, ThreadLedger};
use super::{CreationPolicy, EngineConfig};
use crate::parser::{BucketClock, Pid, Stamp, Tid, TimedEvent, TraceEvent};
use crate::utils::error::EngineError;
use log::{debug, warn};

/// Anomalies observed while replaying
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Slices that jumped over at least one whole bucket
    pub skipped_bucket_slices: u64,

    /// Sum of whole buckets jumped over
    pub skipped_buckets: u64,
}

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    clock: BucketClock,
    threads: ThreadLedger,
    registry: ProcessRegistry,
    cores: CoreSlots,
    diagnostics: Diagnostics,
    /// Latest stamp applied; creation lines may arrive out of order
    last_stamp: Option<Stamp>,
    events_applied: u64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            clock: BucketClock::new(config.bucket_ns),
            cores: CoreSlots::new(config.cores),
            config,
            threads: ThreadLedger::new(),
            registry: ProcessRegistry::new(),
            diagnostics: Diagnostics::default(),
            last_stamp: None,
            events_applied: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> BucketClock {
        self.clock
    }

    pub fn threads(&self) -> &ThreadLedger {
        &self.threads
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    pub fn cores(&self) -> &CoreSlots {
        &self.cores
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    pub fn events_applied(&self) -> u64 {
        self.events_applied
    }

    /// Bucket of the latest event applied so far
    pub fn last_bucket(&self) -> Option<usize> {
        self.last_stamp.map(|s| s.bucket)
    }

    /// Apply one decoded event
    ///
    /// # Errors
    /// Any [`EngineError`]; the run should be abandoned since later totals
    /// would build on a corrupted state.
    pub fn apply(&mut self, event: &TimedEvent) -> Result<(), EngineError> {
        if event.stamp.bucket > self.config.bucket_count {
            return Err(EngineError::BucketOutOfRange {
                bucket: event.stamp.bucket,
                bucket_count: self.config.bucket_count,
            });
        }

        match &event.event {
            TraceEvent::ThreadCreate { pid, tid, name } => {
                self.on_thread_create(*pid, *tid, &event.stamp, name);
            }
            TraceEvent::ScheduleSwitch { core, tid } => {
                self.on_schedule_switch(*core, *tid, &event.stamp)?;
            }
        }

        if self
            .last_stamp
            .map_or(true, |last| event.stamp.timestamp_ns > last.timestamp_ns)
        {
            self.last_stamp = Some(event.stamp);
        }
        self.events_applied += 1;
        Ok(())
    }

    /// Register a thread and its process
    ///
    /// Never closes another thread's slice. Under
    /// [`CreationPolicy::ImpliesSchedule`] a newly seen thread gets a pending
    /// slice starting at its creation time, claimed by the first idle core
    /// it is switched onto.
    pub fn on_thread_create(&mut self, pid: Pid, tid: Tid, stamp: &Stamp, name: &str) {
        let pid = self.registry.register_thread(pid, tid, name);
        let (id, created) =
            self.threads
                .get_or_create(pid, tid, stamp, name, self.config.bucket_count);

        if created && self.config.creation_policy == CreationPolicy::ImpliesSchedule {
            self.threads.get_mut(id).schedule_pending(stamp);
        }
    }

    /// Switch `core` over to `tid`
    ///
    /// The previous occupant's slice is closed and credited first; then the
    /// incoming thread is looked up and a slice is opened for it. A pending
    /// creation slice is kept only when the core was idle, since no thread
    /// can have run on a core another thread occupied.
    pub fn on_schedule_switch(
        &mut self,
        core: usize,
        tid: Tid,
        stamp: &Stamp,
    ) -> Result<(), EngineError> {
        let previous = self.cores.replace(core, None)?;
        if let Some(previous) = previous {
            self.close_slice(previous, stamp)?;
        }

        let id = self
            .threads
            .lookup(tid)
            .ok_or(EngineError::UnknownThread { tid })?;
        self.cores.replace(core, Some(id))?;

        let thread = self.threads.get_mut(id);
        if thread.has_pending_slice() && previous.is_none() {
            debug!("Thread {} runs on core {} since its creation", tid, core);
            thread.claim_pending();
        } else if thread.has_open_slice() && !thread.has_pending_slice() {
            debug!("Thread {} is already running on another core", tid);
        } else {
            thread.schedule_in(stamp);
        }
        Ok(())
    }

    /// Close every slice still running on a core at the latest event's time
    ///
    /// Returns the number of slices closed.
    pub fn flush(&mut self) -> Result<usize, EngineError> {
        let Some(stamp) = self.last_stamp else {
            return Ok(0);
        };
        let running = self.cores.drain();
        for &id in &running {
            self.close_slice(id, &stamp)?;
        }
        Ok(running.len())
    }

    /// Fold same-named processes together; see [`ProcessRegistry::merge_by_name`]
    pub fn merge_by_name(&mut self) -> usize {
        self.registry.merge_by_name()
    }

    fn close_slice(&mut self, id: ThreadId, stamp: &Stamp) -> Result<(), EngineError> {
        let thread = self.threads.get_mut(id);
        let close = thread.schedule_out(stamp, &self.clock, self.config.skip_strategy)?;
        let tid = thread.tid();

        if close.skipped_buckets > 0 {
            warn!(
                "Thread {} ran from bucket {} to bucket {} without a switch event; \
                 {} skipped bucket(s) attributed using {:?}",
                tid,
                close.origin_bucket,
                stamp.bucket,
                close.skipped_buckets,
                self.config.skip_strategy
            );
            self.diagnostics.skipped_bucket_slices += 1;
            self.diagnostics.skipped_buckets += close.skipped_buckets as u64;
        }

        self.registry.credit_time(tid, close.elapsed_ns);
        Ok(())
    }
}
