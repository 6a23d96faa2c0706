//! Bucketed CPU series per process or per thread, and their ranking.

use crate::kernel::Engine;
use crate::parser::Pid;
use crate::utils::config::IDLE_PID;
use log::debug;

/// CPU time of one reporting unit (a process or a thread) over time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    /// Pid for process series, tid for thread series
    pub id: u32,

    /// Owning process
    pub pid: Pid,

    pub label: String,
    pub total_ns: u64,

    /// CPU nanoseconds per bucket
    pub buckets: Vec<u64>,
}

impl Series {
    pub fn new(id: u32, pid: Pid, label: impl Into<String>, total_ns: u64, buckets: Vec<u64>) -> Self {
        Self {
            id,
            pid,
            label: label.into(),
            total_ns,
            buckets,
        }
    }
}

/// One series per live process, in registration order
///
/// A process's histogram is the sum of its threads' histograms.
pub fn process_series(engine: &Engine) -> Vec<Series> {
    let width = engine.config().bucket_count + 1;

    engine
        .registry()
        .processes()
        .iter()
        .map(|process| {
            let mut buckets = vec![0u64; width];
            for thread in process
                .tids
                .iter()
                .filter_map(|&tid| engine.threads().by_tid(tid))
            {
                for (slot, ns) in buckets.iter_mut().zip(thread.buckets()) {
                    *slot += ns;
                }
            }
            Series::new(
                process.pid,
                process.pid,
                process.label(),
                process.total_cpu_ns,
                buckets,
            )
        })
        .collect()
}

/// One series per thread, in order of first sighting
///
/// Labels are `<name>[<tid>]`.
pub fn thread_series(engine: &Engine) -> Vec<Series> {
    engine
        .threads()
        .iter()
        .map(|thread| {
            let name = thread.display_name().unwrap_or("");
            Series::new(
                thread.tid(),
                engine.registry().pid_of(thread.tid()).unwrap_or(thread.pid()),
                format!("{}[{}]", name, thread.tid()),
                thread.total_ns(),
                thread.buckets().to_vec(),
            )
        })
        .collect()
}

/// Sort series by total CPU time, largest first
///
/// The sort is stable, so equal totals keep their incoming (registration)
/// order. With `exclude_idle` the idle process and its threads are dropped.
pub fn rank(series: Vec<Series>, exclude_idle: bool) -> Vec<Series> {
    let mut ranked: Vec<Series> = series
        .into_iter()
        .filter(|s| !(exclude_idle && s.pid == IDLE_PID))
        .collect();

    ranked.sort_by(|a, b| b.total_ns.cmp(&a.total_ns));

    debug!("Ranked {} series", ranked.len());
    ranked
}
