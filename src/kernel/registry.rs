//! Process membership and per-process CPU totals.

use crate::parser::{Pid, Tid};
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub pid: Pid,
    pub tids: BTreeSet<Tid>,
    /// Most recent non-empty name given to any of its threads
    pub display_name: Option<String>,
    pub total_cpu_ns: u64,
}

impl Process {
    fn new(pid: Pid) -> Self {
        Self {
            pid,
            tids: BTreeSet::new(),
            display_name: None,
            total_cpu_ns: 0,
        }
    }

    /// Name used in reports; unnamed processes show as `[pid]`
    pub fn label(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None => format!("[{}]", self.pid),
        }
    }
}

/// Registry of processes in order of first registration
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    processes: Vec<Process>,
    /// pid -> slot in `processes`; folded pids point at their survivor
    index: HashMap<Pid, usize>,
    tid_pid: HashMap<Tid, Pid>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `tid` belongs to `pid`, optionally naming it
    ///
    /// Idempotent. A tid keeps the pid it was first registered with; the
    /// returned pid is that binding.
    pub fn register_thread(&mut self, pid: Pid, tid: Tid, name: &str) -> Pid {
        let pid = match self.tid_pid.get(&tid) {
            Some(&bound) if bound != pid => {
                warn!(
                    "Thread {} re-announced under pid {}, keeping pid {}",
                    tid, pid, bound
                );
                bound
            }
            Some(&bound) => bound,
            None => {
                self.tid_pid.insert(tid, pid);
                pid
            }
        };

        let slot = match self.index.get(&pid) {
            Some(&slot) => slot,
            None => {
                let slot = self.processes.len();
                self.processes.push(Process::new(pid));
                self.index.insert(pid, slot);
                slot
            }
        };

        let process = &mut self.processes[slot];
        process.tids.insert(tid);
        if !name.is_empty() {
            process.display_name = Some(name.to_string());
        }

        process.pid
    }

    /// Add a closed slice's time to the process owning `tid`
    pub fn credit_time(&mut self, tid: Tid, elapsed_ns: u64) {
        let Some(slot) = self
            .tid_pid
            .get(&tid)
            .and_then(|pid| self.index.get(pid))
            .copied()
        else {
            debug!("No process owns thread {}, {}ns not credited", tid, elapsed_ns);
            return;
        };
        self.processes[slot].total_cpu_ns += elapsed_ns;
    }

    /// Fold processes sharing a display name into the earliest registered one
    ///
    /// Returns the number of processes folded away. Unnamed processes are
    /// never merged.
    pub fn merge_by_name(&mut self) -> usize {
        let old_pids: Vec<Pid> = self.processes.iter().map(|p| p.pid).collect();
        let mut merged: Vec<Process> = Vec::with_capacity(self.processes.len());
        let mut by_name: HashMap<String, usize> = HashMap::new();
        let mut index: HashMap<Pid, usize> = HashMap::new();

        for process in std::mem::take(&mut self.processes) {
            let survivor = process
                .display_name
                .as_ref()
                .and_then(|name| by_name.get(name))
                .copied();

            match survivor {
                Some(slot) => {
                    let target = &mut merged[slot];
                    debug!(
                        "Merging pid {} into pid {} ({})",
                        process.pid,
                        target.pid,
                        target.label()
                    );
                    for &tid in &process.tids {
                        self.tid_pid.insert(tid, target.pid);
                    }
                    target.tids.extend(process.tids);
                    target.total_cpu_ns += process.total_cpu_ns;
                    index.insert(process.pid, slot);
                }
                None => {
                    if let Some(name) = &process.display_name {
                        by_name.insert(name.clone(), merged.len());
                    }
                    index.insert(process.pid, merged.len());
                    merged.push(process);
                }
            }
        }

        let folded = old_pids.len() - merged.len();

        // Pids folded by an earlier merge follow their survivor
        for (pid, &old_slot) in &self.index {
            if index.contains_key(pid) {
                continue;
            }
            if let Some(&slot) = index.get(&old_pids[old_slot]) {
                index.insert(*pid, slot);
            }
        }

        self.processes = merged;
        self.index = index;
        folded
    }

    /// Live processes in registration order
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Process by pid; a folded pid resolves to its survivor
    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.index.get(&pid).map(|&slot| &self.processes[slot])
    }

    pub fn pid_of(&self, tid: Tid) -> Option<Pid> {
        self.tid_pid.get(&tid).copied()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}
