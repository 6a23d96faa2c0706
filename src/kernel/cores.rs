//! One slot per CPU core holding the thread currently running there.

use super::thread::ThreadId;
use crate::utils::error::EngineError;

#[derive(Debug, Clone)]
pub struct CoreSlots {
    slots: Vec<Option<ThreadId>>,
}

impl CoreSlots {
    /// `cores` idle slots
    pub fn new(cores: usize) -> Self {
        Self {
            slots: vec![None; cores],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn check(&self, core: usize) -> Result<(), EngineError> {
        if core < self.slots.len() {
            Ok(())
        } else {
            Err(EngineError::CoreOutOfRange {
                core,
                cores: self.slots.len(),
            })
        }
    }

    /// Thread running on `core`, if any
    pub fn occupant(&self, core: usize) -> Result<Option<ThreadId>, EngineError> {
        self.check(core)?;
        Ok(self.slots[core])
    }

    /// Put `thread` on `core` (or idle it with `None`), returning the previous occupant
    pub fn replace(
        &mut self,
        core: usize,
        thread: Option<ThreadId>,
    ) -> Result<Option<ThreadId>, EngineError> {
        self.check(core)?;
        Ok(std::mem::replace(&mut self.slots[core], thread))
    }

    /// Idle every core, returning the threads that were running
    pub fn drain(&mut self) -> Vec<ThreadId> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }

    /// Number of cores currently running a thread
    pub fn busy(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}
