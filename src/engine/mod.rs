pub mod scheduler;

use thiserror::Error;
use tracing::trace;

pub use scheduler::SpeedScheduler;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    Running,
    Locked,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("cannot unlock an engine that is already running")]
    NotLocked,
}

#[derive(Clone, Debug)]
pub struct Engine<T> {
    scheduler: SpeedScheduler<T>,
    state: EngineState,
}

impl<T: Copy + PartialEq> Default for Engine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + PartialEq> Engine<T> {
    pub fn new() -> Self {
        Self {
            scheduler: SpeedScheduler::new(),
            state: EngineState::Locked,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == EngineState::Locked
    }

    pub fn lock(&mut self) {
        self.state = EngineState::Locked;
    }

    pub fn unlock(&mut self) -> Result<(), EngineError> {
        if self.state == EngineState::Running {
            return Err(EngineError::NotLocked);
        }
        trace!("engine unlocked");
        self.state = EngineState::Running;
        Ok(())
    }

    pub fn next_actor(&mut self) -> Option<T> {
        let next = self.scheduler.next();
        if next.is_none() {
            self.lock();
        }
        next
    }

    pub fn scheduler(&self) -> &SpeedScheduler<T> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut SpeedScheduler<T> {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_engine_waits_for_start() {
        let engine: Engine<u8> = Engine::new();
        assert!(engine.is_locked());
    }

    #[test]
    fn double_unlock_is_rejected() {
        let mut engine: Engine<u8> = Engine::new();
        assert_eq!(engine.unlock(), Ok(()));
        assert_eq!(engine.unlock(), Err(EngineError::NotLocked));
        engine.lock();
        assert_eq!(engine.unlock(), Ok(()));
    }

    #[test]
    fn empty_schedule_locks_the_engine() {
        let mut engine: Engine<u8> = Engine::new();
        engine.unlock().expect("locked engine");
        assert_eq!(engine.next_actor(), None);
        assert_eq!(engine.state(), EngineState::Locked);
    }
}
