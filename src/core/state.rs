//! # Execution state of a one-shot service.
//!
//! ```text
//! NotStarted ──► Running ──┬──► Completed   (passes the stop check)
//!                          └──► Failed      (resolution/execution error, cancel, panic)
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

/// Where a one-shot service is in its single execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// `start` has not handed off the execution yet.
    NotStarted,
    /// The unit of work is being resolved or run.
    Running,
    /// The unit of work returned normally.
    Completed,
    /// Resolution or execution failed.
    Failed,
}

impl ExecutionState {
    /// `true` once the attempt has concluded, successfully or not.
    pub fn is_settled(self) -> bool {
        matches!(self, ExecutionState::Completed | ExecutionState::Failed)
    }

    fn as_u8(self) -> u8 {
        match self {
            ExecutionState::NotStarted => 0,
            ExecutionState::Running => 1,
            ExecutionState::Completed => 2,
            ExecutionState::Failed => 3,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => ExecutionState::Running,
            2 => ExecutionState::Completed,
            3 => ExecutionState::Failed,
            _ => ExecutionState::NotStarted,
        }
    }
}

/// Lock-free cell holding an [`ExecutionState`].
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(ExecutionState::NotStarted.as_u8()))
    }

    pub(crate) fn get(&self) -> ExecutionState {
        ExecutionState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `from` → `to`; returns `false` (and leaves the cell untouched) if
    /// the current state is not `from`.
    pub(crate) fn transition(&self, from: ExecutionState, to: ExecutionState) -> bool {
        self.0
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_valid_transitions_apply() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), ExecutionState::NotStarted);
        assert!(!cell.transition(ExecutionState::Running, ExecutionState::Completed));
        assert!(cell.transition(ExecutionState::NotStarted, ExecutionState::Running));
        assert!(cell.transition(ExecutionState::Running, ExecutionState::Failed));
        assert!(!cell.transition(ExecutionState::Running, ExecutionState::Completed));
        assert_eq!(cell.get(), ExecutionState::Failed);
        assert!(cell.get().is_settled());
    }
}
