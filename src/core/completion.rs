//! # Completion flag.
//!
//! Single writer (the execution task, on Running→Completed), single reader
//! (the stop-time check). The join in `stop` already orders the read after the
//! write; release/acquire keeps that true when `stop` gives up waiting early.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub(crate) struct CompletionFlag(AtomicBool);

impl CompletionFlag {
    pub(crate) fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub(crate) fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
