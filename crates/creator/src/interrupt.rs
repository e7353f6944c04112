//! Cooperative interruption flag.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shared abort signal, observed at per-transaction checkpoints during
/// rollup creation.
#[derive(Debug, Default)]
pub struct InterruptFlag(AtomicBool);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Re-arms the flag for the next run.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
