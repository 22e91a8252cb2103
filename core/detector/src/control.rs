//! Operator control channel between the stdin listener and the loop.
//!
//! One atomically swapped slot, not a queue: the listener stores the most
//! recent command and the loop takes it once per tick. Two commands inside
//! one interval collapse to the last one written, and a command is never
//! observed later than the next tick. Shutdown is a separate sticky flag.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Operator-forced transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualOverride {
    ForceStart,
    ForceEnd,
}

const FLAG_NONE: u8 = 0;
const FLAG_FORCE_START: u8 = 1;
const FLAG_FORCE_END: u8 = 2;

/// Cloneable handle shared between the listener thread and the loop.
#[derive(Debug, Clone, Default)]
pub struct ControlHandle {
    inner: Arc<ControlFlags>,
}

#[derive(Debug, Default)]
struct ControlFlags {
    override_flag: AtomicU8,
    shutdown: AtomicBool,
}

impl ControlHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_override(&self, cmd: ManualOverride) {
        let raw = match cmd {
            ManualOverride::ForceStart => FLAG_FORCE_START,
            ManualOverride::ForceEnd => FLAG_FORCE_END,
        };
        self.inner.override_flag.store(raw, Ordering::Relaxed);
    }

    /// Takes the pending override, leaving the slot empty.
    pub fn take_override(&self) -> Option<ManualOverride> {
        match self.inner.override_flag.swap(FLAG_NONE, Ordering::Relaxed) {
            FLAG_FORCE_START => Some(ManualOverride::ForceStart),
            FLAG_FORCE_END => Some(ManualOverride::ForceEnd),
            _ => None,
        }
    }

    pub fn request_shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn shutdown_requested(&self) -> bool {
        self.inner.shutdown.load(Ordering::Relaxed)
    }
}
