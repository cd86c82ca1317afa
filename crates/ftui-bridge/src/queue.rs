//! FIFO holding area for commands pending the next batching pass.
//!
//! Grounded on `ftui-runtime`'s `effect_system` pending-effects queue: a
//! `Mutex<VecDeque<_>>` rather than a lock-free structure, since the
//! operations here (`enqueue`, `drain_all`) are called at most once per cell
//! write or per host tick, not in a hot per-frame loop.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::command::Command;

/// A thread-safe FIFO of pending commands.
#[derive(Default)]
pub struct CommandQueue {
    inner: Mutex<VecDeque<Command>>,
}

impl CommandQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a command if present; a `None` (e.g. from a no-op cell write)
    /// is silently dropped rather than enqueued.
    pub fn enqueue(&self, command: Option<Command>) {
        if let Some(command) = command {
            self.inner
                .lock()
                .expect("command queue lock poisoned")
                .push_back(command);
        }
    }

    /// Remove and return every pending command, oldest first, leaving the
    /// queue empty.
    #[must_use]
    pub fn drain_all(&self) -> Vec<Command> {
        self.inner
            .lock()
            .expect("command queue lock poisoned")
            .drain(..)
            .collect()
    }

    /// A snapshot of pending commands without removing them, for
    /// [`crate::inspector::Inspector`].
    #[must_use]
    pub fn peek(&self) -> Vec<Command> {
        self.inner
            .lock()
            .expect("command queue lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("command queue lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every pending command without executing it.
    pub fn clear(&self) {
        self.inner.lock().expect("command queue lock poisoned").clear();
    }
}
