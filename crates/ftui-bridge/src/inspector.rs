//! Read-only introspection of a component's pending commands, for
//! developer tooling and tests.
//!
//! Safe by construction: since [`crate::command::Command`] is a repeatable
//! `Fn`, peeking at a pending command's would-be message never consumes it
//! or mutates shared state — the spec's own open question about commands
//! with observable side effects is resolved by this type-level guarantee
//! rather than by caller discipline.

use std::sync::Arc;

use web_time::Instant;

use crate::message::Message;
use crate::queue::CommandQueue;

/// Metadata extracted from one pending [`Message::StateChange`] command.
/// Commands whose message is not a `StateChange` (e.g. `Message::Other` or
/// a nested `Message::Batch`) are skipped here but still counted by
/// [`Inspector::pending_count`].
#[derive(Debug, Clone)]
pub struct PendingCommandInfo {
    pub component_id: String,
    pub cell_id: String,
    pub timestamp: Instant,
}

/// Read-only window onto a [`CommandQueue`], used by developer tools that
/// want to show "what's about to run" without affecting it.
#[derive(Clone)]
pub struct Inspector {
    queue: Option<Arc<CommandQueue>>,
}

impl Inspector {
    /// An inspector backed by a real queue.
    #[must_use]
    pub fn new(queue: Arc<CommandQueue>) -> Self {
        Self { queue: Some(queue) }
    }

    /// An inspector with nothing to inspect; every query reports empty
    /// rather than panicking, matching the nil-safe idiom used throughout
    /// the reactive layer (`Cell::get` on an unset cell, `get_default_logger`
    /// falling back to a no-op).
    #[must_use]
    pub fn detached() -> Self {
        Self { queue: None }
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.as_ref().map_or(0, |q| q.len())
    }

    /// Metadata for each pending command whose message is a
    /// [`Message::StateChange`], in queue order. Commands producing any
    /// other message shape are skipped here but still counted by
    /// [`Self::pending_count`]. Executed speculatively (commands are
    /// repeatable `Fn`s, so this never consumes or mutates the underlying
    /// queue).
    #[must_use]
    pub fn pending_commands(&self) -> Vec<PendingCommandInfo> {
        let Some(queue) = &self.queue else {
            return Vec::new();
        };
        queue
            .peek()
            .into_iter()
            .filter_map(|command| match command.execute().ok()? {
                Message::StateChange(sc) => Some(PendingCommandInfo {
                    component_id: sc.component_id,
                    cell_id: sc.cell_id,
                    timestamp: sc.timestamp,
                }),
                _ => None,
            })
            .collect()
    }

    /// Drop every pending command without executing it for real.
    pub fn clear_pending(&self) {
        if let Some(queue) = &self.queue {
            queue.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    #[test]
    fn detached_inspector_reports_empty() {
        let inspector = Inspector::detached();
        assert_eq!(inspector.pending_count(), 0);
        assert!(inspector.pending_commands().is_empty());
        inspector.clear_pending();
    }

    #[test]
    fn pending_count_reflects_queue_length() {
        let queue = Arc::new(CommandQueue::new());
        queue.enqueue(Some(Command::from_message(Message::Other(Arc::new(()), "Noop"))));
        queue.enqueue(Some(Command::from_message(Message::Other(Arc::new(()), "Noop"))));
        let inspector = Inspector::new(Arc::clone(&queue));
        assert_eq!(inspector.pending_count(), 2);
    }

    #[test]
    fn peeking_does_not_remove_pending_commands() {
        let queue = Arc::new(CommandQueue::new());
        queue.enqueue(Some(Command::from_message(Message::StateChange(
            crate::message::StateChange {
                component_id: "c".into(),
                cell_id: "x".into(),
                old_value: Arc::new(0i32),
                new_value: Arc::new(1i32),
                timestamp: web_time::Instant::now(),
            },
        ))));
        let inspector = Inspector::new(Arc::clone(&queue));
        let entries = inspector.pending_commands();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].component_id, "c");
        assert_eq!(entries[0].cell_id, "x");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn pending_commands_skips_non_state_change_messages_but_they_still_count() {
        let queue = Arc::new(CommandQueue::new());
        let state_change = |cell: &str| {
            Command::from_message(Message::StateChange(crate::message::StateChange {
                component_id: "c".into(),
                cell_id: cell.into(),
                old_value: Arc::new(0i32),
                new_value: Arc::new(1i32),
                timestamp: web_time::Instant::now(),
            }))
        };
        queue.enqueue(Some(state_change("a")));
        queue.enqueue(Some(state_change("b")));
        queue.enqueue(Some(state_change("c")));
        queue.enqueue(Some(Command::from_message(Message::Other(Arc::new(()), "Tick"))));

        let inspector = Inspector::new(Arc::clone(&queue));
        assert_eq!(inspector.pending_count(), 4);
        let entries = inspector.pending_commands();
        assert_eq!(entries.len(), 3);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn clear_pending_empties_the_underlying_queue() {
        let queue = Arc::new(CommandQueue::new());
        queue.enqueue(Some(Command::from_message(Message::Other(Arc::new(()), "Noop"))));
        let inspector = Inspector::new(Arc::clone(&queue));
        inspector.clear_pending();
        assert_eq!(queue.len(), 0);
    }
}
