//! The value produced by a [`crate::command::Command`]'s execution.
//!
//! Mirrors `ftui-runtime::program::Message` in shape (a state-change
//! envelope plus a batch wrapper), generalized with an [`Message::Other`]
//! escape hatch for message authors with payloads outside the cell/value
//! model — see the dedup-key discussion on [`message_kind`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use web_time::Instant;

/// A single cell's old/new value pair, produced by [`crate::cell::Cell::set`].
///
/// `timestamp` is sampled when the owning [`crate::command::Command`]
/// executes, not when it was generated — per [`crate::command::CommandGenerator`]'s
/// deferred-timestamp contract.
#[derive(Clone)]
pub struct StateChange {
    pub component_id: String,
    pub cell_id: String,
    pub old_value: Arc<dyn Any + Send + Sync>,
    pub new_value: Arc<dyn Any + Send + Sync>,
    pub timestamp: Instant,
}

impl fmt::Debug for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateChange")
            .field("component_id", &self.component_id)
            .field("cell_id", &self.cell_id)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

impl StateChange {
    /// Downcast the old value to `T`, if it was constructed with that type.
    #[must_use]
    pub fn old_value_ref<T: 'static>(&self) -> Option<&T> {
        self.old_value.downcast_ref::<T>()
    }

    /// Downcast the new value to `T`, if it was constructed with that type.
    #[must_use]
    pub fn new_value_ref<T: 'static>(&self) -> Option<&T> {
        self.new_value.downcast_ref::<T>()
    }
}

/// A group of messages produced by a single batching pass.
///
/// `count` mirrors `messages.len()` as its own field, matching the wire
/// shape named in `spec.md` §6 (`{Messages: ordered list of Message, Count:
/// int}`) for hosts that read the field directly rather than calling
/// `messages.len()`. Use [`Self::new`] to keep the two in sync.
#[derive(Debug, Clone, Default)]
pub struct BatchMessage {
    pub messages: Vec<Message>,
    pub count: usize,
}

impl BatchMessage {
    /// Build a batch message, deriving `count` from `messages.len()`.
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        let count = messages.len();
        Self { messages, count }
    }
}

/// The unit of work that flows from a [`crate::command::Command`] back to
/// the host's update loop.
#[derive(Clone)]
pub enum Message {
    /// A single cell assignment.
    StateChange(StateChange),
    /// A coalesced group produced by [`crate::batcher::Batcher`].
    Batch(BatchMessage),
    /// Anything outside the state-change model. The `&'static str` is an
    /// explicit, author-supplied discriminant standing in for a reflective
    /// type name (there is no `typeof` in Rust); see [`message_kind`].
    Other(Arc<dyn Any + Send + Sync>, &'static str),
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StateChange(sc) => f.debug_tuple("StateChange").field(sc).finish(),
            Self::Batch(b) => f.debug_tuple("Batch").field(&b.messages.len()).finish(),
            Self::Other(_, kind) => f.debug_tuple("Other").field(kind).finish(),
        }
    }
}

/// The dedup key [`crate::batcher::Batcher`] groups messages by:
/// `componentID + ":" + cellID` for state changes, and the author-supplied
/// kind string for everything else. Batch messages have no single key and
/// are never deduplicated as a unit.
#[must_use]
pub fn message_kind(message: &Message) -> Option<String> {
    match message {
        Message::StateChange(sc) => Some(format!("{}:{}", sc.component_id, sc.cell_id)),
        Message::Other(_, kind) => Some((*kind).to_string()),
        Message::Batch(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_change_downcasts_values() {
        let sc = StateChange {
            component_id: "counter-1".into(),
            cell_id: "count".into(),
            old_value: Arc::new(0i32),
            new_value: Arc::new(1i32),
            timestamp: Instant::now(),
        };
        assert_eq!(sc.old_value_ref::<i32>(), Some(&0));
        assert_eq!(sc.new_value_ref::<i32>(), Some(&1));
        assert_eq!(sc.old_value_ref::<String>(), None);
    }

    #[test]
    fn message_kind_groups_state_changes_by_component_and_cell() {
        let msg = Message::StateChange(StateChange {
            component_id: "counter-1".into(),
            cell_id: "count".into(),
            old_value: Arc::new(0i32),
            new_value: Arc::new(1i32),
            timestamp: Instant::now(),
        });
        assert_eq!(
            message_kind(&msg),
            Some("counter-1:count".to_string())
        );
    }

    #[test]
    fn message_kind_uses_author_supplied_discriminant_for_other() {
        let msg = Message::Other(Arc::new(()), "NetworkFetchCompleted");
        assert_eq!(
            message_kind(&msg),
            Some("NetworkFetchCompleted".to_string())
        );
    }

    #[test]
    fn message_kind_is_none_for_batches() {
        let msg = Message::Batch(BatchMessage::default());
        assert_eq!(message_kind(&msg), None);
    }
}
