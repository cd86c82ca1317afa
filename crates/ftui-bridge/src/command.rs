//! Deferred effects: a [`Command`] is a cheaply-cloneable thunk that
//! produces a [`Message`] when executed, grounded on
//! `ftui-runtime::undo::command::Command` — generalized from that single-use
//! undo/redo action into a repeatable `Fn`, since both the host's update
//! loop and the bridge's [`crate::inspector::Inspector`] need to execute
//! (or re-execute, for Peek) the same command without consuming it.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::message::Message;

/// A deferred effect. Cloning a `Command` is an `Arc` bump, not a deep copy;
/// executing it twice must be safe, since the [`crate::inspector::Inspector`]
/// is allowed to peek at pending commands by running them.
#[derive(Clone)]
pub struct Command(Arc<dyn Fn() -> Message + Send + Sync>);

impl Command {
    /// Wrap a closure as a command.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Message + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// A command that always produces the same message, useful for tests
    /// and for commands with no actual deferred work.
    #[must_use]
    pub fn from_message(message: Message) -> Self {
        Self::new(move || message.clone())
    }

    /// Run the thunk, catching any panic rather than letting it unwind into
    /// the host's update loop.
    ///
    /// # Errors
    /// Returns the caught panic payload unchanged; callers typically route
    /// it through [`crate::error::panic_message`] and
    /// [`crate::error::CommandGenerationError`].
    pub fn execute(&self) -> Result<Message, Box<dyn Any + Send>> {
        let inner = Arc::clone(&self.0);
        panic::catch_unwind(AssertUnwindSafe(move || inner()))
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Command").field(&"<thunk>").finish()
    }
}

/// Implemented by types that can lazily produce a [`Command`] describing a
/// state transition, deferring both value construction and timestamping to
/// execution time. Grounded on the teacher's action-generator pattern in
/// `ftui-runtime::undo::command`.
///
/// A [`crate::cell::Cell`] holds its generator as an `Arc<dyn
/// CommandGenerator<T>>` (defaulting to [`StateChangeGenerator`]), so a test
/// or host can substitute a generator producing a different message shape
/// per `spec.md` §4.2's "Variants" contract — the generator itself stays
/// stateless and is handed the old/new pair on each call rather than baking
/// them in at construction.
pub trait CommandGenerator<T>: Send + Sync {
    /// Build the command capturing this write's `(component_id, cell_id,
    /// old_value, new_value)`. Must be pure w.r.t. its inputs and defer
    /// timestamp acquisition to the returned command's execution.
    fn generate(&self, component_id: &str, cell_id: &str, old_value: Arc<T>, new_value: Arc<T>) -> Command;
}

/// The default generator installed on every [`crate::cell::Cell`]: wraps an
/// old/new pair into a [`Message::StateChange`], sampling the timestamp at
/// execution time, not generation time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateChangeGenerator;

impl<T> CommandGenerator<T> for StateChangeGenerator
where
    T: Send + Sync + 'static,
{
    fn generate(&self, component_id: &str, cell_id: &str, old_value: Arc<T>, new_value: Arc<T>) -> Command {
        let component_id = component_id.to_string();
        let cell_id = cell_id.to_string();
        let old_value: Arc<dyn Any + Send + Sync> = old_value;
        let new_value: Arc<dyn Any + Send + Sync> = new_value;
        Command::new(move || {
            Message::StateChange(crate::message::StateChange {
                component_id: component_id.clone(),
                cell_id: cell_id.clone(),
                old_value: old_value.clone(),
                new_value: new_value.clone(),
                timestamp: web_time::Instant::now(),
            })
        })
    }
}
