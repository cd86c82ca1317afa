//! The reactive primitive at the center of the bridge: atomic state plus
//! command emission, generalized from
//! `ftui-runtime::reactive::observable::Observable<T>`'s single-threaded
//! `Rc<RefCell<_>>` to `Arc<Mutex<_>>` so cells can be written from
//! user-spawned worker threads between host update-hook invocations.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::command::{CommandGenerator, StateChangeGenerator};
use crate::error::{BridgeError, CommandGenerationError, ErrorContext, LoopError};
use crate::loop_detector::LoopDetector;
use crate::queue::CommandQueue;

struct CellInner<T> {
    value: Arc<T>,
}

/// A reactive cell. Cheaply cloneable (an `Arc` bump); every clone shares
/// the same underlying state, queue, loop detector, and generator.
pub struct Cell<T> {
    inner: Arc<Mutex<CellInner<T>>>,
    queue: Arc<CommandQueue>,
    loop_detector: Arc<LoopDetector>,
    generator: Arc<dyn CommandGenerator<T>>,
    component_id: Arc<str>,
    cell_id: Arc<str>,
    emission_enabled: Arc<AtomicBool>,
}

impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            queue: Arc::clone(&self.queue),
            loop_detector: Arc::clone(&self.loop_detector),
            generator: Arc::clone(&self.generator),
            component_id: Arc::clone(&self.component_id),
            cell_id: Arc::clone(&self.cell_id),
            emission_enabled: Arc::clone(&self.emission_enabled),
        }
    }
}

impl<T> Cell<T>
where
    T: Send + Sync + std::fmt::Debug + 'static,
{
    /// Construct a cell owned by `component_id`/`cell_id`, backed by the
    /// given queue and loop detector (normally obtained from a
    /// [`crate::bridge::ComponentBridge`], but constructible directly for
    /// tests), using the default [`StateChangeGenerator`]. Command emission
    /// starts enabled.
    #[must_use]
    pub fn new(
        component_id: impl Into<Arc<str>>,
        cell_id: impl Into<Arc<str>>,
        initial: T,
        queue: Arc<CommandQueue>,
        loop_detector: Arc<LoopDetector>,
    ) -> Self {
        Self::with_generator(
            component_id,
            cell_id,
            initial,
            queue,
            loop_detector,
            Arc::new(StateChangeGenerator),
        )
    }

    /// Construct a cell with an explicit [`CommandGenerator`], substituting
    /// the default [`StateChangeGenerator`] per the §4.2 "Variants"
    /// contract — tests and hosts may supply a generator that produces a
    /// different message shape on write.
    #[must_use]
    pub fn with_generator(
        component_id: impl Into<Arc<str>>,
        cell_id: impl Into<Arc<str>>,
        initial: T,
        queue: Arc<CommandQueue>,
        loop_detector: Arc<LoopDetector>,
        generator: Arc<dyn CommandGenerator<T>>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CellInner {
                value: Arc::new(initial),
            })),
            queue,
            loop_detector,
            generator,
            component_id: component_id.into(),
            cell_id: cell_id.into(),
            emission_enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// The current value. Pure, side-effect-free.
    #[must_use]
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.inner.lock().expect("cell lock poisoned").value)
    }

    /// Toggle command emission. When disabled, [`Self::set`] reduces to a
    /// plain store.
    pub fn set_command_emission(&self, enabled: bool) {
        self.emission_enabled.store(enabled, Ordering::SeqCst);
    }

    #[must_use]
    pub fn command_emission_enabled(&self) -> bool {
        self.emission_enabled.load(Ordering::SeqCst)
    }

    /// Replace the current value.
    ///
    /// When emission is enabled: captures the old value, writes the new
    /// value (visible to subsequent [`Self::get`] calls before this method
    /// returns), checks the loop detector, builds a command via the default
    /// [`StateChangeGenerator`], logs through the configured
    /// [`crate::logger::DebugLogger`], and enqueues the command. A panic
    /// inside generation or logging is recovered and reported; the write
    /// itself always stands. A [`LoopError`] suppresses emission for this
    /// call but does not fail the write.
    pub fn set(&self, new_value: T) {
        let new_value = Arc::new(new_value);
        let old_value = {
            let mut guard = self.inner.lock().expect("cell lock poisoned");
            std::mem::replace(&mut guard.value, Arc::clone(&new_value))
        };

        if !self.command_emission_enabled() {
            return;
        }

        if let Err(loop_err) = self.loop_detector.check_and_increment(&self.component_id, &self.cell_id) {
            self.report_loop_error(loop_err);
            return;
        }

        self.generate_and_enqueue(old_value, new_value);
    }

    fn generate_and_enqueue(&self, old_value: Arc<T>, new_value: Arc<T>) {
        let generator = Arc::clone(&self.generator);
        let component_id = Arc::clone(&self.component_id);
        let cell_id = Arc::clone(&self.cell_id);
        let old_for_gen = Arc::clone(&old_value);
        let new_for_gen = Arc::clone(&new_value);

        let generated = panic::catch_unwind(AssertUnwindSafe(move || {
            generator.generate(&component_id, &cell_id, old_for_gen, new_for_gen)
        }));

        let command = match generated {
            Ok(command) => command,
            Err(payload) => {
                self.report_generation_panic(payload);
                return;
            }
        };

        self.log_emission(&old_value, &new_value);
        self.queue.enqueue(Some(command));
    }

    fn log_emission(&self, old_value: &Arc<T>, new_value: &Arc<T>) {
        let logger = crate::logger::get_default_logger();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            logger.log_command(
                &self.component_id,
                &self.component_id,
                &self.cell_id,
                old_value.as_ref(),
                new_value.as_ref(),
            );
        }));
        if let Err(payload) = result {
            self.report_generation_panic(payload);
        }
    }

    fn report_loop_error(&self, err: LoopError) {
        let context = ErrorContext::capture(&*self.component_id, &*self.component_id)
            .with_tag("cell_id", &*self.cell_id);
        crate::reporter::report_error(&BridgeError::Loop(err), context);
    }

    fn report_generation_panic(&self, payload: Box<dyn Any + Send>) {
        let panic_value = crate::error::panic_message(payload.as_ref());
        let context = ErrorContext::capture(&*self.component_id, &*self.component_id)
            .with_tag("cell_id", &*self.cell_id)
            .with_extra("panic_value", panic_value.clone());
        let err = CommandGenerationError {
            component_id: self.component_id.to_string(),
            cell_id: self.cell_id.to_string(),
            panic_value,
        };
        crate::reporter::report_error(&BridgeError::CommandGeneration(err), context);
    }
}
