//! The host-facing façade: constructs cells sharing a component's queue and
//! loop detector, and runs the drain-and-batch step the host calls once per
//! tick after its update hook returns.

use std::fmt::Debug;
use std::sync::Arc;

use crate::batcher::{BatchOutcome, Batcher, BatchStrategy};
use crate::cell::Cell;
use crate::command::CommandGenerator;
use crate::config::BridgeConfig;
use crate::inspector::Inspector;
use crate::loop_detector::LoopDetector;
use crate::queue::CommandQueue;

/// Per-component wiring: one queue, one loop detector, one batcher, shared
/// by every [`Cell`] the component creates through this bridge.
pub struct ComponentBridge {
    component_id: Arc<str>,
    queue: Arc<CommandQueue>,
    loop_detector: Arc<LoopDetector>,
    batcher: Batcher,
}

impl ComponentBridge {
    /// Build a bridge for `component_id` using the documented defaults.
    #[must_use]
    pub fn new(component_id: impl Into<Arc<str>>) -> Self {
        Self::with_config(component_id, BridgeConfig::default())
    }

    /// Build a bridge for `component_id` with explicit tunables.
    #[must_use]
    pub fn with_config(component_id: impl Into<Arc<str>>, config: BridgeConfig) -> Self {
        let batcher = Batcher::new(config.batch_strategy);
        if config.deduplicate {
            batcher.enable_deduplication();
        }
        Self {
            component_id: component_id.into(),
            queue: Arc::new(CommandQueue::new()),
            loop_detector: Arc::new(LoopDetector::with_max(config.loop_detector_max)),
            batcher,
        }
    }

    #[must_use]
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    /// Construct a new reactive cell owned by this component, using the
    /// default [`crate::command::StateChangeGenerator`].
    #[must_use]
    pub fn new_cell<T>(&self, cell_id: impl Into<Arc<str>>, initial: T) -> Cell<T>
    where
        T: Send + Sync + Debug + 'static,
    {
        Cell::new(
            Arc::clone(&self.component_id),
            cell_id,
            initial,
            Arc::clone(&self.queue),
            Arc::clone(&self.loop_detector),
        )
    }

    /// Construct a new reactive cell owned by this component with an
    /// explicit [`CommandGenerator`], substituting the default per §4.2's
    /// "Variants" contract.
    #[must_use]
    pub fn new_cell_with_generator<T>(
        &self,
        cell_id: impl Into<Arc<str>>,
        initial: T,
        generator: Arc<dyn CommandGenerator<T>>,
    ) -> Cell<T>
    where
        T: Send + Sync + Debug + 'static,
    {
        Cell::with_generator(
            Arc::clone(&self.component_id),
            cell_id,
            initial,
            Arc::clone(&self.queue),
            Arc::clone(&self.loop_detector),
            generator,
        )
    }

    /// An [`Inspector`] over this component's pending commands.
    #[must_use]
    pub fn inspector(&self) -> Inspector {
        Inspector::new(Arc::clone(&self.queue))
    }

    /// The batching strategy currently configured.
    #[must_use]
    pub fn batch_strategy(&self) -> BatchStrategy {
        self.batcher.strategy()
    }

    pub fn enable_deduplication(&self) {
        self.batcher.enable_deduplication();
    }

    pub fn disable_deduplication(&self) {
        self.batcher.disable_deduplication();
    }

    /// The host's per-tick contract: drain every pending command, run it
    /// through the batcher, and reset the loop detector's counters for the
    /// next tick. Call this once after the update hook returns.
    #[must_use]
    pub fn drain_and_batch(&self) -> BatchOutcome {
        let commands = self.queue.drain_all();
        let outcome = self.batcher.batch_commands(&commands, &self.component_id);
        self.loop_detector.reset();
        outcome
    }
}
