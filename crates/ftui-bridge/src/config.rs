//! Crate-level tunables for the reactive bridge.
//!
//! Mirrors the `*Config` structs used throughout `ftui-runtime`
//! (`BudgetConfig`, `AlertConfig`, `HistoryConfig`, ...): a plain struct with
//! a `Default` impl matching the documented defaults, constructible
//! field-by-field or via the builder-style `with_*` methods below.

use crate::batcher::BatchStrategy;

/// Default maximum emissions a single (component, cell) pair may make in
/// one tick before the [`crate::loop_detector::LoopDetector`] reports a
/// loop.
pub const DEFAULT_LOOP_MAX: u32 = 100;

/// Default capacity of the process-wide breadcrumb ring buffer.
pub const DEFAULT_BREADCRUMB_CAPACITY: usize = 100;

/// Bundled tunables for constructing a [`crate::bridge::ComponentBridge`].
///
/// All fields have the defaults named in the specification; override only
/// the ones a test or host application actually needs to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Maximum emissions per (component, cell) pair per tick.
    pub loop_detector_max: u32,
    /// Default batching strategy for newly constructed batchers.
    pub batch_strategy: BatchStrategy,
    /// Whether deduplication is enabled by default.
    pub deduplicate: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            loop_detector_max: DEFAULT_LOOP_MAX,
            batch_strategy: BatchStrategy::CoalesceAll,
            deduplicate: false,
        }
    }
}

impl BridgeConfig {
    /// Start from the documented defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the loop detector's per-cell emission ceiling.
    #[must_use]
    pub fn with_loop_detector_max(mut self, max: u32) -> Self {
        self.loop_detector_max = max;
        self
    }

    /// Override the default batching strategy.
    #[must_use]
    pub fn with_batch_strategy(mut self, strategy: BatchStrategy) -> Self {
        self.batch_strategy = strategy;
        self
    }

    /// Override whether deduplication starts enabled.
    #[must_use]
    pub fn with_deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }
}
