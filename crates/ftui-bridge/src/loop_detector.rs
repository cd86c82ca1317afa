//! Per-tick emission ceiling, catching runaway `set` → command → handler →
//! `set` cycles before they hang the host.
//!
//! Grounded on `ftui-runtime`'s cycle-detection pattern for its reactive
//! graph (tracked per-node counters reset once per evaluation pass), backed
//! here by an `ahash`-hashed map since `ftui-core` already pulls in `ahash`
//! for exactly this kind of high-churn string-keyed counting.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::DEFAULT_LOOP_MAX;
use crate::error::LoopError;

/// Tracks per-(component, cell) emission counts within a single tick and
/// flags the pair once it exceeds the configured maximum.
pub struct LoopDetector {
    max: u32,
    counts: Mutex<HashMap<(String, String), u32, ahash::RandomState>>,
}

impl Default for LoopDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopDetector {
    /// A detector using the documented default ceiling (100).
    #[must_use]
    pub fn new() -> Self {
        Self::with_max(DEFAULT_LOOP_MAX)
    }

    /// A detector using an explicit ceiling.
    #[must_use]
    pub fn with_max(max: u32) -> Self {
        Self {
            max,
            counts: Mutex::new(HashMap::default()),
        }
    }

    /// Record one emission for `(component_id, cell_id)`, returning an error
    /// once the running count for this tick exceeds `max`.
    ///
    /// # Errors
    /// Returns [`LoopError`] when the observed count exceeds `max`.
    pub fn check_and_increment(&self, component_id: &str, cell_id: &str) -> Result<(), LoopError> {
        let mut counts = self.counts.lock().expect("loop detector lock poisoned");
        let key = (component_id.to_string(), cell_id.to_string());
        let count = counts.entry(key).or_insert(0);
        *count += 1;
        if *count > self.max {
            return Err(LoopError {
                component_id: component_id.to_string(),
                cell_id: cell_id.to_string(),
                observed_count: *count,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Clear all counters, called by the host once per tick boundary.
    pub fn reset(&self) {
        self.counts.lock().expect("loop detector lock poisoned").clear();
    }
}
