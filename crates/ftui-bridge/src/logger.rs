//! Debug logger: optional, zero-overhead-when-disabled emission logging.
//!
//! The process-wide default slot follows the same read-biased
//! [`arc_swap::ArcSwapOption`] shape as [`crate::reporter`]'s global hook —
//! `get_default_logger()` is called on every [`crate::cell::Cell::set`],
//! while `set_default_logger` is an occasional, deliberate swap.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, OnceLock};

use arc_swap::ArcSwapOption;
use web_time::Instant;

/// Structured logging of cell emissions, pluggable per `spec.md` §4.7.
pub trait DebugLogger: Send + Sync {
    /// Log a single command emission.
    fn log_command(
        &self,
        component_name: &str,
        component_id: &str,
        cell_id: &str,
        old_value: &dyn fmt::Debug,
        new_value: &dyn fmt::Debug,
    );
}

/// The default logger: an empty method body with zero allocations and
/// trivial inlining, so `SetCommandEmission`-gated hot paths pay nothing
/// when logging is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl DebugLogger for NoOpLogger {
    #[inline]
    fn log_command(
        &self,
        _component_name: &str,
        _component_id: &str,
        _cell_id: &str,
        _old_value: &dyn fmt::Debug,
        _new_value: &dyn fmt::Debug,
    ) {
    }
}

/// A working logger that writes fixed-format lines to a configurable sink.
///
/// Format: `<timestamp> [DEBUG] Command Generated component=<name>(<id>)
/// cell=<cell_id> <old> → <new>`. Thread-safe via the sink's own
/// serialization (a `Mutex`), matching the contract in `spec.md` §4.7.
pub struct ConsoleLogger<W: Write + Send> {
    sink: Mutex<W>,
    start: Instant,
}

impl<W: Write + Send> ConsoleLogger<W> {
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
            start: Instant::now(),
        }
    }
}

impl<W: Write + Send> DebugLogger for ConsoleLogger<W> {
    fn log_command(
        &self,
        component_name: &str,
        component_id: &str,
        cell_id: &str,
        old_value: &dyn fmt::Debug,
        new_value: &dyn fmt::Debug,
    ) {
        let elapsed_us = self.start.elapsed().as_micros();
        let mut sink = self.sink.lock().expect("console logger sink lock poisoned");
        let _ = writeln!(
            sink,
            "{elapsed_us}us [DEBUG] Command Generated component={component_name}({component_id}) cell={cell_id} {old_value:?} \u{2192} {new_value:?}"
        );
    }
}

static DEFAULT_LOGGER: OnceLock<ArcSwapOption<dyn DebugLogger>> = OnceLock::new();

fn default_logger_slot() -> &'static ArcSwapOption<dyn DebugLogger> {
    DEFAULT_LOGGER.get_or_init(|| ArcSwapOption::from(None))
}

/// Install the process-wide default logger. Passing `None` reverts to the
/// no-op logger, never to a missing/crashing state.
pub fn set_default_logger(logger: Option<Arc<dyn DebugLogger>>) {
    default_logger_slot().store(logger);
}

/// Fetch the process-wide default logger, or the shared no-op instance if
/// none has been installed.
#[must_use]
pub fn get_default_logger() -> Arc<dyn DebugLogger> {
    match default_logger_slot().load_full() {
        Some(logger) => logger,
        None => {
            static NOOP: OnceLock<Arc<dyn DebugLogger>> = OnceLock::new();
            Arc::clone(NOOP.get_or_init(|| Arc::new(NoOpLogger)))
        }
    }
}
