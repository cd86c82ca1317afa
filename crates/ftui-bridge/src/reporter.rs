//! Error reporter: the pluggable sink for recovered panics and errors.
//!
//! The process-wide hook is modeled as a read-biased, lock-free global slot
//! (grounded on [`arc_swap::ArcSwapOption`], the same primitive
//! `ftui-core::read_optimized::ArcSwapStore` wraps for its own "many reads,
//! rare swap" global state) rather than a bespoke `RwLock`: reports are
//! rare relative to `get_error_reporter()` calls made on every recovered
//! panic, so a wait-free read path matters more than write latency.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;

use crate::error::{BridgeError, HandlerPanicError};

/// Capability set a pluggable error reporter must implement.
///
/// All implementations must be thread-safe: the bridge may report from any
/// worker thread that writes to a [`crate::cell::Cell`] or drains a
/// [`crate::queue::CommandQueue`].
pub trait ErrorReporter: Send + Sync {
    /// Report a panic that occurred inside a user event handler.
    fn report_panic(&self, error: &HandlerPanicError, context: ErrorContext);

    /// Report any other bridge error (loop, command-generation, render).
    fn report_error(&self, error: &BridgeError, context: ErrorContext);

    /// Block until pending reports are delivered or `timeout` elapses.
    /// Returns `true` if everything was flushed before the deadline.
    fn flush(&self, timeout: Duration) -> bool;
}

pub use crate::error::ErrorContext;

static ERROR_REPORTER: std::sync::OnceLock<ArcSwapOption<dyn ErrorReporter>> = std::sync::OnceLock::new();

fn error_reporter_slot() -> &'static ArcSwapOption<dyn ErrorReporter> {
    ERROR_REPORTER.get_or_init(|| ArcSwapOption::from(None))
}

/// Install (or clear, with `None`) the process-wide error reporter.
pub fn set_error_reporter(reporter: Option<Arc<dyn ErrorReporter>>) {
    error_reporter_slot().store(reporter);
}

/// Fetch the currently installed reporter, if any.
#[must_use]
pub fn get_error_reporter() -> Option<Arc<dyn ErrorReporter>> {
    error_reporter_slot().load_full()
}

/// Report a handler panic through the global reporter. No-op if unset.
pub fn report_panic(error: &HandlerPanicError, context: ErrorContext) {
    if let Some(reporter) = get_error_reporter() {
        reporter.report_panic(error, context);
    }
}

/// Report any other bridge error through the global reporter. No-op if unset.
pub fn report_error(error: &BridgeError, context: ErrorContext) {
    if let Some(reporter) = get_error_reporter() {
        reporter.report_error(error, context);
    }
}

/// Writes reports to `tracing`, so they compose with whatever subscriber
/// the host process has installed — matching how every other FrankenTUI
/// crate treats "write to a log sink" once it is no longer itself the
/// terminal output layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    /// When true, the captured stack trace is included in the log line.
    pub verbose: bool,
}

impl ConsoleReporter {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ErrorReporter for ConsoleReporter {
    fn report_panic(&self, error: &HandlerPanicError, context: ErrorContext) {
        if self.verbose {
            tracing::error!(
                target: "ftui.bridge.reporter",
                component = %context.component_name,
                component_id = %context.component_id,
                event = ?context.event_name,
                stack_trace = %String::from_utf8_lossy(&context.stack_trace),
                "{error}"
            );
        } else {
            tracing::error!(
                target: "ftui.bridge.reporter",
                component = %context.component_name,
                component_id = %context.component_id,
                event = ?context.event_name,
                "{error}"
            );
        }
    }

    fn report_error(&self, error: &BridgeError, context: ErrorContext) {
        if self.verbose {
            tracing::warn!(
                target: "ftui.bridge.reporter",
                component = %context.component_name,
                component_id = %context.component_id,
                stack_trace = %String::from_utf8_lossy(&context.stack_trace),
                "{error}"
            );
        } else {
            tracing::warn!(
                target: "ftui.bridge.reporter",
                component = %context.component_name,
                component_id = %context.component_id,
                "{error}"
            );
        }
    }

    fn flush(&self, _timeout: Duration) -> bool {
        // tracing events are synchronous from the caller's perspective.
        true
    }
}

/// A single captured report, used by [`RecordingReporter`].
#[derive(Debug, Clone)]
pub enum RecordedReport {
    Panic(HandlerPanicError),
    Error(BridgeError),
}

/// In-memory reporter used as a test double: captures every report into a
/// shared `Vec` so tests can assert "a report happened" without scraping
/// tracing output. Grounded on the `SpanCapture`/`CaptureHandle` pattern in
/// `ftui-runtime::effect_system`'s own test module.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    reports: Arc<std::sync::Mutex<Vec<RecordedReport>>>,
}

impl RecordingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reports(&self) -> Vec<RecordedReport> {
        self.reports.lock().expect("recording reporter lock poisoned").clone()
    }

    pub fn clear(&self) {
        self.reports.lock().expect("recording reporter lock poisoned").clear();
    }
}

impl ErrorReporter for RecordingReporter {
    fn report_panic(&self, error: &HandlerPanicError, _context: ErrorContext) {
        self.reports
            .lock()
            .expect("recording reporter lock poisoned")
            .push(RecordedReport::Panic(error.clone()));
    }

    fn report_error(&self, error: &BridgeError, _context: ErrorContext) {
        self.reports
            .lock()
            .expect("recording reporter lock poisoned")
            .push(RecordedReport::Error(error.clone()));
    }

    fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}

#[cfg(feature = "webhook-reporter")]
pub use webhook::WebhookReporter;

#[cfg(feature = "webhook-reporter")]
mod webhook {
    use super::{BridgeError, ErrorContext, ErrorReporter, HandlerPanicError};
    use serde::Serialize;
    use std::sync::mpsc::{self, Sender};
    use std::sync::{Arc, Condvar, Mutex};
    use std::thread;
    use std::time::Duration;

    #[derive(Serialize)]
    struct ReportPayload {
        kind: &'static str,
        message: String,
        component_name: String,
        component_id: String,
        environment: String,
        release: String,
    }

    /// Reporter that delivers reports to an external collector over HTTPS
    /// from a background thread, matching the teacher's established
    /// blocking-`reqwest` idiom for best-effort outbound HTTP (the same
    /// dependency `doctor_frankentui` uses, and the same client shape
    /// `ftui-runtime` pulls in transitively for its OTLP exporter).
    pub struct WebhookReporter {
        endpoint: String,
        environment: String,
        release: String,
        before_send: Option<Arc<dyn Fn(&BridgeErrorOrPanic) -> bool + Send + Sync>>,
        tx: Sender<ReportPayload>,
        pending: Arc<(Mutex<u64>, Condvar)>,
    }

    /// Either shape of report the `before_send` hook may inspect.
    pub enum BridgeErrorOrPanic {
        Panic(HandlerPanicError),
        Error(BridgeError),
    }

    impl WebhookReporter {
        #[must_use]
        pub fn new(endpoint: impl Into<String>) -> Self {
            let endpoint = endpoint.into();
            let pending = Arc::new((Mutex::new(0u64), Condvar::new()));
            let (tx, rx) = mpsc::channel::<ReportPayload>();
            let worker_endpoint = endpoint.clone();
            let worker_pending = Arc::clone(&pending);
            thread::spawn(move || {
                let client = reqwest::blocking::Client::new();
                for payload in rx {
                    let _ = client.post(&worker_endpoint).json(&payload).send();
                    let (lock, cvar) = &*worker_pending;
                    let mut count = lock.lock().expect("webhook pending lock poisoned");
                    *count = count.saturating_sub(1);
                    cvar.notify_all();
                }
            });
            Self {
                endpoint,
                environment: "development".to_string(),
                release: "unknown".to_string(),
                before_send: None,
                tx,
                pending,
            }
        }

        #[must_use]
        pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
            self.environment = environment.into();
            self
        }

        #[must_use]
        pub fn with_release(mut self, release: impl Into<String>) -> Self {
            self.release = release.into();
            self
        }

        #[must_use]
        pub fn with_before_send(
            mut self,
            filter: impl Fn(&BridgeErrorOrPanic) -> bool + Send + Sync + 'static,
        ) -> Self {
            self.before_send = Some(Arc::new(filter));
            self
        }

        fn enqueue(&self, kind: &'static str, message: String, context: &ErrorContext) {
            let (lock, _) = &*self.pending;
            *lock.lock().expect("webhook pending lock poisoned") += 1;
            let _ = self.tx.send(ReportPayload {
                kind,
                message,
                component_name: context.component_name.clone(),
                component_id: context.component_id.clone(),
                environment: self.environment.clone(),
                release: self.release.clone(),
            });
        }

        /// The configured delivery endpoint, for diagnostics.
        #[must_use]
        pub fn endpoint(&self) -> &str {
            &self.endpoint
        }
    }

    impl ErrorReporter for WebhookReporter {
        fn report_panic(&self, error: &HandlerPanicError, context: ErrorContext) {
            if let Some(filter) = &self.before_send {
                if !filter(&BridgeErrorOrPanic::Panic(error.clone())) {
                    return;
                }
            }
            self.enqueue("panic", error.to_string(), &context);
        }

        fn report_error(&self, error: &BridgeError, context: ErrorContext) {
            if let Some(filter) = &self.before_send {
                if !filter(&BridgeErrorOrPanic::Error(error.clone())) {
                    return;
                }
            }
            self.enqueue("error", error.to_string(), &context);
        }

        fn flush(&self, timeout: Duration) -> bool {
            let (lock, cvar) = &*self.pending;
            let guard = lock.lock().expect("webhook pending lock poisoned");
            let (guard, timeout_result) = cvar
                .wait_timeout_while(guard, timeout, |count| *count > 0)
                .expect("webhook pending lock poisoned");
            !timeout_result.timed_out() && *guard == 0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ctx() -> ErrorContext {
        ErrorContext::capture("TestComponent", "comp-1")
    }

    #[test]
    fn get_reporter_none_by_default() {
        set_error_reporter(None);
        assert!(get_error_reporter().is_none());
    }

    #[test]
    fn report_calls_are_noop_without_reporter() {
        set_error_reporter(None);
        // Must not panic even though nothing is installed.
        report_panic(
            &HandlerPanicError {
                component_name: "X".into(),
                event_name: "onClick".into(),
                panic_value: "boom".into(),
            },
            ctx(),
        );
    }

    #[test]
    fn recording_reporter_captures_panics_and_errors() {
        let reporter = RecordingReporter::new();
        set_error_reporter(Some(Arc::new(reporter.clone())));

        report_panic(
            &HandlerPanicError {
                component_name: "X".into(),
                event_name: "onClick".into(),
                panic_value: "boom".into(),
            },
            ctx(),
        );
        report_error(
            &BridgeError::Configuration("bad arg".into()),
            ctx(),
        );

        let reports = reporter.reports();
        assert_eq!(reports.len(), 2);
        assert!(matches!(reports[0], RecordedReport::Panic(_)));
        assert!(matches!(reports[1], RecordedReport::Error(_)));

        set_error_reporter(None);
    }

    #[test]
    fn recording_reporter_clear() {
        let reporter = RecordingReporter::new();
        reporter.report_error(&BridgeError::Configuration("x".into()), ctx());
        assert_eq!(reporter.reports().len(), 1);
        reporter.clear();
        assert!(reporter.reports().is_empty());
    }

    #[test]
    fn console_reporter_flush_is_immediate() {
        let reporter = ConsoleReporter::new(true);
        assert!(reporter.flush(Duration::from_millis(0)));
    }

    #[test]
    fn set_error_reporter_swap_is_visible_immediately() {
        let first = RecordingReporter::new();
        set_error_reporter(Some(Arc::new(first.clone())));
        report_error(&BridgeError::Configuration("one".into()), ctx());
        assert_eq!(first.reports().len(), 1);

        let second = RecordingReporter::new();
        set_error_reporter(Some(Arc::new(second.clone())));
        report_error(&BridgeError::Configuration("two".into()), ctx());
        assert_eq!(first.reports().len(), 1, "first reporter should not see later reports");
        assert_eq!(second.reports().len(), 1);

        set_error_reporter(None);
    }

    #[test]
    fn error_context_tags_flow_into_reporter() {
        let reporter = RecordingReporter::new();
        let context = ErrorContext::capture("Widget", "w-1").with_tag("k", "v");
        reporter.report_error(&BridgeError::Configuration("x".into()), context.clone());
        assert_eq!(context.tags.get("k").map(String::as_str), Some("v"));
        let _ = HashMap::<String, String>::new();
    }
}
