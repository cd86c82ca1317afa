//! Error taxonomy and report context for the reactive bridge.
//!
//! Grounded on [`crate::undo::command::CommandError`]-style manual
//! `Display`/`Error` enums: the teacher's workspace does not pull in a
//! derive-macro error crate for its runtime types, so neither does this one.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use web_time::Instant;

use crate::breadcrumb::Breadcrumb;

/// Recover a human-readable message from a caught panic payload.
///
/// Panic payloads are almost always `&'static str` or `String`; anything
/// else is rendered as a fixed placeholder rather than guessed at.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Loop error: a (component, cell) pair exceeded the configured per-tick
/// emission ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopError {
    pub component_id: String,
    pub cell_id: String,
    pub observed_count: u32,
    pub max: u32,
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loop detected on component {:?} cell {:?}: {} emissions exceeds maximum of {}",
            self.component_id, self.cell_id, self.observed_count, self.max
        )
    }
}

impl std::error::Error for LoopError {}

/// A panic inside a user event handler invoked by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerPanicError {
    pub component_name: String,
    pub event_name: String,
    pub panic_value: String,
}

impl fmt::Display for HandlerPanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "handler panic in component {:?} event {:?}: {}",
            self.component_name, self.event_name, self.panic_value
        )
    }
}

impl std::error::Error for HandlerPanicError {}

/// A panic inside a [`crate::command::CommandGenerator`] or a
/// [`crate::command::Command`] thunk executed during batching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGenerationError {
    pub component_id: String,
    pub cell_id: String,
    pub panic_value: String,
}

impl fmt::Display for CommandGenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "command generation panic (component {:?} cell {:?}): {}",
            self.component_id, self.cell_id, self.panic_value
        )
    }
}

impl std::error::Error for CommandGenerationError {}

/// A panic inside a user render closure (conditional, list, etc). Out of
/// scope for this crate's own logic (rendering lives in `ftui-render`), but
/// the bridge surfaces the error shape so a host can route render panics
/// through the same reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPanicError {
    pub component_name: String,
    pub subtree: Option<String>,
    pub panic_value: String,
}

impl fmt::Display for RenderPanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "render panic in component {:?} (subtree {:?}): {}",
            self.component_name, self.subtree, self.panic_value
        )
    }
}

impl std::error::Error for RenderPanicError {}

/// The bridge's single public error type, covering every kind named in the
/// error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    Loop(LoopError),
    HandlerPanic(HandlerPanicError),
    CommandGeneration(CommandGenerationError),
    RenderPanic(RenderPanicError),
    /// Invalid arguments at construction time (e.g. an empty event name).
    Configuration(String),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loop(e) => write!(f, "{e}"),
            Self::HandlerPanic(e) => write!(f, "{e}"),
            Self::CommandGeneration(e) => write!(f, "{e}"),
            Self::RenderPanic(e) => write!(f, "{e}"),
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<LoopError> for BridgeError {
    fn from(e: LoopError) -> Self {
        Self::Loop(e)
    }
}

impl From<HandlerPanicError> for BridgeError {
    fn from(e: HandlerPanicError) -> Self {
        Self::HandlerPanic(e)
    }
}

impl From<CommandGenerationError> for BridgeError {
    fn from(e: CommandGenerationError) -> Self {
        Self::CommandGeneration(e)
    }
}

impl From<RenderPanicError> for BridgeError {
    fn from(e: RenderPanicError) -> Self {
        Self::RenderPanic(e)
    }
}

/// Context attached to every report handed to an [`crate::reporter::ErrorReporter`].
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub component_name: String,
    pub component_id: String,
    pub event_name: Option<String>,
    pub timestamp: Instant,
    pub tags: HashMap<String, String>,
    pub extras: HashMap<String, String>,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub stack_trace: Vec<u8>,
}

impl ErrorContext {
    /// Build a context, capturing the current breadcrumb trail and a
    /// best-effort stack trace.
    #[must_use]
    pub fn capture(component_name: impl Into<String>, component_id: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
            component_id: component_id.into(),
            event_name: None,
            timestamp: Instant::now(),
            tags: HashMap::new(),
            extras: HashMap::new(),
            breadcrumbs: crate::breadcrumb::get_breadcrumbs(),
            stack_trace: std::backtrace::Backtrace::force_capture()
                .to_string()
                .into_bytes(),
        }
    }

    #[must_use]
    pub fn with_event_name(mut self, event_name: impl Into<String>) -> Self {
        self.event_name = Some(event_name.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_error_display_embeds_identifiers() {
        let err = LoopError {
            component_id: "counter-1".into(),
            cell_id: "count".into(),
            observed_count: 101,
            max: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("counter-1"));
        assert!(msg.contains("count"));
        assert!(msg.contains("101"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn handler_panic_display_embeds_fields() {
        let err = HandlerPanicError {
            component_name: "Button".into(),
            event_name: "onClick".into(),
            panic_value: "boom".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Button"));
        assert!(msg.contains("onClick"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn bridge_error_from_conversions() {
        let loop_err: BridgeError = LoopError {
            component_id: "c".into(),
            cell_id: "x".into(),
            observed_count: 1,
            max: 1,
        }
        .into();
        assert!(matches!(loop_err, BridgeError::Loop(_)));
    }

    #[test]
    fn panic_message_downcasts_str_and_string() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(payload.as_ref()), "owned message");

        let payload: Box<dyn Any + Send> = Box::new(42i32);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }

    #[test]
    fn error_context_capture_snapshots_breadcrumbs() {
        crate::breadcrumb::clear_breadcrumbs();
        crate::breadcrumb::record_breadcrumb("test", "hello", HashMap::new());
        let ctx = ErrorContext::capture("MyComponent", "comp-1")
            .with_event_name("onClick")
            .with_tag("env", "test");
        assert_eq!(ctx.component_name, "MyComponent");
        assert_eq!(ctx.event_name.as_deref(), Some("onClick"));
        assert_eq!(ctx.tags.get("env").map(String::as_str), Some("test"));
        assert!(ctx.breadcrumbs.iter().any(|b| b.message == "hello"));
    }
}
