//! Thread-safe reactive state plumbing for bridging a retained-mode
//! component tree to a host's message-passing update loop.
//!
//! A [`cell::Cell`] holds one piece of component state; writing it enqueues
//! a [`command::Command`] describing the transition onto a per-component
//! [`queue::CommandQueue`]. Once per tick the host drains that queue through
//! a [`batcher::Batcher`] and dispatches the resulting
//! [`message::Message`] to its own update function. A
//! [`loop_detector::LoopDetector`] catches runaway write cascades, an
//! [`inspector::Inspector`] lets tooling peek at what's pending without
//! disturbing it, and the [`reporter`]/[`breadcrumb`] modules give user
//! handler panics and bridge-internal errors somewhere to go besides
//! unwinding into the host.
//!
//! [`bridge::ComponentBridge`] ties a component's cells, queue, loop
//! detector, and batcher together; most callers construct one of those
//! rather than wiring the pieces up by hand.

#![forbid(unsafe_code)]

mod batcher;
mod breadcrumb;
mod bridge;
mod cell;
mod command;
mod config;
mod error;
mod inspector;
mod logger;
mod loop_detector;
mod message;
mod queue;
mod reporter;

pub use batcher::{BatchOutcome, BatchStrategy, Batcher};
pub use breadcrumb::{
    clear_breadcrumbs, get_breadcrumbs, record_breadcrumb, record_breadcrumb_with_level, Breadcrumb,
    BreadcrumbLevel,
};
pub use bridge::ComponentBridge;
pub use cell::Cell;
pub use command::{Command, CommandGenerator, StateChangeGenerator};
pub use config::{BridgeConfig, DEFAULT_BREADCRUMB_CAPACITY, DEFAULT_LOOP_MAX};
pub use error::{
    panic_message, BridgeError, CommandGenerationError, ErrorContext, HandlerPanicError, LoopError,
    RenderPanicError,
};
pub use inspector::{Inspector, PendingCommandInfo};
pub use logger::{get_default_logger, set_default_logger, ConsoleLogger, DebugLogger, NoOpLogger};
pub use loop_detector::LoopDetector;
pub use message::{message_kind, BatchMessage, Message, StateChange};
pub use queue::CommandQueue;
pub use reporter::{
    get_error_reporter, report_error, report_panic, set_error_reporter, ConsoleReporter,
    ErrorReporter, RecordedReport, RecordingReporter,
};

#[cfg(feature = "webhook-reporter")]
pub use reporter::WebhookReporter;
