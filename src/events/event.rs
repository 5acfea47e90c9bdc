//! # Events emitted by managed services.
//!
//! Two payloads travel through the [`EventSink`](crate::EventSink):
//! - [`ServiceMessage`]: fire-and-forget narration (starting, paused, tick begin, ...)
//! - [`ErrorEvent`]: a hook failure offered to the error observer, which may
//!   [`mark_handled`](ErrorEvent::mark_handled) it.
//!
//! ## Ordering guarantees
//! Every message and error event takes a number from one global sequence (`seq`)
//! that increases monotonically. Use `seq` to restore the exact order of
//! notifications emitted from different threads.
//!
//! ## Example
//! ```rust
//! use itervisor::{MessageKind, ServiceMessage};
//!
//! let msg = ServiceMessage::new("billing", MessageKind::Paused, "Iterator paused.");
//! assert_eq!(msg.kind, MessageKind::Paused);
//! assert_eq!(&*msg.service, "billing");
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::error::ServiceError;

/// Global sequence counter shared by messages and error events.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

#[inline]
fn next_seq() -> u64 {
    EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed)
}

/// Classification of informational messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    // === Iterator lifecycle ===
    /// `start` accepted, clock about to be armed.
    Starting,
    /// Clock armed; the service is running.
    Started,
    /// Clock suspended (explicit pause or serial-mode tick bracket).
    Paused,
    /// Clock restored to its period.
    Resumed,
    /// `stop` requested.
    Stopping,
    /// Clock released and stop hook done.
    Stopped,

    // === Tick ===
    /// An iteration body is about to run.
    ActivityStarting,
    /// An iteration body returned (or its failure was handled).
    ActivityCompleted,

    // === Running-service lifecycle ===
    /// `activate` requested.
    Activating,
    /// Activation hook done.
    Activated,
    /// `terminate` requested.
    Terminating,
    /// Termination hook done.
    Terminated,
}

impl MessageKind {
    /// Returns a short stable label (kebab-case) for log lines.
    pub fn as_label(&self) -> &'static str {
        match self {
            MessageKind::Starting => "starting",
            MessageKind::Started => "started",
            MessageKind::Paused => "paused",
            MessageKind::Resumed => "resumed",
            MessageKind::Stopping => "stopping",
            MessageKind::Stopped => "stopped",
            MessageKind::ActivityStarting => "activity-starting",
            MessageKind::ActivityCompleted => "activity-completed",
            MessageKind::Activating => "activating",
            MessageKind::Activated => "activated",
            MessageKind::Terminating => "terminating",
            MessageKind::Terminated => "terminated",
        }
    }
}

/// Informational message emitted by a service.
#[derive(Debug, Clone)]
pub struct ServiceMessage {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Name of the emitting service.
    pub service: Arc<str>,
    /// Message classification.
    pub kind: MessageKind,
    /// Human-readable text.
    pub text: Arc<str>,
}

impl ServiceMessage {
    /// Creates a message with the current timestamp and next sequence number.
    pub fn new(
        service: impl Into<Arc<str>>,
        kind: MessageKind,
        text: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            seq: next_seq(),
            at: SystemTime::now(),
            service: service.into(),
            kind,
            text: text.into(),
        }
    }
}

/// Failure report handed to the error observer.
///
/// The observer decides whether the failure is contained by calling
/// [`mark_handled`](Self::mark_handled); the decision is returned to the
/// code path that raised it.
#[derive(Debug)]
pub struct ErrorEvent<'a> {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Name of the emitting service.
    pub service: &'a str,
    /// Free-text context of the failing hook.
    pub context: &'a str,
    /// The failure itself.
    pub error: &'a ServiceError,
    handled: bool,
}

impl<'a> ErrorEvent<'a> {
    /// Creates an unhandled error event.
    pub fn new(service: &'a str, context: &'a str, error: &'a ServiceError) -> Self {
        Self {
            seq: next_seq(),
            at: SystemTime::now(),
            service,
            context,
            error,
            handled: false,
        }
    }

    /// Marks the failure as handled: the service swallows it and keeps operating.
    #[inline]
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    /// Sets the handled flag explicitly.
    #[inline]
    pub fn set_handled(&mut self, handled: bool) {
        self.handled = handled;
    }

    /// Returns the current handled decision.
    #[inline]
    pub fn is_handled(&self) -> bool {
        self.handled
    }
}
