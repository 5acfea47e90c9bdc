//! Service events: payload types and the observer sink.
//!
//! This module groups the event **data model** and the **sink** the controller
//! uses to notify its host about what is happening.
//!
//! ## Contents
//! - [`MessageKind`], [`ServiceMessage`] informational narration of transitions
//! - [`ErrorEvent`] recoverable failure report with a "mark handled" decision
//! - [`EventSink`] one optional message observer plus one optional error observer
//!
//! ## Quick reference
//! - **Publishers**: `IterationController`, `RunningService`, the failure boundary.
//! - **Consumers**: user observers ([`MessageObserver`](crate::MessageObserver),
//!   [`ErrorObserver`](crate::ErrorObserver)), e.g. [`LogWriter`](crate::LogWriter).

mod event;
mod sink;

pub use event::{ErrorEvent, MessageKind, ServiceMessage};
pub use sink::EventSink;
