//! # Observer: user-facing notification handlers
//!
//! [`MessageObserver`] and [`ErrorObserver`] are the **extension points** a host
//! uses to watch a managed service.
//!
//! # High-level architecture:
//! ```text
//! IterationController ── emit ──► EventSink
//!                                    ├─► MessageObserver::on_message(&ServiceMessage)
//!                                    └─► ErrorObserver::on_error(&mut ErrorEvent)
//!                                              └─ ev.mark_handled() → failure contained
//! ```
//!
//! Observers are **synchronous** and run on the emitting thread (often the
//! clock's tick thread): keep them short and non-blocking.
//!
//! # Example: closure observers
//! ```
//! use itervisor::{ErrorFn, EventSink, MessageFn, ServiceError};
//!
//! let sink = EventSink::new("billing");
//! sink.attach_message_observer(MessageFn::arc(|m| println!("[{}] {}", m.service, m.text)));
//! sink.attach_error_observer(ErrorFn::arc(|ev| {
//!     eprintln!("{} failed: {}", ev.context, ev.error);
//!     ev.mark_handled();
//! }));
//!
//! let err = ServiceError::InvalidState { reason: "demo".into() };
//! assert!(sink.emit_error(&err, "Execute activity"));
//! ```

use std::sync::Arc;

use crate::events::{ErrorEvent, ServiceMessage};

/// Receives informational messages.
pub trait MessageObserver: Send + Sync + 'static {
    /// Called for every emitted [`ServiceMessage`].
    fn on_message(&self, message: &ServiceMessage);
}

/// Receives recoverable failures and decides whether they are handled.
pub trait ErrorObserver: Send + Sync + 'static {
    /// Called for every failure raised inside a hook.
    ///
    /// Call [`ErrorEvent::mark_handled`] to swallow the failure; leave it
    /// unmarked to let it propagate.
    fn on_error(&self, event: &mut ErrorEvent<'_>);
}

/// Closure-backed [`MessageObserver`].
pub struct MessageFn<F> {
    f: F,
}

impl<F> MessageFn<F>
where
    F: Fn(&ServiceMessage) + Send + Sync + 'static,
{
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps a closure and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F> MessageObserver for MessageFn<F>
where
    F: Fn(&ServiceMessage) + Send + Sync + 'static,
{
    fn on_message(&self, message: &ServiceMessage) {
        (self.f)(message)
    }
}

/// Closure-backed [`ErrorObserver`].
pub struct ErrorFn<F> {
    f: F,
}

impl<F> ErrorFn<F>
where
    F: Fn(&mut ErrorEvent<'_>) + Send + Sync + 'static,
{
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps a closure and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F> ErrorObserver for ErrorFn<F>
where
    F: Fn(&mut ErrorEvent<'_>) + Send + Sync + 'static,
{
    fn on_error(&self, event: &mut ErrorEvent<'_>) {
        (self.f)(event)
    }
}
