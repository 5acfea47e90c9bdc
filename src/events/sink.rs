//! # Observer sink for service notifications.
//!
//! [`EventSink`] carries the two notification channels of a service:
//! informational messages and recoverable-error reports.
//!
//! ## Architecture
//! ```text
//! Publishers:                      Observers (zero or one each):
//!   IterationController ──┐
//!   RunningService      ──┼──► EventSink ──► MessageObserver::on_message(&ServiceMessage)
//!   failure boundary    ──┘          └─────► ErrorObserver::on_error(&mut ErrorEvent) → handled?
//! ```
//!
//! ## Rules
//! - **Synchronous delivery**: observers run inline on the emitting thread.
//! - **No observer**: messages are dropped, errors report `handled = false`.
//! - **Borrowed lifetime**: the sink holds `Arc`s only; attach/detach at any time.
//! - **Panic isolation**: a panicking observer is logged; for errors it counts as "not handled".
//! - Observers are invoked without any controller lock held, so they may call back
//!   into the controller.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;

use super::event::{ErrorEvent, MessageKind, ServiceMessage};
use crate::core::boundary::panic_message;
use crate::error::ServiceError;
use crate::observers::{ErrorObserver, MessageObserver};

/// Two-channel notification sink with one optional observer per channel.
pub struct EventSink {
    service: Arc<str>,
    message: RwLock<Option<Arc<dyn MessageObserver>>>,
    error: RwLock<Option<Arc<dyn ErrorObserver>>>,
}

impl EventSink {
    /// Creates a sink for the named service with no observers attached.
    pub fn new(service: impl Into<Arc<str>>) -> Self {
        Self {
            service: service.into(),
            message: RwLock::new(None),
            error: RwLock::new(None),
        }
    }

    /// Name of the service whose events flow through this sink.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Attaches a message observer, returning the one it replaced.
    pub fn attach_message_observer(
        &self,
        observer: Arc<dyn MessageObserver>,
    ) -> Option<Arc<dyn MessageObserver>> {
        self.message.write().replace(observer)
    }

    /// Detaches the message observer, if any.
    pub fn detach_message_observer(&self) -> Option<Arc<dyn MessageObserver>> {
        self.message.write().take()
    }

    /// Attaches an error observer, returning the one it replaced.
    pub fn attach_error_observer(
        &self,
        observer: Arc<dyn ErrorObserver>,
    ) -> Option<Arc<dyn ErrorObserver>> {
        self.error.write().replace(observer)
    }

    /// Detaches the error observer, if any.
    pub fn detach_error_observer(&self) -> Option<Arc<dyn ErrorObserver>> {
        self.error.write().take()
    }

    /// Returns `true` when an error observer is attached.
    pub fn has_error_observer(&self) -> bool {
        self.error.read().is_some()
    }

    /// Emits an informational message (fire-and-forget).
    pub fn emit_message(&self, kind: MessageKind, text: impl Into<Arc<str>>) {
        let msg = ServiceMessage::new(Arc::clone(&self.service), kind, text);
        tracing::debug!(service = %self.service, kind = kind.as_label(), "{}", msg.text);

        let Some(observer) = self.message.read().clone() else {
            return;
        };
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| observer.on_message(&msg))) {
            tracing::warn!(
                service = %self.service,
                info = %panic_message(payload.as_ref()),
                "message observer panicked"
            );
        }
    }

    /// Offers a failure to the error observer and returns its "handled" decision.
    ///
    /// Returns `false` when no observer is attached or the observer panicked.
    pub fn emit_error(&self, error: &ServiceError, context: &str) -> bool {
        let Some(observer) = self.error.read().clone() else {
            return false;
        };

        let mut event = ErrorEvent::new(&self.service, context, error);
        match catch_unwind(AssertUnwindSafe(|| observer.on_error(&mut event))) {
            Ok(()) => event.is_handled(),
            Err(payload) => {
                tracing::warn!(
                    service = %self.service,
                    context,
                    info = %panic_message(payload.as_ref()),
                    "error observer panicked; failure left unhandled"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("service", &self.service)
            .field("message_observer", &self.message.read().is_some())
            .field("error_observer", &self.error.read().is_some())
            .finish()
    }
}
