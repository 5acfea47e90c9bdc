//! # LogWriter: tracing-backed observer
//!
//! A minimal observer that forwards service notifications to `tracing`.
//! Attach it to both channels of an [`EventSink`](crate::EventSink).
//!
//! ## Example output (with `tracing-subscriber` fmt)
//! ```text
//! INFO itervisor: [starting] service="billing" text="... Minutes interval: 1"
//! INFO itervisor: [activity-starting] service="billing"
//! ERROR itervisor: [error] service="billing" context="Execute activity" err="execution failed: boom" handled=true
//! ```

use std::sync::Arc;

use crate::events::{ErrorEvent, ServiceMessage};
use crate::observers::{ErrorObserver, MessageObserver};

/// Log observer for both notification channels.
///
/// By default errors are logged and left unhandled; use
/// [`LogWriter::handling`] to log and swallow them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter {
    mark_handled: bool,
}

impl LogWriter {
    /// Construct a [`LogWriter`] that leaves errors unhandled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a [`LogWriter`] that marks every error as handled.
    #[must_use]
    pub fn handling() -> Self {
        Self { mark_handled: true }
    }

    /// Convenience: shared handle for attaching to a sink.
    #[must_use]
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl MessageObserver for LogWriter {
    fn on_message(&self, m: &ServiceMessage) {
        tracing::info!(
            seq = m.seq,
            service = %m.service,
            "[{}] {}",
            m.kind.as_label(),
            m.text
        );
    }
}

impl ErrorObserver for LogWriter {
    fn on_error(&self, ev: &mut ErrorEvent<'_>) {
        if self.mark_handled {
            ev.mark_handled();
        }
        tracing::error!(
            seq = ev.seq,
            service = ev.service,
            context = ev.context,
            label = ev.error.as_label(),
            handled = ev.is_handled(),
            "[error] {}",
            ev.error
        );
    }
}
