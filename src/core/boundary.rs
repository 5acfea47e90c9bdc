//! # Failure boundary around user hooks.
//!
//! Runs one hook future, converts its failure (returned error **or** panic) into
//! [`ServiceError::ActivityFailure`] and offers it to the error observer.
//!
//! ## Flow
//! ```text
//! hook future ──► catch_unwind ──► Ok(())            → Ok(())
//!                              ├─► Err(ActivityError) ─┐
//!                              └─► panic → Panicked ───┴─► EventSink::emit_error(err, context)
//!                                                              ├─ handled   → Ok(())   (swallowed)
//!                                                              └─ unhandled → Err(err) (propagated)
//! ```
//!
//! ## Rules
//! - Exactly one error event per failure.
//! - No timeout: a hook that never returns stalls its caller.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a hook panics while holding a lock.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::{ActivityError, ServiceError};
use crate::events::EventSink;

/// Which hook a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Hook {
    IterationStart,
    Execute,
    ScheduledStop,
    Activation,
    Termination,
}

impl Hook {
    /// Context string handed to the error observer.
    pub(crate) fn context(self) -> &'static str {
        match self {
            Hook::IterationStart => "On iterator start",
            Hook::Execute => "Execute activity",
            Hook::ScheduledStop => "On iterator stop",
            Hook::Activation => "On activation",
            Hook::Termination => "On termination",
        }
    }
}

/// Runs `fut` inside the failure boundary.
///
/// Returns `Ok(())` on success or when the error observer handled the failure.
pub(crate) async fn contain<F>(sink: &EventSink, hook: Hook, fut: F) -> Result<(), ServiceError>
where
    F: Future<Output = Result<(), ActivityError>>,
{
    let res = match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(r) => r,
        Err(payload) => Err(ActivityError::Panicked {
            info: panic_message(payload.as_ref()),
        }),
    };

    let Err(source) = res else {
        return Ok(());
    };

    let context = hook.context();
    let err = ServiceError::ActivityFailure { context, source };
    if sink.emit_error(&err, context) {
        tracing::warn!(service = sink.service(), context, error = %err, "failure handled by observer");
        Ok(())
    } else {
        Err(err)
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
