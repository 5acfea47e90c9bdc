//! Error types used by the iteration controller and its hooks.
//!
//! This module defines two main error enums:
//!
//! - [`ServiceError`]: errors raised by controller operations (`start`, `pause`, ...).
//! - [`ActivityError`]: errors raised by user hooks (`execute_activity`, ...).
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! ## Propagation
//! - `InvalidArgument` / `InvalidState` are always returned to the caller of the operation.
//! - `ActivityFailure` is first offered to the error observer; it reaches the caller
//!   only when the observer did not mark it handled.

use std::borrow::Cow;
use thiserror::Error;

/// # Errors produced by controller operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServiceError {
    /// An argument was rejected (non-positive period, blank service name, ...).
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: Cow<'static, str>,
    },

    /// The operation is not legal in the current state.
    ///
    /// Raised when pausing a non-running iterator, resuming a non-paused one,
    /// pausing/resuming with parallel execution disabled, or using an unarmed clock.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Why the transition was refused.
        reason: Cow<'static, str>,
    },

    /// A user hook failed and the error observer did not handle it.
    #[error("{context}: {source}")]
    ActivityFailure {
        /// Free-text context of the failing hook (e.g. "Execute activity").
        context: &'static str,
        /// The hook failure.
        #[source]
        source: ActivityError,
    },
}

impl ServiceError {
    pub(crate) fn invalid_argument(reason: impl Into<Cow<'static, str>>) -> Self {
        ServiceError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_state(reason: impl Into<Cow<'static, str>>) -> Self {
        ServiceError::InvalidState {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use itervisor::ServiceError;
    ///
    /// let err = ServiceError::InvalidState { reason: "not running".into() };
    /// assert_eq!(err.as_label(), "service_invalid_state");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::InvalidArgument { .. } => "service_invalid_argument",
            ServiceError::InvalidState { .. } => "service_invalid_state",
            ServiceError::ActivityFailure { .. } => "service_activity_failure",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::InvalidArgument { reason } => format!("invalid argument: {reason}"),
            ServiceError::InvalidState { reason } => format!("invalid state: {reason}"),
            ServiceError::ActivityFailure { context, source } => {
                format!("context={context} {}", source.as_message())
            }
        }
    }

    /// Returns `true` for [`ServiceError::ActivityFailure`].
    pub fn is_activity_failure(&self) -> bool {
        matches!(self, ServiceError::ActivityFailure { .. })
    }
}

/// # Errors produced by user hooks.
///
/// Hooks return [`ActivityError::Fail`]; the failure boundary converts a panic
/// inside a hook into [`ActivityError::Panicked`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivityError {
    /// The hook returned an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The hook panicked.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl ActivityError {
    /// Shorthand for [`ActivityError::Fail`].
    ///
    /// ```
    /// use itervisor::ActivityError;
    ///
    /// let err = ActivityError::fail("disk full");
    /// assert_eq!(err.to_string(), "execution failed: disk full");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        ActivityError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ActivityError::Fail { .. } => "activity_failed",
            ActivityError::Panicked { .. } => "activity_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ActivityError::Fail { error } => format!("error: {error}"),
            ActivityError::Panicked { info } => format!("panic: {info}"),
        }
    }
}
