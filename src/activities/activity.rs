//! # Activity and worker traits.
//!
//! An [`Activity`] is the unit of work a scheduled iterator runs on every tick,
//! plus optional setup/teardown hooks. A [`Worker`] is the counterpart for a
//! plain activate/terminate service.
//!
//! Every hook runs inside the failure boundary: a returned
//! [`ActivityError`] or a panic is offered to the error observer first.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ActivityError;

/// Shared handle to an activity.
pub type ActivityRef = Arc<dyn Activity>;

/// Shared handle to a worker.
pub type WorkerRef = Arc<dyn Worker>;

/// # Hooks of a scheduled iterator.
///
/// Only [`execute_activity`](Activity::execute_activity) is mandatory.
///
/// With parallel execution enabled, ticks may overlap and
/// `execute_activity` must be reentrant.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use itervisor::{Activity, ActivityError};
///
/// struct Cleanup;
///
/// #[async_trait]
/// impl Activity for Cleanup {
///     async fn on_iteration_start(&self, period_minutes: u32) -> Result<(), ActivityError> {
///         println!("cleanup every {period_minutes} min");
///         Ok(())
///     }
///
///     async fn execute_activity(&self) -> Result<(), ActivityError> {
///         // purge stale rows...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Activity: Send + Sync + 'static {
    /// Optional setup, run by `start` before the clock is armed.
    async fn on_iteration_start(&self, _period_minutes: u32) -> Result<(), ActivityError> {
        Ok(())
    }

    /// The iteration body.
    async fn execute_activity(&self) -> Result<(), ActivityError>;

    /// Optional teardown, run by `stop` after the clock is released.
    async fn on_scheduled_stop(&self) -> Result<(), ActivityError> {
        Ok(())
    }
}

/// # Hooks of a plain activate/terminate service.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Runs when the service is activated.
    async fn on_activation(&self) -> Result<(), ActivityError> {
        Ok(())
    }

    /// Runs when the service is terminated.
    async fn on_termination(&self) -> Result<(), ActivityError> {
        Ok(())
    }
}
