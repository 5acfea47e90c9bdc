//! # Function-backed activity (`ActivityFn`)
//!
//! [`ActivityFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per
//! iteration. Start and stop hooks are no-ops.
//!
//! ## Concurrency semantics
//! - Each tick calls the closure again and gets a **new** future.
//! - With parallel execution enabled, several of these futures may run at once;
//!   shared state must live behind an explicit `Arc<...>` inside the closure.
//!
//! ## Example
//! ```rust
//! use itervisor::{ActivityError, ActivityFn, ActivityRef};
//!
//! let a: ActivityRef = ActivityFn::arc(|| async {
//!     // do work...
//!     Ok::<_, ActivityError>(())
//! });
//! # let _ = a;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::activities::activity::Activity;
use crate::error::ActivityError;

/// Function-backed activity implementation.
#[derive(Debug)]
pub struct ActivityFn<F> {
    f: F,
}

impl<F, Fut> ActivityFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActivityError>> + Send + 'static,
{
    /// Creates a new function-backed activity.
    ///
    /// Prefer [`ActivityFn::arc`] when you immediately need an [`ActivityRef`](crate::ActivityRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the activity and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Activity for ActivityFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), ActivityError>> + Send + 'static,
{
    async fn execute_activity(&self) -> Result<(), ActivityError> {
        (self.f)().await
    }
}
