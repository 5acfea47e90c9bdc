//! # Activity abstractions.
//!
//! This module provides the user-supplied halves of a managed service:
//! - [`Activity`] - hooks of a scheduled iterator (start, iteration body, stop)
//! - [`ActivityFn`] - closure-backed activity with no-op start/stop hooks
//! - [`ActivityRef`] - shared reference to an activity (`Arc<dyn Activity>`)
//! - [`Worker`] / [`WorkerRef`] - hooks of a plain activate/terminate service

mod activity;
mod activity_fn;

pub use activity::{Activity, ActivityRef, Worker, WorkerRef};
pub use activity_fn::ActivityFn;
