//! # Observers for service notifications.
//!
//! - [`MessageObserver`] / [`ErrorObserver`]: the two extension points of an [`EventSink`](crate::EventSink)
//! - [`MessageFn`] / [`ErrorFn`]: closure-backed observers
//! - [`LogWriter`]: forwards both channels to `tracing` (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod observer;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use observer::{ErrorFn, ErrorObserver, MessageFn, MessageObserver};
