//! Runtime core: clock, controller and host lifecycle.
//!
//! Public API from this module: [`IterationController`] (with its builder),
//! [`IterationClock`], [`RunningService`] and [`ServiceHost`].
//!
//! Internal modules:
//! - [`clock`]: one repeating timer whose cadence can be changed or suspended;
//! - [`controller`]: the Idle/Running/Paused/Stopped state machine over the clock;
//! - [`boundary`]: failure boundary (error or panic → error observer) around every hook;
//! - [`running`]: clockless activate/terminate service;
//! - [`host`]: binds a service to process lifecycle and OS signals;
//! - [`shutdown`]: cross-platform shutdown signal handling.

pub(crate) mod boundary;
mod builder;
mod clock;
mod config;
mod controller;
mod host;
mod running;
mod shutdown;
mod state;

pub use builder::IterationControllerBuilder;
pub use clock::{Cadence, IterationClock};
pub use config::{ITERATION_DUE_TIME, ServiceConfig};
pub use controller::IterationController;
pub use host::{ManagedService, PowerEvent, ServiceHost};
pub use running::{RunningService, RunningState};
pub use shutdown::{ShutdownSignal, wait_for_shutdown_signal};
pub use state::ServiceState;
