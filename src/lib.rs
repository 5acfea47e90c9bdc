//! # itervisor
//!
//! **Itervisor** runs a unit of work on a fixed minute cadence inside a
//! long-lived service, with pause/resume, overlap control and failure
//! containment.
//!
//! It provides a scheduled-iteration controller built on a single repeating
//! timer, an observer sink for lifecycle narration and failures, and a thin
//! host shim that binds a service to process start, stop and OS signals.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌────────────────────┐         ┌───────────────────────────┐
//!   │  Activity (user)   │         │ ServiceHost               │
//!   │ - on_iteration_start│◄──┐    │ - on_host_start / stop    │
//!   │ - execute_activity │   │    │ - on_power_event → true   │
//!   │ - on_scheduled_stop│   │    │ - run(): signal | fault   │
//!   └────────────────────┘   │    └────────────┬──────────────┘
//!                            │                 ▼
//! ┌──────────────────────────┴────────────────────────────────────────┐
//! │  IterationController                                              │
//! │  - state machine: Idle → Running ⇄ Paused → Stopped               │
//! │  - serial mode: forced pause/resume around each iteration body    │
//! │  - failure boundary around every hook (errors and panics)         │
//! │  - fault channel for unhandled tick failures                      │
//! └──────┬──────────────────────────────────────────────┬─────────────┘
//!        ▼                                              ▼
//! ┌───────────────────────────────┐       ┌──────────────────────────────┐
//! │  IterationClock               │       │  EventSink                   │
//! │  - one tokio timer task       │       │  - MessageObserver (0..1)    │
//! │  - Cadence::Every / Suspended │       │  - ErrorObserver   (0..1)    │
//! │  - CancellationToken disarm   │       │  - panic-isolated delivery   │
//! └───────────────────────────────┘       └──────────────────────────────┘
//! ```
//!
//! ### Tick lifecycle (serial mode)
//! ```text
//! start(minutes) ──► on_iteration_start ──► arm(5s, minutes)
//!
//! on every fire {
//!   ├─► forced pause (cadence suspended, state Paused)
//!   ├─► spawn iteration:
//!   │       ├─ "Execute activity initializing..."
//!   │       ├─ execute_activity()
//!   │       │     ├─ Ok / handled failure ──► "Execute activity completed."
//!   │       │     │                           forced resume (state Running)
//!   │       │     └─ unhandled failure   ──► fault channel, stays Paused
//!   └─► next fire one period after resume
//! }
//!
//! stop() ──► release clock ──► on_scheduled_stop ──► "stopped"
//! ```
//!
//! ## Features
//! | Area            | Description                                                  | Key types / traits                              |
//! |-----------------|--------------------------------------------------------------|-------------------------------------------------|
//! | **Iteration**   | Run an activity every N minutes, serial or overlapping.      | [`IterationController`], [`Activity`]           |
//! | **Clock**       | One repeating timer with suspendable cadence.                | [`IterationClock`], [`Cadence`]                 |
//! | **Observers**   | Lifecycle narration and failure decisions.                   | [`MessageObserver`], [`ErrorObserver`]          |
//! | **Hosting**     | Bind a service to process lifecycle and OS signals.          | [`ServiceHost`], [`ManagedService`]             |
//! | **Errors**      | Typed errors for control and hook failures.                  | [`ServiceError`], [`ActivityError`]             |
//! | **Configuration**| Per-instance service settings.                              | [`ServiceConfig`]                               |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] observer.
//!
//! ## Example
//! ```rust,no_run
//! use itervisor::{ActivityFn, ActivityRef, IterationController, ServiceConfig, ServiceHost};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = ServiceConfig::new("cleanup").with_period_minutes(10);
//!
//!     let cleanup: ActivityRef = ActivityFn::arc(|| async {
//!         println!("purging stale rows");
//!         Ok(())
//!     });
//!
//!     let builder = IterationController::builder(cfg, cleanup);
//!     #[cfg(feature = "logging")]
//!     let builder = builder.with_log_writer(itervisor::LogWriter::new());
//!     let ctrl = builder.build()?;
//!
//!     // Runs until Ctrl-C / SIGTERM or the first unhandled iteration failure.
//!     ServiceHost::new(ctrl).run().await?;
//!     Ok(())
//! }
//! ```
mod activities;
mod core;
mod error;
mod events;
mod observers;

// ---- Public re-exports ----

pub use activities::{Activity, ActivityFn, ActivityRef, Worker, WorkerRef};
pub use core::{
    Cadence, ITERATION_DUE_TIME, IterationClock, IterationController, IterationControllerBuilder,
    ManagedService, PowerEvent, RunningService, RunningState, ServiceConfig, ServiceHost,
    ServiceState, ShutdownSignal, wait_for_shutdown_signal,
};
pub use error::{ActivityError, ServiceError};
pub use events::{ErrorEvent, EventSink, MessageKind, ServiceMessage};
pub use observers::{ErrorFn, ErrorObserver, MessageFn, MessageObserver};

// Optional: expose a simple built-in logger observer.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
