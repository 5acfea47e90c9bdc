//! # IterationController: the scheduled-iteration state machine.
//!
//! Drives one [`Activity`](crate::Activity) on an [`IterationClock`], guards
//! state transitions, and wraps every hook in the failure boundary.
//!
//! ## Transitions
//! ```text
//! | From           | Operation            | To        | Guard                                      |
//! |----------------|----------------------|-----------|--------------------------------------------|
//! | Idle / Stopped | start(minutes)       | Running   | minutes > 0 (InvalidArgument)              |
//! | Running        | pause()              | Paused    | parallel execution enabled (InvalidState)  |
//! | Paused         | resume()             | Running   | parallel execution enabled (InvalidState)  |
//! | Running/Paused | stop()               | Stopped   | none; no-op from Idle / Stopped            |
//! | any            | execute_immediate()  | unchanged | none; bypasses the clock                   |
//! ```
//!
//! ## Tick path
//! ```text
//! clock fire ──► on_tick(generation)                      (inline on the timer task)
//!                 ├─ serial:   forced pause (Cadence::Suspended) ──┐
//!                 └─ parallel: admit if Running ───────────────────┤
//!                                                                   ▼
//!                                         spawn run_tick ──► ActivityStarting
//!                                                            contain(execute_activity)
//!                                                              ├─ Ok / handled ──► ActivityCompleted
//!                                                              │                   serial: forced resume
//!                                                              └─ unhandled ─────► fault channel
//!                                                                                  (stays Paused in serial mode)
//! ```
//!
//! ## Rules
//! - Every transition (`arm`, `disarm`, cadence change, state read/write) happens
//!   under one mutex; observers are notified after the mutex is released.
//! - Serial mode never overlaps iteration bodies: the clock is suspended before
//!   the body is spawned and restored only after it returns.
//! - `stop` releases the clock but never interrupts an in-flight body.
//! - Each `start` arms a fresh clock with a new generation; ticks of a released
//!   clock are discarded.
//! - `start` reserves the transition before its hook runs; a `stop` landing
//!   meanwhile makes it abort instead of arming.
//! - Faults are queued only once a receiver was taken with `take_faults`.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::activities::ActivityRef;
use crate::core::boundary::{Hook, contain};
use crate::core::builder::IterationControllerBuilder;
use crate::core::clock::{Cadence, IterationClock};
use crate::core::config::{ITERATION_DUE_TIME, ServiceConfig, period_from_minutes};
use crate::core::state::ServiceState;
use crate::error::ServiceError;
use crate::events::{EventSink, MessageKind};

/// Mutable controller state, guarded by one mutex.
struct Inner {
    state: ServiceState,
    clock: Option<IterationClock>,
    period: Duration,
    generation: u64,
    /// A `start` is between its state check and arming the clock.
    starting: bool,
    /// Bumped by every `stop`; a pending `start` aborts when it changed.
    stop_epoch: u64,
}

/// Start reservation; released on drop so a cancelled `start` does not wedge the controller.
struct StartReservation<'a> {
    inner: &'a Mutex<Inner>,
    epoch: u64,
}

impl Drop for StartReservation<'_> {
    fn drop(&mut self) {
        self.inner.lock().starting = false;
    }
}

/// Where unhandled tick failures go.
enum FaultRoute {
    /// Receiver not taken yet; faults are logged only.
    Pending,
    Open(mpsc::UnboundedSender<ServiceError>),
    /// Receiver taken and dropped.
    Closed,
}

/// Direction of a clock transition.
#[derive(Debug, Clone, Copy)]
enum Shift {
    Suspend,
    Restore,
}

/// Scheduled-iteration service controller.
pub struct IterationController {
    cfg: ServiceConfig,
    activity: ActivityRef,
    sink: Arc<EventSink>,
    inner: Mutex<Inner>,
    faults: Mutex<FaultRoute>,
    me: Weak<IterationController>,
}

impl IterationController {
    /// Starts building a controller for `activity`.
    pub fn builder(cfg: ServiceConfig, activity: ActivityRef) -> IterationControllerBuilder {
        IterationControllerBuilder::new(cfg, activity)
    }

    pub(crate) fn new(cfg: ServiceConfig, activity: ActivityRef, sink: Arc<EventSink>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            cfg,
            activity,
            sink,
            inner: Mutex::new(Inner {
                state: ServiceState::Idle,
                clock: None,
                period: Duration::ZERO,
                generation: 0,
                starting: false,
                stop_epoch: 0,
            }),
            faults: Mutex::new(FaultRoute::Pending),
            me: me.clone(),
        })
    }

    /// Service name.
    pub fn name(&self) -> &str {
        &self.cfg.name
    }

    /// Configuration the controller was built with.
    pub fn config(&self) -> &ServiceConfig {
        &self.cfg
    }

    /// Notification sink; attach or detach observers here.
    pub fn sink(&self) -> &Arc<EventSink> {
        &self.sink
    }

    /// Whether ticks may overlap (fixed at construction).
    pub fn is_parallel_execution_enabled(&self) -> bool {
        self.cfg.parallel_execution
    }

    /// Current state.
    pub fn state(&self) -> ServiceState {
        self.inner.lock().state
    }

    /// Tick period of the armed clock, `None` when no clock is armed.
    pub fn period(&self) -> Option<Duration> {
        let inner = self.inner.lock();
        inner.clock.as_ref().map(|_| inner.period)
    }

    /// Takes the receiver of unhandled tick failures.
    ///
    /// Faults are queued only from this call on; earlier ones are logged and
    /// dropped. Returns `None` after the first call. A host should treat any
    /// received error as a reason to stop the service.
    pub fn take_faults(&self) -> Option<mpsc::UnboundedReceiver<ServiceError>> {
        let mut route = self.faults.lock();
        if !matches!(*route, FaultRoute::Pending) {
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *route = FaultRoute::Open(tx);
        Some(rx)
    }

    /// Arms the clock with a period of `period_minutes` minutes.
    ///
    /// The first tick fires after [`ITERATION_DUE_TIME`], not immediately.
    /// `on_iteration_start` runs (inside the failure boundary) before arming.
    ///
    /// ### Errors
    /// - `InvalidArgument` for `period_minutes <= 0`.
    /// - `InvalidState` while already running, paused or starting, and when a
    ///   `stop` lands while the start hook runs (the clock is then never armed).
    /// - `ActivityFailure` when the start hook fails unhandled; the state is unchanged.
    pub async fn start(&self, period_minutes: i64) -> Result<(), ServiceError> {
        let (minutes, period) = period_from_minutes(period_minutes)?;
        let reservation = self.reserve_start()?;

        contain(
            &self.sink,
            Hook::IterationStart,
            self.activity.on_iteration_start(minutes),
        )
        .await?;

        self.sink.emit_message(
            MessageKind::Starting,
            format!(
                "Scheduled service '{}' starting. Minutes interval: {minutes}",
                self.cfg.name
            ),
        );

        {
            let mut inner = self.inner.lock();
            if inner.stop_epoch != reservation.epoch {
                tracing::debug!(service = %self.cfg.name, "start aborted by stop");
                return Err(ServiceError::invalid_state(format!(
                    "iterator '{}' was stopped while starting",
                    self.cfg.name
                )));
            }

            let generation = inner.generation + 1;
            let me = self.me.clone();
            let mut clock = IterationClock::new(move || {
                if let Some(ctrl) = me.upgrade() {
                    ctrl.on_tick(generation);
                }
            });
            clock.arm(ITERATION_DUE_TIME, period)?;

            inner.generation = generation;
            inner.period = period;
            inner.clock = Some(clock);
            inner.state = ServiceState::Running;
        }

        tracing::info!(service = %self.cfg.name, minutes, "iterator started");
        self.sink.emit_message(
            MessageKind::Started,
            format!("Scheduled service '{}' started.", self.cfg.name),
        );
        Ok(())
    }

    /// Releases the clock and runs `on_scheduled_stop`.
    ///
    /// Safe to call from any thread while a tick is in flight: the in-flight
    /// body runs to completion, no further tick starts. A no-op from `Idle`
    /// or `Stopped`, except that a `start` still running its hook is aborted.
    ///
    /// ### Errors
    /// - `ActivityFailure` when the stop hook fails unhandled. The clock is
    ///   released and `Stopped` is reported regardless.
    pub async fn stop(&self) -> Result<(), ServiceError> {
        {
            let mut inner = self.inner.lock();
            inner.stop_epoch += 1;
            if !inner.state.is_live() {
                tracing::debug!(
                    service = %self.cfg.name,
                    pending_start = inner.starting,
                    "stop ignored; iterator not running"
                );
                return Ok(());
            }
        }

        self.sink.emit_message(
            MessageKind::Stopping,
            format!("Scheduled service '{}' stopping.", self.cfg.name),
        );

        let released = {
            let mut inner = self.inner.lock();
            if inner.state.is_live() {
                if let Some(mut clock) = inner.clock.take() {
                    clock.disarm();
                }
                inner.state = ServiceState::Stopped;
                true
            } else {
                false
            }
        };
        if !released {
            return Ok(());
        }

        let res = contain(
            &self.sink,
            Hook::ScheduledStop,
            self.activity.on_scheduled_stop(),
        )
        .await;

        tracing::info!(service = %self.cfg.name, "iterator stopped");
        self.sink.emit_message(
            MessageKind::Stopped,
            format!("Scheduled service '{}' stopped.", self.cfg.name),
        );
        res
    }

    /// Runs the iteration body once, right now, in the caller's flow.
    ///
    /// Bypasses the clock entirely: no pause bracket, no state change.
    pub async fn execute_immediate(&self) -> Result<(), ServiceError> {
        tracing::debug!(service = %self.cfg.name, state = %self.state(), "immediate execution");
        contain(&self.sink, Hook::Execute, self.activity.execute_activity()).await
    }

    /// Suspends the clock.
    ///
    /// ### Errors
    /// `InvalidState` when parallel execution is disabled or the iterator is not running.
    pub fn pause(&self) -> Result<(), ServiceError> {
        self.shift(Shift::Suspend, |inner| {
            self.external_guard(inner, ServiceState::Running, "pause")
        })
    }

    /// Restores the clock period.
    ///
    /// ### Errors
    /// `InvalidState` when parallel execution is disabled or the iterator is not paused.
    pub fn resume(&self) -> Result<(), ServiceError> {
        self.shift(Shift::Restore, |inner| {
            self.external_guard(inner, ServiceState::Paused, "resume")
        })
    }

    // ---------------------------
    // Transitions
    // ---------------------------

    fn reserve_start(&self) -> Result<StartReservation<'_>, ServiceError> {
        let mut inner = self.inner.lock();
        if inner.state.is_live() {
            return Err(ServiceError::invalid_state(format!(
                "cannot start iterator '{}'; it is already {}",
                self.cfg.name, inner.state
            )));
        }
        if inner.starting {
            return Err(ServiceError::invalid_state(format!(
                "iterator '{}' is already starting",
                self.cfg.name
            )));
        }
        inner.starting = true;
        Ok(StartReservation {
            inner: &self.inner,
            epoch: inner.stop_epoch,
        })
    }

    fn external_guard(
        &self,
        inner: &Inner,
        required: ServiceState,
        op: &str,
    ) -> Result<(), ServiceError> {
        if !self.cfg.parallel_execution {
            return Err(ServiceError::invalid_state(format!(
                "unable to {op} an iterator configured with parallel execution disabled"
            )));
        }
        if inner.state != required {
            return Err(ServiceError::invalid_state(format!(
                "cannot {op} iterator in state {}",
                inner.state
            )));
        }
        Ok(())
    }

    /// Guard of the tick path: the tick must belong to the armed clock.
    fn same_generation(inner: &Inner, generation: u64) -> Result<(), ServiceError> {
        if inner.clock.is_none() || inner.generation != generation {
            return Err(ServiceError::invalid_state("tick belongs to a released clock"));
        }
        Ok(())
    }

    fn pause_forced(&self, generation: u64) -> Result<(), ServiceError> {
        self.shift(Shift::Suspend, |inner| Self::same_generation(inner, generation))
    }

    fn resume_forced(&self, generation: u64) -> Result<(), ServiceError> {
        self.shift(Shift::Restore, |inner| Self::same_generation(inner, generation))
    }

    /// Single state-transition primitive shared by external and forced pause/resume.
    fn shift<G>(&self, to: Shift, guard: G) -> Result<(), ServiceError>
    where
        G: FnOnce(&Inner) -> Result<(), ServiceError>,
    {
        {
            let mut inner = self.inner.lock();
            guard(&inner)?;

            let Some(clock) = inner.clock.as_ref() else {
                return Err(ServiceError::invalid_state(
                    "iterator is not yet initialized",
                ));
            };
            let (cadence, state) = match to {
                Shift::Suspend => (Cadence::Suspended, ServiceState::Paused),
                Shift::Restore => (Cadence::Every(inner.period), ServiceState::Running),
            };
            clock.change_period(cadence)?;
            inner.state = state;
        }

        match to {
            Shift::Suspend => self.sink.emit_message(
                MessageKind::Paused,
                format!("Iterator service '{}' paused.", self.cfg.name),
            ),
            Shift::Restore => self.sink.emit_message(
                MessageKind::Resumed,
                format!("Scheduled service '{}' resumed.", self.cfg.name),
            ),
        }
        Ok(())
    }

    // ---------------------------
    // Tick path
    // ---------------------------

    /// Called inline by the clock on every fire.
    fn on_tick(self: Arc<Self>, generation: u64) {
        let admitted = if self.cfg.parallel_execution {
            let inner = self.inner.lock();
            Self::same_generation(&inner, generation).and_then(|()| {
                if inner.state == ServiceState::Running {
                    Ok(())
                } else {
                    Err(ServiceError::invalid_state("iterator is not running"))
                }
            })
        } else {
            self.pause_forced(generation)
        };

        if let Err(e) = admitted {
            tracing::debug!(service = %self.cfg.name, reason = %e, "tick skipped");
            return;
        }

        tokio::spawn(async move {
            if let Err(err) = self.run_tick(generation).await {
                self.report_fault(err);
            }
        });
    }

    async fn run_tick(&self, generation: u64) -> Result<(), ServiceError> {
        self.sink
            .emit_message(MessageKind::ActivityStarting, "Execute activity initializing...");

        contain(&self.sink, Hook::Execute, self.activity.execute_activity()).await?;

        self.sink
            .emit_message(MessageKind::ActivityCompleted, "Execute activity completed.");

        if !self.cfg.parallel_execution {
            if let Err(e) = self.resume_forced(generation) {
                tracing::debug!(service = %self.cfg.name, reason = %e, "not resuming after tick");
            }
        }
        Ok(())
    }

    fn report_fault(&self, err: ServiceError) {
        tracing::error!(
            service = %self.cfg.name,
            label = err.as_label(),
            error = %err,
            "unhandled failure on tick path"
        );

        let mut route = self.faults.lock();
        match &*route {
            FaultRoute::Open(tx) => {
                if tx.send(err).is_err() {
                    tracing::debug!(service = %self.cfg.name, "fault receiver dropped");
                    *route = FaultRoute::Closed;
                }
            }
            FaultRoute::Pending | FaultRoute::Closed => {
                tracing::debug!(service = %self.cfg.name, "no fault receiver; fault dropped");
            }
        }
    }
}

impl std::fmt::Debug for IterationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IterationController")
            .field("name", &self.cfg.name)
            .field("parallel_execution", &self.cfg.parallel_execution)
            .field("state", &self.state())
            .finish()
    }
}
