//! # RunningService: plain activate/terminate service.
//!
//! The clockless sibling of [`IterationController`](crate::IterationController):
//! a [`Worker`](crate::Worker) is activated once and terminated once, each
//! hook wrapped in the same failure boundary.
//!
//! ```text
//! Idle ──activate──► Active ──terminate──► Terminated ──activate──► Active
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::activities::WorkerRef;
use crate::core::ServiceConfig;
use crate::core::boundary::{Hook, contain};
use crate::error::ServiceError;
use crate::events::{EventSink, MessageKind};

/// Bookkeeping state of a [`RunningService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunningState {
    /// Created, never activated.
    #[default]
    Idle,
    /// `on_activation` succeeded or its failure was handled.
    Active,
    /// `terminate` ran.
    Terminated,
}

impl RunningState {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunningState::Idle => "idle",
            RunningState::Active => "active",
            RunningState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for RunningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Service that runs a [`Worker`](crate::Worker) between activation and termination.
pub struct RunningService {
    cfg: ServiceConfig,
    worker: WorkerRef,
    sink: Arc<EventSink>,
    state: Mutex<RunningState>,
}

impl RunningService {
    /// Creates an idle service.
    ///
    /// ### Errors
    /// [`ServiceError::InvalidArgument`] when the configuration is invalid.
    pub fn new(cfg: ServiceConfig, worker: WorkerRef) -> Result<Arc<Self>, ServiceError> {
        cfg.validate()?;
        let sink = Arc::new(EventSink::new(cfg.name.as_str()));
        Ok(Arc::new(Self {
            cfg,
            worker,
            sink,
            state: Mutex::new(RunningState::Idle),
        }))
    }

    /// Service name.
    pub fn name(&self) -> &str {
        &self.cfg.name
    }

    /// Configuration the service was built with.
    pub fn config(&self) -> &ServiceConfig {
        &self.cfg
    }

    /// Notification sink; attach or detach observers here.
    pub fn sink(&self) -> &Arc<EventSink> {
        &self.sink
    }

    /// Current state.
    pub fn state(&self) -> RunningState {
        *self.state.lock()
    }

    /// Runs `on_activation` and marks the service active.
    ///
    /// ### Errors
    /// - `InvalidState` when already active.
    /// - `ActivityFailure` when the hook fails unhandled; the state is unchanged.
    pub async fn activate(&self) -> Result<(), ServiceError> {
        if *self.state.lock() == RunningState::Active {
            return Err(ServiceError::invalid_state(format!(
                "service '{}' is already active",
                self.cfg.name
            )));
        }

        self.sink.emit_message(
            MessageKind::Activating,
            format!("Service '{}' starting.", self.cfg.name),
        );
        contain(&self.sink, Hook::Activation, self.worker.on_activation()).await?;
        *self.state.lock() = RunningState::Active;

        tracing::info!(service = %self.cfg.name, "service activated");
        self.sink.emit_message(
            MessageKind::Activated,
            format!("Service '{}' started.", self.cfg.name),
        );
        Ok(())
    }

    /// Runs `on_termination` and marks the service terminated.
    ///
    /// A no-op unless active. The state becomes `Terminated` even when the
    /// hook fails unhandled; the failure is returned after "stopped" is reported.
    pub async fn terminate(&self) -> Result<(), ServiceError> {
        {
            let mut state = self.state.lock();
            if *state != RunningState::Active {
                tracing::debug!(service = %self.cfg.name, state = %*state, "terminate ignored");
                return Ok(());
            }
            *state = RunningState::Terminated;
        }

        self.sink.emit_message(
            MessageKind::Terminating,
            format!("Service '{}' stopping.", self.cfg.name),
        );
        let res = contain(&self.sink, Hook::Termination, self.worker.on_termination()).await;

        tracing::info!(service = %self.cfg.name, "service terminated");
        self.sink.emit_message(
            MessageKind::Terminated,
            format!("Service '{}' stopped.", self.cfg.name),
        );
        res
    }
}

impl fmt::Debug for RunningService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunningService")
            .field("name", &self.cfg.name)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activities::Worker;
    use crate::error::ActivityError;
    use crate::observers::{ErrorFn, MessageFn};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        activations: AtomicUsize,
        terminations: AtomicUsize,
        refuse_activation: bool,
    }

    #[async_trait]
    impl Worker for Counter {
        async fn on_activation(&self) -> Result<(), ActivityError> {
            self.activations.fetch_add(1, Ordering::SeqCst);
            if self.refuse_activation {
                return Err(ActivityError::fail("no database"));
            }
            Ok(())
        }

        async fn on_termination(&self) -> Result<(), ActivityError> {
            self.terminations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_activate_then_terminate() {
        let worker = Arc::new(Counter::default());
        let svc = RunningService::new(ServiceConfig::new("worker"), worker.clone()).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = Arc::clone(&seen);
        svc.sink()
            .attach_message_observer(MessageFn::arc(move |m| seen_in.lock().push(m.kind)));

        svc.activate().await.unwrap();
        assert_eq!(svc.state(), RunningState::Active);
        assert!(matches!(
            svc.activate().await,
            Err(ServiceError::InvalidState { .. })
        ));

        svc.terminate().await.unwrap();
        svc.terminate().await.unwrap();
        assert_eq!(svc.state(), RunningState::Terminated);
        assert_eq!(worker.activations.load(Ordering::SeqCst), 1);
        assert_eq!(worker.terminations.load(Ordering::SeqCst), 1);
        assert_eq!(
            *seen.lock(),
            vec![
                MessageKind::Activating,
                MessageKind::Activated,
                MessageKind::Terminating,
                MessageKind::Terminated,
            ]
        );
    }

    #[tokio::test]
    async fn test_activation_failure_follows_observer() {
        let worker = Arc::new(Counter {
            refuse_activation: true,
            ..Counter::default()
        });
        let svc = RunningService::new(ServiceConfig::new("worker"), worker).unwrap();

        assert!(matches!(
            svc.activate().await,
            Err(ServiceError::ActivityFailure { context: "On activation", .. })
        ));
        assert_eq!(svc.state(), RunningState::Idle);

        svc.sink()
            .attach_error_observer(ErrorFn::arc(|ev| ev.mark_handled()));
        svc.activate().await.unwrap();
        assert_eq!(svc.state(), RunningState::Active);
    }
}
