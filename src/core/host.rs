//! # ServiceHost: binds a managed service to the process lifecycle.
//!
//! The host maps lifecycle events 1:1 onto the service:
//!
//! ```text
//! host start   ──► ManagedService::on_host_start   (IterationController::start(cfg.period_minutes))
//! host stop    ──► ManagedService::on_host_stop    (IterationController::stop())
//! power event  ──► acknowledged (true)
//! shutdown     ──► no-op
//!
//! run():
//!   on_host_start ──► select! { OS signal | first unhandled fault } ──► on_host_stop
//!                                                  └─ fault is returned after stopping
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::core::controller::IterationController;
use crate::core::running::RunningService;
use crate::core::{ServiceConfig, shutdown};
use crate::error::ServiceError;
use crate::events::EventSink;

/// Service that can be driven by a [`ServiceHost`].
#[async_trait]
pub trait ManagedService: Send + Sync + 'static {
    /// Configuration the service was built with.
    fn config(&self) -> &ServiceConfig;

    /// Notification sink of the service.
    fn sink(&self) -> &Arc<EventSink>;

    /// Service name, taken from the configuration.
    fn service_name(&self) -> &str {
        &self.config().name
    }

    /// Called when the host starts.
    async fn on_host_start(&self) -> Result<(), ServiceError>;

    /// Called when the host stops.
    async fn on_host_stop(&self) -> Result<(), ServiceError>;

    /// Receiver of failures raised outside any caller's flow, if the service has one.
    fn take_faults(&self) -> Option<mpsc::UnboundedReceiver<ServiceError>> {
        None
    }
}

#[async_trait]
impl ManagedService for IterationController {
    fn config(&self) -> &ServiceConfig {
        IterationController::config(self)
    }

    fn sink(&self) -> &Arc<EventSink> {
        IterationController::sink(self)
    }

    async fn on_host_start(&self) -> Result<(), ServiceError> {
        self.start(i64::from(self.config().period_minutes)).await
    }

    async fn on_host_stop(&self) -> Result<(), ServiceError> {
        self.stop().await
    }

    fn take_faults(&self) -> Option<mpsc::UnboundedReceiver<ServiceError>> {
        IterationController::take_faults(self)
    }
}

#[async_trait]
impl ManagedService for RunningService {
    fn config(&self) -> &ServiceConfig {
        RunningService::config(self)
    }

    fn sink(&self) -> &Arc<EventSink> {
        RunningService::sink(self)
    }

    async fn on_host_start(&self) -> Result<(), ServiceError> {
        self.activate().await
    }

    async fn on_host_stop(&self) -> Result<(), ServiceError> {
        self.terminate().await
    }
}

/// Power-state notification delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerEvent {
    /// Battery power is low.
    BatteryLow,
    /// Switched between battery and mains, or battery level changed.
    PowerStatusChange,
    /// The system asks permission to suspend.
    QuerySuspend,
    /// A suspend request was denied.
    QuerySuspendFailed,
    /// The system is about to suspend.
    Suspend,
    /// Resumed after a normal suspend.
    ResumeSuspend,
    /// Resumed after a critical (forced) suspend.
    ResumeCritical,
    /// Resumed without user activity.
    ResumeAutomatic,
}

/// Host shim around one managed service.
pub struct ServiceHost {
    service: Arc<dyn ManagedService>,
}

impl ServiceHost {
    /// Wraps `service`; nothing is started until `on_host_start` or `run`.
    pub fn new(service: Arc<dyn ManagedService>) -> Self {
        Self { service }
    }

    /// Hosted service.
    pub fn service(&self) -> &Arc<dyn ManagedService> {
        &self.service
    }

    /// Host boot: starts the service.
    pub async fn on_host_start(&self) -> Result<(), ServiceError> {
        tracing::info!(service = self.service.service_name(), "host start");
        self.service.on_host_start().await
    }

    /// Host stop: stops the service.
    pub async fn on_host_stop(&self) -> Result<(), ServiceError> {
        tracing::info!(service = self.service.service_name(), "host stop");
        self.service.on_host_stop().await
    }

    /// Acknowledges every power event.
    pub fn on_power_event(&self, event: PowerEvent) -> bool {
        tracing::debug!(service = self.service.service_name(), ?event, "power event acknowledged");
        true
    }

    /// Host shutdown notification; nothing to do beyond `on_host_stop`.
    pub fn on_shutdown(&self) {
        tracing::debug!(service = self.service.service_name(), "host shutdown");
    }

    /// Runs the service until an OS termination signal or the first unhandled fault.
    ///
    /// The service is stopped in both cases. A fault is returned as the error
    /// of `run` after stopping.
    pub async fn run(&self) -> Result<(), ServiceError> {
        let name = self.service.service_name().to_owned();
        self.run_until(async move {
            match shutdown::wait_for_shutdown_signal().await {
                Ok(signal) => tracing::info!(service = %name, %signal, "shutdown signal received"),
                Err(e) => tracing::error!(service = %name, error = %e, "signal registration failed"),
            }
        })
        .await
    }

    /// Like [`run`](Self::run), with `shutdown` standing in for the OS signal.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), ServiceError>
    where
        F: Future<Output = ()>,
    {
        let mut faults = self.service.take_faults();
        self.on_host_start().await?;

        let fault = tokio::select! {
            _ = shutdown => None,
            Some(err) = next_fault(&mut faults) => Some(err),
        };

        let stopped = self.on_host_stop().await;
        self.on_shutdown();

        match fault {
            Some(err) => {
                if let Err(e) = stopped {
                    tracing::warn!(service = self.service.service_name(), error = %e, "stop failed after fault");
                }
                Err(err)
            }
            None => stopped,
        }
    }
}

impl std::fmt::Debug for ServiceHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHost")
            .field("service", &self.service.service_name())
            .finish()
    }
}

async fn next_fault(
    faults: &mut Option<mpsc::UnboundedReceiver<ServiceError>>,
) -> Option<ServiceError> {
    match faults {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activities::{ActivityFn, Worker};
    use crate::core::{RunningState, ServiceState};
    use crate::error::ActivityError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time;

    fn counting(calls: &Arc<AtomicUsize>, fail: bool) -> crate::ActivityRef {
        let calls = Arc::clone(calls);
        ActivityFn::arc(move || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if fail {
                    return Err(ActivityError::fail("iteration failed"));
                }
                Ok(())
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_starts_and_stops_iterator() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cfg = ServiceConfig::new("hosted").with_period_minutes(2);
        let ctrl = IterationController::builder(cfg, counting(&calls, false))
            .build()
            .unwrap();
        let host = ServiceHost::new(ctrl.clone());

        let (tx, rx) = oneshot::channel::<()>();
        let stopper = tokio::spawn(async move {
            time::sleep(Duration::from_secs(5 * 60)).await;
            let _ = tx.send(());
        });

        host.run_until(async {
            let _ = rx.await;
        })
        .await
        .unwrap();
        stopper.await.unwrap();

        assert_eq!(ctrl.state(), ServiceState::Stopped);
        // ticks at 0:05, 2:05 and 4:05
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_returns_first_fault() {
        let calls = Arc::new(AtomicUsize::new(0));
        let ctrl = IterationController::builder(ServiceConfig::new("faulty"), counting(&calls, true))
            .build()
            .unwrap();
        let host = ServiceHost::new(ctrl.clone());

        let res = host.run_until(std::future::pending()).await;
        assert!(matches!(res, Err(ServiceError::ActivityFailure { .. })));
        assert_eq!(ctrl.state(), ServiceState::Stopped);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_host_start_failure_is_returned() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cfg = ServiceConfig::new("zero").with_period_minutes(0);
        let ctrl = IterationController::builder(cfg, counting(&calls, false))
            .build()
            .unwrap();
        let host = ServiceHost::new(ctrl.clone());

        let res = host.run_until(async {}).await;
        assert!(matches!(res, Err(ServiceError::InvalidArgument { .. })));
        assert_eq!(ctrl.state(), ServiceState::Idle);
    }

    #[tokio::test]
    async fn test_hosts_running_service() {
        struct Noop;
        impl Worker for Noop {}

        let svc = RunningService::new(ServiceConfig::new("plain"), Arc::new(Noop)).unwrap();
        let host = ServiceHost::new(svc.clone());
        assert_eq!(host.service().service_name(), "plain");

        host.on_host_start().await.unwrap();
        assert_eq!(svc.state(), RunningState::Active);
        for event in [
            PowerEvent::BatteryLow,
            PowerEvent::PowerStatusChange,
            PowerEvent::QuerySuspend,
            PowerEvent::QuerySuspendFailed,
            PowerEvent::Suspend,
            PowerEvent::ResumeSuspend,
            PowerEvent::ResumeCritical,
            PowerEvent::ResumeAutomatic,
        ] {
            assert!(host.on_power_event(event));
        }
        host.on_host_stop().await.unwrap();
        assert_eq!(svc.state(), RunningState::Terminated);
    }
}
