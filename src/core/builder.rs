use std::sync::Arc;

use crate::{
    activities::ActivityRef,
    core::{ServiceConfig, controller::IterationController},
    error::ServiceError,
    events::EventSink,
    observers::{ErrorObserver, MessageObserver},
};

/// Builder for constructing an [`IterationController`] with optional observers.
pub struct IterationControllerBuilder {
    cfg: ServiceConfig,
    activity: ActivityRef,
    message: Option<Arc<dyn MessageObserver>>,
    error: Option<Arc<dyn ErrorObserver>>,
}

impl IterationControllerBuilder {
    /// Creates a new builder for `activity` with the given configuration.
    pub fn new(cfg: ServiceConfig, activity: ActivityRef) -> Self {
        Self {
            cfg,
            activity,
            message: None,
            error: None,
        }
    }

    /// Sets the message observer (lifecycle narration).
    pub fn with_message_observer(mut self, observer: Arc<dyn MessageObserver>) -> Self {
        self.message = Some(observer);
        self
    }

    /// Sets the error observer.
    ///
    /// The observer decides per failure whether it is handled (swallowed)
    /// or propagated to the caller / fault channel.
    pub fn with_error_observer(mut self, observer: Arc<dyn ErrorObserver>) -> Self {
        self.error = Some(observer);
        self
    }

    /// Routes both messages and errors to [`LogWriter`](crate::LogWriter).
    ///
    /// Requires the `logging` feature flag.
    #[cfg(feature = "logging")]
    pub fn with_log_writer(self, writer: crate::observers::LogWriter) -> Self {
        let writer = writer.arc();
        self.with_message_observer(writer.clone())
            .with_error_observer(writer)
    }

    /// Builds the controller in the `Idle` state.
    ///
    /// ### Errors
    /// [`ServiceError::InvalidArgument`] when the configuration is invalid.
    pub fn build(self) -> Result<Arc<IterationController>, ServiceError> {
        self.cfg.validate()?;

        let sink = Arc::new(EventSink::new(self.cfg.name.as_str()));
        if let Some(observer) = self.message {
            sink.attach_message_observer(observer);
        }
        if let Some(observer) = self.error {
            sink.attach_error_observer(observer);
        }
        Ok(IterationController::new(self.cfg, self.activity, sink))
    }
}
