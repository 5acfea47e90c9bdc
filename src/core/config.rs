//! # Service configuration.
//!
//! Provides [`ServiceConfig`] the per-instance settings of a managed service.
//!
//! Config is used in two ways:
//! 1. **Controller creation**: `IterationController::builder(config, activity)`
//! 2. **Host start**: `ServiceHost` starts the iterator with [`ServiceConfig::period_minutes`]
//!
//! ## Fixed values
//! - [`ITERATION_DUE_TIME`]: delay before the first tick, identical for every instance.

use std::borrow::Cow;
use std::time::Duration;

use crate::error::ServiceError;

/// Delay between arming the clock and its first tick.
pub const ITERATION_DUE_TIME: Duration = Duration::from_secs(5);

/// Per-instance configuration of a managed service.
///
/// ## Field semantics
/// - `name`: service name (required, non-blank)
/// - `display_name`: human name (`None` = `"{name} service"`)
/// - `description`: free text (`None` = `"Iteration service for '{name}'."`)
/// - `parallel_execution`: whether ticks may overlap; immutable once built
/// - `period_minutes`: period the host shim starts the iterator with
/// - `throw_exception`: reserved for host-level fault policy; the controller never reads it
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors over
/// re-deriving defaults at call sites.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Service name.
    pub name: String,

    /// Optional display name.
    pub display_name: Option<String>,

    /// Optional description.
    pub description: Option<String>,

    /// Allow overlapping ticks.
    ///
    /// - `false` (serial): each tick suspends the clock before the iteration body
    ///   and restores it afterward; external pause/resume are refused.
    /// - `true` (parallel): ticks may overlap; external pause/resume are allowed.
    pub parallel_execution: bool,

    /// Tick period used by the host shim, in minutes.
    pub period_minutes: u32,

    /// Reserved for host fault policy.
    pub throw_exception: bool,
}

impl ServiceConfig {
    /// Creates a serial-mode config for the named service.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the config with parallel execution toggled.
    pub fn with_parallel_execution(mut self, enabled: bool) -> Self {
        self.parallel_execution = enabled;
        self
    }

    /// Returns the config with an updated host period.
    pub fn with_period_minutes(mut self, minutes: u32) -> Self {
        self.period_minutes = minutes;
        self
    }

    /// Display name, falling back to `"{name} service"`.
    pub fn display_name(&self) -> Cow<'_, str> {
        match &self.display_name {
            Some(d) => Cow::Borrowed(d.as_str()),
            None => Cow::Owned(format!("{} service", self.name)),
        }
    }

    /// Description, falling back to `"Iteration service for '{name}'."`.
    pub fn description(&self) -> Cow<'_, str> {
        match &self.description {
            Some(d) => Cow::Borrowed(d.as_str()),
            None => Cow::Owned(format!("Iteration service for '{}'.", self.name)),
        }
    }

    /// Checks the config before a service is built from it.
    ///
    /// Fails with [`ServiceError::InvalidArgument`] for a blank name.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::invalid_argument(
                "unable to create a service without a valid name",
            ));
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    /// Default configuration:
    ///
    /// - `name = ""` (must be set before building)
    /// - `parallel_execution = false` (serial ticks)
    /// - `period_minutes = 1`
    /// - `throw_exception = false`
    fn default() -> Self {
        Self {
            name: String::new(),
            display_name: None,
            description: None,
            parallel_execution: false,
            period_minutes: 1,
            throw_exception: false,
        }
    }
}

/// Converts a minute count into a tick period.
///
/// Fails with [`ServiceError::InvalidArgument`] for non-positive or oversized input.
pub(crate) fn period_from_minutes(minutes: i64) -> Result<(u32, Duration), ServiceError> {
    if minutes <= 0 {
        return Err(ServiceError::invalid_argument(format!(
            "unable to set a period of {minutes} minutes; at least 1 minute is required"
        )));
    }
    let minutes = u32::try_from(minutes).map_err(|_| {
        ServiceError::invalid_argument(format!("period of {minutes} minutes is too large"))
    })?;
    Ok((minutes, Duration::from_secs(u64::from(minutes) * 60)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_derive_from_name() {
        let cfg = ServiceConfig::new("billing");
        assert_eq!(cfg.display_name(), "billing service");
        assert_eq!(cfg.description(), "Iteration service for 'billing'.");
        assert!(!cfg.parallel_execution);
        assert!(!cfg.throw_exception);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let cfg = ServiceConfig::new("   ");
        assert!(matches!(
            cfg.validate(),
            Err(ServiceError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_period_conversion() {
        assert_eq!(
            period_from_minutes(2).ok(),
            Some((2, Duration::from_millis(120_000)))
        );
        assert!(matches!(
            period_from_minutes(0),
            Err(ServiceError::InvalidArgument { .. })
        ));
        assert!(matches!(
            period_from_minutes(-5),
            Err(ServiceError::InvalidArgument { .. })
        ));
        assert!(period_from_minutes(i64::MAX).is_err());
    }
}
