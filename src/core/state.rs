//! Controller states.

use std::fmt;

/// Lifecycle state of an [`IterationController`](crate::IterationController).
///
/// ```text
/// Idle ──start──► Running ◄──resume── Paused
///                    │ └────pause─────►  │
///                    └──────stop──────┬──┘
///                                     ▼
///                                  Stopped ──start──► Running
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceState {
    /// Created, never started.
    #[default]
    Idle,
    /// Clock armed and firing.
    Running,
    /// Clock armed but suspended.
    Paused,
    /// Clock released by `stop`.
    Stopped,
}

impl ServiceState {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceState::Idle => "idle",
            ServiceState::Running => "running",
            ServiceState::Paused => "paused",
            ServiceState::Stopped => "stopped",
        }
    }

    /// `true` while a clock is armed (running or paused).
    #[inline]
    pub fn is_live(&self) -> bool {
        matches!(self, ServiceState::Running | ServiceState::Paused)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
