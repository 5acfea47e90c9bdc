//! # IterationClock: one repeating timer with a mutable cadence.
//!
//! The clock owns a single background timer task. Pause and resume are
//! implemented by **changing the cadence** of that task, never by cancelling
//! and recreating it.
//!
//! ## Architecture
//! ```text
//! arm(initial_delay, period)
//!   └─► spawn drive() ──► sleep_until(first) ──► tick() ──► sleep_until(at + period) ──► tick() ...
//!             ▲
//!             │ watch::Sender<Cadence>
//! change_period(Cadence::Suspended)     → no deadline, waits for the next change
//! change_period(Cadence::Every(period)) → next tick one period from now
//!
//! disarm() ──► CancellationToken::cancel() ──► drive() exits
//! ```
//!
//! ## Rules
//! - `tick` is invoked **inline** on the timer task; it must not block.
//!   A cadence change made from inside `tick` is seen before the next deadline is computed.
//! - Ticks fire in non-decreasing time order; consecutive ticks keep a fixed
//!   phase (`at + period`) unless the cadence changes.
//! - `disarm` is idempotent and never waits for the timer task.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::ServiceError;

type TickFn = Arc<dyn Fn() + Send + Sync>;

/// Firing interval of an armed clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Fire one period from the change, then every period.
    Every(Duration),
    /// Do not fire until the cadence changes again.
    Suspended,
}

impl Cadence {
    #[inline]
    fn next_deadline(self, from: Instant) -> Option<Instant> {
        match self {
            Cadence::Every(period) => Some(from + period),
            Cadence::Suspended => None,
        }
    }
}

struct Armed {
    cadence: watch::Sender<Cadence>,
    token: CancellationToken,
    _join: JoinHandle<()>,
}

/// Single repeating timer driving one tick callback.
pub struct IterationClock {
    tick: TickFn,
    armed: Option<Armed>,
}

impl IterationClock {
    /// Creates an unarmed clock that will call `tick` on every fire.
    pub fn new(tick: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            tick: Arc::new(tick),
            armed: None,
        }
    }

    /// Returns `true` between [`arm`](Self::arm) and [`disarm`](Self::disarm).
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Current cadence, or `None` when unarmed.
    pub fn cadence(&self) -> Option<Cadence> {
        self.armed.as_ref().map(|a| *a.cadence.borrow())
    }

    /// Starts the timer: first fire after `initial_delay`, then every `period`.
    ///
    /// ### Errors
    /// - [`ServiceError::InvalidState`] if already armed, or when called outside a tokio runtime.
    /// - [`ServiceError::InvalidArgument`] for a zero `period`.
    pub fn arm(&mut self, initial_delay: Duration, period: Duration) -> Result<(), ServiceError> {
        if self.armed.is_some() {
            return Err(ServiceError::invalid_state("clock is already armed"));
        }
        if period.is_zero() {
            return Err(ServiceError::invalid_argument("clock period must be positive"));
        }
        let runtime = Handle::try_current()
            .map_err(|_| ServiceError::invalid_state("clock requires a running tokio runtime"))?;

        let (tx, rx) = watch::channel(Cadence::Every(period));
        let token = CancellationToken::new();
        let first = Instant::now() + initial_delay;
        let join = runtime.spawn(drive(Arc::clone(&self.tick), rx, token.clone(), first));

        self.armed = Some(Armed {
            cadence: tx,
            token,
            _join: join,
        });
        Ok(())
    }

    /// Replaces the cadence of the running timer.
    ///
    /// ### Errors
    /// - [`ServiceError::InvalidState`] if the clock is not armed.
    /// - [`ServiceError::InvalidArgument`] for `Cadence::Every(Duration::ZERO)`.
    pub fn change_period(&self, cadence: Cadence) -> Result<(), ServiceError> {
        let Some(armed) = &self.armed else {
            return Err(ServiceError::invalid_state("clock is not armed"));
        };
        if cadence == Cadence::Every(Duration::ZERO) {
            return Err(ServiceError::invalid_argument("clock period must be positive"));
        }
        armed.cadence.send_replace(cadence);
        Ok(())
    }

    /// Stops and releases the timer. No-op when unarmed.
    pub fn disarm(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.token.cancel();
        }
    }
}

impl Drop for IterationClock {
    fn drop(&mut self) {
        self.disarm();
    }
}

impl std::fmt::Debug for IterationClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IterationClock")
            .field("cadence", &self.cadence())
            .finish()
    }
}

/// Timer loop of an armed clock.
async fn drive(
    tick: TickFn,
    mut cadence: watch::Receiver<Cadence>,
    token: CancellationToken,
    first: Instant,
) {
    let mut deadline = Some(first);

    loop {
        let Some(at) = deadline else {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                changed = cadence.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    deadline = cadence.borrow_and_update().next_deadline(Instant::now());
                }
            }
            continue;
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            changed = cadence.changed() => {
                if changed.is_err() {
                    break;
                }
                deadline = cadence.borrow_and_update().next_deadline(Instant::now());
            }
            _ = time::sleep_until(at) => {
                tick();
                deadline = cadence.borrow_and_update().next_deadline(at);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PERIOD: Duration = Duration::from_secs(60);
    const DELAY: Duration = Duration::from_secs(5);

    fn counting_clock() -> (IterationClock, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_in = Arc::clone(&count);
        let clock = IterationClock::new(move || {
            count_in.fetch_add(1, Ordering::SeqCst);
        });
        (clock, count)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fire_waits_for_initial_delay() {
        let (mut clock, count) = counting_clock();
        clock.arm(DELAY, PERIOD).unwrap();

        time::sleep(Duration::from_secs(4)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        time::sleep(PERIOD).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_twice_is_invalid_state() {
        let (mut clock, _count) = counting_clock();
        clock.arm(DELAY, PERIOD).unwrap();
        assert!(matches!(
            clock.arm(DELAY, PERIOD),
            Err(ServiceError::InvalidState { .. })
        ));

        clock.disarm();
        assert!(clock.arm(DELAY, PERIOD).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_suspend_and_restore_cadence() {
        let (mut clock, count) = counting_clock();
        clock.arm(DELAY, PERIOD).unwrap();
        time::sleep(Duration::from_secs(6)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        clock.change_period(Cadence::Suspended).unwrap();
        assert_eq!(clock.cadence(), Some(Cadence::Suspended));
        time::sleep(PERIOD * 10).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        clock.change_period(Cadence::Every(PERIOD)).unwrap();
        time::sleep(PERIOD - Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_is_idempotent_and_stops_ticks() {
        let (mut clock, count) = counting_clock();
        clock.disarm();
        assert!(!clock.is_armed());

        clock.arm(DELAY, PERIOD).unwrap();
        clock.disarm();
        clock.disarm();
        assert!(!clock.is_armed());
        assert_eq!(clock.cadence(), None);

        time::sleep(PERIOD * 3).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_period_requires_armed_clock() {
        let (mut clock, _count) = counting_clock();
        assert!(matches!(
            clock.change_period(Cadence::Suspended),
            Err(ServiceError::InvalidState { .. })
        ));

        clock.arm(DELAY, PERIOD).unwrap();
        assert!(matches!(
            clock.change_period(Cadence::Every(Duration::ZERO)),
            Err(ServiceError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_arm_outside_runtime_is_invalid_state() {
        let (mut clock, _count) = counting_clock();
        assert!(matches!(
            clock.arm(DELAY, PERIOD),
            Err(ServiceError::InvalidState { .. })
        ));
        assert!(!clock.is_armed());
    }
}
