//! Time sources for the turn engine.
//!
//! The engine reads wall-clock time through [`Clock`] and schedules per-turn
//! timeouts through [`TurnTimer`]. Both are injected so tests can drive time
//! by hand with [`ManualClock`].
//!
//! A timer never calls into the engine. When it elapses, the host passes the
//! [`TimerToken`] it was armed with to
//! [`TurnEngine::handle_timeout`](crate::TurnEngine::handle_timeout), which
//! ignores any token that is no longer pending.

use chrono::{DateTime, Utc};
use derive_more::Display;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, instrument, trace};

/// Source of the current time.
pub trait Clock: Send {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Identifies one arming of a turn timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("timer#{}", _0)]
pub struct TimerToken(u64);

impl TimerToken {
    pub(crate) fn first() -> Self {
        Self(1)
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Single-shot, cancellable timer used for per-turn timeouts.
///
/// At most one token is armed at a time: the engine cancels the previous
/// token before arming a new one.
pub trait TurnTimer: Send {
    /// Schedules `token` to elapse after `after`.
    fn arm(&mut self, token: TimerToken, after: Duration);

    /// Cancels `token` if it is still pending.
    fn cancel(&mut self, token: TimerToken);
}

fn offset(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(by)
        .ok()
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Moves `state` toward `target`, stopping at the pending deadline if it
/// falls first.
fn step_toward(state: &mut ManualState, target: DateTime<Utc>) -> Option<TimerToken> {
    match state.pending {
        Some((token, deadline)) if deadline <= target => {
            debug!(%token, %deadline, "Manual timer elapsed");
            state.now = state.now.max(deadline);
            state.pending = None;
            Some(token)
        }
        _ => {
            state.now = target;
            None
        }
    }
}

#[derive(Debug)]
struct ManualState {
    now: DateTime<Utc>,
    pending: Option<(TimerToken, DateTime<Utc>)>,
}

/// Deterministic clock and timer for tests.
///
/// Clones share the same state, so one handle can be given to the engine as
/// its clock, another as its timer, and a third kept by the test to move
/// time forward.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    /// Creates a manual clock starting at `start`.
    #[instrument]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                now: start,
                pending: None,
            })),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ManualState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Moves time forward by `by`, stopping early at the pending deadline.
    ///
    /// If the pending token falls due within `by`, the clock stops at its
    /// deadline and returns it. The token is consumed; the caller hands it to
    /// the engine. Use [`ManualClock::run_for`] to cover a span that may hold
    /// several deadlines.
    #[instrument(skip(self))]
    pub fn advance(&self, by: Duration) -> Option<TimerToken> {
        self.with_state(|state| {
            let target = offset(state.now, by);
            step_toward(state, target)
        })
    }

    /// Moves time forward by `by`, handing every token that falls due to
    /// `on_elapsed` at its own deadline.
    ///
    /// `on_elapsed` may re-arm the timer; a re-armed token that falls due
    /// before the end of the span is delivered in the same call. Returns the
    /// number of tokens delivered. A zero-length interval re-armed from
    /// `on_elapsed` never lets the span end.
    #[instrument(skip(self, on_elapsed))]
    pub fn run_for(&self, by: Duration, mut on_elapsed: impl FnMut(TimerToken)) -> usize {
        let target = self.with_state(|state| offset(state.now, by));
        let mut delivered = 0;
        while let Some(token) = self.with_state(|state| step_toward(state, target)) {
            delivered += 1;
            on_elapsed(token);
        }
        delivered
    }

    /// Token that is currently armed, if any.
    pub fn pending(&self) -> Option<TimerToken> {
        self.with_state(|state| state.pending.map(|(token, _)| token))
    }

    /// Deadline of the currently armed token, if any.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.with_state(|state| state.pending.map(|(_, deadline)| deadline))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.with_state(|state| state.now)
    }
}

impl TurnTimer for ManualClock {
    fn arm(&mut self, token: TimerToken, after: Duration) {
        self.with_state(|state| {
            let deadline = offset(state.now, after);
            trace!(%token, %deadline, "Arming manual timer");
            state.pending = Some((token, deadline));
        });
    }

    fn cancel(&mut self, token: TimerToken) {
        self.with_state(|state| {
            if state.pending.map(|(pending, _)| pending) == Some(token) {
                trace!(%token, "Cancelling manual timer");
                state.pending = None;
            }
        });
    }
}
