//! # CountdownTimer: single-delegate countdown on a cooperative scheduler.
//!
//! ## State machine
//! ```text
//!            start(interval)                    tick: remained > 0
//! Inactive ──────────────────► Running ◄───────────────────────┐
//!    ▲                            │ │                          │
//!    │  stop(): did_stop(rem)     │ └──── did_countdown(rem) ──┘
//!    ├────────────────────────────┤
//!    │  tick: remained == 0       │
//!    └──── did_countdown(0) ──────┘
//!
//! start() while Running: cancel old schedule, fresh countdown, did_start again
//!                        (no did_stop for the superseded run)
//! ```
//!
//! ## Rules
//! - `did_start` is delivered synchronously from `start`, before any tick.
//! - The final callback of a natural run is `did_countdown(0)`; `did_stop` is
//!   reserved for explicit cancellation. Exactly one of them ends a run.
//! - Every run carries a generation number, re-checked under the timer's
//!   dispatch guard right before the delegate is called; ticks from a stopped or
//!   superseded run are discarded, so nothing is observed after `stop()` returns,
//!   whichever thread the scheduler ticks on.
//! - Delegate calls are serialized per timer. The guard is reentrant: callbacks
//!   may call `start`/`stop` on the same timer.
//! - Remaining time only decreases while running and saturates at zero.
//! - The notification interval is frozen for a run when it starts.
//! - A scheduler that reports itself shut down is refused by `start`.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use signalvisor::{CountdownTimer, CountdownTimerDelegate, CountdownTimerState, RunLoop, RunLoopMode};
//!
//! #[derive(Default)]
//! struct Ticks(Mutex<Vec<u64>>);
//!
//! impl CountdownTimerDelegate for Ticks {
//!     fn did_start(&self, _interval: Duration) {}
//!     fn did_countdown(&self, remained: Duration) {
//!         self.0.lock().unwrap().push(remained.as_secs());
//!     }
//!     fn did_stop(&self, _remained: Duration) {}
//! }
//!
//! let run_loop = RunLoop::new();
//! let ticks = Arc::new(Ticks::default());
//! let delegate: Arc<dyn CountdownTimerDelegate> = ticks.clone();
//!
//! let timer = CountdownTimer::new(Duration::from_secs(1));
//! timer.set_delegate(&delegate);
//! timer.start(Duration::from_secs(3), run_loop.scheduler(RunLoopMode::Common));
//!
//! for _ in 0..3 {
//!     run_loop.advance(Duration::from_secs(1), RunLoopMode::Default);
//! }
//! assert_eq!(*ticks.0.lock().unwrap(), vec![2, 1, 0]);
//! assert_eq!(timer.state(), CountdownTimerState::Inactive);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use parking_lot::ReentrantMutex;

use crate::config::{Config, MIN_NOTIFICATION_INTERVAL};
use crate::scheduling::{ScheduleToken, Scheduler};

/// Countdown timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountdownTimerState {
    /// Not counting; `stop()` is a no-op.
    Inactive,
    /// Counting down; ticks are scheduled.
    Running,
}

/// Receiver of countdown progress.
pub trait CountdownTimerDelegate: Send + Sync {
    /// A run started with `interval` remaining.
    fn did_start(&self, interval: Duration);

    /// A tick happened; `remained_interval` is zero on the final tick.
    fn did_countdown(&self, remained_interval: Duration);

    /// The run was stopped explicitly with `remained_interval` left.
    fn did_stop(&self, remained_interval: Duration);
}

struct Schedule {
    scheduler: Arc<dyn Scheduler>,
    token: ScheduleToken,
}

impl Schedule {
    fn cancel(self) {
        tracing::trace!(schedule = self.token.id(), "countdown schedule cancelled");
        self.scheduler.cancel(self.token);
    }
}

struct Run {
    state: CountdownTimerState,
    generation: u64,
    remained: Duration,
    /// Period of the current (or last) run.
    notification_interval: Duration,
    /// Period the next `start` will use.
    configured_interval: Duration,
    schedule: Option<Schedule>,
}

enum Step {
    Countdown(Duration),
    Finished(Option<Schedule>),
}

struct Shared {
    /// Held while the run changes hands and while the delegate is called.
    /// Reentrant so callbacks can call `start`/`stop` on the same thread.
    dispatch: ReentrantMutex<()>,
    run: Mutex<Run>,
    delegate: Mutex<Option<Weak<dyn CountdownTimerDelegate>>>,
}

impl Shared {
    fn run(&self) -> MutexGuard<'_, Run> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn delegate(&self) -> Option<Arc<dyn CountdownTimerDelegate>> {
        self.delegate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade)
    }

    fn tick(&self, generation: u64, elapsed: Duration) {
        let _dispatch = self.dispatch.lock();
        let step = {
            let mut run = self.run();
            if run.generation != generation || run.state != CountdownTimerState::Running {
                return;
            }
            run.remained = run.remained.saturating_sub(elapsed);
            if run.remained.is_zero() {
                run.state = CountdownTimerState::Inactive;
                run.generation += 1;
                Step::Finished(run.schedule.take())
            } else {
                Step::Countdown(run.remained)
            }
        };

        let remained = match step {
            Step::Countdown(remained) => {
                tracing::trace!(?remained, ?elapsed, "countdown tick");
                remained
            }
            Step::Finished(schedule) => {
                if let Some(schedule) = schedule {
                    schedule.cancel();
                }
                tracing::debug!("countdown finished");
                Duration::ZERO
            }
        };

        if let Some(delegate) = self.delegate() {
            delegate.did_countdown(remained);
        }
    }

    /// Ends a running countdown; `notify` selects whether `did_stop` is sent.
    fn stop(&self, notify: bool) {
        let _dispatch = self.dispatch.lock();
        let (remained, schedule) = {
            let mut run = self.run();
            if run.state != CountdownTimerState::Running {
                return;
            }
            run.state = CountdownTimerState::Inactive;
            run.generation += 1;
            (run.remained, run.schedule.take())
        };
        if let Some(schedule) = schedule {
            schedule.cancel();
        }
        tracing::debug!(?remained, notify, "countdown stopped");

        if notify {
            if let Some(delegate) = self.delegate() {
                delegate.did_stop(remained);
            }
        }
    }
}

/// Countdown reporting remaining time to one weakly held delegate.
///
/// Delegate calls for one timer never overlap, and once `stop()` returns on
/// any thread no further callback of that run is delivered. Dropping the timer
/// cancels its schedule without notifying the delegate.
pub struct CountdownTimer {
    shared: Arc<Shared>,
}

impl CountdownTimer {
    /// Creates an inactive timer ticking every `notification_interval` (min 1ms).
    #[must_use]
    pub fn new(notification_interval: Duration) -> Self {
        let period = notification_interval.max(MIN_NOTIFICATION_INTERVAL);
        Self {
            shared: Arc::new(Shared {
                dispatch: ReentrantMutex::new(()),
                run: Mutex::new(Run {
                    state: CountdownTimerState::Inactive,
                    generation: 0,
                    remained: Duration::ZERO,
                    notification_interval: period,
                    configured_interval: period,
                    schedule: None,
                }),
                delegate: Mutex::new(None),
            }),
        }
    }

    /// Creates an inactive timer using [`Config::notification_interval`].
    #[must_use]
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.notification_interval_clamped())
    }

    /// Sets the delegate (held weakly). Does not affect a running countdown.
    pub fn set_delegate(&self, delegate: &Arc<dyn CountdownTimerDelegate>) {
        *self
            .shared
            .delegate
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::downgrade(delegate));
    }

    /// Removes the delegate. A running countdown keeps running silently.
    pub fn clear_delegate(&self) {
        self.shared
            .delegate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn state(&self) -> CountdownTimerState {
        self.shared.run().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == CountdownTimerState::Running
    }

    /// Time left in the current run (or where the last run ended).
    pub fn remained_interval(&self) -> Duration {
        self.shared.run().remained
    }

    /// Tick period of the current run; when inactive, the period the next run will use.
    pub fn notification_interval(&self) -> Duration {
        let run = self.shared.run();
        match run.state {
            CountdownTimerState::Running => run.notification_interval,
            CountdownTimerState::Inactive => run.configured_interval,
        }
    }

    /// Changes the tick period for the next `start` (min 1ms).
    ///
    /// A running countdown keeps the period it started with.
    pub fn set_notification_interval(&self, interval: Duration) {
        self.shared.run().configured_interval = interval.max(MIN_NOTIFICATION_INTERVAL);
    }

    /// Starts counting down `interval` with ticks on `scheduler`.
    ///
    /// If already running, the previous run is cancelled without `did_stop` and
    /// a fresh countdown begins. A scheduler that was shut down is refused: the
    /// call logs a warning and changes nothing.
    pub fn start(&self, interval: Duration, scheduler: Arc<dyn Scheduler>) {
        if scheduler.is_shut_down() {
            tracing::warn!(?interval, "countdown not started, scheduler is shut down");
            return;
        }

        let _dispatch = self.shared.dispatch.lock();
        let (generation, period, superseded, restarted) = {
            let mut run = self.shared.run();
            run.generation += 1;
            let restarted = run.state == CountdownTimerState::Running;
            run.state = CountdownTimerState::Running;
            run.remained = interval;
            run.notification_interval = run.configured_interval;
            (
                run.generation,
                run.notification_interval,
                run.schedule.take(),
                restarted,
            )
        };
        if let Some(schedule) = superseded {
            schedule.cancel();
        }

        // ticks from other threads wait on `dispatch` until did_start returned
        let weak = Arc::downgrade(&self.shared);
        let token = scheduler.schedule_repeating(
            period,
            Arc::new(move |elapsed: Duration| {
                if let Some(shared) = weak.upgrade() {
                    shared.tick(generation, elapsed);
                }
            }),
        );
        tracing::debug!(
            ?interval,
            ?period,
            restarted,
            schedule = token.id(),
            "countdown started"
        );
        self.shared.run().schedule = Some(Schedule { scheduler, token });

        if let Some(delegate) = self.shared.delegate() {
            delegate.did_start(interval);
        }
    }

    /// Stops a running countdown and reports the time left.
    ///
    /// No-op (and no callback) when inactive. Waits for a callback of this
    /// timer that is in progress on another thread.
    pub fn stop(&self) {
        self.shared.stop(true);
    }

    pub(crate) fn handle(&self) -> CountdownHandle {
        CountdownHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.shared.stop(false);
    }
}

impl fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = self.shared.run();
        f.debug_struct("CountdownTimer")
            .field("state", &run.state)
            .field("remained", &run.remained)
            .field("notification_interval", &run.notification_interval)
            .finish()
    }
}

/// Weak handle used by the hub to stop timers it handed out.
#[derive(Clone)]
pub(crate) struct CountdownHandle {
    shared: Weak<Shared>,
}

impl CountdownHandle {
    pub(crate) fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }

    /// Stops the timer (with `did_stop`) if it still exists and is running.
    pub(crate) fn stop(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.stop(true);
        }
    }
}
