//! # RunLoop: manually pumped, mode-scoped scheduler.
//!
//! A [`RunLoop`] owns a virtual monotonic clock and a set of repeating timers.
//! Nothing fires until the owner pumps it with [`RunLoop::advance`], the way a
//! UI thread's run loop only services timers while it spins.
//!
//! ## Modes
//! ```text
//! timer mode   pumped in Default   pumped in Tracking
//! Default            fires            suspended
//! Tracking         suspended            fires
//! Common             fires              fires
//! ```
//! A suspended timer is not lost: it fires once, with the full elapsed time, on
//! the next pump in a matching mode.
//!
//! ## Rules
//! - Each due timer fires at most once per pump; missed periods collapse.
//! - Due timers fire in deadline order (ties by scheduling order).
//! - Actions run without the loop lock held; they may schedule or cancel.
//! - A timer cancelled by an earlier action in the same pump does not fire.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//! use signalvisor::{RunLoop, RunLoopMode, Scheduler};
//!
//! let run_loop = RunLoop::new();
//! let fired = Arc::new(AtomicUsize::new(0));
//! let counter = fired.clone();
//!
//! run_loop
//!     .scheduler(RunLoopMode::Default)
//!     .schedule_repeating(Duration::from_secs(1), Arc::new(move |_elapsed: Duration| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     }));
//!
//! run_loop.advance(Duration::from_secs(1), RunLoopMode::Tracking); // suspended
//! assert_eq!(fired.load(Ordering::SeqCst), 0);
//!
//! run_loop.advance(Duration::ZERO, RunLoopMode::Default);
//! assert_eq!(fired.load(Ordering::SeqCst), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::listeners::panic_message;

use super::scheduler::{ScheduleToken, Scheduler, TickAction};

/// Scope a run-loop timer is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunLoopMode {
    /// Regular event processing.
    Default,
    /// Active user interaction (scrolling, dragging).
    Tracking,
    /// Placeholder mode: timers bound to it run in every mode.
    Common,
}

impl RunLoopMode {
    #[inline]
    fn runs_in(self, pumping: RunLoopMode) -> bool {
        self == RunLoopMode::Common || self == pumping
    }
}

struct LoopTimer {
    interval: Duration,
    mode: RunLoopMode,
    last_fire: Duration,
    next_fire: Duration,
    action: TickAction,
}

#[derive(Default)]
struct LoopState {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<u64, LoopTimer>,
}

/// Cooperative run loop with a virtual clock.
///
/// Cloning yields another handle to the same loop.
#[derive(Clone, Default)]
pub struct RunLoop {
    state: Arc<Mutex<LoopState>>,
}

impl RunLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Time on the loop's virtual clock (starts at zero).
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of scheduled timers.
    pub fn timer_count(&self) -> usize {
        self.lock().timers.len()
    }

    /// Returns a [`Scheduler`] whose timers are bound to `mode`.
    pub fn scheduler(&self, mode: RunLoopMode) -> Arc<dyn Scheduler> {
        Arc::new(RunLoopScheduler {
            run_loop: self.clone(),
            mode,
        })
    }

    /// Moves the clock forward by `by` and fires every timer due in `mode`.
    ///
    /// Returns how many actions ran.
    pub fn advance(&self, by: Duration, mode: RunLoopMode) -> usize {
        let due = self.collect_due(by, mode);

        let mut fired = 0;
        for (id, action, elapsed) in due {
            if !self.lock().timers.contains_key(&id) {
                continue;
            }
            fired += 1;
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| action(elapsed))) {
                tracing::error!(
                    timer = id,
                    panic = %panic_message(payload.as_ref()),
                    "run loop timer action panicked"
                );
            }
        }
        fired
    }

    /// Advances the clock and reschedules due timers, under one lock.
    fn collect_due(&self, by: Duration, mode: RunLoopMode) -> Vec<(u64, TickAction, Duration)> {
        let mut state = self.lock();
        state.now += by;
        let now = state.now;

        let mut due: Vec<(Duration, u64)> = state
            .timers
            .iter()
            .filter(|(_, t)| t.mode.runs_in(mode) && t.next_fire <= now)
            .map(|(id, t)| (t.next_fire, *id))
            .collect();
        due.sort_unstable();

        due.into_iter()
            .filter_map(|(_, id)| {
                let timer = state.timers.get_mut(&id)?;
                let elapsed = now.saturating_sub(timer.last_fire);
                timer.last_fire = now;
                timer.next_fire = now + timer.interval;
                Some((id, timer.action.clone(), elapsed))
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, LoopState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for RunLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("RunLoop")
            .field("now", &state.now)
            .field("timers", &state.timers.len())
            .finish()
    }
}

/// Mode-bound scheduling handle into a [`RunLoop`].
struct RunLoopScheduler {
    run_loop: RunLoop,
    mode: RunLoopMode,
}

impl Scheduler for RunLoopScheduler {
    fn schedule_repeating(&self, interval: Duration, action: TickAction) -> ScheduleToken {
        let mut state = self.run_loop.lock();
        let id = state.next_id;
        state.next_id += 1;
        let now = state.now;
        state.timers.insert(
            id,
            LoopTimer {
                interval,
                mode: self.mode,
                last_fire: now,
                next_fire: now + interval,
                action,
            },
        );
        ScheduleToken(id)
    }

    fn cancel(&self, token: ScheduleToken) {
        self.run_loop.lock().timers.remove(&token.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Arc<Mutex<Vec<(&'static str, Duration)>>>;

    fn recording(name: &'static str, log: &Log) -> TickAction {
        let log = log.clone();
        Arc::new(move |elapsed: Duration| log.lock().unwrap().push((name, elapsed)))
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn fires_every_interval_with_elapsed() {
        let rl = RunLoop::new();
        let log = Log::default();
        rl.scheduler(RunLoopMode::Default)
            .schedule_repeating(secs(1), recording("t", &log));

        assert_eq!(rl.advance(Duration::from_millis(500), RunLoopMode::Default), 0);
        assert_eq!(rl.advance(Duration::from_millis(500), RunLoopMode::Default), 1);
        assert_eq!(rl.advance(secs(1), RunLoopMode::Default), 1);

        assert_eq!(log.lock().unwrap().clone(), vec![("t", secs(1)), ("t", secs(1))]);
        assert_eq!(rl.now(), secs(2));
    }

    #[test]
    fn late_pump_fires_once_with_full_elapsed() {
        let rl = RunLoop::new();
        let log = Log::default();
        rl.scheduler(RunLoopMode::Default)
            .schedule_repeating(secs(1), recording("t", &log));

        assert_eq!(rl.advance(secs(3), RunLoopMode::Default), 1);
        assert_eq!(rl.advance(Duration::from_millis(999), RunLoopMode::Default), 0);
        assert_eq!(rl.advance(Duration::from_millis(1), RunLoopMode::Default), 1);

        assert_eq!(log.lock().unwrap().clone(), vec![("t", secs(3)), ("t", secs(1))]);
    }

    #[test]
    fn tracking_pump_suspends_default_timers() {
        let rl = RunLoop::new();
        let log = Log::default();
        rl.scheduler(RunLoopMode::Default)
            .schedule_repeating(secs(1), recording("default", &log));
        rl.scheduler(RunLoopMode::Common)
            .schedule_repeating(secs(1), recording("common", &log));

        rl.advance(secs(1), RunLoopMode::Tracking);
        rl.advance(secs(1), RunLoopMode::Tracking);
        rl.advance(Duration::ZERO, RunLoopMode::Default);

        assert_eq!(
            log.lock().unwrap().clone(),
            vec![("common", secs(1)), ("common", secs(1)), ("default", secs(2))]
        );
    }

    #[test]
    fn cancel_is_immediate() {
        let rl = RunLoop::new();
        let log = Log::default();
        let sched = rl.scheduler(RunLoopMode::Default);
        let token = sched.schedule_repeating(secs(1), recording("t", &log));
        sched.cancel(token);
        sched.cancel(token);

        assert_eq!(rl.advance(secs(5), RunLoopMode::Default), 0);
        assert_eq!(rl.timer_count(), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn action_cancelling_a_later_timer_prevents_its_firing() {
        let rl = RunLoop::new();
        let log = Log::default();
        let sched = rl.scheduler(RunLoopMode::Default);

        let victim_slot: Arc<Mutex<Option<ScheduleToken>>> = Arc::default();
        let slot = victim_slot.clone();
        let killer_sched = rl.scheduler(RunLoopMode::Default);
        let killer_log = log.clone();
        sched.schedule_repeating(
            secs(1),
            Arc::new(move |elapsed: Duration| {
                killer_log.lock().unwrap().push(("killer", elapsed));
                if let Some(token) = slot.lock().unwrap().take() {
                    killer_sched.cancel(token);
                }
            }),
        );
        let victim = sched.schedule_repeating(secs(1), recording("victim", &log));
        *victim_slot.lock().unwrap() = Some(victim);

        assert_eq!(rl.advance(secs(1), RunLoopMode::Default), 1);
        assert_eq!(log.lock().unwrap().clone(), vec![("killer", secs(1))]);
    }

    #[test]
    fn panicking_action_does_not_stop_the_loop() {
        let rl = RunLoop::new();
        let log = Log::default();
        let sched = rl.scheduler(RunLoopMode::Default);
        sched.schedule_repeating(secs(1), Arc::new(|_: Duration| panic!("tick failed")));
        sched.schedule_repeating(secs(1), recording("ok", &log));

        assert_eq!(rl.advance(secs(1), RunLoopMode::Default), 2);
        assert_eq!(log.lock().unwrap().len(), 1);
    }
}
