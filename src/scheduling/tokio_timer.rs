//! # TokioScheduler: real-time scheduler on the tokio timer wheel.
//!
//! Each scheduled action gets its own task driven by [`tokio::time::interval`]
//! with [`MissedTickBehavior::Delay`], and its own child [`CancellationToken`].
//!
//! ## Architecture
//! ```text
//! schedule_repeating(interval, action)
//!     ├─► root.child_token() ──► tokens[id]
//!     └─► spawn:
//!           loop {
//!             select! {
//!               token.cancelled() ─► exit
//!               ticker.tick()     ─► action(now - last)   (panic caught + logged)
//!             }
//!           }
//!
//! cancel(token) ─► tokens.remove(id).cancel()
//! drop(scheduler) ─► root.cancel() ─► every task exits
//! ```
//!
//! ## Notes
//! - On a multi-threaded runtime an action that already started may still be
//!   running when `cancel` returns. Callers that need a hard cut-off serialize
//!   their own delivery and re-check a generation under it, as
//!   [`CountdownTimer`](crate::CountdownTimer) does.
//! - After [`shutdown`](TokioScheduler::shutdown) new schedules are refused:
//!   `is_shut_down()` turns true and the returned token never fires.
//! - Intervals below 1ms are clamped to 1ms.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::MIN_NOTIFICATION_INTERVAL;
use crate::listeners::panic_message;

use super::scheduler::{ScheduleToken, Scheduler, TickAction};

/// Scheduler backed by tokio timers.
pub struct TokioScheduler {
    handle: Handle,
    root: CancellationToken,
    next_id: AtomicU64,
    tokens: Mutex<HashMap<u64, CancellationToken>>,
}

impl TokioScheduler {
    /// Creates a scheduler on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    /// Creates a scheduler that spawns onto `handle`.
    #[must_use]
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            root: CancellationToken::new(),
            next_id: AtomicU64::new(0),
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Number of scheduled (not cancelled) actions.
    pub fn active_count(&self) -> usize {
        self.tokens().len()
    }

    /// Cancels every scheduled action. Later schedules never fire.
    pub fn shutdown(&self) {
        self.root.cancel();
        self.tokens().clear();
    }

    fn tokens(&self) -> MutexGuard<'_, HashMap<u64, CancellationToken>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, interval: Duration, action: TickAction) -> ScheduleToken {
        let period = interval.max(MIN_NOTIFICATION_INTERVAL);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if self.root.is_cancelled() {
            tracing::warn!(timer = id, "schedule refused, scheduler is shut down");
            return ScheduleToken(id);
        }
        let token = self.root.child_token();
        self.tokens().insert(id, token.clone());

        let start = Instant::now();
        self.handle.spawn(async move {
            let mut ticker = time::interval_at(start + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last = start;

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if token.is_cancelled() {
                            break;
                        }
                        let now = Instant::now();
                        let elapsed = now.saturating_duration_since(last);
                        last = now;
                        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| action(elapsed))) {
                            tracing::error!(
                                timer = id,
                                panic = %panic_message(payload.as_ref()),
                                "scheduled action panicked"
                            );
                        }
                    }
                }
            }
            tracing::trace!(timer = id, "scheduled action finished");
        });

        ScheduleToken(id)
    }

    fn cancel(&self, token: ScheduleToken) {
        if let Some(t) = self.tokens().remove(&token.0) {
            t.cancel();
        }
    }

    fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

impl fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("active", &self.active_count())
            .field("shut_down", &self.root.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn counting(log: &Arc<Mutex<Vec<Duration>>>) -> TickAction {
        let log = log.clone();
        Arc::new(move |elapsed: Duration| log.lock().unwrap().push(elapsed))
    }

    #[tokio::test(start_paused = true)]
    async fn fires_each_period_until_cancelled() {
        let sched = TokioScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let token = sched.schedule_repeating(Duration::from_secs(1), counting(&log));

        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(log.lock().unwrap().clone(), vec![Duration::from_secs(1); 3]);

        sched.cancel(token);
        assert_eq!(sched.active_count(), 0);
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_everything() {
        let sched = TokioScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        sched.schedule_repeating(Duration::from_secs(1), counting(&log));
        sched.schedule_repeating(Duration::from_secs(2), counting(&log));

        sched.shutdown();
        assert!(sched.is_shut_down());
        sched.schedule_repeating(Duration::from_secs(1), counting(&log));
        assert_eq!(sched.active_count(), 0);

        time::sleep(Duration::from_secs(5)).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_clamped() {
        let sched = TokioScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let token = sched.schedule_repeating(Duration::ZERO, counting(&log));

        time::sleep(Duration::from_millis(5)).await;
        sched.cancel(token);
        let seen = log.lock().unwrap().clone();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|d| *d >= Duration::from_millis(1)));
    }
}
