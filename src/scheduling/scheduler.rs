//! # Cooperative scheduler capability.
//!
//! [`Scheduler`] is the one seam the countdown timer needs: register a repeating
//! action at an interval, and cancel it.
//!
//! ## Rules
//! - The action receives the monotonic time elapsed since its previous firing
//!   (or since it was scheduled, for the first firing).
//! - A scheduler that falls behind fires **once** when it resumes, with the full
//!   elapsed time; it never replays missed firings back-to-back.
//! - `cancel` is synchronous: once it returns, the action is not started again.
//!   Cancelling an unknown or already-cancelled token is a no-op.
//! - Actions may call back into the scheduler (e.g. cancel themselves).
//! - A scheduler that can be shut down reports it through `is_shut_down`, so
//!   callers can refuse to start work that would never fire.

use std::sync::Arc;
use std::time::Duration;

/// Repeating action; the argument is the elapsed time since the previous firing.
pub type TickAction = Arc<dyn Fn(Duration) + Send + Sync>;

/// Handle identifying one scheduled action within its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleToken(pub(crate) u64);

impl ScheduleToken {
    /// Raw numeric id (for logs).
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Registers and cancels repeating actions.
pub trait Scheduler: Send + Sync {
    /// Schedules `action` to fire every `interval`, first after one interval.
    fn schedule_repeating(&self, interval: Duration, action: TickAction) -> ScheduleToken;

    /// Cancels a scheduled action.
    fn cancel(&self, token: ScheduleToken);

    /// True once the scheduler stopped firing for good; new schedules never fire.
    fn is_shut_down(&self) -> bool {
        false
    }
}
