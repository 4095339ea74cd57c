//! Scheduling substrate for repeating timers.
//!
//! ## Contents
//! - [`Scheduler`] the capability: `schedule_repeating` / `cancel`
//! - [`RunLoop`] manually pumped, mode-scoped implementation with a virtual clock
//! - [`TokioScheduler`] real-time implementation on tokio timers
//!
//! ## Quick wiring
//! ```text
//! CountdownTimer::start(interval, scheduler)
//!      └─► scheduler.schedule_repeating(notification_interval, tick)
//!               ├─ RunLoop:        fires on advance(by, mode)
//!               └─ TokioScheduler: fires on the tokio timer wheel
//! ```

mod run_loop;
mod scheduler;
mod tokio_timer;

pub use run_loop::{RunLoop, RunLoopMode};
pub use scheduler::{ScheduleToken, Scheduler, TickAction};
pub use tokio_timer::TokioScheduler;
