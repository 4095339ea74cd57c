//! # signalvisor
//!
//! **Signalvisor** dispatches application lifecycle and environment signals to
//! registered observers, and drives countdown timers with periodic callbacks.
//!
//! It guarantees ordering, idempotent registration, and safe listener lifetimes
//! across asynchronous platform events (foreground/background transitions,
//! network reachability changes, day boundaries). Every platform touch point sits
//! behind a narrow trait so it can be replaced in tests.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   platform glue                      reachability primitive
//!        │ post(AppNotification)              │ callback(bool)
//!        ▼                                    ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  SignalHub                                                        │
//! │  - NotificationCenter (broadcast, capacity from Config)           │
//! │  - dispatch loop (single task, posting order)                     │
//! │  - ApplicationHandler / DayChangeHandler                          │
//! │  - ReachabilityMonitor (optional)                                 │
//! │  - TokioScheduler (shared by countdown timers)                    │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!  ListenerRegistry   ListenerRegistry   ListenerRegistry
//!   "application"       "day_change"      "reachability"
//!        │                  │                  │
//!   (Weak → Arc, insertion order, panic isolated per listener)
//!        ▼                  ▼                  ▼
//!  lifecycle delegates  day delegates   reachability listeners
//! ```
//!
//! ### Countdown
//! ```text
//! CountdownTimer::start(interval, scheduler)
//!   ├─► did_start(interval)
//!   └─► scheduler.schedule_repeating(notification_interval, tick)
//!
//! tick(elapsed):
//!   remained = remained.saturating_sub(elapsed)
//!   ├─ remained > 0  ─► did_countdown(remained)
//!   └─ remained == 0 ─► Inactive, cancel, did_countdown(0)
//!
//! stop():  Running ─► Inactive, cancel, did_stop(remained)
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                                     |
//! |-------------------|----------------------------------------------------------|--------------------------------------------------------|
//! | **Registries**    | Weak, identity-keyed listener lists with fan-out.        | [`ListenerRegistry`], [`NotifyReport`]                 |
//! | **Lifecycle**     | App lifecycle and day-change routing.                    | [`ApplicationHandler`], [`DayChangeHandler`]           |
//! | **Reachability**  | Republishes a primitive's network state changes.         | [`ReachabilityMonitor`], [`Reachability`]              |
//! | **Countdown**     | Remaining-time timer with a single delegate.             | [`CountdownTimer`], [`CountdownTimerDelegate`]         |
//! | **Scheduling**    | Repeating timers on a run loop or on tokio.              | [`Scheduler`], [`RunLoop`], [`TokioScheduler`]         |
//! | **Assembly**      | Owns the managers and the notification dispatch loop.    | [`SignalHub`]                                          |
//! | **Errors**        | Typed registration and reachability errors.              | [`ListenerError`], [`ReachabilityError`]               |
//! | **Configuration** | Centralized settings.                                    | [`Config`]                                             |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogListener`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use signalvisor::{Config, CountdownTimerDelegate, SignalHub};
//!
//! struct ResendButton;
//!
//! impl CountdownTimerDelegate for ResendButton {
//!     fn did_start(&self, _interval: Duration) { /* disable button */ }
//!     fn did_countdown(&self, remained: Duration) {
//!         if remained.is_zero() { /* enable button */ }
//!     }
//!     fn did_stop(&self, _remained: Duration) { /* enable button */ }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = SignalHub::builder(Config::default()).build()?;
//!
//!     let button: Arc<dyn CountdownTimerDelegate> = Arc::new(ResendButton);
//!     let timer = hub.countdown_timer();
//!     timer.set_delegate(&button);
//!     timer.start(Duration::from_secs(30), hub.scheduler());
//!
//!     timer.stop();
//!     hub.shutdown();
//!     Ok(())
//! }
//! ```
mod application;
mod config;
mod error;
mod hub;
mod listeners;
mod notifications;
mod reachability;
mod scheduling;
mod timer;

// ---- Public re-exports ----

pub use application::{
    AppState, ApplicationHandler, ApplicationHandlerDelegate, DayChangeHandler,
    DayChangeHandlerDelegate,
};
pub use config::Config;
pub use error::{ListenerError, ReachabilityError};
pub use hub::{SignalHub, SignalHubBuilder};
pub use listeners::{ListenerId, ListenerRegistry, NotifyReport};
pub use notifications::{AppNotification, NotificationCenter, NotificationKind};
pub use reachability::{
    Reachability, ReachabilityCallback, ReachabilityListenerDelegate, ReachabilityManager,
    ReachabilityMonitor, ReachabilitySwitch,
};
pub use scheduling::{RunLoop, RunLoopMode, ScheduleToken, Scheduler, TickAction, TokioScheduler};
pub use timer::{CountdownTimer, CountdownTimerDelegate, CountdownTimerState};

// Optional: expose a simple built-in logging listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use listeners::LogListener;
