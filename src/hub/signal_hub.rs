//! # SignalHub: owns the managers and routes posted notifications to them.
//!
//! The [`SignalHub`] owns the [`NotificationCenter`], the application and
//! day-change handlers, an optional [`ReachabilityMonitor`], and a shared
//! [`TokioScheduler`] for countdown timers.
//!
//! ## High-level architecture
//! ```text
//! Platform glue:
//!   post(AppNotification) ──► NotificationCenter (broadcast)
//!                                   │
//!                                   ▼
//!                        dispatch loop (one task, posting order)
//!                           ├─► ApplicationHandler::handle ─► lifecycle delegates
//!                           └─► DayChangeHandler::handle   ─► day-change delegates
//!
//! Reachability primitive ──► ReachabilityMonitor ──► reachability listeners
//!                            (callback driven, no dispatch loop)
//!
//! countdown_timer() ──► CountdownTimer::from_config(cfg)
//! scheduler()       ──► shared TokioScheduler
//!
//! Shutdown path:
//!   shutdown() / drop
//!        └─► runtime_token.cancel() ─► dispatch loop exits
//!        └─► hub timers stop        ─► did_stop(remained) for running ones
//!        └─► scheduler.shutdown()   ─► every scheduled tick stops, new starts refused
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use signalvisor::{
//!     AppNotification, AppState, ApplicationHandlerDelegate, Config, NotificationKind, SignalHub,
//! };
//!
//! struct Resumer;
//!
//! impl ApplicationHandlerDelegate for Resumer {
//!     fn did_receive_will_enter_foreground(&self, _n: &AppNotification) {
//!         // refresh state after coming back
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = SignalHub::builder(Config::default()).build()?;
//!
//!     let resumer: Arc<dyn ApplicationHandlerDelegate> = Arc::new(Resumer);
//!     hub.application().add_delegate(&resumer)?;
//!
//!     hub.notifications().post_kind(NotificationKind::WillEnterForeground);
//!     tokio::task::yield_now().await;
//!
//!     assert_eq!(hub.application().state(), AppState::Foreground);
//!     hub.shutdown();
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use super::builder::SignalHubBuilder;
use crate::{
    application::{ApplicationHandler, DayChangeHandler},
    config::Config,
    notifications::NotificationCenter,
    reachability::ReachabilityMonitor,
    scheduling::{Scheduler, TokioScheduler},
    timer::{CountdownHandle, CountdownTimer},
};

/// Owner of every signal manager and of the notification dispatch loop.
pub struct SignalHub {
    cfg: Config,
    center: NotificationCenter,
    application: Arc<ApplicationHandler>,
    day_change: Arc<DayChangeHandler>,
    reachability: Option<Arc<ReachabilityMonitor>>,
    scheduler: Arc<TokioScheduler>,
    timers: Mutex<Vec<CountdownHandle>>,
    runtime_token: CancellationToken,
}

impl SignalHub {
    /// Creates a builder for configuring the hub.
    #[must_use]
    pub fn builder(cfg: Config) -> SignalHubBuilder {
        SignalHubBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: Config,
        center: NotificationCenter,
        application: Arc<ApplicationHandler>,
        day_change: Arc<DayChangeHandler>,
        reachability: Option<Arc<ReachabilityMonitor>>,
        scheduler: Arc<TokioScheduler>,
        runtime_token: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            center,
            application,
            day_change,
            reachability,
            scheduler,
            timers: Mutex::new(Vec::new()),
            runtime_token,
        }
    }

    /// Center the platform layer posts notifications into.
    pub fn notifications(&self) -> &NotificationCenter {
        &self.center
    }

    pub fn application(&self) -> &Arc<ApplicationHandler> {
        &self.application
    }

    pub fn day_change(&self) -> &Arc<DayChangeHandler> {
        &self.day_change
    }

    /// Reachability monitor, if the hub was built with a primitive.
    pub fn reachability(&self) -> Option<&Arc<ReachabilityMonitor>> {
        self.reachability.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Creates an inactive countdown timer ticking at the configured interval.
    ///
    /// The hub keeps a weak handle: [`shutdown`](Self::shutdown) stops the timer
    /// (with `did_stop`) if it is still running.
    pub fn countdown_timer(&self) -> CountdownTimer {
        let timer = CountdownTimer::from_config(&self.cfg);
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        timers.retain(CountdownHandle::is_alive);
        timers.push(timer.handle());
        timer
    }

    /// Shared real-time scheduler for countdown timers.
    pub fn scheduler(&self) -> Arc<dyn Scheduler> {
        self.scheduler.clone()
    }

    /// True once [`shutdown`](Self::shutdown) ran.
    pub fn is_shut_down(&self) -> bool {
        self.runtime_token.is_cancelled()
    }

    /// Stops the dispatch loop, every running timer from
    /// [`countdown_timer`](Self::countdown_timer) (each gets `did_stop`), and the
    /// shared scheduler, which then refuses new countdowns. Idempotent.
    pub fn shutdown(&self) {
        if self.runtime_token.is_cancelled() {
            return;
        }
        self.runtime_token.cancel();

        let timers = {
            let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *timers)
        };
        for timer in &timers {
            timer.stop();
        }
        self.scheduler.shutdown();
        tracing::info!(timers = timers.len(), "signal hub shut down");
    }

    /// Subscribes to the center and feeds both handlers in posting order.
    pub(super) fn dispatch_listener(&self) {
        let mut rx = self.center.subscribe();
        let application = Arc::clone(&self.application);
        let day_change = Arc::clone(&self.day_change);
        let token = self.runtime_token.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    res = rx.recv() => match res {
                        Ok(notification) if notification.kind.is_lifecycle() => {
                            application.handle(&notification);
                        }
                        Ok(notification) => {
                            day_change.handle(&notification);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "dispatch loop lagged, notifications dropped");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!("dispatch loop stopped");
        });
    }
}

impl Drop for SignalHub {
    fn drop(&mut self) {
        self.runtime_token.cancel();
    }
}

impl fmt::Debug for SignalHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalHub")
            .field("cfg", &self.cfg)
            .field("app_state", &self.application.state())
            .field("reachability", &self.reachability.is_some())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
