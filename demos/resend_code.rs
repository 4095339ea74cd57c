//! # Example: resend_code
//!
//! A verification screen with a "resend code" countdown that pauses its UI work
//! in the background and reacts to connectivity.
//!
//! Shows how to:
//! - Build a [`SignalHub`] with a reachability primitive.
//! - Attach lifecycle, reachability and countdown delegates.
//! - Use the built-in [`LogListener`] next to a custom delegate.
//!
//! ## Flow
//! ```text
//! SignalHub::builder(cfg).with_reachability(switch).build()
//!     ├─► post(WillEnterForeground / DidBecomeActive / DidEnterBackground)
//!     │     └─► dispatch loop ─► ApplicationHandler ─► ResendScreen + LogListener
//!     ├─► switch.set_reachable(false)
//!     │     └─► ReachabilityMonitor ─► ResendScreen (stop countdown)
//!     └─► CountdownTimer on hub.scheduler()
//!           └─► did_start / did_countdown / did_stop ─► ResendScreen
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example resend_code --features logging
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use signalvisor::{
    AppNotification, ApplicationHandlerDelegate, Config, CountdownTimer, CountdownTimerDelegate,
    LogListener, NotificationKind, ReachabilityListenerDelegate, ReachabilityManager,
    ReachabilitySwitch, Scheduler, SignalHub,
};
use tracing_subscriber::EnvFilter;

/// Screen state driven entirely by signals.
struct ResendScreen {
    timer: Mutex<Option<Arc<CountdownTimer>>>,
    scheduler: Arc<dyn Scheduler>,
    resend_enabled: Mutex<bool>,
}

impl ResendScreen {
    fn timer(&self) -> Option<Arc<CountdownTimer>> {
        self.timer.lock().ok().and_then(|t| t.clone())
    }

    fn set_resend_enabled(&self, enabled: bool) {
        if let Ok(mut flag) = self.resend_enabled.lock() {
            *flag = enabled;
        }
        println!("[screen] resend button enabled={enabled}");
    }
}

impl CountdownTimerDelegate for ResendScreen {
    fn did_start(&self, interval: Duration) {
        println!("[screen] code sent, next resend in {}s", interval.as_secs());
        self.set_resend_enabled(false);
    }

    fn did_countdown(&self, remained: Duration) {
        println!("[screen] resend in {}s", remained.as_secs());
        if remained.is_zero() {
            self.set_resend_enabled(true);
        }
    }

    fn did_stop(&self, remained: Duration) {
        println!("[screen] countdown stopped with {}s left", remained.as_secs());
        self.set_resend_enabled(true);
    }
}

impl ApplicationHandlerDelegate for ResendScreen {
    fn did_receive_did_become_active(&self, _n: &AppNotification) {
        if let Some(timer) = self.timer() {
            if !timer.is_running() {
                timer.start(Duration::from_secs(5), self.scheduler.clone());
            }
        }
    }
}

impl ReachabilityListenerDelegate for ResendScreen {
    fn did_change_reachability(&self, manager: &dyn ReachabilityManager) {
        if !manager.is_reachable() {
            if let Some(timer) = self.timer() {
                timer.stop();
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut cfg = Config::default();
    cfg.notification_interval = Duration::from_secs(1);

    let switch = Arc::new(ReachabilitySwitch::new(true));
    let hub = SignalHub::builder(cfg).with_reachability(switch.clone()).build()?;

    let screen = Arc::new(ResendScreen {
        timer: Mutex::new(Some(Arc::new(hub.countdown_timer()))),
        scheduler: hub.scheduler(),
        resend_enabled: Mutex::new(true),
    });
    let logger = Arc::new(LogListener::new());

    let countdown: Arc<dyn CountdownTimerDelegate> = screen.clone();
    if let Some(timer) = screen.timer() {
        timer.set_delegate(&countdown);
    }

    let app: Arc<dyn ApplicationHandlerDelegate> = screen.clone();
    let app_log: Arc<dyn ApplicationHandlerDelegate> = logger.clone();
    hub.application().add_delegate(&app)?;
    hub.application().add_delegate(&app_log)?;

    let net: Arc<dyn ReachabilityListenerDelegate> = screen.clone();
    let net_log: Arc<dyn ReachabilityListenerDelegate> = logger.clone();
    if let Some(monitor) = hub.reachability() {
        monitor.add(&net)?;
        monitor.add(&net_log)?;
    }

    let center = hub.notifications();
    center.post_kind(NotificationKind::WillEnterForeground);
    center.post_kind(NotificationKind::DidBecomeActive);

    // first run counts down to zero
    tokio::time::sleep(Duration::from_millis(5500)).await;

    // second run is cut short by a connectivity drop
    center.post_kind(NotificationKind::DidBecomeActive);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    switch.set_reachable(false);

    center.post_kind(NotificationKind::WillResignActive);
    center.post_kind(NotificationKind::DidEnterBackground);
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("[main] final app state: {:?}", hub.application().state());
    if let Ok(mut timer) = screen.timer.lock() {
        timer.take();
    }
    hub.shutdown();
    Ok(())
}
