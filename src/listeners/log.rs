//! # LogListener: simple signal printer
//!
//! A minimal listener implementing every delegate trait and writing each
//! callback as a `tracing` event. Use it for tests or demos.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO signalvisor: [will-enter-foreground] seq=3
//! INFO signalvisor: [did-become-active] seq=4
//! INFO signalvisor: [reachability] reachable=false
//! INFO signalvisor: [countdown-start] interval=30s
//! INFO signalvisor: [countdown] remained=29s
//! INFO signalvisor: [countdown-stop] remained=12s
//! ```

use std::time::Duration;

use crate::{
    AppNotification, ApplicationHandlerDelegate, CountdownTimerDelegate,
    DayChangeHandlerDelegate, ReachabilityListenerDelegate, ReachabilityManager,
};

/// Listener that logs every signal it receives.
#[derive(Debug, Default)]
pub struct LogListener;

impl LogListener {
    /// Construct a new [`LogListener`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ApplicationHandlerDelegate for LogListener {
    fn did_receive_will_resign_active(&self, n: &AppNotification) {
        tracing::info!(target: "signalvisor", seq = n.seq, "[will-resign-active]");
    }

    fn did_receive_did_become_active(&self, n: &AppNotification) {
        tracing::info!(target: "signalvisor", seq = n.seq, "[did-become-active]");
    }

    fn did_receive_will_enter_foreground(&self, n: &AppNotification) {
        tracing::info!(target: "signalvisor", seq = n.seq, "[will-enter-foreground]");
    }

    fn did_receive_did_enter_background(&self, n: &AppNotification) {
        tracing::info!(target: "signalvisor", seq = n.seq, "[did-enter-background]");
    }
}

impl DayChangeHandlerDelegate for LogListener {
    fn did_change_day(&self, n: &AppNotification) {
        tracing::info!(target: "signalvisor", seq = n.seq, "[day-changed]");
    }
}

impl ReachabilityListenerDelegate for LogListener {
    fn did_change_reachability(&self, manager: &dyn ReachabilityManager) {
        tracing::info!(
            target: "signalvisor",
            reachable = manager.is_reachable(),
            "[reachability]"
        );
    }
}

impl CountdownTimerDelegate for LogListener {
    fn did_start(&self, interval: Duration) {
        tracing::info!(target: "signalvisor", ?interval, "[countdown-start]");
    }

    fn did_countdown(&self, remained: Duration) {
        tracing::info!(target: "signalvisor", ?remained, "[countdown]");
    }

    fn did_stop(&self, remained: Duration) {
        tracing::info!(target: "signalvisor", ?remained, "[countdown-stop]");
    }
}
