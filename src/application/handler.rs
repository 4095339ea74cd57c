//! # ApplicationHandler: lifecycle notification router.
//!
//! Turns lifecycle [`AppNotification`]s into [`AppState`] transitions and fans each
//! one out to every registered [`ApplicationHandlerDelegate`].
//!
//! ## Transitions
//! ```text
//! WillResignActive    ─► Inactive   ─► did_receive_will_resign_active
//! DidBecomeActive     ─► Active     ─► did_receive_did_become_active
//! WillEnterForeground ─► Foreground ─► did_receive_will_enter_foreground
//! DidEnterBackground  ─► Background ─► did_receive_did_enter_background
//! ```
//!
//! ## Rules
//! - No coalescing: every lifecycle notification is dispatched exactly once,
//!   even when the same kind repeats back-to-back.
//! - The state is recorded before dispatch, so delegates reading
//!   [`ApplicationHandler::state`] see the new state.
//! - Delegates may register/unregister from inside a callback.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ListenerError;
use crate::listeners::{ListenerRegistry, NotifyReport};
use crate::notifications::{AppNotification, NotificationKind};

/// Application lifecycle state as last reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppState {
    /// Running in the background.
    Background,
    /// Entering the foreground, not yet active.
    Foreground,
    /// In the foreground and receiving events.
    Active,
    /// In the foreground but not receiving events.
    Inactive,
}

impl AppState {
    /// The state a lifecycle notification moves the app into.
    ///
    /// Returns `None` for non-lifecycle kinds.
    pub fn after(kind: NotificationKind) -> Option<Self> {
        match kind {
            NotificationKind::WillResignActive => Some(AppState::Inactive),
            NotificationKind::DidBecomeActive => Some(AppState::Active),
            NotificationKind::WillEnterForeground => Some(AppState::Foreground),
            NotificationKind::DidEnterBackground => Some(AppState::Background),
            NotificationKind::DayChanged => None,
        }
    }
}

/// Observer of application lifecycle transitions.
///
/// Every method has an empty default body; implement the ones you need.
pub trait ApplicationHandlerDelegate: Send + Sync {
    /// The app is about to resign active.
    fn did_receive_will_resign_active(&self, _notification: &AppNotification) {}

    /// The app became active.
    fn did_receive_did_become_active(&self, _notification: &AppNotification) {}

    /// The app is about to enter the foreground.
    fn did_receive_will_enter_foreground(&self, _notification: &AppNotification) {}

    /// The app entered the background.
    fn did_receive_did_enter_background(&self, _notification: &AppNotification) {}
}

/// Routes lifecycle notifications to registered delegates.
pub struct ApplicationHandler {
    delegates: ListenerRegistry<dyn ApplicationHandlerDelegate>,
    state: Mutex<AppState>,
}

impl ApplicationHandler {
    /// Creates a handler reporting `initial` until the first lifecycle notification.
    #[must_use]
    pub fn new(initial: AppState) -> Self {
        Self {
            delegates: ListenerRegistry::new("application"),
            state: Mutex::new(initial),
        }
    }

    /// Registers a delegate. Fails if this exact delegate is already registered.
    pub fn add_delegate(
        &self,
        delegate: &Arc<dyn ApplicationHandlerDelegate>,
    ) -> Result<(), ListenerError> {
        self.delegates.add(delegate)
    }

    /// Unregisters a delegate; absent delegates are ignored.
    pub fn remove_delegate(&self, delegate: &Arc<dyn ApplicationHandlerDelegate>) {
        self.delegates.remove(delegate);
    }

    /// Number of registered delegates (dead ones included until the next dispatch).
    pub fn delegate_count(&self) -> usize {
        self.delegates.len()
    }

    /// Last recorded lifecycle state.
    pub fn state(&self) -> AppState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies a notification.
    ///
    /// Lifecycle kinds update the state and dispatch the matching callback once
    /// per live delegate; the new state is returned. Other kinds are ignored.
    pub fn handle(&self, notification: &AppNotification) -> Option<AppState> {
        let next = AppState::after(notification.kind)?;
        let prev = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *state, next)
        };

        let report = self.dispatch(notification);
        tracing::debug!(
            kind = notification.kind.as_label(),
            seq = notification.seq,
            from = ?prev,
            to = ?next,
            delivered = report.delivered,
            failed = report.failed,
            "lifecycle notification dispatched"
        );
        Some(next)
    }

    fn dispatch(&self, n: &AppNotification) -> NotifyReport {
        match n.kind {
            NotificationKind::WillResignActive => self
                .delegates
                .notify(|d| d.did_receive_will_resign_active(n)),
            NotificationKind::DidBecomeActive => self
                .delegates
                .notify(|d| d.did_receive_did_become_active(n)),
            NotificationKind::WillEnterForeground => self
                .delegates
                .notify(|d| d.did_receive_will_enter_foreground(n)),
            NotificationKind::DidEnterBackground => self
                .delegates
                .notify(|d| d.did_receive_did_enter_background(n)),
            NotificationKind::DayChanged => NotifyReport::default(),
        }
    }
}

impl Default for ApplicationHandler {
    fn default() -> Self {
        Self::new(AppState::Inactive)
    }
}
