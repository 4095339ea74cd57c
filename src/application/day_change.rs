//! # DayChangeHandler: calendar day boundary fan-out.
//!
//! Forwards [`NotificationKind::DayChanged`] notifications to every registered
//! [`DayChangeHandlerDelegate`]. Everything else is ignored.

use std::sync::Arc;

use crate::error::ListenerError;
use crate::listeners::ListenerRegistry;
use crate::notifications::{AppNotification, NotificationKind};

/// Observer of calendar day changes.
pub trait DayChangeHandlerDelegate: Send + Sync {
    /// The local calendar day changed.
    fn did_change_day(&self, notification: &AppNotification);
}

/// Routes day-change notifications to registered delegates.
pub struct DayChangeHandler {
    delegates: ListenerRegistry<dyn DayChangeHandlerDelegate>,
}

impl DayChangeHandler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            delegates: ListenerRegistry::new("day_change"),
        }
    }

    /// Registers a delegate. Fails if this exact delegate is already registered.
    pub fn add_delegate(
        &self,
        delegate: &Arc<dyn DayChangeHandlerDelegate>,
    ) -> Result<(), ListenerError> {
        self.delegates.add(delegate)
    }

    /// Unregisters a delegate; absent delegates are ignored.
    pub fn remove_delegate(&self, delegate: &Arc<dyn DayChangeHandlerDelegate>) {
        self.delegates.remove(delegate);
    }

    pub fn delegate_count(&self) -> usize {
        self.delegates.len()
    }

    /// Dispatches a day change. Returns `false` for any other kind.
    pub fn handle(&self, notification: &AppNotification) -> bool {
        if notification.kind != NotificationKind::DayChanged {
            return false;
        }
        let report = self.delegates.notify(|d| d.did_change_day(notification));
        tracing::debug!(
            seq = notification.seq,
            delivered = report.delivered,
            failed = report.failed,
            "day change dispatched"
        );
        true
    }
}

impl Default for DayChangeHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl DayChangeHandlerDelegate for Counter {
        fn did_change_day(&self, _n: &AppNotification) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn only_day_changes_are_dispatched() {
        let handler = DayChangeHandler::new();
        let counter = Arc::new(Counter::default());
        let delegate: Arc<dyn DayChangeHandlerDelegate> = counter.clone();
        handler.add_delegate(&delegate).unwrap();

        assert!(!handler.handle(&AppNotification::new(NotificationKind::DidBecomeActive)));
        assert!(handler.handle(&AppNotification::new(NotificationKind::DayChanged)));
        assert!(handler.handle(&AppNotification::new(NotificationKind::DayChanged)));
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn duplicate_and_removal() {
        let handler = DayChangeHandler::new();
        let counter = Arc::new(Counter::default());
        let delegate: Arc<dyn DayChangeHandlerDelegate> = counter.clone();
        handler.add_delegate(&delegate).unwrap();
        assert!(handler.add_delegate(&delegate).is_err());
        assert_eq!(handler.delegate_count(), 1);

        handler.remove_delegate(&delegate);
        handler.handle(&AppNotification::new(NotificationKind::DayChanged));
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }
}
