//! # Notification center for platform signals.
//!
//! [`NotificationCenter`] is a thin wrapper around [`tokio::sync::broadcast`] that the
//! platform layer posts lifecycle and calendar notifications into.
//!
//! ## Architecture
//! ```text
//! Posters (platform glue):           Consumer (one):
//!   scene delegate ──┐
//!   calendar watch ──┼──► NotificationCenter ──► SignalHub dispatch loop
//!   tests          ──┘     (broadcast chan)        ├─► ApplicationHandler::handle
//!                                                  └─► DayChangeHandler::handle
//! ```
//!
//! ## Rules
//! - **Non-blocking post**: `post()` never blocks.
//! - **Bounded capacity**: a single ring buffer stores recent notifications.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: notifications posted with no receiver are dropped.

use tokio::sync::broadcast;

use super::notification::{AppNotification, NotificationKind};

/// Broadcast channel for platform notifications.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct NotificationCenter {
    tx: broadcast::Sender<AppNotification>,
}

impl NotificationCenter {
    /// Creates a new center with the given ring buffer capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<AppNotification>(capacity);
        Self { tx }
    }

    /// Posts a notification to every current receiver.
    ///
    /// Returns the number of receivers it was queued for (`0` if none).
    pub fn post(&self, notification: AppNotification) -> usize {
        tracing::trace!(
            kind = notification.kind.as_label(),
            seq = notification.seq,
            "notification posted"
        );
        self.tx.send(notification).unwrap_or(0)
    }

    /// Shorthand for `post(AppNotification::new(kind))`.
    pub fn post_kind(&self, kind: NotificationKind) -> usize {
        self.post(AppNotification::new(kind))
    }

    /// Creates a receiver that observes notifications posted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<AppNotification> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn post_reaches_subscribers_in_order() {
        let center = NotificationCenter::new(8);
        let mut rx = center.subscribe();

        assert_eq!(center.post_kind(NotificationKind::WillResignActive), 1);
        center.post_kind(NotificationKind::DidEnterBackground);

        assert_eq!(rx.recv().await.unwrap().kind, NotificationKind::WillResignActive);
        assert_eq!(rx.recv().await.unwrap().kind, NotificationKind::DidEnterBackground);
    }

    #[test]
    fn post_without_receivers_is_dropped() {
        let center = NotificationCenter::new(0);
        assert_eq!(center.receiver_count(), 0);
        assert_eq!(center.post_kind(NotificationKind::DayChanged), 0);
    }
}
