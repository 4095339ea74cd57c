//! # Platform notifications posted to the notification center.
//!
//! The [`NotificationKind`] enum classifies the platform signals the hub routes:
//! - **Lifecycle**: resign active, become active, enter foreground, enter background
//! - **Calendar**: day boundary crossed
//!
//! The [`AppNotification`] struct is the opaque payload handed to delegates: a
//! sequence number, a timestamp, and optional poster/info strings.
//!
//! ## Ordering guarantees
//! Each notification has a globally unique sequence number (`seq`) that increases
//! monotonically in creation order.
//!
//! ## Example
//! ```rust
//! use signalvisor::{AppNotification, NotificationKind};
//!
//! let n = AppNotification::new(NotificationKind::DidEnterBackground)
//!     .with_object("scene-main")
//!     .with_info("home button");
//!
//! assert_eq!(n.kind, NotificationKind::DidEnterBackground);
//! assert_eq!(n.object.as_deref(), Some("scene-main"));
//! assert!(n.kind.is_lifecycle());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for notification ordering.
static NOTIFICATION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of platform notifications.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    // === Application lifecycle ===
    /// The app is about to move from active to inactive.
    WillResignActive,
    /// The app became active.
    DidBecomeActive,
    /// The app is about to enter the foreground.
    WillEnterForeground,
    /// The app entered the background.
    DidEnterBackground,

    // === Calendar ===
    /// The calendar day changed (local midnight crossed).
    DayChanged,
}

impl NotificationKind {
    /// True for the four application lifecycle kinds.
    #[inline]
    pub fn is_lifecycle(self) -> bool {
        matches!(
            self,
            NotificationKind::WillResignActive
                | NotificationKind::DidBecomeActive
                | NotificationKind::WillEnterForeground
                | NotificationKind::DidEnterBackground
        )
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            NotificationKind::WillResignActive => "will_resign_active",
            NotificationKind::DidBecomeActive => "did_become_active",
            NotificationKind::WillEnterForeground => "will_enter_foreground",
            NotificationKind::DidEnterBackground => "did_enter_background",
            NotificationKind::DayChanged => "day_changed",
        }
    }
}

/// Platform notification with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `object`/`info`: free-form payload from the poster
#[derive(Debug, Clone)]
pub struct AppNotification {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Notification classification.
    pub kind: NotificationKind,
    /// Description of the object that posted the notification.
    pub object: Option<Arc<str>>,
    /// Free-form details.
    pub info: Option<Arc<str>>,
}

impl AppNotification {
    /// Creates a notification of the given kind with current timestamp and next sequence number.
    pub fn new(kind: NotificationKind) -> Self {
        Self {
            seq: NOTIFICATION_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            object: None,
            info: None,
        }
    }

    /// Attaches the posting object.
    #[inline]
    pub fn with_object(mut self, object: impl Into<Arc<str>>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Attaches free-form details.
    #[inline]
    pub fn with_info(mut self, info: impl Into<Arc<str>>) -> Self {
        self.info = Some(info.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_increases() {
        let a = AppNotification::new(NotificationKind::DidBecomeActive);
        let b = AppNotification::new(NotificationKind::DidBecomeActive);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn day_change_is_not_lifecycle() {
        assert!(!NotificationKind::DayChanged.is_lifecycle());
        assert!(NotificationKind::WillResignActive.is_lifecycle());
        assert_eq!(NotificationKind::DayChanged.as_label(), "day_changed");
    }
}
