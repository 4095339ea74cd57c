//! Platform notifications: types and broadcast center.
//!
//! ## Contents
//! - [`NotificationKind`], [`AppNotification`] classification and payload
//! - [`NotificationCenter`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: platform glue (scene/app delegate adapters, calendar watchers), tests.
//! - **Consumers**: the `SignalHub` dispatch loop, which feeds the application
//!   and day-change handlers in posting order.

mod center;
mod notification;

pub use center::NotificationCenter;
pub use notification::{AppNotification, NotificationKind};
