//! Application-level signal routing.
//!
//! - [`ApplicationHandler`] lifecycle transitions → [`ApplicationHandlerDelegate`]
//! - [`DayChangeHandler`] calendar day boundaries → [`DayChangeHandlerDelegate`]
//!
//! Both consume [`AppNotification`](crate::AppNotification)s and fan out through
//! a [`ListenerRegistry`](crate::ListenerRegistry).

mod day_change;
mod handler;

pub use day_change::{DayChangeHandler, DayChangeHandlerDelegate};
pub use handler::{AppState, ApplicationHandler, ApplicationHandlerDelegate};
