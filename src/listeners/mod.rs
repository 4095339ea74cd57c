//! # Listener registries.
//!
//! Every signal category (application lifecycle, day change, reachability) owns
//! one [`ListenerRegistry`] and fans out through it.
//!
//! ## Architecture
//! ```text
//! ApplicationHandler ──┐
//! DayChangeHandler   ──┼──► ListenerRegistry<dyn Delegate>::notify(|d| d.callback(..))
//! ReachabilityMonitor ─┘            │
//!                                   ├──► delegate #1 (Weak → Arc)
//!                                   ├──► delegate #2
//!                                   └──► delegate #N
//! ```
//!
//! ## Rules
//! - The registry never owns a listener; the caller keeps the `Arc` alive.
//! - Registering the same `Arc` twice is an error ([`ListenerError::Duplicate`](crate::ListenerError)).
//! - Removal is idempotent.
//! - Feature `logging` adds [`LogListener`](crate::LogListener), a reference
//!   listener for every delegate trait.

mod registry;

#[cfg(feature = "logging")]
mod log;

pub(crate) use registry::panic_message;
pub use registry::{ListenerId, ListenerRegistry, NotifyReport};

#[cfg(feature = "logging")]
pub use log::LogListener;
