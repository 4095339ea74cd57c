//! Network reachability.
//!
//! ## Contents
//! - [`Reachability`] the low-level primitive seam, plus [`ReachabilitySwitch`]
//! - [`ReachabilityMonitor`] the [`ReachabilityManager`] that republishes changes
//!   to [`ReachabilityListenerDelegate`]s

mod monitor;
mod primitive;

pub use monitor::{ReachabilityListenerDelegate, ReachabilityManager, ReachabilityMonitor};
pub use primitive::{Reachability, ReachabilityCallback, ReachabilitySwitch};
