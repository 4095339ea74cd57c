//! Hub: assembly and notification dispatch.
//!
//! The only public API from this module is [`SignalHub`] and its builder.
//!
//! Internal modules:
//! - [`builder`]: assembles managers from a [`Config`](crate::Config);
//! - [`signal_hub`]: owns the managers, runs the dispatch loop, shuts down.

mod builder;
mod signal_hub;

pub use builder::SignalHubBuilder;
pub use signal_hub::SignalHub;
