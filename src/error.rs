//! Error types used by listener registries and reachability monitoring.
//!
//! This module defines two error enums:
//!
//! - [`ListenerError`]: raised by a [`ListenerRegistry`](crate::ListenerRegistry) when a
//!   registration would break its one-entry-per-identity rule.
//! - [`ReachabilityError`]: raised by a [`ReachabilityMonitor`](crate::ReachabilityMonitor)
//!   and by [`Reachability`](crate::Reachability) primitives.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! Removal and stop operations never fail, so they have no error type.

use thiserror::Error;

/// # Errors produced by a listener registry.
///
/// A duplicate registration is recoverable: the registry is left unchanged and the
/// caller decides what to do. It is never swallowed, because a silent duplicate
/// would deliver every signal twice to the same observer.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// The listener identity is already registered with this registry.
    #[error("listener already registered with '{registry}'")]
    Duplicate {
        /// Name of the registry that rejected the listener.
        registry: &'static str,
    },
}

impl ListenerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use signalvisor::ListenerError;
    ///
    /// let err = ListenerError::Duplicate { registry: "application" };
    /// assert_eq!(err.as_label(), "listener_duplicate");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Duplicate { .. } => "listener_duplicate",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ListenerError::Duplicate { registry } => {
                format!("duplicate listener; registry={registry}")
            }
        }
    }
}

/// # Errors produced by reachability monitoring.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReachabilityError {
    /// The listener is already subscribed to this monitor.
    #[error("listener already subscribed to this reachability monitor")]
    AlreadySubscribed,

    /// The underlying reachability primitive could not start notifying.
    #[error("reachability unavailable: {reason}")]
    Unavailable {
        /// Why the primitive refused to start.
        reason: String,
    },
}

impl ReachabilityError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use signalvisor::ReachabilityError;
    ///
    /// let err = ReachabilityError::Unavailable { reason: "no route".into() };
    /// assert_eq!(err.as_label(), "reachability_unavailable");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ReachabilityError::AlreadySubscribed => "reachability_already_subscribed",
            ReachabilityError::Unavailable { .. } => "reachability_unavailable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ReachabilityError::AlreadySubscribed => "listener already subscribed".to_string(),
            ReachabilityError::Unavailable { reason } => format!("unavailable: {reason}"),
        }
    }
}

impl From<ListenerError> for ReachabilityError {
    fn from(err: ListenerError) -> Self {
        match err {
            ListenerError::Duplicate { .. } => ReachabilityError::AlreadySubscribed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_maps_to_already_subscribed() {
        let err: ReachabilityError = ListenerError::Duplicate {
            registry: "reachability",
        }
        .into();
        assert_eq!(err, ReachabilityError::AlreadySubscribed);
        assert_eq!(err.as_label(), "reachability_already_subscribed");
    }

    #[test]
    fn messages_carry_details() {
        let err = ListenerError::Duplicate {
            registry: "day_change",
        };
        assert_eq!(err.to_string(), "listener already registered with 'day_change'");
        assert!(err.as_message().contains("registry=day_change"));

        let err = ReachabilityError::Unavailable {
            reason: "socket closed".into(),
        };
        assert_eq!(err.as_message(), "unavailable: socket closed");
    }
}
