//! # Low-level reachability primitive.
//!
//! [`Reachability`] is the seam to whatever tells the process whether a network
//! path exists (an OS path monitor, a platform SDK, a host probe living elsewhere).
//! [`ReachabilityMonitor`](crate::ReachabilityMonitor) is the only consumer.
//!
//! [`ReachabilitySwitch`] is an in-process primitive driven by
//! [`ReachabilitySwitch::set_reachable`]. Use it for tests and for hosts that
//! learn reachability through their own channels.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ReachabilityError;

/// Callback invoked by a primitive with the new reachability value.
pub type ReachabilityCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Network reachability source.
///
/// ### Implementation requirements
/// - `start_notifier` replaces any previously installed callback.
/// - `stop_notifier` is idempotent and may be called without a prior start.
/// - The callback may be invoked from any thread.
pub trait Reachability: Send + Sync {
    /// Current reachability as known by the primitive.
    fn is_reachable(&self) -> bool;

    /// Begins reporting changes through `on_change`.
    fn start_notifier(&self, on_change: ReachabilityCallback) -> Result<(), ReachabilityError>;

    /// Stops reporting changes and drops the callback.
    fn stop_notifier(&self);
}

/// Manually driven reachability primitive.
///
/// The callback fires only when [`set_reachable`](Self::set_reachable) flips the value.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use signalvisor::{Reachability, ReachabilitySwitch};
///
/// let switch = ReachabilitySwitch::new(true);
/// let flips = Arc::new(AtomicUsize::new(0));
/// let seen = flips.clone();
/// switch.start_notifier(Arc::new(move |_: bool| { seen.fetch_add(1, Ordering::SeqCst); })).unwrap();
///
/// assert!(!switch.set_reachable(true)); // unchanged, no callback
/// assert!(switch.set_reachable(false));
/// assert_eq!(flips.load(Ordering::SeqCst), 1);
/// ```
pub struct ReachabilitySwitch {
    reachable: AtomicBool,
    callback: Mutex<Option<ReachabilityCallback>>,
}

impl ReachabilitySwitch {
    #[must_use]
    pub fn new(reachable: bool) -> Self {
        Self {
            reachable: AtomicBool::new(reachable),
            callback: Mutex::new(None),
        }
    }

    /// Sets the value and reports it if it flipped. Returns `true` on a flip.
    pub fn set_reachable(&self, reachable: bool) -> bool {
        let prev = self.reachable.swap(reachable, Ordering::SeqCst);
        if prev == reachable {
            return false;
        }
        let callback = self.callback().clone();
        if let Some(cb) = callback {
            cb(reachable);
        }
        true
    }

    /// True while a callback is installed.
    pub fn is_notifying(&self) -> bool {
        self.callback().is_some()
    }

    fn callback(&self) -> MutexGuard<'_, Option<ReachabilityCallback>> {
        self.callback.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Reachability for ReachabilitySwitch {
    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    fn start_notifier(&self, on_change: ReachabilityCallback) -> Result<(), ReachabilityError> {
        *self.callback() = Some(on_change);
        Ok(())
    }

    fn stop_notifier(&self) {
        self.callback().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_detaches_callback() {
        let switch = ReachabilitySwitch::new(false);
        let hits = Arc::new(Mutex::new(Vec::new()));
        let sink = hits.clone();
        switch
            .start_notifier(Arc::new(move |v: bool| sink.lock().unwrap().push(v)))
            .unwrap();
        assert!(switch.is_notifying());

        switch.set_reachable(true);
        switch.stop_notifier();
        switch.stop_notifier();
        switch.set_reachable(false);

        assert!(!switch.is_notifying());
        assert!(!switch.is_reachable());
        assert_eq!(hits.lock().unwrap().clone(), vec![true]);
    }
}
