//! # ReachabilityMonitor: reachability change fan-out.
//!
//! Wraps one [`Reachability`] primitive, keeps a best-effort `is_reachable`
//! snapshot, and notifies every registered [`ReachabilityListenerDelegate`] on
//! each primitive callback.
//!
//! ## Flow
//! ```text
//! primitive callback(bool) ──► store is_reachable ──► ListenerRegistry::notify
//!                                                        └─► did_change_reachability(&monitor)
//!                                                               └─► listener reads is_reachable()
//! ```
//!
//! Listeners receive the monitor, not the value: by the time a listener runs the
//! value may have flipped again, and reading it fresh avoids acting on a stale copy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::error::ReachabilityError;
use crate::listeners::ListenerRegistry;

use super::primitive::Reachability;

/// Observer of reachability changes.
pub trait ReachabilityListenerDelegate: Send + Sync {
    /// Reachability changed; read the current value from `manager`.
    fn did_change_reachability(&self, manager: &dyn ReachabilityManager);
}

/// Read/subscribe surface of a reachability monitor.
pub trait ReachabilityManager: Send + Sync {
    /// Best-effort current value. Not atomic with the next change notification.
    fn is_reachable(&self) -> bool;

    /// Subscribes a listener. Fails with [`ReachabilityError::AlreadySubscribed`]
    /// if this listener is already subscribed to this manager.
    fn add(
        &self,
        listener: &Arc<dyn ReachabilityListenerDelegate>,
    ) -> Result<(), ReachabilityError>;

    /// Unsubscribes a listener. Unconditional and idempotent.
    fn remove(&self, listener: &Arc<dyn ReachabilityListenerDelegate>);
}

/// Reachability manager backed by a [`Reachability`] primitive.
pub struct ReachabilityMonitor {
    primitive: Arc<dyn Reachability>,
    reachable: AtomicBool,
    listeners: ListenerRegistry<dyn ReachabilityListenerDelegate>,
}

impl ReachabilityMonitor {
    /// Creates a monitor and starts the primitive's notifier.
    ///
    /// The initial snapshot is read from the primitive. A primitive that refuses
    /// to start yields its error.
    pub fn new(primitive: Arc<dyn Reachability>) -> Result<Arc<Self>, ReachabilityError> {
        let monitor = Arc::new(Self {
            reachable: AtomicBool::new(primitive.is_reachable()),
            primitive,
            listeners: ListenerRegistry::new("reachability"),
        });

        let weak: Weak<Self> = Arc::downgrade(&monitor);
        monitor.primitive.start_notifier(Arc::new(move |reachable: bool| {
            if let Some(monitor) = weak.upgrade() {
                monitor.apply(reachable);
            }
        }))?;

        tracing::info!(reachable = monitor.is_reachable(), "reachability monitor started");
        Ok(monitor)
    }

    /// Number of subscribed listeners (dead ones included until the next change).
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn apply(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
        tracing::info!(reachable, "reachability changed");

        let report = self.listeners.notify(|l| l.did_change_reachability(self));
        tracing::debug!(
            delivered = report.delivered,
            failed = report.failed,
            "reachability change dispatched"
        );
    }
}

impl ReachabilityManager for ReachabilityMonitor {
    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    fn add(
        &self,
        listener: &Arc<dyn ReachabilityListenerDelegate>,
    ) -> Result<(), ReachabilityError> {
        self.listeners.add(listener).map_err(ReachabilityError::from)
    }

    fn remove(&self, listener: &Arc<dyn ReachabilityListenerDelegate>) {
        self.listeners.remove(listener);
    }
}

impl Drop for ReachabilityMonitor {
    fn drop(&mut self) {
        self.primitive.stop_notifier();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reachability::{ReachabilityCallback, ReachabilitySwitch};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Observer {
        seen: Mutex<Vec<bool>>,
    }

    impl ReachabilityListenerDelegate for Observer {
        fn did_change_reachability(&self, manager: &dyn ReachabilityManager) {
            self.seen.lock().unwrap().push(manager.is_reachable());
        }
    }

    fn setup(initial: bool) -> (Arc<ReachabilitySwitch>, Arc<ReachabilityMonitor>) {
        let switch = Arc::new(ReachabilitySwitch::new(initial));
        let monitor = ReachabilityMonitor::new(switch.clone()).unwrap();
        (switch, monitor)
    }

    #[test]
    fn seeds_snapshot_from_primitive() {
        let (_switch, monitor) = setup(true);
        assert!(monitor.is_reachable());
    }

    #[test]
    fn listeners_read_fresh_value() {
        let (switch, monitor) = setup(true);
        let observer = Arc::new(Observer::default());
        let listener: Arc<dyn ReachabilityListenerDelegate> = observer.clone();
        monitor.add(&listener).unwrap();

        switch.set_reachable(false);
        switch.set_reachable(true);

        assert_eq!(observer.seen.lock().unwrap().clone(), vec![false, true]);
        assert!(monitor.is_reachable());
    }

    #[test]
    fn second_subscription_fails() {
        let (_switch, monitor) = setup(true);
        let listener: Arc<dyn ReachabilityListenerDelegate> = Arc::new(Observer::default());
        monitor.add(&listener).unwrap();

        assert_eq!(
            monitor.add(&listener),
            Err(ReachabilityError::AlreadySubscribed)
        );
        assert_eq!(monitor.listener_count(), 1);
    }

    #[test]
    fn monitors_are_independent() {
        let (_s1, first) = setup(true);
        let (_s2, second) = setup(false);
        let listener: Arc<dyn ReachabilityListenerDelegate> = Arc::new(Observer::default());

        first.add(&listener).unwrap();
        second.add(&listener).unwrap();
    }

    #[test]
    fn removed_listener_misses_later_flips() {
        let (switch, monitor) = setup(true);
        let observer = Arc::new(Observer::default());
        let listener: Arc<dyn ReachabilityListenerDelegate> = observer.clone();
        monitor.add(&listener).unwrap();
        monitor.remove(&listener);
        monitor.remove(&listener);

        switch.set_reachable(false);
        assert!(observer.seen.lock().unwrap().is_empty());
        assert!(!monitor.is_reachable());
    }

    #[test]
    fn drop_stops_notifier() {
        let (switch, monitor) = setup(true);
        assert!(switch.is_notifying());
        drop(monitor);
        assert!(!switch.is_notifying());
    }

    struct Refusing;

    impl Reachability for Refusing {
        fn is_reachable(&self) -> bool {
            false
        }

        fn start_notifier(&self, _cb: ReachabilityCallback) -> Result<(), ReachabilityError> {
            Err(ReachabilityError::Unavailable {
                reason: "no path monitor".into(),
            })
        }

        fn stop_notifier(&self) {}
    }

    #[test]
    fn start_failure_is_propagated() {
        let err = ReachabilityMonitor::new(Arc::new(Refusing)).err();
        assert_eq!(
            err,
            Some(ReachabilityError::Unavailable {
                reason: "no path monitor".into()
            })
        );
    }
}
