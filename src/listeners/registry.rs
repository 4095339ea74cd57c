//! # ListenerRegistry: weak, ordered, duplicate-free fan-out
//!
//! [`ListenerRegistry`] keeps an ordered list of listeners for one signal category
//! and invokes a callback on each of them.
//!
//! ## What it guarantees
//! - Insertion order is notify order.
//! - One entry per listener **identity** (allocation address, not equality).
//! - Listeners are held through [`Weak`]: the registry never extends a lifetime.
//!   Dropped listeners are skipped and purged on the next pass.
//! - A panic inside one listener is caught and logged; later listeners still run.
//! - Callbacks may add/remove listeners on the same registry (no lock is held
//!   while a callback runs).
//!
//! ## What it does **not** guarantee
//! - Listeners added during a pass are not part of that pass.
//! - Listeners removed during a pass still receive that pass if they were
//!   already snapshotted.
//!
//! ## Diagram
//! ```text
//!   notify(f)
//!     ├─► lock ─► prune dead Weak ─► upgrade live ─► snapshot: Vec<Arc<L>> ─► unlock
//!     └─► for l in snapshot (insertion order):
//!            catch_unwind(f(&l)) ── panic ─► tracing::error!, failed += 1
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::error::ListenerError;

/// Reference identity of a listener.
///
/// Two `Arc`s pointing at the same allocation share an id, whatever the trait
/// object they are viewed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

impl ListenerId {
    /// Returns the identity of the given listener.
    #[inline]
    pub fn of<L: ?Sized>(listener: &Arc<L>) -> Self {
        Self(Arc::as_ptr(listener) as *const () as usize)
    }
}

/// Outcome of one [`ListenerRegistry::notify`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    /// Listeners whose callback returned normally.
    pub delivered: usize,
    /// Listeners whose callback panicked.
    pub failed: usize,
    /// Dead entries removed before the pass.
    pub pruned: usize,
}

struct Entry<L: ?Sized> {
    id: ListenerId,
    listener: Weak<L>,
}

/// Ordered set of weakly held listeners with duplicate rejection.
pub struct ListenerRegistry<L: ?Sized> {
    name: &'static str,
    entries: Mutex<Vec<Entry<L>>>,
}

impl<L: ?Sized> ListenerRegistry<L> {
    /// Creates an empty registry. `name` is used in logs and errors.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Returns the registry name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Registers a listener at the end of the notify order.
    ///
    /// Returns [`ListenerError::Duplicate`] if the same identity is already
    /// registered; the registry is unchanged in that case.
    pub fn add(&self, listener: &Arc<L>) -> Result<(), ListenerError> {
        let id = ListenerId::of(listener);
        let mut entries = self.lock();
        if entries.iter().any(|e| e.id == id) {
            drop(entries);
            tracing::warn!(registry = self.name, "duplicate listener rejected");
            return Err(ListenerError::Duplicate {
                registry: self.name,
            });
        }
        entries.push(Entry {
            id,
            listener: Arc::downgrade(listener),
        });
        let len = entries.len();
        drop(entries);

        tracing::debug!(registry = self.name, listeners = len, "listener added");
        Ok(())
    }

    /// Unregisters a listener by identity.
    ///
    /// Removing an absent listener is a no-op. Returns `true` if an entry was removed.
    pub fn remove(&self, listener: &Arc<L>) -> bool {
        let id = ListenerId::of(listener);
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        let removed = entries.len() != before;
        drop(entries);

        if removed {
            tracing::debug!(registry = self.name, "listener removed");
        }
        removed
    }

    /// True if this identity is registered (alive or not yet purged).
    pub fn contains(&self, listener: &Arc<L>) -> bool {
        let id = ListenerId::of(listener);
        self.lock().iter().any(|e| e.id == id)
    }

    /// Number of entries, including dead ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of entries whose listener is still alive.
    pub fn live_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|e| e.listener.strong_count() > 0)
            .count()
    }

    /// Drops entries whose listener is gone. Returns how many were removed.
    pub fn purge(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| e.listener.strong_count() > 0);
        before - entries.len()
    }

    /// Invokes `f` once per live listener, in insertion order.
    ///
    /// The live list is snapshotted before the first call, so `f` may freely
    /// add or remove listeners on this registry. A panicking callback is
    /// isolated: it is logged, counted in [`NotifyReport::failed`], and the pass
    /// continues with the next listener.
    pub fn notify<F>(&self, mut f: F) -> NotifyReport
    where
        F: FnMut(&L),
    {
        let (snapshot, pruned) = self.snapshot();
        let mut report = NotifyReport {
            pruned,
            ..NotifyReport::default()
        };

        for listener in snapshot {
            let res = panic::catch_unwind(AssertUnwindSafe(|| f(&listener)));
            match res {
                Ok(()) => report.delivered += 1,
                Err(payload) => {
                    report.failed += 1;
                    tracing::error!(
                        registry = self.name,
                        panic = %panic_message(payload.as_ref()),
                        "listener panicked during notify"
                    );
                }
            }
        }

        if pruned > 0 {
            tracing::debug!(registry = self.name, pruned, "dead listeners purged");
        }
        report
    }

    /// Prunes dead entries and upgrades the rest, under one lock.
    fn snapshot(&self) -> (Vec<Arc<L>>, usize) {
        let mut entries = self.lock();
        let before = entries.len();
        let mut live = Vec::with_capacity(before);
        entries.retain(|e| match e.listener.upgrade() {
            Some(l) => {
                live.push(l);
                true
            }
            None => false,
        });
        let pruned = before - entries.len();
        (live, pruned)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry<L>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<L: ?Sized> fmt::Debug for ListenerRegistry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("name", &self.name)
            .field("len", &self.len())
            .finish()
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Probe: Send + Sync {
        fn ping(&self, pass: usize);
    }

    type Log = Arc<Mutex<Vec<(&'static str, usize)>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Probe for Recorder {
        fn ping(&self, pass: usize) {
            self.log.lock().unwrap().push((self.name, pass));
        }
    }

    fn recorder(name: &'static str, log: &Log) -> Arc<dyn Probe> {
        Arc::new(Recorder {
            name,
            log: log.clone(),
        })
    }

    fn names(log: &Log) -> Vec<&'static str> {
        log.lock().unwrap().iter().map(|(n, _)| *n).collect()
    }

    #[test]
    fn notifies_in_insertion_order() {
        let log = Log::default();
        let reg: ListenerRegistry<dyn Probe> = ListenerRegistry::new("test");
        let a = recorder("a", &log);
        let b = recorder("b", &log);
        let c = recorder("c", &log);
        reg.add(&a).unwrap();
        reg.add(&b).unwrap();
        reg.add(&c).unwrap();

        let report = reg.notify(|l| l.ping(1));
        assert_eq!(report.delivered, 3);
        assert_eq!(names(&log), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_add_fails_and_leaves_count() {
        let log = Log::default();
        let reg: ListenerRegistry<dyn Probe> = ListenerRegistry::new("test");
        let a = recorder("a", &log);
        reg.add(&a).unwrap();

        let err = reg.add(&a).unwrap_err();
        assert_eq!(err, ListenerError::Duplicate { registry: "test" });
        assert_eq!(reg.len(), 1);

        reg.notify(|l| l.ping(1));
        assert_eq!(names(&log), vec!["a"]);
    }

    #[test]
    fn identity_not_equality() {
        let log = Log::default();
        let reg: ListenerRegistry<dyn Probe> = ListenerRegistry::new("test");
        let a1 = recorder("same", &log);
        let a2 = recorder("same", &log);
        reg.add(&a1).unwrap();
        reg.add(&a2).unwrap();
        assert_eq!(reg.len(), 2);

        let alias = a1.clone();
        assert!(reg.add(&alias).is_err());
    }

    #[test]
    fn remove_absent_is_noop() {
        let log = Log::default();
        let reg: ListenerRegistry<dyn Probe> = ListenerRegistry::new("test");
        let a = recorder("a", &log);
        let stranger = recorder("x", &log);
        reg.add(&a).unwrap();

        assert!(!reg.remove(&stranger));
        assert_eq!(reg.len(), 1);
        assert!(reg.remove(&a));
        assert!(!reg.remove(&a));
        assert!(reg.is_empty());
    }

    #[test]
    fn dropped_listener_is_skipped_and_pruned() {
        let log = Log::default();
        let reg: ListenerRegistry<dyn Probe> = ListenerRegistry::new("test");
        let a = recorder("a", &log);
        let b = recorder("b", &log);
        reg.add(&a).unwrap();
        reg.add(&b).unwrap();
        drop(a);

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.live_count(), 1);

        let report = reg.notify(|l| l.ping(1));
        assert_eq!(report.delivered, 1);
        assert_eq!(report.pruned, 1);
        assert_eq!(names(&log), vec!["b"]);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn purge_removes_dead_entries() {
        let log = Log::default();
        let reg: ListenerRegistry<dyn Probe> = ListenerRegistry::new("test");
        let a = recorder("a", &log);
        reg.add(&a).unwrap();
        drop(a);
        assert_eq!(reg.purge(), 1);
        assert!(reg.is_empty());
    }

    struct Panicker;

    impl Probe for Panicker {
        fn ping(&self, _pass: usize) {
            panic!("listener blew up");
        }
    }

    #[test]
    fn panicking_listener_is_isolated() {
        let log = Log::default();
        let reg: ListenerRegistry<dyn Probe> = ListenerRegistry::new("test");
        let a = recorder("a", &log);
        let bad: Arc<dyn Probe> = Arc::new(Panicker);
        let c = recorder("c", &log);
        reg.add(&a).unwrap();
        reg.add(&bad).unwrap();
        reg.add(&c).unwrap();

        let report = reg.notify(|l| l.ping(1));
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(names(&log), vec!["a", "c"]);
        assert_eq!(reg.len(), 3);
    }

    struct Adder {
        registry: Arc<ListenerRegistry<dyn Probe>>,
        newcomer: Arc<dyn Probe>,
        log: Log,
    }

    impl Probe for Adder {
        fn ping(&self, pass: usize) {
            self.log.lock().unwrap().push(("adder", pass));
            let _ = self.registry.add(&self.newcomer);
        }
    }

    #[test]
    fn listener_added_mid_pass_waits_for_next_pass() {
        let log = Log::default();
        let reg: Arc<ListenerRegistry<dyn Probe>> = Arc::new(ListenerRegistry::new("test"));
        let newcomer = recorder("newcomer", &log);
        let adder: Arc<dyn Probe> = Arc::new(Adder {
            registry: reg.clone(),
            newcomer: newcomer.clone(),
            log: log.clone(),
        });
        let tail = recorder("tail", &log);
        reg.add(&adder).unwrap();
        reg.add(&tail).unwrap();

        reg.notify(|l| l.ping(1));
        reg.notify(|l| l.ping(2));

        let got = log.lock().unwrap().clone();
        assert_eq!(
            got,
            vec![
                ("adder", 1),
                ("tail", 1),
                ("adder", 2),
                ("tail", 2),
                ("newcomer", 2),
            ]
        );
    }

    struct Remover {
        registry: Arc<ListenerRegistry<dyn Probe>>,
        victim: Arc<dyn Probe>,
    }

    impl Probe for Remover {
        fn ping(&self, _pass: usize) {
            self.registry.remove(&self.victim);
        }
    }

    #[test]
    fn listener_removed_mid_pass_keeps_current_delivery() {
        let log = Log::default();
        let reg: Arc<ListenerRegistry<dyn Probe>> = Arc::new(ListenerRegistry::new("test"));
        let victim = recorder("victim", &log);
        let remover: Arc<dyn Probe> = Arc::new(Remover {
            registry: reg.clone(),
            victim: victim.clone(),
        });
        reg.add(&remover).unwrap();
        reg.add(&victim).unwrap();

        let first = reg.notify(|l| l.ping(1));
        assert_eq!(first.delivered, 2);
        assert!(!reg.contains(&victim));

        reg.notify(|l| l.ping(2));
        assert_eq!(log.lock().unwrap().clone(), vec![("victim", 1)]);
    }

    #[test]
    fn notified_count_matches_live_registrations() {
        let log = Log::default();
        let reg: ListenerRegistry<dyn Probe> = ListenerRegistry::new("test");
        let mut kept = Vec::new();
        for i in 0..6 {
            let l = recorder("l", &log);
            reg.add(&l).unwrap();
            if i % 2 == 0 {
                kept.push(l);
            }
        }
        reg.remove(&kept[0]);

        let report = reg.notify(|l| l.ping(1));
        assert_eq!(report.delivered, 2);
        assert_eq!(report.pruned, 3);
    }
}
