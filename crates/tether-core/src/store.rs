#![forbid(unsafe_code)]

//! Global state container with versioned change notification.
//!
//! A [`Store<S>`] holds the current state as an immutable [`Snapshot`].
//! Updates replace the state wholesale and bump the version; every live
//! listener is then called with the new snapshot.
//!
//! # Architecture
//!
//! `Store<S>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Listeners are stored as `Weak` function pointers; the strong side lives in
//! the [`Subscription`] returned by [`Store::subscribe`]. Dead entries are
//! pruned lazily on subscribe and at the start of each notification round.
//!
//! # Invariants
//!
//! 1. The version increments by exactly one per `replace`/`update`.
//! 2. Listeners are called in registration order.
//! 3. Every listener observes snapshots in emission order, including when a
//!    listener updates the store re-entrantly: nested updates are queued and
//!    delivered after the current round completes.
//! 4. Dropping a [`Subscription`] stops delivery before the next listener
//!    call, even in the middle of a notification round.
//! 5. No borrow of the store is held while user code (listeners, update
//!    closures) runs.
//!
//! # Failure Modes
//!
//! - Listener panic: propagates to the caller of `replace`/`update`. Queued
//!   nested snapshots are discarded; the store state itself is already
//!   updated and later updates notify normally.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::snapshot::Snapshot;

struct Listener<S>(Box<dyn Fn(&Snapshot<S>)>);

struct ListenerEntry<S> {
    id: u64,
    callback: Weak<Listener<S>>,
}

struct StoreInner<S> {
    current: Snapshot<S>,
    listeners: Vec<ListenerEntry<S>>,
    next_listener_id: u64,
    pending: VecDeque<Snapshot<S>>,
    notifying: bool,
}

/// Shared handle to the application state.
///
/// Cloning a `Store` clones the handle, not the state.
pub struct Store<S> {
    inner: Rc<RefCell<StoreInner<S>>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: 'static> Store<S> {
    /// Create a store holding `state` at version 0.
    #[must_use]
    pub fn new(state: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                current: Snapshot::new(0, Rc::new(state)),
                listeners: Vec::new(),
                next_listener_id: 1,
                pending: VecDeque::new(),
                notifying: false,
            })),
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn get_state(&self) -> Snapshot<S> {
        self.inner.borrow().current.clone()
    }

    /// Current version counter.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().current.version()
    }

    /// Register `listener` to be called with every new snapshot.
    ///
    /// The listener stays registered for as long as the returned
    /// [`Subscription`] is alive.
    pub fn subscribe(&self, listener: impl Fn(&Snapshot<S>) + 'static) -> Subscription {
        let callback = Rc::new(Listener(Box::new(listener)));
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner
            .listeners
            .retain(|entry| entry.callback.strong_count() > 0);
        inner.listeners.push(ListenerEntry {
            id,
            callback: Rc::downgrade(&callback),
        });
        tracing::trace!(listener = id, "store subscribe");
        Subscription {
            id,
            _callback: callback,
        }
    }

    /// Number of listeners whose subscription is still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|entry| entry.callback.strong_count() > 0)
            .count()
    }

    /// Replace the state wholesale and notify listeners.
    ///
    /// Returns the new version.
    pub fn replace(&self, state: S) -> u64 {
        let snapshot = {
            let mut inner = self.inner.borrow_mut();
            let version = inner.current.version() + 1;
            inner.current = Snapshot::new(version, Rc::new(state));
            inner.current.clone()
        };
        let version = snapshot.version();
        self.emit(snapshot);
        version
    }

    /// Derive the next state from the current one and install it.
    ///
    /// Returns the new version.
    pub fn update(&self, f: impl FnOnce(&S) -> S) -> u64 {
        let current = self.get_state();
        let next = f(&current);
        self.replace(next)
    }

    fn emit(&self, snapshot: Snapshot<S>) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.pending.push_back(snapshot);
            if inner.notifying {
                return;
            }
            inner.notifying = true;
        }
        let _guard = NotifyGuard { inner: &self.inner };

        loop {
            let (next, targets) = {
                let mut inner = self.inner.borrow_mut();
                let Some(next) = inner.pending.pop_front() else {
                    break;
                };
                inner
                    .listeners
                    .retain(|entry| entry.callback.strong_count() > 0);
                let targets: Vec<(u64, Weak<Listener<S>>)> = inner
                    .listeners
                    .iter()
                    .map(|entry| (entry.id, Weak::clone(&entry.callback)))
                    .collect();
                (next, targets)
            };

            let _span = tracing::debug_span!(
                "store notify",
                version = next.version(),
                listeners = targets.len()
            )
            .entered();
            for (id, weak) in targets {
                // Upgrade at call time so a subscription dropped by an
                // earlier listener in this round is skipped.
                if let Some(listener) = weak.upgrade() {
                    tracing::trace!(listener = id, version = next.version(), "deliver");
                    (listener.0)(&next);
                }
            }
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Store")
            .field("version", &inner.current.version())
            .field("state", &*inner.current)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

struct NotifyGuard<'a, S> {
    inner: &'a RefCell<StoreInner<S>>,
}

impl<S> Drop for NotifyGuard<'_, S> {
    fn drop(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.notifying = false;
        inner.pending.clear();
    }
}

/// RAII guard for a store listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    _callback: Rc<dyn Any>,
}

impl Subscription {
    /// Store-local listener id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unsubscribe now. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {
        tracing::trace!(listener = self.id, "store unsubscribe");
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn initial_version_is_zero() {
        let store = Store::new(1);
        assert_eq!(store.version(), 0);
        assert_eq!(*store.get_state(), 1);
    }

    #[test]
    fn replace_bumps_version_and_notifies() {
        let store = Store::new(0);
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let _sub = store.subscribe(move |snap| s.set(**snap));

        assert_eq!(store.replace(7), 1);
        assert_eq!(seen.get(), 7);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn equal_value_still_notifies() {
        // State is replaced wholesale; equality is the subscriber's concern.
        let store = Store::new(5);
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let _sub = store.subscribe(move |_| c.set(c.get() + 1));

        store.replace(5);
        store.replace(5);
        assert_eq!(calls.get(), 2);
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn update_derives_from_current() {
        let store = Store::new(vec![1, 2]);
        store.update(|v| {
            let mut next = v.clone();
            next.push(3);
            next
        });
        assert_eq!(*store.get_state(), vec![1, 2, 3]);
    }

    #[test]
    fn listeners_called_in_registration_order() {
        let store = Store::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let subs: Vec<_> = (0..3)
            .map(|i| {
                let log = Rc::clone(&log);
                store.subscribe(move |_| log.borrow_mut().push(i))
            })
            .collect();

        store.replace(1);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        drop(subs);
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let store = Store::new(0);
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let sub = store.subscribe(move |_| c.set(c.get() + 1));
        assert_eq!(store.subscriber_count(), 1);

        store.replace(1);
        sub.unsubscribe();
        store.replace(2);

        assert_eq!(calls.get(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn nested_update_preserves_emission_order() {
        let store = Store::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let handle = store.clone();
        let first_log = Rc::clone(&log);
        let _first = store.subscribe(move |snap| {
            first_log.borrow_mut().push(("first", snap.version()));
            if **snap == 1 {
                handle.replace(2);
            }
        });
        let second_log = Rc::clone(&log);
        let _second = store.subscribe(move |snap| {
            second_log.borrow_mut().push(("second", snap.version()));
        });

        store.replace(1);
        assert_eq!(
            *log.borrow(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
        assert_eq!(*store.get_state(), 2);
    }

    #[test]
    fn subscription_dropped_mid_round_is_skipped() {
        let store = Store::new(0);
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(Cell::new(0));

        let v = Rc::clone(&victim);
        let _killer = store.subscribe(move |_| {
            v.borrow_mut().take();
        });
        let c = Rc::clone(&calls);
        *victim.borrow_mut() = Some(store.subscribe(move |_| c.set(c.get() + 1)));

        store.replace(1);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn listener_panic_does_not_wedge_store() {
        let store = Store::new(0);
        let armed = Rc::new(Cell::new(true));
        let a = Rc::clone(&armed);
        let _sub = store.subscribe(move |_| {
            if a.replace(false) {
                panic!("listener failure");
            }
        });
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let _counter = store.subscribe(move |_| c.set(c.get() + 1));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.replace(1);
        }));
        assert!(result.is_err());
        assert_eq!(store.version(), 1);

        store.replace(2);
        assert_eq!(calls.get(), 1, "later updates must still notify");
    }

    #[test]
    #[tracing_test::traced_test]
    fn notify_is_traced() {
        let store = Store::new(0);
        let _sub = store.subscribe(|_| {});
        store.replace(1);
        assert!(logs_contain("store notify"));
    }

    #[test]
    fn subscribe_prunes_dropped_listeners() {
        let store = Store::new(0);
        let _kept = store.subscribe(|_| {});
        for _ in 0..64 {
            drop(store.subscribe(|_| {}));
        }
        assert_eq!(store.inner.borrow().listeners.len(), 2);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn debug_format_reports_version() {
        let store = Store::new("x");
        store.replace("y");
        let debug = format!("{store:?}");
        assert!(debug.contains("version: 1"));
    }
}
