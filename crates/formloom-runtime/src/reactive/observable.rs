#![forbid(unsafe_code)]

//! Published snapshot with change listeners.
//!
//! The builder keeps its committed [`FormState`](formloom_layout::FormState)
//! as `Arc` snapshots. [`Observable`] holds the most recently published one
//! and calls every listener when a different snapshot arrives. Publishing
//! the same `Arc` (or an equal value) is silent, so undo of a no-op or a
//! refused edit never wakes the view layer.
//!
//! Listeners are keyed. The [`Subscription`] returned by
//! [`Observable::subscribe`] removes its listener when dropped, even while a
//! notification is in flight; the running notification still finishes with
//! the listeners it started with.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, info_span};
use web_time::Instant;

type Listener<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    current: Arc<T>,
    version: u64,
    next_key: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// Latest published snapshot plus the listeners watching it.
///
/// Clones are handles to the same registry.
pub struct Observable<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("Observable")
            .field("version", &registry.version)
            .field("listeners", &registry.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<T: PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(initial: Arc<T>) -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                current: initial,
                version: 0,
                next_key: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// The last published snapshot.
    #[must_use]
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.registry.borrow().current)
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.registry.borrow().current)
    }

    /// Publish `snapshot`. Returns `false` when it matches the current one
    /// and nobody was notified.
    pub fn set(&self, snapshot: Arc<T>) -> bool {
        let (listeners, version) = {
            let mut registry = self.registry.borrow_mut();
            if Arc::ptr_eq(&registry.current, &snapshot) || *registry.current == *snapshot {
                return false;
            }
            registry.current = Arc::clone(&snapshot);
            registry.version += 1;
            let listeners: Vec<Listener<T>> = registry
                .listeners
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect();
            (listeners, registry.version)
        };
        self.notify(&snapshot, &listeners, version);
        true
    }

    /// Attach `callback`. It runs after every published change until the
    /// returned guard is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let key = {
            let mut registry = self.registry.borrow_mut();
            let key = registry.next_key;
            registry.next_key += 1;
            registry.listeners.push((key, Rc::new(callback)));
            key
        };
        let registry = Rc::downgrade(&self.registry);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry
                        .borrow_mut()
                        .listeners
                        .retain(|(listener_key, _)| *listener_key != key);
                }
            })),
        }
    }

    /// Number of published changes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.registry.borrow().version
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    fn notify(&self, snapshot: &T, listeners: &[Listener<T>], version: u64) {
        if listeners.is_empty() {
            return;
        }
        let started = Instant::now();
        let span = info_span!(
            "formloom.notify",
            subscribers = listeners.len() as u64,
            version,
            duration_us = tracing::field::Empty
        );
        let _entered = span.enter();
        for listener in listeners {
            listener(snapshot);
        }
        let duration_us = started.elapsed().as_micros() as u64;
        span.record("duration_us", duration_us);
        debug!(duration_us, version, "subscribers notified");
    }
}

/// Keeps a listener attached. Dropping it detaches the listener.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn new_snapshot_reaches_listeners() {
        let observable = Observable::new(Arc::new(1));
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        let _sub = observable.subscribe(move |value| sink.set(*value));

        assert!(observable.set(Arc::new(5)));
        assert_eq!(seen.get(), 5);
        assert_eq!(observable.version(), 1);
        assert_eq!(*observable.get(), 5);
    }

    #[test]
    fn same_or_equal_snapshot_is_silent() {
        let first = Arc::new("same".to_string());
        let observable = Observable::new(Arc::clone(&first));
        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);
        let _sub = observable.subscribe(move |_| counter.set(counter.get() + 1));

        assert!(!observable.set(first));
        assert!(!observable.set(Arc::new("same".to_string())));
        assert_eq!(calls.get(), 0);
        assert_eq!(observable.version(), 0);
    }

    #[test]
    fn dropping_the_guard_detaches_at_once() {
        let observable = Observable::new(Arc::new(0));
        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);
        let sub = observable.subscribe(move |_| counter.set(counter.get() + 1));
        assert_eq!(observable.subscriber_count(), 1);

        observable.set(Arc::new(1));
        drop(sub);
        assert_eq!(observable.subscriber_count(), 0);
        observable.set(Arc::new(2));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let observable = Observable::new(Arc::new(0));
        let log = Rc::new(RefCell::new(Vec::new()));
        let first_log = Rc::clone(&log);
        let second_log = Rc::clone(&log);
        let _a = observable.subscribe(move |v| first_log.borrow_mut().push(("a", *v)));
        let _b = observable.subscribe(move |v| second_log.borrow_mut().push(("b", *v)));

        observable.set(Arc::new(3));
        assert_eq!(*log.borrow(), vec![("a", 3), ("b", 3)]);
    }

    #[test]
    fn guard_outliving_the_observable_is_harmless() {
        let observable = Observable::new(Arc::new(0));
        let sub = observable.subscribe(|_| {});
        drop(observable);
        drop(sub);
    }

    #[test]
    fn clones_share_the_registry() {
        let observable = Observable::new(Arc::new(10));
        let handle = observable.clone();
        handle.set(Arc::new(11));
        assert_eq!(*observable.get(), 11);
        assert_eq!(observable.with(|v| v * 2), 22);
    }
}
