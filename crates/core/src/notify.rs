//! Subscription management and ordered event delivery.
//!
//! `Notifier<E>` is the single observer primitive every component uses:
//! change feeds, per-item property notifications and filter signals.
//!
//! Delivery is synchronous and ordered. An event raised while the notifier
//! is already dispatching (a subscriber mutated the thing it observes) is
//! queued and delivered after the current event reached every subscriber,
//! so all subscribers observe events in the order they were raised.
//! Subscribers are snapshotted per event; a subscriber removed mid-dispatch
//! is not called again.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

/// Unique identifier for a subscription.
pub type SubscriptionId = u64;

/// Callback type for notifications.
pub type Callback<E> = Rc<dyn Fn(&E)>;

/// Registered callbacks; ordered by id so delivery follows subscription order.
struct Registry<E> {
    subscriptions: BTreeMap<SubscriptionId, Callback<E>>,
    next_id: SubscriptionId,
}

/// An ordered, re-entrancy-safe event notifier.
pub struct Notifier<E> {
    registry: RefCell<Registry<E>>,
    queue: RefCell<VecDeque<E>>,
    dispatching: Cell<bool>,
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Notifier<E> {
    /// Creates a notifier with no subscribers.
    pub fn new() -> Self {
        Self {
            registry: RefCell::new(Registry {
                subscriptions: BTreeMap::new(),
                next_id: 1,
            }),
            queue: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        }
    }

    /// Subscribes with the given callback.
    ///
    /// Returns the subscription ID that can be used to unsubscribe.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&E) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscriptions.insert(id, Rc::new(callback));
        id
    }

    /// Unsubscribes by ID.
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.borrow_mut().subscriptions.remove(&id).is_some()
    }

    /// Returns true if `id` is still subscribed.
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.registry.borrow().subscriptions.contains_key(&id)
    }

    /// Returns the number of subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.registry.borrow().subscriptions.len()
    }

    /// Returns true if there are no subscriptions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registry.borrow().subscriptions.is_empty()
    }

    /// Returns true while an event is being delivered.
    #[inline]
    pub fn is_dispatching(&self) -> bool {
        self.dispatching.get()
    }

    /// Clears all subscriptions.
    pub fn clear(&self) {
        self.registry.borrow_mut().subscriptions.clear();
    }

    /// Delivers `event` to every subscriber.
    ///
    /// If called from inside a subscriber, the event is queued behind the
    /// one currently being delivered.
    pub fn emit(&self, event: E) {
        self.queue.borrow_mut().push_back(event);
        if self.dispatching.replace(true) {
            return;
        }
        let _guard = DispatchGuard(&self.dispatching);

        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(event) = next else { break };

            let snapshot: Vec<(SubscriptionId, Callback<E>)> = self
                .registry
                .borrow()
                .subscriptions
                .iter()
                .map(|(id, callback)| (*id, callback.clone()))
                .collect();

            for (id, callback) in snapshot {
                if self.is_subscribed(id) {
                    callback(&event);
                }
            }
        }
    }
}

/// Clears the dispatching flag even if a subscriber panics.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
