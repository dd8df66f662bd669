//! Observable insertion-ordered set.

use crate::event::ChangeEvent;
use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;
use hashbrown::HashSet;
use vista_core::{Notifier, SubscriptionId};

struct Members<T> {
    order: Vec<T>,
    index: HashSet<T>,
}

struct Inner<T> {
    members: RefCell<Members<T>>,
    changes: Notifier<ChangeEvent<T>>,
}

/// A deduplicated set that remembers insertion order and announces
/// membership changes on the same feed protocol as [`ObservableVec`].
///
/// [`ObservableVec`]: crate::ObservableVec
pub struct ObservableSet<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for ObservableSet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Eq + Hash + Clone + 'static> Default for ObservableSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone + 'static> ObservableSet<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                members: RefCell::new(Members {
                    order: Vec::new(),
                    index: HashSet::new(),
                }),
                changes: Notifier::new(),
            }),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.members.borrow().order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.members.borrow().order.is_empty()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.inner.members.borrow().index.contains(value)
    }

    /// Members in insertion order.
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.members.borrow().order.clone()
    }

    /// Adds `value`. Returns false (and emits nothing) if already present.
    pub fn insert(&self, value: T) -> bool {
        let index = {
            let mut members = self.inner.members.borrow_mut();
            if !members.index.insert(value.clone()) {
                return false;
            }
            members.order.push(value.clone());
            members.order.len() - 1
        };
        self.inner.changes.emit(ChangeEvent::add(index, vec![value]));
        true
    }

    /// Adds every new value in `values` as one `Add`. Returns how many were new.
    pub fn insert_many(&self, values: impl IntoIterator<Item = T>) -> usize {
        let (index, fresh) = {
            let mut members = self.inner.members.borrow_mut();
            let index = members.order.len();
            let mut fresh = Vec::new();
            for value in values {
                if members.index.insert(value.clone()) {
                    members.order.push(value.clone());
                    fresh.push(value);
                }
            }
            (index, fresh)
        };
        let count = fresh.len();
        if count > 0 {
            self.inner.changes.emit(ChangeEvent::add(index, fresh));
        }
        count
    }

    /// Removes `value`. Returns false (and emits nothing) if absent.
    pub fn remove(&self, value: &T) -> bool {
        let (index, removed) = {
            let mut members = self.inner.members.borrow_mut();
            if !members.index.remove(value) {
                return false;
            }
            let Some(index) = members.order.iter().position(|v| v == value) else {
                return false;
            };
            (index, members.order.remove(index))
        };
        self.inner
            .changes
            .emit(ChangeEvent::remove(index, vec![removed]));
        true
    }

    /// Replaces the membership wholesale, announced as a single `Reset`.
    /// Duplicates in `values` keep their first position.
    pub fn reset_with(&self, values: impl IntoIterator<Item = T>) {
        let contents = {
            let mut members = self.inner.members.borrow_mut();
            members.order.clear();
            members.index.clear();
            for value in values {
                if members.index.insert(value.clone()) {
                    members.order.push(value);
                }
            }
            members.order.clone()
        };
        self.inner.changes.emit(ChangeEvent::reset(contents));
    }

    pub fn clear(&self) {
        if self.is_empty() {
            return;
        }
        self.reset_with(std::iter::empty());
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent<T>) + 'static,
    {
        self.inner.changes.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.changes.unsubscribe(id)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
