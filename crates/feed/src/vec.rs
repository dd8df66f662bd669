//! Observable ordered sequence.

use crate::event::ChangeEvent;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use vista_core::{Error, Identity, ItemId, Notifier, Result, SubscriptionId};

struct Inner<T> {
    items: RefCell<Vec<T>>,
    changes: Notifier<ChangeEvent<T>>,
}

/// An ordered sequence that announces every mutation as a `ChangeEvent`.
///
/// `ObservableVec` is a shared handle: clones refer to the same sequence.
/// Events are emitted after the mutation is complete and the internal
/// borrow is released, so subscribers may read (or mutate) the sequence
/// from inside their callback.
pub struct ObservableVec<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for ObservableVec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> ObservableVec<T> {
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.changes.unsubscribe(id)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.changes.len()
    }

    /// True if both handles refer to the same sequence.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// A handle that does not keep the sequence alive.
    pub fn downgrade(&self) -> WeakObservableVec<T> {
        WeakObservableVec {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> ObservableVec<T> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates a sequence holding `items`. No event is emitted.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(Inner {
                items: RefCell::new(items),
                changes: Notifier::new(),
            }),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.items.borrow().get(index).cloned()
    }

    /// Copies the current contents.
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.items.borrow().clone()
    }

    /// Runs `f` against the current contents without copying them.
    /// `f` must not mutate this sequence.
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.inner.items.borrow())
    }

    /// Index of the first element matching `pred`.
    pub fn position(&self, pred: impl FnMut(&T) -> bool) -> Option<usize> {
        self.inner.items.borrow().iter().position(pred)
    }

    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.inner.items.borrow_mut();
            items.push(item.clone());
            items.len() - 1
        };
        self.inner.changes.emit(ChangeEvent::add(index, vec![item]));
    }

    pub fn insert(&self, index: usize, item: T) -> Result<()> {
        self.insert_many(index, vec![item])
    }

    /// Inserts a contiguous run as a single `Add`.
    pub fn insert_many(&self, index: usize, new_items: Vec<T>) -> Result<()> {
        {
            let mut items = self.inner.items.borrow_mut();
            if index > items.len() {
                return Err(Error::index_out_of_bounds(index, items.len()));
            }
            if new_items.is_empty() {
                return Ok(());
            }
            items.splice(index..index, new_items.iter().cloned());
        }
        self.inner.changes.emit(ChangeEvent::add(index, new_items));
        Ok(())
    }

    /// Appends a run as a single `Add`.
    pub fn extend(&self, new_items: Vec<T>) {
        if new_items.is_empty() {
            return;
        }
        let index = {
            let mut items = self.inner.items.borrow_mut();
            let index = items.len();
            items.extend(new_items.iter().cloned());
            index
        };
        self.inner.changes.emit(ChangeEvent::add(index, new_items));
    }

    pub fn remove_at(&self, index: usize) -> Result<T> {
        let item = {
            let mut items = self.inner.items.borrow_mut();
            if index >= items.len() {
                return Err(Error::index_out_of_bounds(index, items.len()));
            }
            items.remove(index)
        };
        self.inner
            .changes
            .emit(ChangeEvent::remove(index, vec![item.clone()]));
        Ok(item)
    }

    /// Removes `count` contiguous elements as a single `Remove`.
    pub fn remove_range(&self, index: usize, count: usize) -> Result<Vec<T>> {
        let removed: Vec<T> = {
            let mut items = self.inner.items.borrow_mut();
            let end = index.saturating_add(count);
            if end > items.len() {
                return Err(Error::index_out_of_bounds(end, items.len()));
            }
            if count == 0 {
                return Ok(Vec::new());
            }
            items.drain(index..end).collect()
        };
        self.inner
            .changes
            .emit(ChangeEvent::remove(index, removed.clone()));
        Ok(removed)
    }

    /// Removes the first element equal by identity to `id`.
    pub fn remove_id(&self, id: ItemId) -> Result<Option<T>>
    where
        T: Identity,
    {
        match self.position_of(id) {
            Some(index) => self.remove_at(index).map(Some),
            None => Ok(None),
        }
    }

    /// Overwrites one element, announced as a `Replace`.
    pub fn set(&self, index: usize, item: T) -> Result<T> {
        let old = {
            let mut items = self.inner.items.borrow_mut();
            let len = items.len();
            let slot = items
                .get_mut(index)
                .ok_or_else(|| Error::index_out_of_bounds(index, len))?;
            std::mem::replace(slot, item.clone())
        };
        let event = ChangeEvent::replace(index, vec![old.clone()], vec![item])?;
        self.inner.changes.emit(event);
        Ok(old)
    }

    /// Overwrites a contiguous run starting at `index`, announced as one
    /// `Replace` of equal length.
    pub fn replace_range(&self, index: usize, new_items: Vec<T>) -> Result<Vec<T>> {
        if new_items.is_empty() {
            return Ok(Vec::new());
        }
        let removed: Vec<T> = {
            let mut items = self.inner.items.borrow_mut();
            let end = index.saturating_add(new_items.len());
            if end > items.len() {
                return Err(Error::index_out_of_bounds(end, items.len()));
            }
            items.splice(index..end, new_items.iter().cloned()).collect()
        };
        let event = ChangeEvent::replace(index, removed.clone(), new_items)?;
        self.inner.changes.emit(event);
        Ok(removed)
    }

    /// Replaces the whole contents, announced as one `Reset`.
    pub fn reset_with(&self, new_items: Vec<T>) {
        *self.inner.items.borrow_mut() = new_items.clone();
        self.inner.changes.emit(ChangeEvent::reset(new_items));
    }

    /// Empties the sequence. Emits `Reset` unless it was already empty.
    pub fn clear(&self) {
        let was_empty = {
            let mut items = self.inner.items.borrow_mut();
            let was_empty = items.is_empty();
            items.clear();
            was_empty
        };
        if !was_empty {
            self.inner.changes.emit(ChangeEvent::reset(Vec::new()));
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent<T>) + 'static,
    {
        self.inner.changes.subscribe(callback)
    }

    pub fn position_of(&self, id: ItemId) -> Option<usize>
    where
        T: Identity,
    {
        self.position(|item| item.id() == id)
    }

    pub fn find(&self, id: ItemId) -> Option<T>
    where
        T: Identity,
    {
        self.inner
            .items
            .borrow()
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    pub fn contains_id(&self, id: ItemId) -> bool
    where
        T: Identity,
    {
        self.position_of(id).is_some()
    }
}

/// Weak counterpart of [`ObservableVec`].
pub struct WeakObservableVec<T> {
    inner: Weak<Inner<T>>,
}

impl<T> Clone for WeakObservableVec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> WeakObservableVec<T> {
    pub fn upgrade(&self) -> Option<ObservableVec<T>> {
        self.inner.upgrade().map(|inner| ObservableVec { inner })
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ObservableVec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.items.try_borrow() {
            Ok(items) => f.debug_list().entries(items.iter()).finish(),
            Err(_) => f.write_str("ObservableVec(<borrowed>)"),
        }
    }
}
