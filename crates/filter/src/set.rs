//! Conjunction of criteria.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use vista_core::{ItemId, Notifier, PropertyName, SubscriptionId};

use crate::change::FilterChange;
use crate::criterion::Criterion;

/// Copies a slot's criterion, parameters only, into another set.
type Duplicate<T> = fn(&Slot<T>, &FilterSet<T>);

struct Slot<T: 'static> {
    type_id: TypeId,
    criterion: Rc<dyn Criterion<T>>,
    concrete: Rc<dyn Any>,
    subscription: SubscriptionId,
    duplicate: Duplicate<T>,
}

struct FilterSetInner<T: 'static> {
    slots: RefCell<Vec<Slot<T>>>,
    changes: Notifier<FilterChange>,
}

impl<T: 'static> Drop for FilterSetInner<T> {
    fn drop(&mut self) {
        for slot in self.slots.get_mut().drain(..) {
            slot.criterion.signals().unsubscribe(slot.subscription);
        }
    }
}

/// An ordered set of criteria, at most one of each type, combined by AND.
///
/// Criteria are created on first request. Every signal a member criterion
/// raises is re-published on the set's own feed. `FilterSet` is a shared
/// handle; use [`clone_parameters`](Self::clone_parameters) for an
/// independent copy.
pub struct FilterSet<T: 'static> {
    inner: Rc<FilterSetInner<T>>,
}

impl<T: 'static> Clone for FilterSet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Default for FilterSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> FilterSet<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(FilterSetInner {
                slots: RefCell::new(Vec::new()),
                changes: Notifier::new(),
            }),
        }
    }

    /// The criterion of type `C`, created (inactive) if the set has none yet.
    pub fn criterion<C>(&self) -> Rc<C>
    where
        C: Criterion<T> + Default + Clone,
    {
        if let Some(existing) = self.get::<C>() {
            return existing;
        }
        self.install(C::default())
    }

    /// The criterion of type `C` if the set has one.
    pub fn get<C>(&self) -> Option<Rc<C>>
    where
        C: Criterion<T>,
    {
        let type_id = TypeId::of::<C>();
        let concrete = self
            .inner
            .slots
            .borrow()
            .iter()
            .find(|slot| slot.type_id == type_id)
            .map(|slot| slot.concrete.clone())?;
        concrete.downcast::<C>().ok()
    }

    /// True if every criterion admits `item`. Stops at the first rejection.
    pub fn filter(&self, item: &T) -> bool {
        self.inner
            .slots
            .borrow()
            .iter()
            .all(|slot| slot.criterion.filter(item))
    }

    /// True if any criterion is active.
    pub fn is_active(&self) -> bool {
        self.inner
            .slots
            .borrow()
            .iter()
            .any(|slot| slot.criterion.is_active())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.slots.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.slots.borrow().is_empty()
    }

    /// Kind names of the member criteria, in creation order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.inner
            .slots
            .borrow()
            .iter()
            .map(|slot| slot.criterion.kind_name())
            .collect()
    }

    /// Clears every criterion. Each one signals `Loosened`.
    pub fn clear_all(&self) {
        for criterion in self.members() {
            criterion.clear_filter();
        }
    }

    /// A new, independent set with copies of every criterion's parameters.
    /// Listeners are not copied.
    pub fn clone_parameters(&self) -> FilterSet<T> {
        let copy = FilterSet::new();
        let slots = self.inner.slots.borrow();
        for slot in slots.iter() {
            (slot.duplicate)(slot, &copy);
        }
        copy
    }

    /// Forwards an item property change to every criterion.
    pub fn item_property_changed(&self, id: ItemId, property: PropertyName) {
        for criterion in self.members() {
            criterion.item_property_changed(id, property);
        }
    }

    /// Subscribes to the fanned-in signals of every member criterion.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&FilterChange) + 'static,
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

    fn members(&self) -> Vec<Rc<dyn Criterion<T>>> {
        self.inner
            .slots
            .borrow()
            .iter()
            .map(|slot| slot.criterion.clone())
            .collect()
    }

    fn install<C>(&self, criterion: C) -> Rc<C>
    where
        C: Criterion<T> + Clone,
    {
        let criterion = Rc::new(criterion);
        let weak: Weak<FilterSetInner<T>> = Rc::downgrade(&self.inner);
        let subscription = criterion.signals().subscribe(move |change: &FilterChange| {
            if let Some(inner) = weak.upgrade() {
                inner.changes.emit(*change);
            }
        });
        tracing::debug!(criterion = criterion.kind_name(), "criterion added to filter set");
        let member: Rc<dyn Criterion<T>> = criterion.clone();
        let concrete: Rc<dyn Any> = criterion.clone();
        self.inner.slots.borrow_mut().push(Slot {
            type_id: TypeId::of::<C>(),
            criterion: member,
            concrete,
            subscription,
            duplicate: duplicate_criterion::<T, C>,
        });
        criterion
    }
}

fn duplicate_criterion<T: 'static, C>(slot: &Slot<T>, target: &FilterSet<T>)
where
    C: Criterion<T> + Clone,
{
    if let Some(original) = slot.concrete.downcast_ref::<C>() {
        target.install(original.clone());
    }
}
