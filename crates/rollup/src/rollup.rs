//! Field rollup over a parent collection.

use std::rc::{Rc, Weak};
use hashbrown::{HashMap, HashSet};
use vista_core::{
    Error, FaultHandler, Identity, ItemId, NotifyPropertyChanged, OwnerCell, PropertyName, Result, SubscriptionId,
};
use vista_feed::{ChangeEvent, ObservableSet, ObservableVec};

use crate::extractor::FieldExtractor;

struct Attachment<C> {
    parent: ObservableVec<C>,
    subscription: SubscriptionId,
}

struct Child<C, T> {
    item: C,
    /// What the child currently contributes, one entry per occurrence.
    values: Vec<T>,
    nested: Option<(ObservableVec<T>, SubscriptionId)>,
    watch: Option<SubscriptionId>,
}

struct RollupState<C, T> {
    children: Vec<Child<C, T>>,
    /// How many contributions hold each value.
    holders: HashMap<T, usize>,
    attachment: Option<Attachment<C>>,
}

/// Everything a rollup needs from its children.
pub trait RollupChild: Clone + Identity + NotifyPropertyChanged + 'static {}

impl<T> RollupChild for T where T: Clone + Identity + NotifyPropertyChanged + 'static {}

struct RollupInner<C: RollupChild, E: FieldExtractor<C>> {
    extractor: E,
    values: ObservableSet<E::Value>,
    cell: OwnerCell<RollupState<C, E::Value>>,
    weak_self: Weak<RollupInner<C, E>>,
}

/// Keeps the deduplicated union of one field across every child of a
/// parent collection.
///
/// The union is published as an [`ObservableSet`]. Child additions and
/// removals, and edits to a child's nested collection, are applied
/// incrementally. A value leaves the set only when no remaining child
/// holds it. A nested `Reset` or a change to a child's single value
/// recounts the set, published as one `Reset`.
///
/// `Rollup` is a shared handle; clones drive the same aggregate.
pub struct Rollup<C: RollupChild, E: FieldExtractor<C>> {
    inner: Rc<RollupInner<C, E>>,
}

impl<C: RollupChild, E: FieldExtractor<C>> Clone for Rollup<C, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: RollupChild, E: FieldExtractor<C>> Rollup<C, E> {
    /// Creates a detached rollup with no children.
    pub fn new(extractor: E) -> Self {
        let inner = Rc::new_cyclic(|weak| RollupInner {
            extractor,
            values: ObservableSet::new(),
            cell: OwnerCell::new(RollupState {
                children: Vec::new(),
                holders: HashMap::new(),
                attachment: None,
            }),
            weak_self: weak.clone(),
        });
        Self { inner }
    }

    /// The rolled-up values.
    pub fn values(&self) -> ObservableSet<E::Value> {
        self.inner.values.clone()
    }

    pub fn snapshot(&self) -> Vec<E::Value> {
        self.inner.values.snapshot()
    }

    #[inline]
    pub fn contains(&self, value: &E::Value) -> bool {
        self.inner.values.contains(value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.values.is_empty()
    }

    /// Number of children currently aggregated, or `None` while the rollup
    /// is applying a change.
    pub fn child_count(&self) -> Option<usize> {
        self.inner.cell.read(|state| state.children.len())
    }

    pub fn set_fault_handler(&self, handler: FaultHandler) {
        self.inner.cell.set_fault_handler(handler);
    }

    /// Follows `parent`, replacing any previous attachment, and rebuilds
    /// from its current children.
    pub fn attach(&self, parent: &ObservableVec<C>) -> Result<()> {
        let weak = Rc::downgrade(&self.inner);
        let subscription = parent.subscribe(move |event: &ChangeEvent<C>| {
            if let Some(inner) = weak.upgrade() {
                let event = event.clone();
                Rollup { inner }.run_or_report(move |this, state| this.apply_parent(state, &event));
            }
        });
        let parent = parent.clone();
        self.run(move |this, state| {
            if let Some(previous) = state.attachment.take() {
                previous.parent.unsubscribe(previous.subscription);
            }
            state.attachment = Some(Attachment { parent, subscription });
            tracing::debug!("rollup attached");
            this.rebuild(state)
        })
    }

    /// Stops following the parent. Current children keep contributing.
    pub fn detach(&self) -> Result<()> {
        self.run(|_, state| {
            if let Some(previous) = state.attachment.take() {
                previous.parent.unsubscribe(previous.subscription);
                tracing::debug!("rollup detached");
            }
            Ok(())
        })
    }

    /// Applies one change event from the parent collection.
    pub fn apply(&self, event: &ChangeEvent<C>) -> Result<()> {
        let event = event.clone();
        self.run(move |this, state| this.apply_parent(state, &event))
    }

    /// Rebuilds the set from every child, published as one `Reset`.
    pub fn reset(&self) -> Result<()> {
        self.run(|this, state| this.rebuild(state))
    }

    /// Verifies the set equals the union of every child's current values.
    pub fn check_invariants(&self) -> Result<()> {
        self.inner
            .cell
            .read(|state| self.inner.check(state))
            .unwrap_or_else(|| Err(Error::consistency("rollup is mid-operation")))
    }

    fn run<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&RollupInner<C, E>, &mut RollupState<C, E::Value>) -> Result<()> + 'static,
    {
        let weak = Rc::downgrade(&self.inner);
        self.inner.cell.run(move |state| match weak.upgrade() {
            Some(this) => op(&this, state),
            None => Ok(()),
        })
    }

    fn run_or_report<F>(&self, op: F)
    where
        F: FnOnce(&RollupInner<C, E>, &mut RollupState<C, E::Value>) -> Result<()> + 'static,
    {
        if let Err(err) = self.run(op) {
            self.inner.cell.report(&err);
        }
    }
}

impl<C: RollupChild, E: FieldExtractor<C>> RollupInner<C, E> {
    /// Starts following `item`; returns the values it newly brings in.
    fn track(&self, state: &mut RollupState<C, E::Value>, item: C) -> Result<Vec<E::Value>> {
        let id = item.id();
        if state.children.iter().any(|child| child.item.id() == id) {
            return Err(Error::consistency(format!("child {id} added twice")));
        }

        let (values, nested, watch) = if self.extractor.is_multi(&item) {
            match self.extractor.multi(&item) {
                Some(collection) => {
                    let listener = self.weak_self.clone();
                    let subscription = collection.subscribe(move |event: &ChangeEvent<E::Value>| {
                        if let Some(inner) = listener.upgrade() {
                            let event = event.clone();
                            Rollup { inner }.run_or_report(move |this, state| this.apply_nested(state, id, &event));
                        }
                    });
                    (collection.snapshot(), Some((collection, subscription)), None)
                }
                None => (Vec::new(), None, None),
            }
        } else {
            let property = self.extractor.single_property(&item);
            let listener = self.weak_self.clone();
            let watch = item.property_changed().subscribe(move |changed: &PropertyName| {
                if *changed != property {
                    return;
                }
                if let Some(inner) = listener.upgrade() {
                    tracing::trace!(child = %id, property, "rollup field changed");
                    Rollup { inner }.run_or_report(move |this, state| this.refresh_single(state, id));
                }
            });
            (self.extractor.single(&item).into_iter().collect(), None, Some(watch))
        };

        let fresh: Vec<E::Value> = values
            .iter()
            .filter(|value| hold(&mut state.holders, *value))
            .cloned()
            .collect();
        state.children.push(Child {
            item,
            values,
            nested,
            watch,
        });
        Ok(fresh)
    }

    fn add_children(&self, state: &mut RollupState<C, E::Value>, items: &[C]) -> Result<()> {
        let mut fresh = Vec::new();
        for item in items {
            fresh.extend(self.track(state, item.clone())?);
        }
        self.values.insert_many(fresh);
        Ok(())
    }

    fn remove_children(&self, state: &mut RollupState<C, E::Value>, items: &[C]) -> Result<()> {
        let mut gone = Vec::new();
        for item in items {
            let id = item.id();
            let position = state
                .children
                .iter()
                .position(|child| child.item.id() == id)
                .ok_or_else(|| Error::consistency(format!("removed child {id} is not tracked")))?;
            let child = state.children.remove(position);
            release_subscriptions(&child);
            for value in child.values {
                if release(&mut state.holders, &value)? {
                    gone.push(value);
                }
            }
        }
        for value in &gone {
            self.values.remove(value);
        }
        Ok(())
    }

    fn apply_parent(&self, state: &mut RollupState<C, E::Value>, event: &ChangeEvent<C>) -> Result<()> {
        let outcome = self.apply_parent_unchecked(state, event);
        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "rollup desynced from parent, rebuilding");
            self.rebuild(state)?;
        }
        outcome
    }

    fn apply_parent_unchecked(&self, state: &mut RollupState<C, E::Value>, event: &ChangeEvent<C>) -> Result<()> {
        event.validate()?;
        match event {
            ChangeEvent::Add { items, .. } => self.add_children(state, items),
            ChangeEvent::Remove { items, .. } => self.remove_children(state, items),
            ChangeEvent::Replace { removed, added, .. } => {
                self.remove_children(state, removed)?;
                self.add_children(state, added)
            }
            ChangeEvent::Reset { items } => self.reset_children(state, items),
        }
    }

    fn apply_nested(
        &self,
        state: &mut RollupState<C, E::Value>,
        id: ItemId,
        event: &ChangeEvent<E::Value>,
    ) -> Result<()> {
        if let ChangeEvent::Reset { items } = event {
            return self.reset_nested(state, id, items);
        }
        let outcome = self.apply_nested_unchecked(state, id, event);
        if let Err(err) = &outcome {
            tracing::warn!(child = %id, error = %err, "rollup desynced from child, rebuilding");
            self.rebuild(state)?;
        }
        outcome
    }

    fn apply_nested_unchecked(
        &self,
        state: &mut RollupState<C, E::Value>,
        id: ItemId,
        event: &ChangeEvent<E::Value>,
    ) -> Result<()> {
        event.validate()?;
        let RollupState { children, holders, .. } = state;
        let Some(child) = children.iter_mut().find(|child| child.item.id() == id) else {
            return Ok(());
        };

        let mut gone = Vec::new();
        for value in event.removed() {
            let position = child
                .values
                .iter()
                .position(|held| held == value)
                .ok_or_else(|| Error::consistency(format!("child {id} removed a value it never held")))?;
            child.values.swap_remove(position);
            if release(holders, value)? {
                gone.push(value.clone());
            }
        }
        let mut fresh = Vec::new();
        for value in event.added() {
            child.values.push(value.clone());
            if hold(holders, value) {
                fresh.push(value.clone());
            }
        }

        // A value both dropped and re-added by the same event stays put.
        gone.retain(|value| !holders.contains_key(value));
        for value in &gone {
            self.values.remove(value);
        }
        self.values.insert_many(fresh);
        Ok(())
    }

    /// Replaces the children with `items`. Children already tracked under
    /// the same identity keep their subscriptions and mirrored values.
    fn reset_children(&self, state: &mut RollupState<C, E::Value>, items: &[C]) -> Result<()> {
        let mut previous = std::mem::take(&mut state.children);
        state.holders.clear();
        for item in items {
            let id = item.id();
            if state.children.iter().any(|child| child.item.id() == id) {
                tracing::warn!(child = %id, "duplicate child in parent, ignoring");
                continue;
            }
            match previous.iter().position(|child| child.item.id() == id) {
                Some(position) => {
                    let child = previous.swap_remove(position);
                    for value in &child.values {
                        hold(&mut state.holders, value);
                    }
                    state.children.push(child);
                }
                None => {
                    if let Err(err) = self.track(state, item.clone()) {
                        for child in &previous {
                            release_subscriptions(child);
                        }
                        return Err(err);
                    }
                }
            }
        }
        for child in previous {
            release_subscriptions(&child);
        }
        self.publish(state);
        Ok(())
    }

    fn reset_nested(&self, state: &mut RollupState<C, E::Value>, id: ItemId, items: &[E::Value]) -> Result<()> {
        let Some(child) = state.children.iter_mut().find(|child| child.item.id() == id) else {
            return Ok(());
        };
        child.values = items.to_vec();
        recount(state);
        self.publish(state);
        Ok(())
    }

    fn refresh_single(&self, state: &mut RollupState<C, E::Value>, id: ItemId) -> Result<()> {
        let Some(child) = state.children.iter_mut().find(|child| child.item.id() == id) else {
            return Ok(());
        };
        child.values = self.extractor.single(&child.item).into_iter().collect();
        recount(state);
        self.publish(state);
        Ok(())
    }

    /// Re-reads every child from scratch. Used on attach and after a desync.
    fn rebuild(&self, state: &mut RollupState<C, E::Value>) -> Result<()> {
        let items: Vec<C> = match &state.attachment {
            Some(attachment) => attachment.parent.snapshot(),
            None => state.children.iter().map(|child| child.item.clone()).collect(),
        };
        for child in state.children.drain(..) {
            release_subscriptions(&child);
        }
        state.holders.clear();

        for item in items {
            if state.children.iter().any(|child| child.item.id() == item.id()) {
                tracing::warn!(child = %item.id(), "duplicate child in parent, ignoring");
                continue;
            }
            self.track(state, item)?;
        }
        self.publish(state);
        Ok(())
    }

    fn publish(&self, state: &RollupState<C, E::Value>) {
        let ordered: Vec<E::Value> = state
            .children
            .iter()
            .flat_map(|child| child.values.iter().cloned())
            .collect();
        tracing::debug!(children = state.children.len(), values = state.holders.len(), "rollup rebuilt");
        self.values.reset_with(ordered);
    }

    fn check(&self, state: &RollupState<C, E::Value>) -> Result<()> {
        let mut expected: HashSet<E::Value> = HashSet::new();
        for child in &state.children {
            let current: Vec<E::Value> = if self.extractor.is_multi(&child.item) {
                self.extractor
                    .multi(&child.item)
                    .map(|nested| nested.snapshot())
                    .unwrap_or_default()
            } else {
                self.extractor.single(&child.item).into_iter().collect()
            };
            expected.extend(current);
        }

        let published = self.values.snapshot();
        if published.len() != expected.len() || published.iter().any(|value| !expected.contains(value)) {
            return Err(Error::consistency(format!(
                "rollup holds {} values, children hold {}",
                published.len(),
                expected.len()
            )));
        }
        if state.holders.len() != expected.len() {
            return Err(Error::consistency("holder counts disagree with the rolled-up values"));
        }
        Ok(())
    }
}

impl<C: RollupChild, E: FieldExtractor<C>> Drop for RollupInner<C, E> {
    fn drop(&mut self) {
        let state = self.cell.get_mut();
        if let Some(attachment) = state.attachment.take() {
            attachment.parent.unsubscribe(attachment.subscription);
        }
        for child in state.children.drain(..) {
            release_subscriptions(&child);
        }
    }
}

fn release_subscriptions<C: NotifyPropertyChanged, T>(child: &Child<C, T>) {
    if let Some((nested, subscription)) = &child.nested {
        nested.unsubscribe(*subscription);
    }
    if let Some(watch) = child.watch {
        child.item.property_changed().unsubscribe(watch);
    }
}

fn recount<C, T: Eq + std::hash::Hash + Clone>(state: &mut RollupState<C, T>) {
    state.holders.clear();
    for child in &state.children {
        for value in &child.values {
            hold(&mut state.holders, value);
        }
    }
}

/// Records one more holder of `value`; true if it was not held before.
fn hold<T: Eq + std::hash::Hash + Clone>(holders: &mut HashMap<T, usize>, value: &T) -> bool {
    let count = holders.entry(value.clone()).or_insert(0);
    *count += 1;
    *count == 1
}

/// Drops one holder of `value`; true if nobody holds it any more.
fn release<T: Eq + std::hash::Hash>(holders: &mut HashMap<T, usize>, value: &T) -> Result<bool> {
    let Some(count) = holders.get_mut(value) else {
        return Err(Error::consistency("released a value that was not held"));
    };
    *count -= 1;
    if *count == 0 {
        holders.remove(value);
        return Ok(true);
    }
    Ok(false)
}
