//! The filtered, sorted, labeled timeline view.

use std::cell::Cell;
use std::rc::{Rc, Weak};
use hashbrown::{HashMap, HashSet};
use vista_core::{
    property, Dated, Error, FaultHandler, Granularity, Identity, ItemId, NotifyPropertyChanged, OwnerCell, PropertyName,
    Result, Selectable, SubscriptionId,
};
use vista_feed::{ChangeEvent, ObservableVec};
use vista_filter::{FilterChange, FilterSet};

use crate::label::DisplayEntry;
use crate::layout::{first_empty_label, layout, locate, plan_insertion, removal_span, sort_key, SortKey};
use crate::options::TimelineOptions;
use crate::sequence::DisplaySequence;

/// Everything a timeline needs from the items it displays.
pub trait TimelineItem: Clone + Identity + Dated + Selectable + NotifyPropertyChanged + 'static {}

impl<T> TimelineItem for T where T: Clone + Identity + Dated + Selectable + NotifyPropertyChanged + 'static {}

/// An item the timeline knows about, displayed or not.
struct Tracked<V> {
    item: V,
    /// The key the item was last placed with.
    key: SortKey,
    watch: SubscriptionId,
}

struct Attachment<V> {
    source: ObservableVec<V>,
    subscription: SubscriptionId,
}

struct TimelineState<V> {
    full: HashMap<ItemId, Tracked<V>>,
    visible: HashSet<ItemId>,
    levels: Vec<Granularity>,
    attachment: Option<Attachment<V>>,
}

struct TimelineInner<V: TimelineItem> {
    cell: OwnerCell<TimelineState<V>>,
    display: ObservableVec<DisplayEntry<V>>,
    filters: FilterSet<V>,
    filter_subscription: SubscriptionId,
    options: Cell<TimelineOptions>,
    weak_self: Weak<TimelineInner<V>>,
}

/// A display sequence that tracks a source collection through a filter set.
///
/// The display holds every passing item exactly once, sorted by
/// `(timestamp, id)`, with Year/Month/Day labels at bucket boundaries.
/// Source changes, filter signals and item property changes are applied
/// incrementally. Items leaving the display are deselected.
///
/// `TimelineView` is a shared handle; clones drive the same view.
pub struct TimelineView<V: TimelineItem> {
    inner: Rc<TimelineInner<V>>,
}

impl<V: TimelineItem> Clone for TimelineView<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V: TimelineItem> TimelineView<V> {
    /// Creates an empty timeline driven by `filters`.
    pub fn new(filters: FilterSet<V>, options: TimelineOptions) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<TimelineInner<V>>| {
            let listener = weak.clone();
            let filter_subscription = filters.subscribe(move |change: &FilterChange| {
                if let Some(inner) = listener.upgrade() {
                    TimelineView { inner }.on_filter_change(*change);
                }
            });
            TimelineInner {
                cell: OwnerCell::new(TimelineState {
                    full: HashMap::new(),
                    visible: HashSet::new(),
                    levels: options.levels(),
                    attachment: None,
                }),
                display: ObservableVec::new(),
                filters,
                filter_subscription,
                options: Cell::new(options),
                weak_self: weak.clone(),
            }
        });
        Self { inner }
    }

    /// The observable display sequence.
    pub fn display(&self) -> DisplaySequence<V> {
        DisplaySequence::new(self.inner.display.clone())
    }

    /// The filter set this timeline follows.
    pub fn filters(&self) -> FilterSet<V> {
        self.inner.filters.clone()
    }

    #[inline]
    pub fn options(&self) -> TimelineOptions {
        self.inner.options.get()
    }

    /// Number of displayed items, labels excluded.
    pub fn len(&self) -> usize {
        self.inner
            .display
            .with_items(|entries| entries.iter().filter(|e| !e.is_label()).count())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.display.is_empty()
    }

    /// True if the item is currently displayed.
    pub fn is_visible(&self, id: ItemId) -> bool {
        self.inner
            .display
            .with_items(|entries| entries.iter().any(|e| e.item_id() == Some(id)))
    }

    /// Number of items known to the timeline, hidden ones included. `None`
    /// while an operation on the timeline is running.
    pub fn tracked_len(&self) -> Option<usize> {
        self.inner.cell.read(|state| state.full.len())
    }

    pub fn set_fault_handler(&self, handler: FaultHandler) {
        self.inner.cell.set_fault_handler(handler);
    }

    /// Changes the layout options and rebuilds the display.
    pub fn set_options(&self, options: TimelineOptions) -> Result<()> {
        self.inner.options.set(options);
        self.run(move |this, state| {
            state.levels = options.levels();
            this.rebuild(state)
        })
    }

    /// Follows `source`, replacing any previous attachment. The timeline is
    /// reset to the source's current contents.
    pub fn attach(&self, source: &ObservableVec<V>) -> Result<()> {
        let weak = Rc::downgrade(&self.inner);
        let subscription = source.subscribe(move |event: &ChangeEvent<V>| {
            if let Some(inner) = weak.upgrade() {
                let event = event.clone();
                TimelineView { inner }.run_or_report(move |this, state| this.apply_source(state, &event));
            }
        });
        let source = source.clone();
        self.run(move |this, state| {
            if let Some(previous) = state.attachment.take() {
                previous.source.unsubscribe(previous.subscription);
            }
            state.attachment = Some(Attachment { source, subscription });
            tracing::debug!("timeline attached");
            this.reset_from_source(state)
        })
    }

    /// Stops following the source. Tracked items stay displayed.
    pub fn detach(&self) -> Result<()> {
        self.run(|_, state| {
            if let Some(previous) = state.attachment.take() {
                previous.source.unsubscribe(previous.subscription);
                tracing::debug!("timeline detached");
            }
            Ok(())
        })
    }

    /// Starts tracking `items`, displaying those that pass the filters.
    pub fn add(&self, items: Vec<V>) -> Result<()> {
        self.run(move |this, state| this.add_items(state, &items))
    }

    /// Stops tracking the items with the given identities.
    pub fn remove(&self, ids: &[ItemId]) -> Result<()> {
        let ids = ids.to_vec();
        self.run(move |this, state| this.remove_items(state, &ids))
    }

    /// Removes display entries by value. Labels are synthetic and cannot be
    /// removed directly: any label in `entries` fails the whole call.
    pub fn remove_entries(&self, entries: &[DisplayEntry<V>]) -> Result<()> {
        if entries.iter().any(DisplayEntry::is_label) {
            return Err(Error::consistency("labels cannot be removed from a timeline directly"));
        }
        let ids: Vec<ItemId> = entries.iter().filter_map(DisplayEntry::item_id).collect();
        self.remove(&ids)
    }

    /// Re-evaluates one item against the filters.
    pub fn filter_status_changed(&self, id: ItemId) -> Result<()> {
        self.run(move |this, state| this.filter_status_changed_in(state, id))
    }

    /// Moves one item after its timestamp changed.
    pub fn sort_key_changed(&self, id: ItemId) -> Result<()> {
        self.run(move |this, state| this.sort_key_changed_in(state, id))
    }

    /// Drops displayed items that no longer pass. Never adds.
    pub fn filter_tightened(&self) -> Result<()> {
        self.run(|this, state| this.filter_tightened_in(state))
    }

    /// Displays hidden items that now pass. Never removes.
    pub fn filter_loosened(&self) -> Result<()> {
        self.run(|this, state| this.filter_loosened_in(state))
    }

    /// Handles a filter change of unknown direction.
    pub fn filter_changed(&self) -> Result<()> {
        self.refresh()
    }

    /// Rebuilds the display in one pass, published as a single `Reset`.
    pub fn refresh(&self) -> Result<()> {
        self.run(|this, state| this.rebuild(state))
    }

    /// Routes an item property change: a timestamp change moves the item,
    /// and every change is offered to the filters.
    pub fn item_property_changed(&self, id: ItemId, name: PropertyName) {
        if name == property::TIMESTAMP {
            self.run_or_report(move |this, state| this.sort_key_changed_in(state, id));
        }
        self.inner.filters.item_property_changed(id, name);
    }

    /// Verifies every structural guarantee of the display.
    pub fn check_invariants(&self) -> Result<()> {
        self.inner
            .cell
            .read(|state| self.inner.check(state))
            .unwrap_or_else(|| Err(Error::consistency("timeline is mid-operation")))
    }

    fn on_filter_change(&self, change: FilterChange) {
        tracing::trace!(change = %change, "timeline filter signal");
        match change {
            FilterChange::Tightened => self.run_or_report(|this, state| this.filter_tightened_in(state)),
            FilterChange::Loosened => self.run_or_report(|this, state| this.filter_loosened_in(state)),
            FilterChange::Changed => {
                if let Err(err) = self.filter_changed() {
                    self.inner.cell.report(&err);
                }
            }
            FilterChange::ItemAffected(id) => {
                self.run_or_report(move |this, state| this.filter_status_changed_in(state, id))
            }
        }
    }

    fn run<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&TimelineInner<V>, &mut TimelineState<V>) -> Result<()> + 'static,
    {
        let weak = Rc::downgrade(&self.inner);
        self.inner.cell.run(move |state| match weak.upgrade() {
            Some(this) => op(&this, state),
            None => Ok(()),
        })
    }

    fn run_or_report<F>(&self, op: F)
    where
        F: FnOnce(&TimelineInner<V>, &mut TimelineState<V>) -> Result<()> + 'static,
    {
        if let Err(err) = self.run(op) {
            self.inner.cell.report(&err);
        }
    }
}

impl<V: TimelineItem> TimelineInner<V> {
    fn key_of<'a>(state: &'a TimelineState<V>) -> impl Fn(&V) -> SortKey + 'a {
        move |item: &V| {
            state
                .full
                .get(&item.id())
                .map(|tracked| tracked.key)
                .unwrap_or_else(|| sort_key(item))
        }
    }

    fn track(&self, state: &mut TimelineState<V>, item: V) -> Result<()> {
        let id = item.id();
        if state.full.contains_key(&id) {
            return Err(Error::consistency(format!("item {id} added twice")));
        }
        let watcher = self.weak_self.clone();
        let watch = item.property_changed().subscribe(move |changed: &PropertyName| {
            if let Some(inner) = watcher.upgrade() {
                TimelineView { inner }.item_property_changed(id, *changed);
            }
        });
        let key = sort_key(&item);
        state.full.insert(id, Tracked { item, key, watch });
        Ok(())
    }

    fn untrack(&self, state: &mut TimelineState<V>, id: ItemId) -> Result<V> {
        let tracked = state
            .full
            .remove(&id)
            .ok_or_else(|| Error::consistency(format!("removed item {id} is not tracked")))?;
        tracked.item.property_changed().unsubscribe(tracked.watch);
        Ok(tracked.item)
    }

    fn add_items(&self, state: &mut TimelineState<V>, items: &[V]) -> Result<()> {
        for item in items {
            self.track(state, item.clone())?;
            if self.filters.filter(item) {
                self.insert_display(state, item.id())?;
            }
        }
        Ok(())
    }

    fn remove_items(&self, state: &mut TimelineState<V>, ids: &[ItemId]) -> Result<()> {
        for id in ids {
            if state.visible.contains(id) {
                self.remove_display(state, *id)?;
            }
            let item = self.untrack(state, *id)?;
            item.set_selected(false);
        }
        Ok(())
    }

    fn apply_source(&self, state: &mut TimelineState<V>, event: &ChangeEvent<V>) -> Result<()> {
        let outcome = self.apply_source_unchecked(state, event);
        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "timeline desynced from source, rebuilding");
            self.reset_from_source(state)?;
        }
        outcome
    }

    fn apply_source_unchecked(&self, state: &mut TimelineState<V>, event: &ChangeEvent<V>) -> Result<()> {
        event.validate()?;
        match event {
            ChangeEvent::Add { items, .. } => self.add_items(state, items),
            ChangeEvent::Remove { items, .. } => {
                let ids: Vec<ItemId> = items.iter().map(Identity::id).collect();
                self.remove_items(state, &ids)
            }
            ChangeEvent::Replace { removed, added, .. } => {
                let ids: Vec<ItemId> = removed.iter().map(Identity::id).collect();
                self.remove_items(state, &ids)?;
                self.add_items(state, added)
            }
            ChangeEvent::Reset { items } => self.reset_to(state, items.clone()),
        }
    }

    fn reset_from_source(&self, state: &mut TimelineState<V>) -> Result<()> {
        let Some(attachment) = &state.attachment else {
            return self.rebuild(state);
        };
        let items = attachment.source.snapshot();
        self.reset_to(state, items)
    }

    /// Replaces the tracked set with `items`.
    fn reset_to(&self, state: &mut TimelineState<V>, items: Vec<V>) -> Result<()> {
        let incoming: HashSet<ItemId> = items.iter().map(Identity::id).collect();

        let departed: Vec<V> = state
            .visible
            .iter()
            .filter(|id| !incoming.contains(*id))
            .filter_map(|id| state.full.get(id).map(|tracked| tracked.item.clone()))
            .collect();

        let known: Vec<ItemId> = state.full.keys().copied().collect();
        for id in known {
            self.untrack(state, id)?;
        }
        for item in items {
            if state.full.contains_key(&item.id()) {
                tracing::warn!(item = %item.id(), "duplicate item in source, ignoring");
                continue;
            }
            self.track(state, item)?;
        }
        self.rebuild(state)?;
        for item in departed {
            item.set_selected(false);
        }
        Ok(())
    }

    fn insert_display(&self, state: &mut TimelineState<V>, id: ItemId) -> Result<()> {
        let Some(tracked) = state.full.get_mut(&id) else {
            return Err(Error::consistency(format!("item {id} is not tracked")));
        };
        let item = tracked.item.clone();
        let key = sort_key(&item);
        tracked.key = key;

        let plan = {
            let key_of = Self::key_of(state);
            let levels = &state.levels;
            self.display
                .with_items(|entries| plan_insertion(entries, key, levels, key_of))
        };
        let mut run: Vec<DisplayEntry<V>> = plan.labels.into_iter().map(DisplayEntry::Label).collect();
        run.push(DisplayEntry::Item(item));
        tracing::trace!(item = %id, index = plan.index, entries = run.len(), "timeline insert");
        self.display.insert_many(plan.index, run)?;
        state.visible.insert(id);
        Ok(())
    }

    fn remove_display(&self, state: &mut TimelineState<V>, id: ItemId) -> Result<V> {
        let key = state
            .full
            .get(&id)
            .map(|tracked| tracked.key)
            .ok_or_else(|| Error::consistency(format!("item {id} is not tracked")))?;

        let span = {
            let key_of = Self::key_of(state);
            self.display.with_items(|entries| {
                let at = locate(entries, key, key_of);
                let index = if entries.get(at).and_then(DisplayEntry::item_id) == Some(id) {
                    Some(at)
                } else {
                    entries.iter().position(|e| e.item_id() == Some(id))
                };
                index.map(|index| removal_span(entries, index))
            })
        };
        let Some(span) = span else {
            return Err(Error::consistency(format!("displayed item {id} is missing from the display")));
        };

        let removed = self.display.remove_range(span.start, span.len())?;
        let mut item = None;
        for entry in removed {
            match entry {
                DisplayEntry::Item(v) if v.id() == id => item = Some(v),
                DisplayEntry::Label(_) => {}
                DisplayEntry::Item(other) => {
                    return Err(Error::consistency(format!(
                        "removing {id} would also remove item {}",
                        other.id()
                    )));
                }
            }
        }
        state.visible.remove(&id);
        tracing::trace!(item = %id, entries = span.len(), "timeline remove");
        item.ok_or_else(|| Error::consistency(format!("item {id} vanished during removal")))
    }

    fn filter_status_changed_in(&self, state: &mut TimelineState<V>, id: ItemId) -> Result<()> {
        let Some(tracked) = state.full.get(&id) else {
            return Ok(());
        };
        let passes = self.filters.filter(&tracked.item);
        match (passes, state.visible.contains(&id)) {
            (true, false) => self.insert_display(state, id),
            (false, true) => {
                let item = self.remove_display(state, id)?;
                item.set_selected(false);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn sort_key_changed_in(&self, state: &mut TimelineState<V>, id: ItemId) -> Result<()> {
        let Some(tracked) = state.full.get(&id) else {
            return Ok(());
        };
        let item = tracked.item.clone();
        if state.visible.contains(&id) {
            self.remove_display(state, id)?;
        }
        if self.filters.filter(&item) {
            self.insert_display(state, id)
        } else {
            if let Some(tracked) = state.full.get_mut(&id) {
                tracked.key = sort_key(&item);
            }
            item.set_selected(false);
            Ok(())
        }
    }

    fn filter_tightened_in(&self, state: &mut TimelineState<V>) -> Result<()> {
        let displayed: Vec<V> = self
            .display
            .with_items(|entries| entries.iter().filter_map(DisplayEntry::as_item).cloned().collect());
        let mut dropped = 0usize;
        for item in displayed {
            if !self.filters.filter(&item) {
                let item = self.remove_display(state, item.id())?;
                item.set_selected(false);
                dropped += 1;
            }
        }
        tracing::debug!(dropped, "filter tightened");
        Ok(())
    }

    fn filter_loosened_in(&self, state: &mut TimelineState<V>) -> Result<()> {
        let mut admitted: Vec<(SortKey, ItemId)> = state
            .full
            .values()
            .filter(|tracked| !state.visible.contains(&tracked.item.id()))
            .filter(|tracked| self.filters.filter(&tracked.item))
            .map(|tracked| (sort_key(&tracked.item), tracked.item.id()))
            .collect();
        admitted.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        tracing::debug!(admitted = admitted.len(), "filter loosened");
        for (_, id) in admitted {
            self.insert_display(state, id)?;
        }
        Ok(())
    }

    fn rebuild(&self, state: &mut TimelineState<V>) -> Result<()> {
        let mut passing: Vec<(SortKey, V)> = Vec::new();
        for tracked in state.full.values_mut() {
            tracked.key = sort_key(&tracked.item);
            if self.filters.filter(&tracked.item) {
                passing.push((tracked.key, tracked.item.clone()));
            }
        }
        passing.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let items: Vec<V> = passing.into_iter().map(|(_, item)| item).collect();
        let entries = layout(&items, &state.levels);

        let now: HashSet<ItemId> = items.iter().map(Identity::id).collect();
        let departed: Vec<V> = state
            .visible
            .iter()
            .filter(|id| !now.contains(*id))
            .filter_map(|id| state.full.get(id).map(|tracked| tracked.item.clone()))
            .collect();
        state.visible = now;

        tracing::debug!(items = items.len(), entries = entries.len(), "timeline rebuilt");
        self.display.reset_with(entries);
        for item in departed {
            item.set_selected(false);
        }
        Ok(())
    }

    fn check(&self, state: &TimelineState<V>) -> Result<()> {
        let entries = self.display.snapshot();
        let items: Vec<V> = entries.iter().filter_map(DisplayEntry::as_item).cloned().collect();

        for item in &items {
            if !self.filters.filter(item) {
                return Err(Error::consistency(format!("displayed item {} fails the filters", item.id())));
            }
            if !state.full.contains_key(&item.id()) {
                return Err(Error::consistency(format!("displayed item {} is not tracked", item.id())));
            }
        }
        for tracked in state.full.values() {
            let id = tracked.item.id();
            if self.filters.filter(&tracked.item) && !state.visible.contains(&id) {
                return Err(Error::consistency(format!("passing item {id} is hidden")));
            }
        }
        if state.visible.len() != items.len() {
            return Err(Error::consistency(format!(
                "{} items displayed but {} marked visible",
                items.len(),
                state.visible.len()
            )));
        }
        for pair in items.windows(2) {
            if sort_key(&pair[0]) >= sort_key(&pair[1]) {
                return Err(Error::consistency(format!(
                    "items {} and {} are out of order",
                    pair[0].id(),
                    pair[1].id()
                )));
            }
        }
        if state.levels.is_empty() && entries.iter().any(DisplayEntry::is_label) {
            return Err(Error::consistency("labels displayed while labels are disabled"));
        }
        if let Some(index) = first_empty_label(&entries) {
            return Err(Error::consistency(format!("label at {index} is empty")));
        }

        let expected = layout(&items, &state.levels);
        if expected.len() != entries.len() {
            return Err(Error::consistency(format!(
                "display has {} entries, expected {}",
                entries.len(),
                expected.len()
            )));
        }
        for (index, (want, have)) in expected.iter().zip(entries.iter()).enumerate() {
            let same = match (want, have) {
                (DisplayEntry::Label(a), DisplayEntry::Label(b)) => a == b,
                (DisplayEntry::Item(a), DisplayEntry::Item(b)) => a.id() == b.id(),
                _ => false,
            };
            if !same {
                return Err(Error::consistency(format!("label chain broken at entry {index}")));
            }
        }
        Ok(())
    }
}

impl<V: TimelineItem> Drop for TimelineInner<V> {
    fn drop(&mut self) {
        self.filters.unsubscribe(self.filter_subscription);
        let state = self.cell.get_mut();
        if let Some(attachment) = state.attachment.take() {
            attachment.source.unsubscribe(attachment.subscription);
        }
        for (_, tracked) in state.full.drain() {
            tracked.item.property_changed().unsubscribe(tracked.watch);
        }
    }
}
