//! Read-only view of a timeline's display.

use vista_core::SubscriptionId;
use vista_feed::{ChangeEvent, ObservableVec};

use crate::label::{DisplayEntry, Label};

/// The labeled display sequence, observable but not writable by consumers.
pub struct DisplaySequence<V> {
    entries: ObservableVec<DisplayEntry<V>>,
}

impl<V> Clone for DisplaySequence<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<V: Clone + 'static> DisplaySequence<V> {
    pub(crate) fn new(entries: ObservableVec<DisplayEntry<V>>) -> Self {
        Self { entries }
    }

    /// Number of entries, labels included.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<DisplayEntry<V>> {
        self.entries.get(index)
    }

    pub fn snapshot(&self) -> Vec<DisplayEntry<V>> {
        self.entries.snapshot()
    }

    /// Runs `f` against the entries without copying them.
    pub fn with_entries<R>(&self, f: impl FnOnce(&[DisplayEntry<V>]) -> R) -> R {
        self.entries.with_items(f)
    }

    /// Displayed items in display order, labels skipped.
    pub fn items(&self) -> Vec<V> {
        self.entries
            .with_items(|entries| entries.iter().filter_map(DisplayEntry::as_item).cloned().collect())
    }

    pub fn labels(&self) -> Vec<Label> {
        self.entries
            .with_items(|entries| entries.iter().filter_map(DisplayEntry::as_label).copied().collect())
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent<DisplayEntry<V>>) + 'static,
    {
        self.entries.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.entries.unsubscribe(id)
    }
}
