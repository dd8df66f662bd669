//! Tag criterion.

use std::cell::RefCell;
use std::collections::BTreeSet;
use vista_core::{property, Notifier, PropertyName};

use crate::change::FilterChange;
use crate::criterion::{Criterion, Tagged};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct TagParams {
    required: BTreeSet<String>,
    excluded: BTreeSet<String>,
}

/// Admits items carrying every required tag and none of the excluded ones.
#[derive(Default)]
pub struct TagCriterion {
    params: RefCell<TagParams>,
    signals: Notifier<FilterChange>,
}

impl Clone for TagCriterion {
    /// Copies the parameters. The clone starts with no listeners.
    fn clone(&self) -> Self {
        Self {
            params: RefCell::new(self.params.borrow().clone()),
            signals: Notifier::new(),
        }
    }
}

impl TagCriterion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&self) -> BTreeSet<String> {
        self.params.borrow().required.clone()
    }

    pub fn excluded(&self) -> BTreeSet<String> {
        self.params.borrow().excluded.clone()
    }

    /// Requires `tag`. Emits `Tightened` if it was not required yet.
    pub fn require(&self, tag: impl Into<String>) -> bool {
        let added = self.params.borrow_mut().required.insert(tag.into());
        self.signal_if(added, FilterChange::Tightened)
    }

    /// Stops requiring `tag`. Emits `Loosened` if it was required.
    pub fn unrequire(&self, tag: &str) -> bool {
        let removed = self.params.borrow_mut().required.remove(tag);
        self.signal_if(removed, FilterChange::Loosened)
    }

    /// Rejects items carrying `tag`. Emits `Tightened` if newly excluded.
    pub fn exclude(&self, tag: impl Into<String>) -> bool {
        let added = self.params.borrow_mut().excluded.insert(tag.into());
        self.signal_if(added, FilterChange::Tightened)
    }

    /// Stops rejecting `tag`. Emits `Loosened` if it was excluded.
    pub fn unexclude(&self, tag: &str) -> bool {
        let removed = self.params.borrow_mut().excluded.remove(tag);
        self.signal_if(removed, FilterChange::Loosened)
    }

    /// Replaces the required set.
    ///
    /// A strict superset of the old set tightens, a strict subset loosens,
    /// anything else is `Changed`.
    pub fn set_required(&self, tags: BTreeSet<String>) -> bool {
        let change = {
            let mut params = self.params.borrow_mut();
            if params.required == tags {
                None
            } else if tags.is_superset(&params.required) {
                params.required = tags;
                Some(FilterChange::Tightened)
            } else if tags.is_subset(&params.required) {
                params.required = tags;
                Some(FilterChange::Loosened)
            } else {
                params.required = tags;
                Some(FilterChange::Changed)
            }
        };
        match change {
            Some(change) => self.signal_if(true, change),
            None => false,
        }
    }

    fn signal_if(&self, changed: bool, change: FilterChange) -> bool {
        if changed {
            tracing::trace!(criterion = "tags", change = change.name(), "criterion updated");
            self.signals.emit(change);
        }
        changed
    }
}

impl<T: Tagged + ?Sized> Criterion<T> for TagCriterion {
    fn kind_name(&self) -> &'static str {
        "tags"
    }

    fn filter(&self, item: &T) -> bool {
        let params = self.params.borrow();
        params.required.iter().all(|tag| item.has_tag(tag))
            && !params.excluded.iter().any(|tag| item.has_tag(tag))
    }

    fn is_active(&self) -> bool {
        let params = self.params.borrow();
        !params.required.is_empty() || !params.excluded.is_empty()
    }

    fn clear_filter(&self) {
        *self.params.borrow_mut() = TagParams::default();
        self.signals.emit(FilterChange::Loosened);
    }

    fn signals(&self) -> &Notifier<FilterChange> {
        &self.signals
    }

    fn watched_properties(&self) -> &'static [PropertyName] {
        &[property::TAGS]
    }
}
