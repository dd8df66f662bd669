//! Map item criterion.

use std::cell::Cell;
use vista_core::{property, ItemId, Notifier, PropertyName};

use crate::change::FilterChange;
use crate::criterion::{Criterion, MapAssociated};

/// Admits items associated with the chosen map item.
#[derive(Default)]
pub struct MapItemCriterion {
    selected: Cell<Option<ItemId>>,
    signals: Notifier<FilterChange>,
}

impl Clone for MapItemCriterion {
    fn clone(&self) -> Self {
        Self {
            selected: Cell::new(self.selected.get()),
            signals: Notifier::new(),
        }
    }
}

impl MapItemCriterion {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn map_item(&self) -> Option<ItemId> {
        self.selected.get()
    }

    /// Chooses the map item, or `None` to admit everything.
    pub fn set_map_item(&self, map_item: Option<ItemId>) -> bool {
        let previous = self.selected.replace(map_item);
        let change = match (previous, map_item) {
            (None, None) => return false,
            (Some(a), Some(b)) if a == b => return false,
            (None, Some(_)) => FilterChange::Tightened,
            (Some(_), None) => FilterChange::Loosened,
            (Some(_), Some(_)) => FilterChange::Changed,
        };
        tracing::trace!(criterion = "map_item", change = change.name(), "criterion updated");
        self.signals.emit(change);
        true
    }
}

impl<T: MapAssociated + ?Sized> Criterion<T> for MapItemCriterion {
    fn kind_name(&self) -> &'static str {
        "map_item"
    }

    fn filter(&self, item: &T) -> bool {
        self.selected
            .get()
            .map_or(true, |map_item| item.is_associated_with(map_item))
    }

    fn is_active(&self) -> bool {
        self.selected.get().is_some()
    }

    fn clear_filter(&self) {
        self.selected.set(None);
        self.signals.emit(FilterChange::Loosened);
    }

    fn signals(&self) -> &Notifier<FilterChange> {
        &self.signals
    }

    fn watched_properties(&self) -> &'static [PropertyName] {
        &[property::MAP_ITEMS]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{population, record, Item};

    #[test]
    fn test_filter_by_place() {
        let items = population();
        let c = MapItemCriterion::new();
        c.set_map_item(Some(ItemId::new(200)));

        let admitted: Vec<u64> = items
            .iter()
            .filter(|i| Criterion::<Item>::filter(&c, *i))
            .map(|i| i.id.raw())
            .collect();
        assert_eq!(admitted, vec![3, 5]);
    }

    #[test]
    fn test_transitions() {
        let c = MapItemCriterion::new();
        let log = record(Criterion::<Item>::signals(&c));

        assert!(!c.set_map_item(None));
        assert!(c.set_map_item(Some(ItemId::new(1))));
        assert!(!c.set_map_item(Some(ItemId::new(1))));
        assert!(c.set_map_item(Some(ItemId::new(2))));
        assert!(c.set_map_item(None));

        assert_eq!(
            *log.borrow(),
            vec![FilterChange::Tightened, FilterChange::Changed, FilterChange::Loosened]
        );
    }
}
