//! Checks that a signalled direction matches what actually happened.

use vista_core::{Error, Identity, ItemId, Result};

use crate::change::FilterChange;

/// Which items a filter admitted at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdmissionSnapshot {
    verdicts: Vec<(ItemId, bool)>,
}

impl AdmissionSnapshot {
    pub fn capture<T: Identity>(items: &[T], filter: impl Fn(&T) -> bool) -> Self {
        Self {
            verdicts: items.iter().map(|item| (item.id(), filter(item))).collect(),
        }
    }

    pub fn admitted(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.verdicts.iter().filter(|(_, ok)| *ok).map(|(id, _)| *id)
    }

    pub fn admits(&self, id: ItemId) -> Option<bool> {
        self.verdicts.iter().find(|(item, _)| *item == id).map(|(_, ok)| *ok)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}

/// Verifies the subset/superset precondition of `change` between two
/// snapshots of the same items.
///
/// A `Tightened` change must not admit anything that was rejected before
/// and a `Loosened` change must not reject anything that was admitted
/// before. `Changed` and `ItemAffected` carry no precondition.
pub fn audit_transition(
    before: &AdmissionSnapshot,
    after: &AdmissionSnapshot,
    change: &FilterChange,
    criterion: &str,
) -> Result<()> {
    for (id, was) in &before.verdicts {
        let Some(now) = after.admits(*id) else { continue };
        let violated = match change {
            FilterChange::Tightened => !*was && now,
            FilterChange::Loosened => *was && !now,
            FilterChange::Changed | FilterChange::ItemAffected(_) => false,
        };
        if violated {
            tracing::warn!(criterion, change = change.name(), item = %id, "filter direction violated");
            return Err(Error::invalid_transition(criterion, change.name(), *id));
        }
    }
    Ok(())
}
