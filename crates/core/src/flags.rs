//! View-only status flags.

use crate::notify::Notifier;
use crate::traits::{property, PropertyName};
use std::cell::Cell;

/// Selection and in-view flags carried by a view item.
///
/// Both flags are view state: they never feed back into the domain model.
/// Setters emit on the owning item's property notifier, and only when the
/// value actually changes.
#[derive(Debug, Default)]
pub struct ViewFlags {
    selected: Cell<bool>,
    in_view: Cell<bool>,
}

impl ViewFlags {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selected.get()
    }

    #[inline]
    pub fn is_in_view(&self) -> bool {
        self.in_view.get()
    }

    /// Returns true if the value changed.
    pub fn set_selected(&self, selected: bool, notifier: &Notifier<PropertyName>) -> bool {
        Self::set(&self.selected, selected, property::IS_SELECTED, notifier)
    }

    /// Returns true if the value changed.
    pub fn set_in_view(&self, in_view: bool, notifier: &Notifier<PropertyName>) -> bool {
        Self::set(&self.in_view, in_view, property::IS_IN_VIEW, notifier)
    }

    fn set(cell: &Cell<bool>, value: bool, name: PropertyName, notifier: &Notifier<PropertyName>) -> bool {
        if cell.replace(value) == value {
            return false;
        }
        notifier.emit(name);
        true
    }
}
