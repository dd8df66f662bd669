//! The criterion contract and the item attributes criteria read.

use std::rc::Rc;
use vista_core::{ItemId, Notifier, PropertyName};

use crate::change::FilterChange;

/// One parameterized filter rule over items of type `T`.
///
/// `filter` must be pure given the current parameters. An inactive
/// criterion admits everything. Every effective parameter change emits
/// exactly one signal on `signals()`; a no-op change emits nothing.
pub trait Criterion<T: ?Sized>: 'static {
    /// Stable name used in logs and audit errors.
    fn kind_name(&self) -> &'static str;

    fn filter(&self, item: &T) -> bool;

    fn is_active(&self) -> bool;

    /// Resets every parameter to its inactive value. Always emits `Loosened`.
    fn clear_filter(&self);

    fn signals(&self) -> &Notifier<FilterChange>;

    /// Item properties whose change can alter this criterion's verdict.
    fn watched_properties(&self) -> &'static [PropertyName];

    /// Emits `ItemAffected(id)` if the changed property is one this
    /// criterion reads and the criterion is active.
    fn item_property_changed(&self, id: ItemId, property: PropertyName) {
        if self.is_active() && self.watched_properties().contains(&property) {
            self.signals().emit(FilterChange::ItemAffected(id));
        }
    }
}

/// Items carrying a tag set.
pub trait Tagged {
    fn has_tag(&self, tag: &str) -> bool;
}

/// Items that can be associated with map items.
pub trait MapAssociated {
    fn is_associated_with(&self, map_item: ItemId) -> bool;
}

/// Items with a user-facing name.
pub trait Named {
    fn display_name(&self) -> String;
}

impl<T: Tagged + ?Sized> Tagged for Rc<T> {
    #[inline]
    fn has_tag(&self, tag: &str) -> bool {
        (**self).has_tag(tag)
    }
}

impl<T: MapAssociated + ?Sized> MapAssociated for Rc<T> {
    #[inline]
    fn is_associated_with(&self, map_item: ItemId) -> bool {
        (**self).is_associated_with(map_item)
    }
}

impl<T: Named + ?Sized> Named for Rc<T> {
    #[inline]
    fn display_name(&self) -> String {
        (**self).display_name()
    }
}
