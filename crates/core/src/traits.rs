//! Capability traits shared by domain items and view items.

use crate::notify::Notifier;
use crate::timestamp::Timestamp;
use std::rc::Rc;

/// Name of an observable property.
pub type PropertyName = &'static str;

/// Well-known property names.
pub mod property {
    use super::PropertyName;

    pub const TIMESTAMP: PropertyName = "timestamp";
    pub const TAGS: PropertyName = "tags";
    pub const NAME: PropertyName = "name";
    pub const MAP_ITEMS: PropertyName = "map_items";
    pub const IS_SELECTED: PropertyName = "is_selected";
    pub const IS_IN_VIEW: PropertyName = "is_in_view";
}

/// An item that announces property changes by name.
pub trait NotifyPropertyChanged {
    /// Per-item property change notifications.
    fn property_changed(&self) -> &Notifier<PropertyName>;
}

/// An item placed on the timeline by its timestamp.
pub trait Dated {
    fn timestamp(&self) -> Timestamp;
}

/// An item the user can select.
pub trait Selectable {
    fn is_selected(&self) -> bool;

    /// Sets the selection state. Emits `is_selected` only when it changes.
    fn set_selected(&self, selected: bool);
}

impl<T: NotifyPropertyChanged + ?Sized> NotifyPropertyChanged for Rc<T> {
    #[inline]
    fn property_changed(&self) -> &Notifier<PropertyName> {
        (**self).property_changed()
    }
}

impl<T: Dated + ?Sized> Dated for Rc<T> {
    #[inline]
    fn timestamp(&self) -> Timestamp {
        (**self).timestamp()
    }
}

impl<T: Selectable + ?Sized> Selectable for Rc<T> {
    #[inline]
    fn is_selected(&self) -> bool {
        (**self).is_selected()
    }

    #[inline]
    fn set_selected(&self, selected: bool) {
        (**self).set_selected(selected)
    }
}
