//! Field extraction rules.

use std::hash::Hash;
use std::rc::Rc;
use vista_core::PropertyName;
use vista_feed::ObservableVec;

/// Reads the rolled-up field from a child.
///
/// A child exposes the field either as a nested observable collection
/// (`is_multi` true, read through `multi`) or as a single optional value
/// (read through `single`, announced under `single_property`).
pub trait FieldExtractor<C>: 'static {
    type Value: Eq + Hash + Clone + 'static;

    fn is_multi(&self, child: &C) -> bool;

    /// The child's nested collection. `None` contributes nothing.
    fn multi(&self, child: &C) -> Option<ObservableVec<Self::Value>>;

    fn single(&self, child: &C) -> Option<Self::Value>;

    /// Property raised by the child when its single value changes.
    fn single_property(&self, child: &C) -> PropertyName;
}

type IsMulti<C> = Rc<dyn Fn(&C) -> bool>;
type Multi<C, T> = Rc<dyn Fn(&C) -> Option<ObservableVec<T>>>;
type Single<C, T> = Rc<dyn Fn(&C) -> Option<T>>;

/// A [`FieldExtractor`] assembled from closures.
pub struct FnExtractor<C, T> {
    is_multi: IsMulti<C>,
    multi: Multi<C, T>,
    single: Single<C, T>,
    property: PropertyName,
}

impl<C, T> Clone for FnExtractor<C, T> {
    fn clone(&self) -> Self {
        Self {
            is_multi: self.is_multi.clone(),
            multi: self.multi.clone(),
            single: self.single.clone(),
            property: self.property,
        }
    }
}

impl<C: 'static, T: 'static> FnExtractor<C, T> {
    /// Every child holds a nested collection.
    pub fn multi(multi: impl Fn(&C) -> Option<ObservableVec<T>> + 'static) -> Self {
        Self {
            is_multi: Rc::new(|_| true),
            multi: Rc::new(multi),
            single: Rc::new(|_| None),
            property: "",
        }
    }

    /// Every child holds one optional value, announced under `property`.
    pub fn single(property: PropertyName, single: impl Fn(&C) -> Option<T> + 'static) -> Self {
        Self {
            is_multi: Rc::new(|_| false),
            multi: Rc::new(|_| None),
            single: Rc::new(single),
            property,
        }
    }

    /// Children decide per instance which shape they expose.
    pub fn mixed(
        is_multi: impl Fn(&C) -> bool + 'static,
        multi: impl Fn(&C) -> Option<ObservableVec<T>> + 'static,
        property: PropertyName,
        single: impl Fn(&C) -> Option<T> + 'static,
    ) -> Self {
        Self {
            is_multi: Rc::new(is_multi),
            multi: Rc::new(multi),
            single: Rc::new(single),
            property,
        }
    }
}

impl<C: 'static, T: Eq + Hash + Clone + 'static> FieldExtractor<C> for FnExtractor<C, T> {
    type Value = T;

    fn is_multi(&self, child: &C) -> bool {
        (self.is_multi)(child)
    }

    fn multi(&self, child: &C) -> Option<ObservableVec<T>> {
        (self.multi)(child)
    }

    fn single(&self, child: &C) -> Option<T> {
        (self.single)(child)
    }

    fn single_property(&self, _child: &C) -> PropertyName {
        self.property
    }
}
