//! Stable item identities.
//!
//! Every domain item the core tracks carries an `ItemId`. Identity is what
//! the projector, the timeline and the rollup use to match change payloads
//! against the entries they already hold.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global item ID counter for generating unique item IDs.
static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a tracked item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    /// Wraps a raw identifier.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocates the next process-wide unique ID.
    pub fn next() -> Self {
        Self(NEXT_ITEM_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Returns the raw value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Reserves a range of item IDs and returns the first one.
/// Useful when a caller materializes a batch of items at once.
pub fn reserve_item_ids(count: u64) -> ItemId {
    ItemId(NEXT_ITEM_ID.fetch_add(count, Ordering::SeqCst))
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Anything with a stable identity.
pub trait Identity {
    /// Returns the item's identity. Must not change over the item's lifetime.
    fn id(&self) -> ItemId;
}

impl Identity for ItemId {
    #[inline]
    fn id(&self) -> ItemId {
        *self
    }
}

impl<T: Identity + ?Sized> Identity for Rc<T> {
    #[inline]
    fn id(&self) -> ItemId {
        (**self).id()
    }
}

impl<T: Identity + ?Sized> Identity for &T {
    #[inline]
    fn id(&self) -> ItemId {
        (**self).id()
    }
}
