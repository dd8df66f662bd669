//! Change events.

use std::fmt;
use vista_core::{Error, Result};

/// The four kinds of change a feed can announce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Add,
    Remove,
    Replace,
    Reset,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeKind::Add => "add",
            ChangeKind::Remove => "remove",
            ChangeKind::Replace => "replace",
            ChangeKind::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// A change to an ordered sequence.
///
/// `index` is the position in the sequence *before* the change for
/// `Remove`/`Replace`, and the position of the first new element for `Add`.
/// `Reset` replaces the whole sequence with `items`, the contents at the
/// moment the event was raised. Handlers that run later in the same dispatch
/// must rebuild from `items`, never from a fresh read of the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeEvent<T> {
    Add { index: usize, items: Vec<T> },
    Remove { index: usize, items: Vec<T> },
    Replace { index: usize, removed: Vec<T>, added: Vec<T> },
    Reset { items: Vec<T> },
}

impl<T> ChangeEvent<T> {
    #[inline]
    pub fn add(index: usize, items: Vec<T>) -> Self {
        ChangeEvent::Add { index, items }
    }

    #[inline]
    pub fn remove(index: usize, items: Vec<T>) -> Self {
        ChangeEvent::Remove { index, items }
    }

    #[inline]
    pub fn reset(items: Vec<T>) -> Self {
        ChangeEvent::Reset { items }
    }

    /// Creates a replace event. Both payloads must have the same length.
    pub fn replace(index: usize, removed: Vec<T>, added: Vec<T>) -> Result<Self> {
        if removed.len() != added.len() {
            return Err(Error::consistency(format!(
                "replace at {index} removes {} items but adds {}",
                removed.len(),
                added.len()
            )));
        }
        Ok(ChangeEvent::Replace { index, removed, added })
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeEvent::Add { .. } => ChangeKind::Add,
            ChangeEvent::Remove { .. } => ChangeKind::Remove,
            ChangeEvent::Replace { .. } => ChangeKind::Replace,
            ChangeEvent::Reset { .. } => ChangeKind::Reset,
        }
    }

    /// Position of the change. `Reset` reports 0.
    pub fn index(&self) -> usize {
        match self {
            ChangeEvent::Add { index, .. }
            | ChangeEvent::Remove { index, .. }
            | ChangeEvent::Replace { index, .. } => *index,
            ChangeEvent::Reset { .. } => 0,
        }
    }

    /// Items entering the sequence. `Reset` reports none; see [`contents`].
    ///
    /// [`contents`]: ChangeEvent::contents
    pub fn added(&self) -> &[T] {
        match self {
            ChangeEvent::Add { items, .. } => items,
            ChangeEvent::Replace { added, .. } => added,
            _ => &[],
        }
    }

    /// Items leaving the sequence.
    pub fn removed(&self) -> &[T] {
        match self {
            ChangeEvent::Remove { items, .. } => items,
            ChangeEvent::Replace { removed, .. } => removed,
            _ => &[],
        }
    }

    /// The new contents carried by a `Reset`.
    pub fn contents(&self) -> Option<&[T]> {
        match self {
            ChangeEvent::Reset { items } => Some(items),
            _ => None,
        }
    }

    /// Checks the payload invariants of a hand-built event.
    pub fn validate(&self) -> Result<()> {
        match self {
            ChangeEvent::Replace { index, removed, added } if removed.len() != added.len() => {
                Err(Error::consistency(format!(
                    "replace at {index} removes {} items but adds {}",
                    removed.len(),
                    added.len()
                )))
            }
            _ => Ok(()),
        }
    }

    /// Maps the payload, keeping kind and index.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> ChangeEvent<U> {
        match self {
            ChangeEvent::Add { index, items } => ChangeEvent::Add {
                index: *index,
                items: items.iter().map(&mut f).collect(),
            },
            ChangeEvent::Remove { index, items } => ChangeEvent::Remove {
                index: *index,
                items: items.iter().map(&mut f).collect(),
            },
            ChangeEvent::Replace { index, removed, added } => ChangeEvent::Replace {
                index: *index,
                removed: removed.iter().map(&mut f).collect(),
                added: added.iter().map(&mut f).collect(),
            },
            ChangeEvent::Reset { items } => ChangeEvent::Reset {
                items: items.iter().map(&mut f).collect(),
            },
        }
    }
}
