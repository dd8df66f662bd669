//! Filter change signals.

use std::fmt;
use vista_core::ItemId;

/// What a filter parameter change did to the admitted set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterChange {
    /// The admitted set can only have shrunk.
    Tightened,
    /// The admitted set can only have grown.
    Loosened,
    /// The admitted set may have changed in either direction.
    Changed,
    /// The admission of one item may have changed because one of its
    /// filtered attributes changed.
    ItemAffected(ItemId),
}

impl FilterChange {
    /// Combines the directions of independent parameter changes.
    /// Returns `None` when nothing moved.
    pub fn from_directions(loosened: bool, tightened: bool) -> Option<Self> {
        match (loosened, tightened) {
            (false, false) => None,
            (true, false) => Some(FilterChange::Loosened),
            (false, true) => Some(FilterChange::Tightened),
            (true, true) => Some(FilterChange::Changed),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterChange::Tightened => "tightened",
            FilterChange::Loosened => "loosened",
            FilterChange::Changed => "changed",
            FilterChange::ItemAffected(_) => "item_affected",
        }
    }
}

impl fmt::Display for FilterChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterChange::ItemAffected(id) => write!(f, "item_affected({id})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Direction of a single bound or parameter move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Same,
    Tighter,
    Looser,
}

impl Direction {
    pub(crate) fn combine(directions: &[Direction]) -> Option<FilterChange> {
        let loosened = directions.contains(&Direction::Looser);
        let tightened = directions.contains(&Direction::Tighter);
        FilterChange::from_directions(loosened, tightened)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_directions() {
        assert_eq!(FilterChange::from_directions(false, false), None);
        assert_eq!(FilterChange::from_directions(true, false), Some(FilterChange::Loosened));
        assert_eq!(FilterChange::from_directions(false, true), Some(FilterChange::Tightened));
        assert_eq!(FilterChange::from_directions(true, true), Some(FilterChange::Changed));
    }

    #[test]
    fn test_combine() {
        assert_eq!(Direction::combine(&[Direction::Same, Direction::Same]), None);
        assert_eq!(
            Direction::combine(&[Direction::Tighter, Direction::Same]),
            Some(FilterChange::Tightened)
        );
        assert_eq!(
            Direction::combine(&[Direction::Tighter, Direction::Looser]),
            Some(FilterChange::Changed)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(FilterChange::Tightened.to_string(), "tightened");
        assert_eq!(FilterChange::ItemAffected(ItemId::new(3)).to_string(), "item_affected(#3)");
    }
}
