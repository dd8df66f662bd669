//! Time range criterion.

use chrono::NaiveDateTime;
use std::cell::Cell;
use vista_core::{property, Dated, Notifier, PropertyName, Timestamp};

use crate::change::{Direction, FilterChange};
use crate::criterion::Criterion;

/// Admits items whose timestamp falls inside an inclusive range.
///
/// Both bounds are optional. An item passes when its timestamp starts at
/// or after the start of `start` and before the end of `end`, so
/// `end = 2024-03` admits everything in March 2024.
#[derive(Default)]
pub struct TimeRangeCriterion {
    start: Cell<Option<Timestamp>>,
    end: Cell<Option<Timestamp>>,
    signals: Notifier<FilterChange>,
}

impl Clone for TimeRangeCriterion {
    fn clone(&self) -> Self {
        Self {
            start: Cell::new(self.start.get()),
            end: Cell::new(self.end.get()),
            signals: Notifier::new(),
        }
    }
}

impl TimeRangeCriterion {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn start(&self) -> Option<Timestamp> {
        self.start.get()
    }

    #[inline]
    pub fn end(&self) -> Option<Timestamp> {
        self.end.get()
    }

    /// Moves the lower bound. Returns true if the admitted range changed.
    pub fn set_start(&self, start: Option<Timestamp>) -> bool {
        self.set_range(start, self.end.get())
    }

    /// Moves the upper bound. Returns true if the admitted range changed.
    pub fn set_end(&self, end: Option<Timestamp>) -> bool {
        self.set_range(self.start.get(), end)
    }

    /// Moves both bounds at once, emitting a single signal.
    ///
    /// Each bound is judged on its own; when one loosens while the other
    /// tightens the signal is `Changed`.
    pub fn set_range(&self, start: Option<Timestamp>, end: Option<Timestamp>) -> bool {
        let lower = Bound::lower(self.start.get()).direction_to(Bound::lower(start));
        let upper = Bound::upper(self.end.get()).direction_to(Bound::upper(end));
        self.start.set(start);
        self.end.set(end);
        match Direction::combine(&[lower, upper]) {
            Some(change) => {
                tracing::trace!(criterion = "time_range", change = change.name(), "criterion updated");
                self.signals.emit(change);
                true
            }
            None => false,
        }
    }

    fn admits(&self, ts: &Timestamp) -> bool {
        let at = ts.start();
        self.start.get().map_or(true, |start| at >= start.start())
            && self.end.get().map_or(true, |end| at < end.end())
    }
}

impl<T: Dated + ?Sized> Criterion<T> for TimeRangeCriterion {
    fn kind_name(&self) -> &'static str {
        "time_range"
    }

    fn filter(&self, item: &T) -> bool {
        self.admits(&item.timestamp())
    }

    fn is_active(&self) -> bool {
        self.start.get().is_some() || self.end.get().is_some()
    }

    fn clear_filter(&self) {
        self.start.set(None);
        self.end.set(None);
        self.signals.emit(FilterChange::Loosened);
    }

    fn signals(&self) -> &Notifier<FilterChange> {
        &self.signals
    }

    fn watched_properties(&self) -> &'static [PropertyName] {
        &[property::TIMESTAMP]
    }
}

/// Effective edge of a range bound; `None` is unbounded.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Bound {
    edge: Option<NaiveDateTime>,
    lower: bool,
}

impl Bound {
    fn lower(ts: Option<Timestamp>) -> Self {
        Self {
            edge: ts.map(|t| t.start()),
            lower: true,
        }
    }

    fn upper(ts: Option<Timestamp>) -> Self {
        Self {
            edge: ts.map(|t| t.end()),
            lower: false,
        }
    }

    fn direction_to(self, next: Bound) -> Direction {
        match (self.edge, next.edge) {
            (None, None) => Direction::Same,
            (None, Some(_)) => Direction::Tighter,
            (Some(_), None) => Direction::Looser,
            (Some(old), Some(new)) if old == new => Direction::Same,
            (Some(old), Some(new)) => {
                // A lower bound moving later, or an upper bound moving
                // earlier, narrows the range.
                if (new > old) == self.lower {
                    Direction::Tighter
                } else {
                    Direction::Looser
                }
            }
        }
    }
}
