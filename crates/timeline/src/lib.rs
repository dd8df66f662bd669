//! Vista Timeline - A filtered, sorted, time-bucketed display sequence.
//!
//! `TimelineView` follows a source collection through a `FilterSet` and
//! publishes a `DisplaySequence`: the passing items sorted by
//! `(timestamp, id)`, interleaved with Year/Month/Day labels at bucket
//! boundaries.
//!
//! The view is maintained incrementally:
//!
//! - source `Add`/`Remove`/`Replace` touch only the affected items
//! - a tightened filter re-examines only displayed items
//! - a loosened filter re-examines only hidden items
//! - a changed filter, a source `Reset` or new options rebuild in one pass
//!
//! Labels are never empty, never redundant, and never removable by callers.

mod label;
mod layout;
mod options;
mod sequence;
#[cfg(test)]
mod test_support;
mod view;

pub use label::{DisplayEntry, Label};
pub use layout::SortKey;
pub use options::TimelineOptions;
pub use sequence::DisplaySequence;
pub use view::{TimelineItem, TimelineView};
