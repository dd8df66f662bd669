//! Built-in criteria.

mod map_item;
mod tag;
mod text;
mod time_range;

pub use map_item::MapItemCriterion;
pub use tag::TagCriterion;
pub use text::TextCriterion;
pub use time_range::TimeRangeCriterion;
