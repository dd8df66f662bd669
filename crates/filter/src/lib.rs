//! Vista Filter - Composable filter predicates that describe their own
//! changes.
//!
//! A `Criterion` is one parameterized rule. Each time its parameters change
//! it signals the *direction* of the change:
//!
//! - `Tightened`: the admitted set can only shrink
//! - `Loosened`: the admitted set can only grow
//! - `Changed`: no direction is known
//!
//! Consumers use the direction to re-examine only the items that can
//! possibly move: displayed items after a tightening, hidden items after a
//! loosening. A `FilterSet` is the conjunction of at most one criterion of
//! each type.
//!
//! # Example
//!
//! ```rust
//! use vista_filter::{FilterChange, FilterSet, TagCriterion, Tagged};
//!
//! struct Photo(Vec<&'static str>);
//! impl Tagged for Photo {
//!     fn has_tag(&self, tag: &str) -> bool {
//!         self.0.iter().any(|t| *t == tag)
//!     }
//! }
//!
//! let filters: FilterSet<Photo> = FilterSet::new();
//! filters.subscribe(|change| assert_eq!(*change, FilterChange::Tightened));
//! filters.criterion::<TagCriterion>().require("beach");
//!
//! assert!(filters.filter(&Photo(vec!["beach", "sunset"])));
//! assert!(!filters.filter(&Photo(vec!["forest"])));
//! ```

mod audit;
mod change;
mod criteria;
mod criterion;
mod set;
#[cfg(test)]
mod test_support;

pub use audit::{audit_transition, AdmissionSnapshot};
pub use change::FilterChange;
pub use criteria::{MapItemCriterion, TagCriterion, TextCriterion, TimeRangeCriterion};
pub use criterion::{Criterion, MapAssociated, Named, Tagged};
pub use set::FilterSet;
