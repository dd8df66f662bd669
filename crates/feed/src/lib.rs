//! Vista Feed - The change feed contract.
//!
//! Every ordered source the core observes speaks one protocol:
//! `ChangeEvent::{Add, Remove, Replace, Reset}`. This crate defines the
//! event type and the two observable collections that emit it:
//!
//! - `ObservableVec`: an ordered sequence
//! - `ObservableSet`: an insertion-ordered set without duplicates
//!
//! # Example
//!
//! ```rust
//! use vista_feed::{ChangeEvent, ObservableVec};
//!
//! let list = ObservableVec::new();
//! list.subscribe(|event: &ChangeEvent<u32>| {
//!     assert_eq!(event.added(), &[7]);
//! });
//! list.push(7);
//! assert_eq!(list.snapshot(), vec![7]);
//! ```

mod event;
mod set;
mod vec;

pub use event::{ChangeEvent, ChangeKind};
pub use set::ObservableSet;
pub use vec::{ObservableVec, WeakObservableVec};
