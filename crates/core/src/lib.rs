//! Vista Core - Shared building blocks for the Vista reactive view layer.
//!
//! This crate provides the pieces every other Vista crate is built from:
//!
//! - `ItemId` / `Identity`: stable item identities
//! - `Timestamp`: precision-tagged timestamps and display granularities
//! - `Notifier`: ordered, re-entrancy-safe event delivery
//! - `OwnerCell`: serialized access to a component's mutable state
//! - `Error`: error types and the fault boundary for callback errors
//!
//! # Example
//!
//! ```rust
//! use vista_core::{Notifier, Timestamp, Granularity};
//!
//! let notifier: Notifier<&'static str> = Notifier::new();
//! notifier.subscribe(|name| assert_eq!(*name, "timestamp"));
//! notifier.emit("timestamp");
//!
//! let taken = Timestamp::ymd_hms(2024, 3, 5, 9, 30, 0).unwrap();
//! assert_eq!(taken.bucket(Granularity::Month).to_string(), "2024-03");
//! ```

mod error;
mod fault;
mod flags;
mod id;
mod notify;
mod owner;
mod timestamp;
mod traits;

pub use error::{Error, Result};
pub use fault::{log_fault, panic_on_fault, FaultHandler};
pub use flags::ViewFlags;
pub use id::{reserve_item_ids, Identity, ItemId};
pub use notify::{Callback, Notifier, SubscriptionId};
pub use owner::OwnerCell;
pub use timestamp::{Granularity, Precision, Timestamp};
pub use traits::{property, Dated, NotifyPropertyChanged, PropertyName, Selectable};
