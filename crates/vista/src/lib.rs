//! Vista - Reactive view synchronization for collection UIs.
//!
//! Vista keeps derived views of a mutable collection in sync as it changes:
//!
//! - [`Projector`]: one view item per model item, in source order
//! - [`FilterSet`]: composable criteria that report the direction of every
//!   parameter change
//! - [`TimelineView`]: the filtered items sorted by time, with Year, Month
//!   and Day labels, patched incrementally
//! - [`Rollup`]: the deduplicated union of a field across all children
//! - [`Loader`]: cancellable background decoding with generation checks
//!
//! Everything except the loader's workers runs synchronously on one owner
//! thread. Events raised while a component is busy are queued and applied
//! in order once it is idle.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use vista::prelude::*;
//!
//! struct Photo {
//!     id: ItemId,
//!     taken: Timestamp,
//!     flags: ViewFlags,
//!     changed: Notifier<PropertyName>,
//! }
//!
//! impl Identity for Photo {
//!     fn id(&self) -> ItemId { self.id }
//! }
//! impl Dated for Photo {
//!     fn timestamp(&self) -> Timestamp { self.taken }
//! }
//! impl Selectable for Photo {
//!     fn is_selected(&self) -> bool { self.flags.is_selected() }
//!     fn set_selected(&self, selected: bool) { self.flags.set_selected(selected, &self.changed); }
//! }
//! impl NotifyPropertyChanged for Photo {
//!     fn property_changed(&self) -> &Notifier<PropertyName> { &self.changed }
//! }
//!
//! let photo = |id, day| Rc::new(Photo {
//!     id: ItemId::new(id),
//!     taken: Timestamp::ymd(2024, 3, day).unwrap(),
//!     flags: ViewFlags::new(),
//!     changed: Notifier::new(),
//! });
//!
//! let source = ObservableVec::from_vec(vec![photo(1, 5)]);
//! let timeline = TimelineView::new(FilterSet::new(), TimelineOptions::default());
//! timeline.attach(&source).unwrap();
//! source.push(photo(2, 6));
//!
//! let text: Vec<String> = timeline.display().labels().iter().map(|l| l.to_string()).collect();
//! assert_eq!(text, vec!["2024", "March", "5th", "6th"]);
//! ```

mod logging;

pub use logging::{init_test_tracing, init_tracing, DEFAULT_FILTER};

pub use vista_core::{
    log_fault, panic_on_fault, property, Dated, Error, FaultHandler, Granularity, Identity, ItemId, Notifier,
    NotifyPropertyChanged, OwnerCell, Precision, PropertyName, Result, Selectable, SubscriptionId, Timestamp,
    ViewFlags,
};
pub use vista_feed::{ChangeEvent, ChangeKind, ObservableSet, ObservableVec};
pub use vista_filter::{
    audit_transition, AdmissionSnapshot, Criterion, FilterChange, FilterSet, MapAssociated, MapItemCriterion, Named,
    TagCriterion, Tagged, TextCriterion, TimeRangeCriterion,
};
pub use vista_loader::{
    DecodeSize, Decoder, Generation, GenerationToken, LoadContext, LoadRequest, LoadState, Loader, LoaderConfig,
    LoaderStats,
};
pub use vista_projection::Projector;
pub use vista_rollup::{FieldExtractor, FnExtractor, Rollup};
pub use vista_timeline::{DisplayEntry, DisplaySequence, Label, TimelineItem, TimelineOptions, TimelineView};

/// The types most hosts need, for glob import.
pub mod prelude {
    pub use crate::{
        property, ChangeEvent, Dated, DisplayEntry, Error, FilterChange, FilterSet, FnExtractor, Identity, ItemId,
        Notifier, NotifyPropertyChanged, ObservableSet, ObservableVec, Projector, PropertyName, Result, Rollup,
        Selectable, TagCriterion, Tagged, TimeRangeCriterion, TimelineOptions, TimelineView, Timestamp, ViewFlags,
    };
}
