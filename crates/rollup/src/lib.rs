//! Vista Rollup - Deduplicated field aggregation across a collection.
//!
//! A `Rollup` watches a parent collection of children and maintains the
//! union of one field over all of them. Each child exposes the field either
//! as a nested observable collection (an album's tags) or as a single
//! optional value (a photo's camera model); a `FieldExtractor` tells the
//! rollup which.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use vista_core::{Identity, ItemId, Notifier, NotifyPropertyChanged, PropertyName};
//! use vista_feed::ObservableVec;
//! use vista_rollup::{FnExtractor, Rollup};
//!
//! struct Album {
//!     id: ItemId,
//!     tags: ObservableVec<&'static str>,
//!     changed: Notifier<PropertyName>,
//! }
//!
//! impl Identity for Album {
//!     fn id(&self) -> ItemId {
//!         self.id
//!     }
//! }
//!
//! impl NotifyPropertyChanged for Album {
//!     fn property_changed(&self) -> &Notifier<PropertyName> {
//!         &self.changed
//!     }
//! }
//!
//! let album = |id, tags: Vec<&'static str>| {
//!     Rc::new(Album { id: ItemId::new(id), tags: ObservableVec::from_vec(tags), changed: Notifier::new() })
//! };
//! let a = album(1, vec!["red", "blue"]);
//! let b = album(2, vec!["blue"]);
//! let albums = ObservableVec::from_vec(vec![a, b]);
//!
//! let rollup = Rollup::new(FnExtractor::multi(|album: &Rc<Album>| Some(album.tags.clone())));
//! rollup.attach(&albums).unwrap();
//! assert_eq!(rollup.snapshot(), vec!["red", "blue"]);
//!
//! albums.remove_at(0).unwrap();
//! assert_eq!(rollup.snapshot(), vec!["blue"]);
//! ```

mod extractor;
mod rollup;

pub use extractor::{FieldExtractor, FnExtractor};
pub use rollup::{Rollup, RollupChild};
