//! Vista Projection - Keeps a view sequence in 1:1 correspondence with a
//! model sequence.
//!
//! A `Projector` owns one view item per live model item, in source order.
//! View items are created through a caller-supplied factory, torn down when
//! their model item leaves, and published on an `ObservableVec` that other
//! components consume.
//!
//! # Example
//!
//! ```rust
//! use vista_core::ItemId;
//! use vista_feed::ObservableVec;
//! use vista_projection::Projector;
//!
//! #[derive(Clone)]
//! struct Label(ItemId, String);
//!
//! let source = ObservableVec::from_vec(vec![ItemId::new(1)]);
//! let projector = Projector::new(
//!     |id: &ItemId| Label(*id, id.to_string()),
//!     |label: &Label| label.0,
//! );
//! projector.attach(&source).unwrap();
//! source.push(ItemId::new(2));
//!
//! let names: Vec<String> = projector.view().snapshot().into_iter().map(|l| l.1).collect();
//! assert_eq!(names, vec!["#1", "#2"]);
//! ```

mod projector;

pub use projector::Projector;
