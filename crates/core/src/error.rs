//! Error types for Vista.

use crate::id::ItemId;
use thiserror::Error;

/// Result type alias for Vista operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised by the synchronization core.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// A change event references state the derived view does not hold, or a
    /// caller tried to remove a synthetic entry directly. The feed and the
    /// derived state have desynced; only a full rebuild recovers.
    #[error("Consistency violation: {message}")]
    Consistency { message: String },

    /// A criterion emitted a tightened/loosened signal whose subset/superset
    /// precondition does not hold for `item`.
    #[error("Invalid transition: criterion {criterion} signalled {change} but item {item} moved the other way")]
    InvalidTransition {
        criterion: String,
        change: &'static str,
        item: ItemId,
    },

    /// Index outside the bounds of an observable sequence.
    #[error("Index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A calendar value that does not exist.
    #[error("Invalid timestamp: {message}")]
    InvalidTimestamp { message: String },

    /// A background load failed.
    #[error("Load failed: {message}")]
    Load { message: String },
}

impl Error {
    /// Creates a consistency error.
    pub fn consistency(message: impl Into<String>) -> Self {
        Error::Consistency {
            message: message.into(),
        }
    }

    /// Creates an invalid transition error.
    pub fn invalid_transition(criterion: impl Into<String>, change: &'static str, item: ItemId) -> Self {
        Error::InvalidTransition {
            criterion: criterion.into(),
            change,
            item,
        }
    }

    /// Creates an index out of bounds error.
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Error::IndexOutOfBounds { index, len }
    }

    /// Creates an invalid timestamp error.
    pub fn invalid_timestamp(message: impl Into<String>) -> Self {
        Error::InvalidTimestamp {
            message: message.into(),
        }
    }

    /// Creates a load error.
    pub fn load(message: impl Into<String>) -> Self {
        Error::Load {
            message: message.into(),
        }
    }

    /// Returns true for errors that mean derived state can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Consistency { .. } | Error::InvalidTransition { .. })
    }
}
