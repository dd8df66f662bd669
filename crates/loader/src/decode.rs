//! Decoder contract and per-load types.

use crate::config::DecodeSize;
use crate::generation::GenerationToken;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use vista_core::{ItemId, Result};

/// An immutable snapshot of what to load for one item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub id: ItemId,
    /// Where the payload lives, e.g. a file path.
    pub source: String,
    /// Overrides the configured decode size.
    pub size: Option<DecodeSize>,
}

impl LoadRequest {
    pub fn new(id: ItemId, source: impl Into<String>) -> Self {
        Self {
            id,
            source: source.into(),
            size: None,
        }
    }

    pub fn with_size(mut self, size: DecodeSize) -> Self {
        self.size = Some(size);
        self
    }
}

/// Where an item's load stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState<T> {
    Pending,
    Loaded(T),
    /// The decoder failed; the item shows a placeholder.
    Failed(String),
}

impl<T> LoadState<T> {
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

/// Cancellation state visible to a running decode.
#[derive(Clone, Debug)]
pub struct LoadContext {
    list: GenerationToken,
    item: Arc<AtomicBool>,
    size: DecodeSize,
}

impl LoadContext {
    pub(crate) fn new(list: GenerationToken, item: Arc<AtomicBool>, size: DecodeSize) -> Self {
        Self { list, item, size }
    }

    /// True once a list-wide reload or a newer load for this item
    /// superseded this one. Decoders check it between expensive steps.
    pub fn is_cancelled(&self) -> bool {
        !self.list.is_current() || self.item.load(Ordering::Acquire)
    }

    /// The size to decode to.
    #[inline]
    pub fn decode_size(&self) -> DecodeSize {
        self.size
    }

    #[inline]
    pub(crate) fn generation(&self) -> u64 {
        self.list.value()
    }
}

/// Turns a request into a displayable payload off the owner thread.
#[async_trait]
pub trait Decoder: Send + Sync + 'static {
    type Output: Clone + Send + 'static;

    /// Decode the request. Errors become [`LoadState::Failed`].
    async fn decode(&self, request: &LoadRequest, ctx: &LoadContext) -> Result<Self::Output>;
}
