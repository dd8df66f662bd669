//! Vista Loader - Cancellable background loading for view items.
//!
//! Heavy per-item payloads (thumbnails, previews) are decoded on tokio
//! tasks. The owner thread never waits on them: results are posted back on
//! a channel and applied by [`Loader::pump`] or [`Loader::apply_next`].
//!
//! Cancellation uses generation counters. A list-wide reload advances one
//! [`Generation`]; reloading or cancelling a single item sets that load's
//! own flag. Superseded work drops its result silently.

mod config;
mod decode;
mod generation;
mod loader;

pub use config::{DecodeSize, LoaderConfig, DEFAULT_DECODE_SIZE, DEFAULT_MAX_CONCURRENT};
pub use decode::{Decoder, LoadContext, LoadRequest, LoadState};
pub use generation::{Generation, GenerationToken};
pub use loader::{Loader, LoaderStats};
