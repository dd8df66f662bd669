//! Loader configuration.

/// Target dimensions handed to the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodeSize {
    pub width: u32,
    pub height: u32,
}

impl DecodeSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Default number of decodes allowed to run at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Default decode size when a request does not carry one.
pub const DEFAULT_DECODE_SIZE: DecodeSize = DecodeSize::new(256, 256);

/// Configuration for a [`Loader`](crate::Loader).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoaderConfig {
    /// Maximum number of decodes running concurrently.
    pub max_concurrent: usize,
    /// Size used for requests that do not specify one.
    pub decode_size: DecodeSize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            decode_size: DEFAULT_DECODE_SIZE,
        }
    }
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum concurrent decodes. Clamped to at least one.
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    pub fn with_decode_size(mut self, size: DecodeSize) -> Self {
        self.decode_size = size;
        self
    }
}
