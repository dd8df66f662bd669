//! Generation counters.
//!
//! A counter is advanced whenever the target of some background work is
//! superseded. Work captures a token when it starts and checks it after
//! every suspension point; a stale token means the result must be dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A monotonically increasing, shareable counter.
#[derive(Clone, Debug, Default)]
pub struct Generation {
    counter: Arc<AtomicU64>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    /// Supersedes every outstanding token. Returns the new value.
    pub fn advance(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Captures the current value.
    pub fn token(&self) -> GenerationToken {
        GenerationToken {
            counter: self.counter.clone(),
            captured: self.current(),
        }
    }
}

/// A captured generation value.
#[derive(Clone, Debug)]
pub struct GenerationToken {
    counter: Arc<AtomicU64>,
    captured: u64,
}

impl GenerationToken {
    #[inline]
    pub fn value(&self) -> u64 {
        self.captured
    }

    /// True until the counter advances past the captured value.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::Acquire) == self.captured
    }
}
