//! Background loader with generation-checked results.

use crate::config::LoaderConfig;
use crate::decode::{Decoder, LoadContext, LoadRequest, LoadState};
use crate::generation::Generation;
use hashbrown::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Semaphore;
use vista_core::{Error, ItemId, Result};

/// A finished decode on its way back to the owner thread.
struct Completion<T> {
    id: ItemId,
    generation: u64,
    cancel: Arc<AtomicBool>,
    outcome: Result<T>,
}

/// Guarantees every worker answers exactly once unless it was superseded,
/// even if the decoder panics.
struct Posting<T> {
    tx: UnboundedSender<Completion<T>>,
    id: ItemId,
    generation: u64,
    cancel: Arc<AtomicBool>,
    done: bool,
}

impl<T> Posting<T> {
    fn post(mut self, outcome: Result<T>) {
        self.done = true;
        self.send(outcome);
    }

    fn abandon(mut self) {
        self.done = true;
    }

    fn send(&self, outcome: Result<T>) {
        let _ = self.tx.send(Completion {
            id: self.id,
            generation: self.generation,
            cancel: self.cancel.clone(),
            outcome,
        });
    }
}

impl<T> Drop for Posting<T> {
    fn drop(&mut self) {
        if !self.done {
            self.send(Err(Error::load("decode task ended without a result")));
        }
    }
}

#[derive(Default)]
struct Counters {
    started: AtomicU64,
    loaded: AtomicU64,
    failed: AtomicU64,
    discarded: AtomicU64,
}

/// Loader statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoaderStats {
    pub started: u64,
    pub loaded: u64,
    pub failed: u64,
    /// Superseded results dropped by a worker or by the apply step.
    pub discarded: u64,
}

/// Runs decodes on the tokio runtime and applies their results on the
/// owner thread.
///
/// `reload_all` supersedes every outstanding load by advancing the
/// list-wide generation; `load` and `cancel` supersede a single item's
/// load through its own cancellation flag. Workers drop superseded results
/// after every suspension point and the apply step checks again, so a stale
/// result never reaches `state`.
pub struct Loader<D: Decoder> {
    decoder: Arc<D>,
    config: LoaderConfig,
    runtime: Handle,
    permits: Arc<Semaphore>,
    generation: Generation,
    in_flight: HashMap<ItemId, Arc<AtomicBool>>,
    states: HashMap<ItemId, LoadState<D::Output>>,
    tx: UnboundedSender<Completion<D::Output>>,
    rx: UnboundedReceiver<Completion<D::Output>>,
    counters: Arc<Counters>,
}

impl<D: Decoder> Loader<D> {
    /// Creates a loader on the current tokio runtime.
    pub fn new(decoder: D, config: LoaderConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|err| Error::load(format!("no tokio runtime: {err}")))?;
        Ok(Self::with_handle(decoder, config, runtime))
    }

    /// Creates a loader that spawns onto `runtime`.
    pub fn with_handle(decoder: D, config: LoaderConfig, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let permits = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        Self {
            decoder: Arc::new(decoder),
            config,
            runtime,
            permits,
            generation: Generation::new(),
            in_flight: HashMap::new(),
            states: HashMap::new(),
            tx,
            rx,
            counters: Arc::new(Counters::default()),
        }
    }

    #[inline]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The current list-wide generation.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.current()
    }

    pub fn state(&self, id: ItemId) -> Option<&LoadState<D::Output>> {
        self.states.get(&id)
    }

    /// Number of loads whose result has not been applied yet.
    #[inline]
    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn stats(&self) -> LoaderStats {
        LoaderStats {
            started: self.counters.started.load(Ordering::Relaxed),
            loaded: self.counters.loaded.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
        }
    }

    /// Starts loading one item, superseding its previous load if any.
    pub fn load(&mut self, request: LoadRequest) {
        let id = request.id;
        if let Some(previous) = self.in_flight.remove(&id) {
            previous.store(true, Ordering::Release);
            tracing::trace!(item = %id, "superseding in-flight load");
        }
        let cancel = Arc::new(AtomicBool::new(false));
        self.in_flight.insert(id, cancel.clone());
        self.states.insert(id, LoadState::Pending);

        let size = request.size.unwrap_or(self.config.decode_size);
        let ctx = LoadContext::new(self.generation.token(), cancel.clone(), size);
        let posting = Posting {
            tx: self.tx.clone(),
            id,
            generation: ctx.generation(),
            cancel,
            done: false,
        };
        let decoder = self.decoder.clone();
        let permits = self.permits.clone();
        let counters = self.counters.clone();
        counters.started.fetch_add(1, Ordering::Relaxed);

        self.runtime.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            if ctx.is_cancelled() {
                counters.discarded.fetch_add(1, Ordering::Relaxed);
                posting.abandon();
                return;
            }
            let outcome = decoder.decode(&request, &ctx).await;
            if ctx.is_cancelled() {
                tracing::trace!(item = %request.id, "dropping superseded decode");
                counters.discarded.fetch_add(1, Ordering::Relaxed);
                posting.abandon();
                return;
            }
            posting.post(outcome);
        });
    }

    /// Supersedes every outstanding load and starts `requests` under a new
    /// generation. Returns the new generation.
    pub fn reload_all(&mut self, requests: impl IntoIterator<Item = LoadRequest>) -> u64 {
        let generation = self.generation.advance();
        for (_, flag) in self.in_flight.drain() {
            flag.store(true, Ordering::Release);
        }
        self.states.clear();
        tracing::debug!(generation, "reloading every item");
        for request in requests {
            self.load(request);
        }
        generation
    }

    /// Cancels one item's in-flight load. Returns false if none was running.
    pub fn cancel(&mut self, id: ItemId) -> bool {
        let Some(flag) = self.in_flight.remove(&id) else {
            return false;
        };
        flag.store(true, Ordering::Release);
        if self.states.get(&id).is_some_and(LoadState::is_pending) {
            self.states.remove(&id);
        }
        tracing::trace!(item = %id, "load cancelled");
        true
    }

    /// Applies every result that has already arrived, without waiting.
    /// Returns the items whose state changed.
    pub fn pump(&mut self) -> Vec<ItemId> {
        let mut applied = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            if let Some(id) = self.apply(completion) {
                applied.push(id);
            }
        }
        applied
    }

    /// Waits for the next current result and applies it. Returns `None`
    /// when nothing is in flight.
    pub async fn apply_next(&mut self) -> Option<ItemId> {
        loop {
            if self.in_flight.is_empty() {
                self.pump();
                return None;
            }
            let completion = self.rx.recv().await?;
            if let Some(id) = self.apply(completion) {
                return Some(id);
            }
        }
    }

    /// Applies results until nothing is in flight.
    pub async fn settle(&mut self) -> Vec<ItemId> {
        let mut applied = Vec::new();
        while let Some(id) = self.apply_next().await {
            applied.push(id);
        }
        applied
    }

    fn apply(&mut self, completion: Completion<D::Output>) -> Option<ItemId> {
        let id = completion.id;
        let owned = self
            .in_flight
            .get(&id)
            .is_some_and(|flag| Arc::ptr_eq(flag, &completion.cancel));
        if !owned || completion.generation != self.generation.current() || completion.cancel.load(Ordering::Acquire) {
            self.counters.discarded.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(item = %id, "discarding stale load result");
            return None;
        }
        self.in_flight.remove(&id);

        let state = match completion.outcome {
            Ok(value) => {
                self.counters.loaded.fetch_add(1, Ordering::Relaxed);
                LoadState::Loaded(value)
            }
            Err(err) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(item = %id, error = %err, "load failed");
                LoadState::Failed(err.to_string())
            }
        };
        self.states.insert(id, state);
        Some(id)
    }
}

impl<D: Decoder> Drop for Loader<D> {
    fn drop(&mut self) {
        self.generation.advance();
        for flag in self.in_flight.values() {
            flag.store(true, Ordering::Release);
        }
    }
}
