//! Cache layer that orchestrates caching logic with network fetching.

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

use super::key::CacheKey;
use super::store::{any_match, MemoryStore};
use super::traits::CacheResult;
use crate::api::{ApiError, Tag};

type SharedFetch = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

/// Capacity of the invalidation channel; slow receivers see `Lagged`.
const INVALIDATION_BUFFER: usize = 64;

/// How a fetch treats existing cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
  /// Serve a fresh entry, else join an in-flight request, else go to network
  #[default]
  CacheFirst,
  /// Always issue a new request (manual refetch)
  Network,
}

/// A request that has been issued and not yet stored.
struct Pending {
  key: CacheKey,
  provides: Vec<Tag>,
  /// An invalidation matched while the request was out; its payload
  /// predates the mutation and must land stale
  invalidated: bool,
}

/// Requests in flight, guarded together with the store writes they make.
#[derive(Default)]
struct InFlight {
  /// Latest request per key, for joining
  joinable: HashMap<CacheKey, (u64, SharedFetch)>,
  /// Every outstanding request by generation, including superseded ones
  pending: HashMap<u64, Pending>,
}

/// Query cache service shared by all consumers.
///
/// Build one per process (or per test) and hand out `Arc` clones.
pub struct QueryCache {
  store: Arc<MemoryStore>,
  in_flight: Arc<Mutex<InFlight>>,
  generation: AtomicU64,
  invalidations: broadcast::Sender<Vec<CacheKey>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl QueryCache {
  pub fn new() -> Self {
    let (invalidations, _) = broadcast::channel(INVALIDATION_BUFFER);
    Self {
      store: Arc::new(MemoryStore::new()),
      in_flight: Arc::new(Mutex::new(InFlight::default())),
      generation: AtomicU64::new(0),
      invalidations,
    }
  }

  pub fn store(&self) -> &MemoryStore {
    &self.store
  }

  /// Receive the keys expired by each successful invalidation.
  pub fn subscribe(&self) -> broadcast::Receiver<Vec<CacheKey>> {
    self.invalidations.subscribe()
  }

  /// `None` when nothing is cached for `key`.
  pub fn is_stale(&self, key: &CacheKey) -> Option<bool> {
    self.store.get(key).map(|e| e.stale)
  }

  pub fn in_flight_count(&self) -> usize {
    lock(&self.in_flight).pending.len()
  }

  /// Fetch a query result through the cache.
  ///
  /// 1. In `CacheFirst` mode a fresh entry is returned without a request
  /// 2. A request already in flight for the key is joined instead of repeated,
  ///    unless an invalidation has overtaken it
  /// 3. Otherwise `fetcher` runs; a successful payload overwrites the entry,
  ///    tagged with `provides`, when the response arrives
  ///
  /// Errors are handed to every joined caller and never cached.
  pub async fn fetch<F, Fut>(
    &self,
    key: CacheKey,
    provides: Vec<Tag>,
    mode: FetchMode,
    fetcher: F,
  ) -> Result<CacheResult<Value>, ApiError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, ApiError>> + Send + 'static,
  {
    if mode == FetchMode::CacheFirst {
      if let Some(entry) = self.store.get_fresh(&key) {
        tracing::debug!(%key, "cache hit");
        return Ok(CacheResult::from_cache(entry.data, entry.fetched_at));
      }
    }

    let fetch = self.join_or_start(key, provides, mode, fetcher);
    fetch.await.map(CacheResult::from_network)
  }

  fn join_or_start<F, Fut>(
    &self,
    key: CacheKey,
    provides: Vec<Tag>,
    mode: FetchMode,
    fetcher: F,
  ) -> SharedFetch
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, ApiError>> + Send + 'static,
  {
    let mut in_flight = lock(&self.in_flight);

    if mode == FetchMode::CacheFirst {
      if let Some((generation, fetch)) = in_flight.joinable.get(&key) {
        let overtaken = in_flight
          .pending
          .get(generation)
          .is_some_and(|p| p.invalidated);
        if !overtaken {
          tracing::debug!(%key, "joining in-flight request");
          return fetch.clone();
        }
      }
    }

    tracing::debug!(%key, ?mode, "cache miss, fetching");

    let generation = self.generation.fetch_add(1, Ordering::Relaxed);
    let store = Arc::clone(&self.store);
    let registry = Arc::downgrade(&self.in_flight);
    let request = fetcher();
    let task_key = key.clone();

    let fetch = async move {
      let result = request.await;

      // Store and deregister under the in-flight lock so an invalidation
      // sees either the pending request or the stored entry
      if let Some(registry) = registry.upgrade() {
        let mut in_flight = lock(&registry);
        let pending = in_flight.pending.remove(&generation);

        // Whichever response lands last owns the entry
        if let (Ok(data), Some(pending)) = (&result, pending) {
          if pending.invalidated {
            tracing::debug!(key = %task_key, "response overtaken by invalidation, storing stale");
          }
          store.insert(
            task_key.clone(),
            data.clone(),
            pending.provides,
            pending.invalidated,
          );
        }

        let ours = in_flight
          .joinable
          .get(&task_key)
          .is_some_and(|(g, _)| *g == generation);
        if ours {
          in_flight.joinable.remove(&task_key);
        }
      }

      result
    }
    .boxed()
    .shared();

    in_flight.pending.insert(
      generation,
      Pending {
        key: key.clone(),
        provides,
        invalidated: false,
      },
    );
    in_flight.joinable.insert(key, (generation, fetch.clone()));

    fetch
  }

  /// Mark stale every entry providing a tag matched by `tags`, flag matching
  /// requests still in flight, and notify subscribers. Returns the affected
  /// keys.
  pub fn invalidate(&self, tags: &[Tag]) -> Vec<CacheKey> {
    let mut in_flight = lock(&self.in_flight);

    let mut affected = self.store.mark_stale(tags);
    for pending in in_flight.pending.values_mut() {
      if any_match(tags, &pending.provides) {
        pending.invalidated = true;
        if !affected.contains(&pending.key) {
          affected.push(pending.key.clone());
        }
      }
    }
    drop(in_flight);

    let labels: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    tracing::debug!(tags = ?labels, affected = affected.len(), "invalidated");

    if !affected.is_empty() {
      // No receivers just means no screen is mounted
      let _ = self.invalidations.send(affected.clone());
    }

    affected
  }
}

impl Default for QueryCache {
  fn default() -> Self {
    Self::new()
  }
}
