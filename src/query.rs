//! Async query and mutation subscriptions for screens.
//!
//! A `Query<T>` wraps a fetcher closure and tracks loading, error, success and
//! background-refresh state. When it watches a cache key, invalidation of that
//! key makes the next `poll()` refetch while the old data stays visible.
//!
//! # Example
//!
//! ```ignore
//! let api = client.clone();
//! let mut query = Query::new(move |mode| {
//!     let api = api.clone();
//!     async move { api.get_posts(mode).await }
//! })
//! .watching(client.cache(), CacheKey::new("getPosts", None));
//!
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//! ```
//!
//! Dropping a query (unmounting its screen) discards any result that arrives
//! later; the request itself still completes and fills the cache.

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};

use crate::api::ApiError;
use crate::cache::{CacheKey, FetchMode, QueryCache};

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// First fetch in progress, no data yet
  Loading,
  /// Data present (possibly being refreshed, see `Query::is_fetching`)
  Success(T),
  /// Last fetch failed
  Error(ApiError),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&ApiError> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send>>;

type FetcherFn<T> = Box<dyn Fn(FetchMode) -> BoxFuture<T> + Send + Sync>;

struct Watch {
  key: CacheKey,
  rx: broadcast::Receiver<Vec<CacheKey>>,
}

/// Async query for data fetching with state management.
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, ApiError>>>,
  fetched_at: Option<Instant>,
  watch: Option<Watch>,
  /// Our key was invalidated while a fetch was out; refetch once it lands
  pending_invalidation: bool,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher receives the fetch mode: `CacheFirst` for the initial fetch
  /// and invalidation refetches, `Network` for a manual `refetch()`.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn(FetchMode) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move |mode| Box::pin(fetcher(mode))),
      receiver: None,
      fetched_at: None,
      watch: None,
      pending_invalidation: false,
    }
  }

  /// Refetch whenever `key` is invalidated in `cache`.
  pub fn watching(mut self, cache: &QueryCache, key: CacheKey) -> Self {
    self.watch = Some(Watch {
      key,
      rx: cache.subscribe(),
    });
    self
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  pub fn is_success(&self) -> bool {
    self.state.is_success()
  }

  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  pub fn error(&self) -> Option<&ApiError> {
    self.state.error()
  }

  /// A request is outstanding (initial load or refresh).
  pub fn is_fetching(&self) -> bool {
    self.receiver.is_some()
  }

  /// Old data is on screen while a refresh runs.
  pub fn is_refreshing(&self) -> bool {
    self.is_fetching() && self.state.is_success()
  }

  pub fn fetched_at(&self) -> Option<Instant> {
    self.fetched_at
  }

  /// Start fetching data if not already fetching.
  pub fn fetch(&mut self) {
    if self.is_fetching() {
      return;
    }
    self.start_fetch(FetchMode::CacheFirst);
  }

  /// Force a network refetch, superseding any pending fetch.
  pub fn refetch(&mut self) {
    self.receiver = None;
    self.pending_invalidation = false;
    self.start_fetch(FetchMode::Network);
  }

  /// Poll for invalidations and results.
  ///
  /// Returns `true` if the state changed. Call this in the event loop tick.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;

    if self.take_invalidation() {
      if self.is_fetching() {
        self.pending_invalidation = true;
      } else {
        self.start_fetch(FetchMode::CacheFirst);
        changed = true;
      }
    }

    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return changed,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.fetched_at = Some(Instant::now());
        self.receiver = None;
        // The data just shown predates the invalidation
        if std::mem::take(&mut self.pending_invalidation) {
          self.start_fetch(FetchMode::CacheFirst);
        }
        true
      }
      Ok(Err(error)) => {
        // Keep the error visible; the stale entry refetches on retry
        self.state = QueryState::Error(error);
        self.receiver = None;
        self.pending_invalidation = false;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => changed,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // The fetch task panicked or was aborted
        self.state = QueryState::Error(ApiError::Network("request was cancelled".to_string()));
        self.receiver = None;
        self.pending_invalidation = false;
        true
      }
    }
  }

  /// Drain the invalidation channel; true if our key was among the batches.
  fn take_invalidation(&mut self) -> bool {
    let Some(watch) = &mut self.watch else {
      return false;
    };

    let mut hit = false;
    loop {
      match watch.rx.try_recv() {
        Ok(keys) => hit |= keys.contains(&watch.key),
        // Missed batches may have named us
        Err(broadcast::error::TryRecvError::Lagged(_)) => hit = true,
        Err(_) => break,
      }
    }
    hit
  }

  fn start_fetch(&mut self, mode: FetchMode) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);

    // Keep showing data while it refreshes
    if !self.state.is_success() {
      self.state = QueryState::Loading;
    }

    let future = (self.fetcher)(mode);
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - the subscriber may have unmounted
      let _ = tx.send(result);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("fetching", &self.receiver.is_some())
      .field("fetched_at", &self.fetched_at)
      .finish_non_exhaustive()
  }
}

/// Write operation handle for a screen.
///
/// Only one call runs at a time; `run` while pending is ignored, mirroring a
/// disabled button.
pub struct Mutation<T> {
  receiver: Option<mpsc::UnboundedReceiver<Result<T, ApiError>>>,
}

impl<T: Send + 'static> Mutation<T> {
  pub fn new() -> Self {
    Self { receiver: None }
  }

  pub fn is_pending(&self) -> bool {
    self.receiver.is_some()
  }

  /// Start the mutation. Returns false if one is already pending.
  pub fn run<Fut>(&mut self, future: Fut) -> bool
  where
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    if self.is_pending() {
      return false;
    }

    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    tokio::spawn(async move {
      let _ = tx.send(future.await);
    });
    true
  }

  /// Take the outcome once the mutation has settled.
  pub fn poll(&mut self) -> Option<Result<T, ApiError>> {
    let receiver = self.receiver.as_mut()?;

    let outcome = match receiver.try_recv() {
      Ok(result) => result,
      Err(mpsc::error::TryRecvError::Empty) => return None,
      Err(mpsc::error::TryRecvError::Disconnected) => Err(ApiError::Network(
        "mutation was cancelled".to_string(),
      )),
    };

    self.receiver = None;
    Some(outcome)
  }
}

impl<T: Send + 'static> Default for Mutation<T> {
  fn default() -> Self {
    Self::new()
  }
}
