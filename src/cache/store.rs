//! Entry storage for the query cache.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::key::CacheKey;
use crate::api::Tag;

/// A cached query result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
  /// Last payload received for the key
  pub data: Value,
  /// Tags this entry provides, resolved at fetch time
  pub provides: Vec<Tag>,
  /// Set by invalidation, cleared by the next successful fetch
  pub stale: bool,
  pub fetched_at: DateTime<Utc>,
}

/// Process-memory storage of cache entries.
///
/// Every operation takes the lock once, so an update of a key is never
/// observed half-applied.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
    // The map holds plain data; a panic elsewhere cannot leave it half-written
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }

  pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
    self.lock().get(key).cloned()
  }

  /// Get an entry only if it has not been invalidated.
  pub fn get_fresh(&self, key: &CacheKey) -> Option<CacheEntry> {
    self.lock().get(key).filter(|e| !e.stale).cloned()
  }

  /// Insert or overwrite the entry for `key`, marking it fresh.
  pub fn put(&self, key: CacheKey, data: Value, provides: Vec<Tag>) {
    self.insert(key, data, provides, false);
  }

  /// Insert or overwrite the entry for `key` with an explicit stale flag.
  ///
  /// A response whose request was overtaken by an invalidation is stored
  /// stale so the next read goes back to the network.
  pub fn insert(&self, key: CacheKey, data: Value, provides: Vec<Tag>, stale: bool) {
    self.lock().insert(
      key,
      CacheEntry {
        data,
        provides,
        stale,
        fetched_at: Utc::now(),
      },
    );
  }

  /// Mark stale every entry providing a tag matched by one of `tags`.
  ///
  /// Returns the affected keys, including entries that were already stale.
  pub fn mark_stale(&self, tags: &[Tag]) -> Vec<CacheKey> {
    let mut entries = self.lock();
    let mut affected = Vec::new();

    for (key, entry) in entries.iter_mut() {
      if any_match(tags, &entry.provides) {
        entry.stale = true;
        affected.push(key.clone());
      }
    }

    affected
  }
}

/// True if one of `invalidated` matches one of `provided`.
pub(crate) fn any_match(invalidated: &[Tag], provided: &[Tag]) -> bool {
  invalidated
    .iter()
    .any(|tag| provided.iter().any(|p| tag.matches(p)))
}
