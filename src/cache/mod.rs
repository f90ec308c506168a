//! In-memory query cache with tag-based invalidation.
//!
//! This module provides the cache service shared by every screen:
//! - Stores the last payload of each query, keyed by endpoint and argument
//! - Records the tags each entry provides so mutations can expire them
//! - Shares one in-flight request between concurrent callers of the same key
//! - Broadcasts invalidated keys so live subscribers can refetch

mod key;
mod layer;
mod store;
mod traits;

pub use key::CacheKey;
pub use layer::{FetchMode, QueryCache};
pub use store::{CacheEntry, MemoryStore};
pub use traits::{CacheResult, CacheSource};
