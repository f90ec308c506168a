//! Remote data client for the JSONPlaceholder demo API.
//!
//! `client` owns the request policy, `endpoint` the record types, `posts` and
//! `users` the endpoint tables, and `cached_client` the executor that runs a
//! record through the query cache.

pub mod cached_client;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod posts;
pub mod users;

pub use cached_client::CachedApiClient;
pub use client::{bearer_token_hook, ApiClient, HeaderHook, BASE_URL};
pub use endpoint::{Endpoint, EndpointKind, Method, Tag, TagId, TagTemplate, TagType};
pub use error::ApiError;
pub use posts::{CreatePost, Post, UpdatePost};
pub use users::{Address, Company, Geo, User};

/// Every declared endpoint, across all resource groups.
pub fn endpoints() -> impl Iterator<Item = &'static Endpoint> {
  posts::ENDPOINTS
    .iter()
    .chain(users::ENDPOINTS.iter())
    .copied()
}

/// Look up an endpoint by operation name (`getPosts`, `deletePost`, ...).
pub fn endpoint(name: &str) -> Option<&'static Endpoint> {
  endpoints().find(|e| e.name == name)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn test_endpoint_names_are_unique() {
    let names: Vec<_> = endpoints().map(|e| e.name).collect();
    let unique: HashSet<_> = names.iter().collect();
    assert_eq!(names.len(), unique.len());
  }

  #[test]
  fn test_lookup_by_name() {
    let delete = endpoint("deletePost").unwrap();
    assert_eq!(delete.method, Method::Delete);
    assert_eq!(delete.kind, EndpointKind::Mutation);
    assert!(endpoint("getTodos").is_none());
  }

  #[test]
  fn test_queries_only_get() {
    for e in endpoints().filter(|e| e.kind == EndpointKind::Query) {
      assert_eq!(e.method, Method::Get, "{} should be a GET", e.name);
    }
  }
}
