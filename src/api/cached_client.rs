//! Executor that runs endpoint records through the query cache.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use super::client::ApiClient;
use super::endpoint::{Endpoint, EndpointKind};
use super::error::ApiError;
use crate::cache::{CacheKey, CacheResult, FetchMode, QueryCache};

/// API client with transparent caching and tag invalidation.
///
/// Queries go through [`QueryCache::fetch`]; mutations hit the network
/// directly and, on success, invalidate the tags their endpoint declares.
#[derive(Clone)]
pub struct CachedApiClient {
  inner: ApiClient,
  cache: Arc<QueryCache>,
}

impl CachedApiClient {
  pub fn new(inner: ApiClient, cache: Arc<QueryCache>) -> Self {
    Self { inner, cache }
  }

  pub fn cache(&self) -> &Arc<QueryCache> {
    &self.cache
  }

  pub fn inner(&self) -> &ApiClient {
    &self.inner
  }

  /// Run a query endpoint.
  pub async fn query(
    &self,
    endpoint: &'static Endpoint,
    arg: Option<u64>,
    mode: FetchMode,
  ) -> Result<CacheResult<Value>, ApiError> {
    endpoint.expect_kind(EndpointKind::Query)?;

    let path = endpoint.path_for(arg)?;
    let key = CacheKey::new(endpoint.name, arg);
    let provides = endpoint.tags_for(arg);
    let inner = self.inner.clone();
    let method = endpoint.method;

    self
      .cache
      .fetch(key, provides, mode, move || async move {
        inner.execute(method, &path, None).await
      })
      .await
  }

  /// Run a mutation endpoint and invalidate its tags if it succeeds.
  pub async fn mutate(
    &self,
    endpoint: &'static Endpoint,
    arg: Option<u64>,
    body: Option<Value>,
  ) -> Result<Value, ApiError> {
    endpoint.expect_kind(EndpointKind::Mutation)?;

    let path = endpoint.path_for(arg)?;
    let data = self
      .inner
      .execute(endpoint.method, &path, body.as_ref())
      .await?;

    let affected = self.cache.invalidate(&endpoint.tags_for(arg));
    tracing::info!(
      endpoint = endpoint.name,
      invalidated = affected.len(),
      "mutation succeeded"
    );

    Ok(data)
  }

  /// Run any endpoint by operation name. Queries use the cache.
  pub async fn dispatch(
    &self,
    name: &str,
    arg: Option<u64>,
    body: Option<Value>,
  ) -> Result<Value, ApiError> {
    let endpoint = super::endpoint(name)
      .ok_or_else(|| ApiError::InvalidRequest(format!("unknown endpoint {}", name)))?;

    match endpoint.kind {
      EndpointKind::Query => Ok(self.query(endpoint, arg, FetchMode::CacheFirst).await?.data),
      EndpointKind::Mutation => self.mutate(endpoint, arg, body).await,
    }
  }

  pub(crate) async fn query_as<T: DeserializeOwned>(
    &self,
    endpoint: &'static Endpoint,
    arg: Option<u64>,
    mode: FetchMode,
  ) -> Result<T, ApiError> {
    let result = self.query(endpoint, arg, mode).await?;
    Ok(serde_json::from_value(result.data)?)
  }

  pub(crate) async fn mutate_as<T: DeserializeOwned>(
    &self,
    endpoint: &'static Endpoint,
    arg: Option<u64>,
    body: Option<Value>,
  ) -> Result<T, ApiError> {
    let data = self.mutate(endpoint, arg, body).await?;
    Ok(serde_json::from_value(data)?)
  }
}
