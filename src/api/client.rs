use std::fmt;
use std::sync::Arc;

use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use super::endpoint::Method;
use super::error::ApiError;

/// Public demo API every endpoint is resolved against.
pub const BASE_URL: &str = "https://jsonplaceholder.typicode.com/";

/// Called with the outgoing headers right before each request is sent.
pub type HeaderHook = Arc<dyn Fn(&mut HeaderMap) + Send + Sync>;

/// Shared request client: one base URL and one header policy for every
/// endpoint group.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base_url: Url,
  prepare_headers: Option<HeaderHook>,
}

impl ApiClient {
  pub fn new(base_url: &str) -> Result<Self> {
    // Url::join drops the last segment unless the base ends with a slash
    let normalized = if base_url.ends_with('/') {
      base_url.to_string()
    } else {
      format!("{}/", base_url)
    };

    let base_url =
      Url::parse(&normalized).map_err(|e| eyre!("Invalid base URL {}: {}", base_url, e))?;

    let http = reqwest::Client::builder()
      .user_agent(concat!("jpq/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      prepare_headers: None,
    })
  }

  /// Install a hook that may add or replace headers on every request.
  pub fn with_header_hook(mut self, hook: HeaderHook) -> Self {
    self.prepare_headers = Some(hook);
    self
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
  }

  fn headers(&self) -> HeaderMap {
    let mut headers = Self::default_headers();
    if let Some(hook) = &self.prepare_headers {
      hook(&mut headers);
    }
    headers
  }

  /// Send one request and decode the JSON reply.
  ///
  /// Non-2xx statuses become [`ApiError::Http`] with the raw body. An empty
  /// 2xx body decodes as `null`.
  pub async fn execute(
    &self,
    method: Method,
    path: &str,
    body: Option<&Value>,
  ) -> std::result::Result<Value, ApiError> {
    let url = self
      .base_url
      .join(path)
      .map_err(|e| ApiError::InvalidRequest(format!("bad path {}: {}", path, e)))?;

    tracing::debug!(?method, %url, "sending request");

    let mut request = self.http.request(method.into(), url).headers(self.headers());
    if let Some(body) = body {
      request = request.body(serde_json::to_vec(body)?);
    }

    let response = request.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
      return Err(ApiError::Http {
        status: status.as_u16(),
        body: String::from_utf8_lossy(&bytes).into_owned(),
      });
    }

    if bytes.is_empty() {
      return Ok(Value::Null);
    }

    Ok(serde_json::from_slice(&bytes)?)
  }
}

impl fmt::Debug for ApiClient {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ApiClient")
      .field("base_url", &self.base_url.as_str())
      .field("prepare_headers", &self.prepare_headers.is_some())
      .finish_non_exhaustive()
  }
}

/// Header hook adding `Authorization: Bearer <token>` when a token is set.
///
/// Returns `None` for a missing or blank token so no hook is installed.
pub fn bearer_token_hook(token: Option<String>) -> Option<HeaderHook> {
  let token = token.filter(|t| !t.trim().is_empty())?;
  let value = HeaderValue::from_str(&format!("Bearer {}", token.trim())).ok()?;
  Some(Arc::new(move |headers: &mut HeaderMap| {
    headers.insert(AUTHORIZATION, value.clone());
  }))
}
