use thiserror::Error;

/// Errors produced by the request client.
///
/// `Clone` so a single deduplicated fetch can hand the same failure to every
/// subscriber waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
  /// Transport failure: connection refused, DNS, TLS, reset.
  #[error("network error: {0}")]
  Network(String),

  /// The server answered with a non-2xx status.
  #[error("HTTP {status}: {body}")]
  Http { status: u16, body: String },

  /// The body could not be encoded or decoded as the expected JSON shape.
  #[error("serialization error: {0}")]
  Serialization(String),

  /// The call did not fit its endpoint (missing id, query used as mutation).
  #[error("invalid request: {0}")]
  InvalidRequest(String),
}

impl ApiError {
  /// HTTP status, when the server produced one.
  pub fn status(&self) -> Option<u16> {
    match self {
      ApiError::Http { status, .. } => Some(*status),
      _ => None,
    }
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_decode() {
      ApiError::Serialization(e.to_string())
    } else {
      ApiError::Network(e.to_string())
    }
  }
}

impl From<serde_json::Error> for ApiError {
  fn from(e: serde_json::Error) -> Self {
    ApiError::Serialization(e.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_http_error_display_carries_status_and_body() {
    let err = ApiError::Http {
      status: 500,
      body: "boom".to_string(),
    };
    assert_eq!(err.to_string(), "HTTP 500: boom");
    assert_eq!(err.status(), Some(500));
  }

  #[test]
  fn test_status_absent_for_transport_errors() {
    assert_eq!(ApiError::Network("refused".into()).status(), None);
    assert_eq!(ApiError::Serialization("eof".into()).status(), None);
  }

  #[test]
  fn test_from_serde_error() {
    let err = serde_json::from_str::<u64>("nope").unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::Serialization(_)));
  }
}
