use std::fmt;

/// Identity of a cached query result: which endpoint, called with which id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
  pub endpoint: &'static str,
  pub arg: Option<u64>,
}

impl CacheKey {
  pub fn new(endpoint: &'static str, arg: Option<u64>) -> Self {
    Self { endpoint, arg }
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.arg {
      Some(arg) => write!(f, "{}({})", self.endpoint, arg),
      None => write!(f, "{}()", self.endpoint),
    }
  }
}
