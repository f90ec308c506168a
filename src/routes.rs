use std::fmt;

/// Leaf screens of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
  Home,
  Posts,
  Users,
}

impl Route {
  pub const ALL: [Route; 3] = [Route::Home, Route::Posts, Route::Users];

  pub fn path(self) -> &'static str {
    match self {
      Route::Home => "/",
      Route::Posts => "/posts",
      Route::Users => "/users",
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Route::Home => "Home",
      Route::Posts => "Posts",
      Route::Users => "Users",
    }
  }

  /// Parse a route path; a missing leading slash and trailing slash are tolerated.
  pub fn from_path(path: &str) -> Option<Self> {
    let trimmed = path.trim().trim_matches('/');
    match trimmed {
      "" => Some(Route::Home),
      "posts" => Some(Route::Posts),
      "users" => Some(Route::Users),
      _ => None,
    }
  }
}

impl fmt::Display for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.path())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_paths_round_trip() {
    for route in Route::ALL {
      assert_eq!(Route::from_path(route.path()), Some(route));
    }
  }

  #[test]
  fn test_lenient_parsing() {
    assert_eq!(Route::from_path("posts"), Some(Route::Posts));
    assert_eq!(Route::from_path("/users/"), Some(Route::Users));
    assert_eq!(Route::from_path(""), Some(Route::Home));
    assert_eq!(Route::from_path("/todos"), None);
  }
}
