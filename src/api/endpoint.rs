//! Declarative endpoint records and cache tags.
//!
//! Every remote operation is described by a static [`Endpoint`]: its HTTP
//! method, a path template, and the cache tags it provides (queries) or
//! invalidates (mutations). The executor in `cached_client` is the only code
//! that interprets these records.

use std::fmt;

use super::error::ApiError;

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  Get,
  Post,
  Patch,
  Delete,
}

impl From<Method> for reqwest::Method {
  fn from(m: Method) -> Self {
    match m {
      Method::Get => reqwest::Method::GET,
      Method::Post => reqwest::Method::POST,
      Method::Patch => reqwest::Method::PATCH,
      Method::Delete => reqwest::Method::DELETE,
    }
  }
}

/// Cache categories known to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagType {
  Post,
  User,
  Todo,
}

impl fmt::Display for TagType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TagType::Post => "Post",
      TagType::User => "User",
      TagType::Todo => "Todo",
    };
    f.write_str(name)
  }
}

/// Scope of a tag within its category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagId {
  /// A specific entity
  Id(u64),
  /// A named slice such as `PARTIAL-LIST`
  Label(&'static str),
}

/// A cache tag: a category, optionally narrowed to one id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
  pub kind: TagType,
  pub id: Option<TagId>,
}

impl Tag {
  /// The general list of a category (`Post`).
  pub const fn bare(kind: TagType) -> Self {
    Self { kind, id: None }
  }

  /// One entity of a category (`{Post, 7}`).
  pub const fn with_id(kind: TagType, id: u64) -> Self {
    Self {
      kind,
      id: Some(TagId::Id(id)),
    }
  }

  pub const fn labelled(kind: TagType, label: &'static str) -> Self {
    Self {
      kind,
      id: Some(TagId::Label(label)),
    }
  }

  /// Whether invalidating `self` expires an entry that provided `provided`.
  ///
  /// A bare tag matches every tag of its category; a scoped tag only matches
  /// the identical scope.
  pub fn matches(&self, provided: &Tag) -> bool {
    if self.kind != provided.kind {
      return false;
    }
    match &self.id {
      None => true,
      Some(id) => provided.id.as_ref() == Some(id),
    }
  }
}

impl fmt::Display for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.id {
      None => write!(f, "{}", self.kind),
      Some(TagId::Id(id)) => write!(f, "{}:{}", self.kind, id),
      Some(TagId::Label(label)) => write!(f, "{}:{}", self.kind, label),
    }
  }
}

/// Tag declaration resolved against the call argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTemplate {
  /// `Post`
  Bare(TagType),
  /// `{Post, <arg>}`
  Arg(TagType),
  /// `{Post, "PARTIAL-LIST"}`
  Label(TagType, &'static str),
}

impl TagTemplate {
  pub fn resolve(&self, arg: Option<u64>) -> Tag {
    match *self {
      TagTemplate::Bare(kind) => Tag::bare(kind),
      TagTemplate::Arg(kind) => match arg {
        Some(id) => Tag::with_id(kind, id),
        None => Tag::bare(kind),
      },
      TagTemplate::Label(kind, label) => Tag::labelled(kind, label),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
  /// Read; `tags` are the tags it provides
  Query,
  /// Write; `tags` are the tags it invalidates on success
  Mutation,
}

/// One row of an endpoint table.
#[derive(Debug)]
pub struct Endpoint {
  pub name: &'static str,
  pub kind: EndpointKind,
  pub method: Method,
  /// Path relative to the base URL; `{id}` is replaced by the argument
  pub path: &'static str,
  pub tags: &'static [TagTemplate],
}

const ID_PLACEHOLDER: &str = "{id}";

impl Endpoint {
  pub fn takes_arg(&self) -> bool {
    self.path.contains(ID_PLACEHOLDER)
  }

  /// Render the path template for a call.
  pub fn path_for(&self, arg: Option<u64>) -> Result<String, ApiError> {
    match (self.takes_arg(), arg) {
      (true, Some(id)) => Ok(self.path.replace(ID_PLACEHOLDER, &id.to_string())),
      (true, None) => Err(ApiError::InvalidRequest(format!(
        "{} requires an id",
        self.name
      ))),
      (false, _) => Ok(self.path.to_string()),
    }
  }

  /// Tags this call provides or invalidates.
  pub fn tags_for(&self, arg: Option<u64>) -> Vec<Tag> {
    self.tags.iter().map(|t| t.resolve(arg)).collect()
  }

  /// Fail unless this endpoint is of the given kind.
  pub fn expect_kind(&self, kind: EndpointKind) -> Result<(), ApiError> {
    if self.kind == kind {
      Ok(())
    } else {
      Err(ApiError::InvalidRequest(format!(
        "{} is a {:?}, not a {:?}",
        self.name, self.kind, kind
      )))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const GET_THING: Endpoint = Endpoint {
    name: "getThing",
    kind: EndpointKind::Query,
    method: Method::Get,
    path: "things/{id}",
    tags: &[TagTemplate::Arg(TagType::Post)],
  };

  #[test]
  fn test_bare_tag_matches_every_scope() {
    let bare = Tag::bare(TagType::Post);
    assert!(bare.matches(&Tag::bare(TagType::Post)));
    assert!(bare.matches(&Tag::with_id(TagType::Post, 7)));
    assert!(bare.matches(&Tag::labelled(TagType::Post, "PARTIAL-LIST")));
    assert!(!bare.matches(&Tag::bare(TagType::User)));
  }

  #[test]
  fn test_scoped_tag_matches_only_same_id() {
    let seven = Tag::with_id(TagType::Post, 7);
    assert!(seven.matches(&Tag::with_id(TagType::Post, 7)));
    assert!(!seven.matches(&Tag::with_id(TagType::Post, 8)));
    assert!(!seven.matches(&Tag::bare(TagType::Post)));
    assert!(!seven.matches(&Tag::with_id(TagType::User, 7)));
  }

  #[test]
  fn test_path_for_substitutes_id() {
    assert_eq!(GET_THING.path_for(Some(3)).unwrap(), "things/3");
    assert!(matches!(
      GET_THING.path_for(None),
      Err(ApiError::InvalidRequest(_))
    ));
  }

  #[test]
  fn test_tags_for_resolves_templates() {
    assert_eq!(
      GET_THING.tags_for(Some(3)),
      vec![Tag::with_id(TagType::Post, 3)]
    );
  }

  #[test]
  fn test_tag_display() {
    assert_eq!(Tag::bare(TagType::User).to_string(), "User");
    assert_eq!(Tag::with_id(TagType::Post, 7).to_string(), "Post:7");
    assert_eq!(
      Tag::labelled(TagType::Post, "PARTIAL-LIST").to_string(),
      "Post:PARTIAL-LIST"
    );
  }

  #[test]
  fn test_expect_kind() {
    assert!(GET_THING.expect_kind(EndpointKind::Query).is_ok());
    assert!(GET_THING.expect_kind(EndpointKind::Mutation).is_err());
  }
}
