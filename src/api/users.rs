use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::cached_client::CachedApiClient;
use super::endpoint::{Endpoint, EndpointKind, Method, TagTemplate, TagType};
use super::error::ApiError;
use super::posts::Post;
use crate::cache::FetchMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: u64,
  pub name: String,
  pub username: String,
  pub email: String,
  pub address: Address,
  pub phone: String,
  pub website: String,
  pub company: Company,
  /// Fields this client does not model, kept so a round trip loses nothing
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub street: String,
  pub suite: String,
  pub city: String,
  pub zipcode: String,
  pub geo: Geo,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Coordinates are strings in the demo API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geo {
  pub lat: String,
  pub lng: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
  pub name: String,
  pub catch_phrase: String,
  pub bs: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

pub static GET_USERS: Endpoint = Endpoint {
  name: "getUsers",
  kind: EndpointKind::Query,
  method: Method::Get,
  path: "users",
  tags: &[TagTemplate::Bare(TagType::User)],
};

pub static GET_USER: Endpoint = Endpoint {
  name: "getUser",
  kind: EndpointKind::Query,
  method: Method::Get,
  path: "users/{id}",
  tags: &[TagTemplate::Arg(TagType::User)],
};

pub static GET_USER_POSTS: Endpoint = Endpoint {
  name: "getUserPosts",
  kind: EndpointKind::Query,
  method: Method::Get,
  path: "users/{id}/posts",
  tags: &[
    TagTemplate::Label(TagType::Post, "PARTIAL-LIST"),
    TagTemplate::Arg(TagType::User),
  ],
};

pub static ENDPOINTS: &[&Endpoint] = &[&GET_USERS, &GET_USER, &GET_USER_POSTS];

impl CachedApiClient {
  pub async fn get_users(&self, mode: FetchMode) -> Result<Vec<User>, ApiError> {
    self.query_as(&GET_USERS, None, mode).await
  }

  pub async fn get_user(&self, id: u64, mode: FetchMode) -> Result<User, ApiError> {
    self.query_as(&GET_USER, Some(id), mode).await
  }

  pub async fn get_user_posts(
    &self,
    user_id: u64,
    mode: FetchMode,
  ) -> Result<Vec<Post>, ApiError> {
    self.query_as(&GET_USER_POSTS, Some(user_id), mode).await
  }
}
