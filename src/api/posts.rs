use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::cached_client::CachedApiClient;
use super::endpoint::{Endpoint, EndpointKind, Method, TagTemplate, TagType};
use super::error::ApiError;
use crate::cache::FetchMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub id: u64,
  pub title: String,
  pub body: String,
  pub user_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
  pub title: String,
  pub body: String,
  pub user_id: u64,
}

/// Partial update; `id` selects the post and is not sent in the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePost {
  #[serde(skip)]
  pub id: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_id: Option<u64>,
}

pub static GET_POSTS: Endpoint = Endpoint {
  name: "getPosts",
  kind: EndpointKind::Query,
  method: Method::Get,
  path: "posts",
  tags: &[TagTemplate::Bare(TagType::Post)],
};

pub static GET_POST: Endpoint = Endpoint {
  name: "getPost",
  kind: EndpointKind::Query,
  method: Method::Get,
  path: "posts/{id}",
  tags: &[TagTemplate::Arg(TagType::Post)],
};

pub static CREATE_POST: Endpoint = Endpoint {
  name: "createPost",
  kind: EndpointKind::Mutation,
  method: Method::Post,
  path: "posts",
  tags: &[TagTemplate::Bare(TagType::Post)],
};

pub static UPDATE_POST: Endpoint = Endpoint {
  name: "updatePost",
  kind: EndpointKind::Mutation,
  method: Method::Patch,
  path: "posts/{id}",
  tags: &[TagTemplate::Arg(TagType::Post)],
};

pub static DELETE_POST: Endpoint = Endpoint {
  name: "deletePost",
  kind: EndpointKind::Mutation,
  method: Method::Delete,
  path: "posts/{id}",
  tags: &[TagTemplate::Bare(TagType::Post)],
};

pub static ENDPOINTS: &[&Endpoint] = &[
  &GET_POSTS,
  &GET_POST,
  &CREATE_POST,
  &UPDATE_POST,
  &DELETE_POST,
];

impl CachedApiClient {
  pub async fn get_posts(&self, mode: FetchMode) -> Result<Vec<Post>, ApiError> {
    self.query_as(&GET_POSTS, None, mode).await
  }

  pub async fn get_post(&self, id: u64, mode: FetchMode) -> Result<Post, ApiError> {
    self.query_as(&GET_POST, Some(id), mode).await
  }

  pub async fn create_post(&self, post: &CreatePost) -> Result<Post, ApiError> {
    let body = serde_json::to_value(post)?;
    self.mutate_as(&CREATE_POST, None, Some(body)).await
  }

  pub async fn update_post(&self, patch: &UpdatePost) -> Result<Post, ApiError> {
    let body = serde_json::to_value(patch)?;
    self.mutate_as(&UPDATE_POST, Some(patch.id), Some(body)).await
  }

  /// The demo API answers a delete with an empty object.
  pub async fn delete_post(&self, id: u64) -> Result<Value, ApiError> {
    self.mutate(&DELETE_POST, Some(id), None).await
  }
}
