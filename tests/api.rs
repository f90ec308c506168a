use jpq::api::{
  bearer_token_hook, ApiClient, CachedApiClient, CreatePost, Tag, TagType, UpdatePost,
};
use jpq::cache::{CacheKey, CacheSource, FetchMode, QueryCache};
use jpq::query::Query;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
  matchers::{header, method, path},
  Mock, MockServer, ResponseTemplate,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn post(id: u64, user_id: u64) -> Value {
  json!({
    "id": id,
    "title": format!("title {}", id),
    "body": format!("body of post {}", id),
    "userId": user_id
  })
}

fn user(id: u64) -> Value {
  json!({
    "id": id,
    "name": format!("User {}", id),
    "username": format!("user{}", id),
    "email": format!("user{}@example.test", id),
    "address": {
      "street": "Main St",
      "suite": "Apt. 1",
      "city": "Springfield",
      "zipcode": "00000",
      "geo": {"lat": "0", "lng": "0"}
    },
    "phone": "555-0100",
    "website": "example.test",
    "company": {"name": "Acme", "catchPhrase": "We make things", "bs": "synergy"}
  })
}

/// A mock JSONPlaceholder with three posts and two users
async fn mock_backend() -> MockServer {
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/posts"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      post(1, 1),
      post(2, 1),
      post(3, 2)
    ])))
    .mount(&server)
    .await;

  for id in 1..=3 {
    Mock::given(method("GET"))
      .and(path(format!("/posts/{}", id)))
      .respond_with(ResponseTemplate::new(200).set_body_json(post(id, 1)))
      .mount(&server)
      .await;
  }

  Mock::given(method("GET"))
    .and(path("/users"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([user(1), user(2)])))
    .mount(&server)
    .await;

  for id in 1..=2 {
    Mock::given(method("GET"))
      .and(path(format!("/users/{}", id)))
      .respond_with(ResponseTemplate::new(200).set_body_json(user(id)))
      .mount(&server)
      .await;
  }

  Mock::given(method("GET"))
    .and(path("/users/1/posts"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([post(1, 1), post(2, 1)])))
    .mount(&server)
    .await;

  server
}

fn client_for(server: &MockServer) -> CachedApiClient {
  let inner = ApiClient::new(&server.uri()).unwrap();
  CachedApiClient::new(inner, Arc::new(QueryCache::new()))
}

async fn get_count(server: &MockServer, url_path: &str) -> usize {
  server
    .received_requests()
    .await
    .unwrap()
    .iter()
    .filter(|r| r.method.as_str() == "GET" && r.url.path() == url_path)
    .count()
}

/// Poll until the query has no request outstanding
async fn settle<T: Send + 'static>(query: &mut Query<T>) {
  for _ in 0..100 {
    query.poll();
    if !query.is_fetching() {
      return;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  panic!("query never settled");
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_listed_post_fetches_by_id() {
  let server = mock_backend().await;
  let client = client_for(&server);

  let posts = client.get_posts(FetchMode::CacheFirst).await.unwrap();
  assert_eq!(posts.len(), 3);

  for listed in &posts {
    let single = client
      .get_post(listed.id, FetchMode::CacheFirst)
      .await
      .unwrap();
    assert_eq!(single.id, listed.id);
  }
}

#[tokio::test]
async fn test_each_user_is_cached_under_its_own_id() {
  let server = mock_backend().await;
  let client = client_for(&server);

  let one = client.get_user(1, FetchMode::CacheFirst).await.unwrap();
  let two = client.get_user(2, FetchMode::CacheFirst).await.unwrap();
  assert_eq!(one.id, 1);
  assert_eq!(two.username, "user2");
  assert_eq!(one.company.catch_phrase, "We make things");

  // Served from cache the second time
  let again = client.get_user(1, FetchMode::CacheFirst).await.unwrap();
  assert_eq!(again, one);
  assert_eq!(get_count(&server, "/users/1").await, 1);
  assert_eq!(get_count(&server, "/users/2").await, 1);

  let first_key = CacheKey::new("getUser", Some(1));
  let second_key = CacheKey::new("getUser", Some(2));
  let affected = client
    .cache()
    .invalidate(&[Tag::with_id(TagType::User, 1)]);
  assert_eq!(affected, vec![first_key.clone()]);

  let cache = client.cache();
  assert_eq!(cache.is_stale(&first_key), Some(true));
  assert_eq!(cache.is_stale(&second_key), Some(false));

  client.get_user(1, FetchMode::CacheFirst).await.unwrap();
  client.get_user(2, FetchMode::CacheFirst).await.unwrap();
  assert_eq!(get_count(&server, "/users/1").await, 2);
  assert_eq!(get_count(&server, "/users/2").await, 1);
}

#[tokio::test]
async fn test_concurrent_users_requests_share_one_call() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/users"))
    .respond_with(
      ResponseTemplate::new(200)
        .set_body_json(json!([user(1)]))
        .set_delay(Duration::from_millis(100)),
    )
    .expect(1)
    .mount(&server)
    .await;

  let client = client_for(&server);
  let (a, b, c) = tokio::join!(
    client.get_users(FetchMode::CacheFirst),
    client.get_users(FetchMode::CacheFirst),
    client.get_users(FetchMode::CacheFirst)
  );

  let a = a.unwrap();
  assert_eq!(a, b.unwrap());
  assert_eq!(a, c.unwrap());
}

#[tokio::test]
async fn test_second_read_comes_from_cache() {
  let server = mock_backend().await;
  let client = client_for(&server);

  client.get_users(FetchMode::CacheFirst).await.unwrap();
  let again = client
    .query(&jpq::api::users::GET_USERS, None, FetchMode::CacheFirst)
    .await
    .unwrap();

  assert_eq!(again.source, CacheSource::Cache);
  assert_eq!(get_count(&server, "/users").await, 1);
}

// ============================================================================
// Invalidation
// ============================================================================

#[tokio::test]
async fn test_delete_expires_every_post_list() {
  let server = mock_backend().await;
  Mock::given(method("DELETE"))
    .and(path("/posts/1"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
    .mount(&server)
    .await;

  let client = client_for(&server);
  client.get_posts(FetchMode::CacheFirst).await.unwrap();
  client
    .get_user_posts(1, FetchMode::CacheFirst)
    .await
    .unwrap();
  client.get_users(FetchMode::CacheFirst).await.unwrap();

  client.delete_post(1).await.unwrap();

  let cache = client.cache();
  assert_eq!(cache.is_stale(&CacheKey::new("getPosts", None)), Some(true));
  // The partial list carries a Post tag, so a bare Post invalidation reaches it
  assert_eq!(
    cache.is_stale(&CacheKey::new("getUserPosts", Some(1))),
    Some(true)
  );
  assert_eq!(cache.is_stale(&CacheKey::new("getUsers", None)), Some(false));

  // Backend still returns the original list; the refetch succeeds
  let posts = client.get_posts(FetchMode::CacheFirst).await.unwrap();
  assert_eq!(posts.len(), 3);
  assert_eq!(get_count(&server, "/posts").await, 2);
}

#[tokio::test]
async fn test_update_expires_only_that_post() {
  let server = mock_backend().await;
  Mock::given(method("PATCH"))
    .and(path("/posts/2"))
    .respond_with(ResponseTemplate::new(200).set_body_json(post(2, 1)))
    .mount(&server)
    .await;

  let client = client_for(&server);
  client.get_post(1, FetchMode::CacheFirst).await.unwrap();
  client.get_post(2, FetchMode::CacheFirst).await.unwrap();

  let mut invalidations = client.cache().subscribe();
  client
    .update_post(&UpdatePost {
      id: 2,
      title: Some("renamed".to_string()),
      ..Default::default()
    })
    .await
    .unwrap();

  let cache = client.cache();
  assert_eq!(cache.is_stale(&CacheKey::new("getPost", Some(1))), Some(false));
  assert_eq!(cache.is_stale(&CacheKey::new("getPost", Some(2))), Some(true));
  assert_eq!(
    invalidations.try_recv().unwrap(),
    vec![CacheKey::new("getPost", Some(2))]
  );
}

#[tokio::test]
async fn test_create_during_refetch_triggers_another_refetch() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/posts"))
    .respond_with(
      ResponseTemplate::new(200)
        .set_body_json(json!([post(1, 1), post(2, 1)]))
        .set_delay(Duration::from_millis(150)),
    )
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path("/posts"))
    .respond_with(ResponseTemplate::new(201).set_body_json(post(101, 1)))
    .mount(&server)
    .await;

  let client = client_for(&server);
  let api = client.clone();
  let mut query = Query::new(move |mode| {
    let api = api.clone();
    async move { api.get_posts(mode).await }
  })
  .watching(client.cache(), CacheKey::new("getPosts", None));

  query.fetch();
  settle(&mut query).await;
  assert!(query.is_success());
  assert_eq!(get_count(&server, "/posts").await, 1);

  // The create lands while the manual refetch is still on the wire
  query.refetch();
  tokio::time::sleep(Duration::from_millis(30)).await;
  client
    .create_post(&CreatePost {
      title: "new".to_string(),
      body: "fresh".to_string(),
      user_id: 1,
    })
    .await
    .unwrap();

  settle(&mut query).await;
  assert_eq!(get_count(&server, "/posts").await, 3);
  assert_eq!(
    client.cache().is_stale(&CacheKey::new("getPosts", None)),
    Some(false)
  );
  assert_eq!(query.data().map(|posts| posts.len()), Some(2));
}

// ============================================================================
// Request policy
// ============================================================================

#[tokio::test]
async fn test_bearer_token_reaches_server() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/users"))
    .and(header("authorization", "Bearer secret"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
    .expect(1)
    .mount(&server)
    .await;

  let hook = bearer_token_hook(Some("secret".to_string())).unwrap();
  let inner = ApiClient::new(&server.uri()).unwrap().with_header_hook(hook);
  let client = CachedApiClient::new(inner, Arc::new(QueryCache::new()));

  assert!(client
    .get_users(FetchMode::CacheFirst)
    .await
    .unwrap()
    .is_empty());
}

#[tokio::test]
async fn test_server_error_surfaces_status_and_recovers() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/users"))
    .respond_with(ResponseTemplate::new(500).set_body_string("down"))
    .up_to_n_times(1)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/users"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([user(1)])))
    .mount(&server)
    .await;

  let client = client_for(&server);
  let err = client.get_users(FetchMode::CacheFirst).await.unwrap_err();
  assert_eq!(err.status(), Some(500));

  let users = client.get_users(FetchMode::Network).await.unwrap();
  assert_eq!(users.len(), 1);
}
