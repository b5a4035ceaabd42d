use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use shelf_core::{
  memory::MemoryStore,
  store::Repository,
  user::{Role, User, UserCommand},
};
use tower::ServiceExt as _;
use uuid::Uuid;

use super::*;

fn make_state() -> AppState<MemoryStore> {
  let tokens = TokenIssuer::new(&TokenConfig {
    access_secret:    "access".to_owned(),
    refresh_secret:   "refresh".to_owned(),
    access_ttl_secs:  900,
    refresh_ttl_secs: 3600,
  });
  AppState::new(MemoryStore::new(), tokens)
}

/// Insert a user straight into the store and return a bearer header for them.
async fn seed_user(state: &AppState<MemoryStore>, username: &str, role: Role) -> (Uuid, String) {
  let id = Uuid::new_v4();
  let mut user = User::new(
    id,
    UserCommand {
      name:     username.to_uppercase(),
      username: username.to_owned(),
      email:    format!("{username}@example.com"),
      password: "unused-password".to_owned(),
    },
    "unused-hash".to_owned(),
  );
  user.role = role;
  Repository::<User>::insert(&*state.store, user).await.unwrap();
  let pair = state.tokens.issue(id, role).unwrap();
  (id, format!("Bearer {}", pair.access_token))
}

async fn send(
  state: &AppState<MemoryStore>,
  method: &str,
  uri: &str,
  auth: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(auth) = auth {
    builder = builder.header(header::AUTHORIZATION, auth);
  }
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp = router(state.clone()).oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

fn book_body(title: &str) -> Value {
  json!({
    "title": title,
    "description": "A story.",
    "author": "Someone",
    "genre": "fiction",
    "pages": 320,
  })
}

async fn seed_book(state: &AppState<MemoryStore>, staff: &str, title: &str) -> Uuid {
  let id = Uuid::new_v4();
  let (status, _) =
    send(state, "PUT", &format!("/books/{id}"), Some(staff), Some(book_body(title))).await;
  assert_eq!(status, StatusCode::CREATED);
  id
}

// ── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_check_reports_ok() {
  let state = make_state();
  let (status, body) = send(&state, "GET", "/health-check", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "status": "ok" }));
}

// ── Books ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn book_writes_require_staff() {
  let state = make_state();
  let (_, user) = seed_user(&state, "reader", Role::Default).await;
  let id = Uuid::new_v4();
  let uri = format!("/books/{id}");

  let (status, body) = send(&state, "PUT", &uri, None, Some(book_body("Dune"))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["error"].is_string());

  let (status, _) = send(&state, "PUT", &uri, Some(&user), Some(book_body("Dune"))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(&state, "GET", &uri, None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn book_lifecycle() {
  let state = make_state();
  let (_, staff) = seed_user(&state, "admin", Role::Staff).await;
  let id = seed_book(&state, &staff, "Dune").await;
  let uri = format!("/books/{id}");

  let (status, body) = send(&state, "GET", &uri, None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["title"], "Dune");
  assert_eq!(body["data"]["rating"], 0.0);
  let created_on = body["data"]["created_on"].clone();

  let (status, body) =
    send(&state, "PATCH", &uri, Some(&staff), Some(json!({ "pages": 400 }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["pages"], 400);
  assert_eq!(body["data"]["title"], "Dune");
  assert_eq!(body["data"]["created_on"], created_on);

  let (status, body) = send(&state, "PUT", &uri, Some(&staff), Some(book_body("Dune"))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "book id already exists");

  let (status, body) = send(&state, "DELETE", &uri, Some(&staff), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  assert_eq!(body, Value::Null);

  let (status, _) = send(&state, "DELETE", &uri, Some(&staff), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_book_is_rejected() {
  let state = make_state();
  let (_, staff) = seed_user(&state, "admin", Role::Staff).await;
  let mut body = book_body("");
  body["pages"] = json!(0);
  let (status, _) =
    send(&state, "PUT", &format!("/books/{}", Uuid::new_v4()), Some(&staff), Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_path_id_is_a_bad_request() {
  let state = make_state();
  let (status, _) = send(&state, "GET", "/books/not-a-uuid", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn book_listing_filters_and_pages() {
  let state = make_state();
  let (_, staff) = seed_user(&state, "admin", Role::Staff).await;
  for title in ["Dune", "Emma", "Dracula"] {
    seed_book(&state, &staff, title).await;
  }

  let (_, body) = send(&state, "GET", "/books?q=d", None, None).await;
  assert_eq!(body["data"].as_array().unwrap().len(), 2);

  let (_, body) = send(&state, "GET", "/books?page=2&per_page=2", None, None).await;
  assert_eq!(body["data"].as_array().unwrap().len(), 1);

  let (_, body) = send(&state, "GET", "/books?all=true&per_page=1", None, None).await;
  assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

// ── Reviews ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reviews_carry_reviewer_and_feed_rating() {
  let state = make_state();
  let (_, staff) = seed_user(&state, "admin", Role::Staff).await;
  let (alice_id, alice) = seed_user(&state, "alice", Role::Default).await;
  let (_, bob) = seed_user(&state, "bob", Role::Default).await;
  let book = seed_book(&state, &staff, "Dune").await;

  for (token, rating) in [(&alice, 4.0), (&bob, 1.5)] {
    let uri = format!("/books/{book}/reviews/{}", Uuid::new_v4());
    let (status, _) =
      send(&state, "PUT", &uri, Some(token), Some(json!({ "text": "ok", "rating": rating })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  let (status, body) = send(&state, "GET", &format!("/books/{book}/reviews"), None, None).await;
  assert_eq!(status, StatusCode::OK);
  let reviews = body["data"].as_array().unwrap();
  assert_eq!(reviews.len(), 2);
  assert!(reviews.iter().any(|r| r["reviewer"]["username"] == "alice"
    && r["reviewer"]["id"] == alice_id.to_string()));

  let (_, body) = send(&state, "GET", &format!("/books/{book}"), None, None).await;
  assert_eq!(body["data"]["rating"], 3.0);

  let (_, body) = send(&state, "GET", "/reviews/ranking?order=asc", None, None).await;
  assert_eq!(body["data"][0]["book_id"], book.to_string());
  assert_eq!(body["data"][0]["total"], 2);
}

#[tokio::test]
async fn review_on_missing_book_is_not_found() {
  let state = make_state();
  let (_, alice) = seed_user(&state, "alice", Role::Default).await;
  let uri = format!("/books/{}/reviews/{}", Uuid::new_v4(), Uuid::new_v4());
  let (status, body) =
    send(&state, "PUT", &uri, Some(&alice), Some(json!({ "text": "ok", "rating": 3.0 }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "book not found");
}

#[tokio::test]
async fn only_the_author_edits_and_only_staff_deletes_a_review() {
  let state = make_state();
  let (_, staff) = seed_user(&state, "admin", Role::Staff).await;
  let (_, alice) = seed_user(&state, "alice", Role::Default).await;
  let (_, bob) = seed_user(&state, "bob", Role::Default).await;
  let book = seed_book(&state, &staff, "Dune").await;
  let review = Uuid::new_v4();
  send(
    &state,
    "PUT",
    &format!("/books/{book}/reviews/{review}"),
    Some(&alice),
    Some(json!({ "text": "great", "rating": 5.0 })),
  )
  .await;
  let uri = format!("/book/reviews/{review}");

  let (status, _) = send(&state, "PATCH", &uri, Some(&bob), Some(json!({ "text": "bad" }))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (_, body) = send(&state, "GET", &uri, None, None).await;
  assert_eq!(body["data"]["text"], "great");

  let (status, body) =
    send(&state, "PATCH", &uri, Some(&alice), Some(json!({ "text": "fine" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["text"], "fine");
  assert_eq!(body["data"]["rating"], 5.0);

  let (status, _) = send(&state, "DELETE", &uri, Some(&alice), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = send(&state, "DELETE", &uri, Some(&staff), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
}

// ── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_login_and_refresh() {
  let state = make_state();
  let id = Uuid::new_v4();
  let registration = json!({
    "name": "Alice",
    "username": "Alice",
    "email": "Alice@Example.com",
    "password": "hunter22!",
  });

  let (status, body) =
    send(&state, "PUT", &format!("/users/{id}"), None, Some(registration.clone())).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["data"]["username"], "alice");
  assert_eq!(body["data"]["email"], "alice@example.com");
  assert!(body["data"].get("password").is_none());
  assert!(body["data"].get("password_hash").is_none());

  let mut again = registration.clone();
  again["username"] = json!("alice2");
  let (status, body) =
    send(&state, "PUT", &format!("/users/{}", Uuid::new_v4()), None, Some(again)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "email already in use");

  let (status, body) = send(
    &state,
    "POST",
    "/login",
    None,
    Some(json!({ "email": "ALICE@example.com", "password": "wrong-password" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["error"].is_string());

  let (status, _) = send(
    &state,
    "POST",
    "/login",
    None,
    Some(json!({ "email": "nobody@example.com", "password": "hunter22!" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, body) = send(
    &state,
    "POST",
    "/login",
    None,
    Some(json!({ "email": "alice@example.com", "password": "hunter22!" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["id"], id.to_string());
  assert!(body["data"].get("password_hash").is_none());
  let access = body["tokens"]["access_token"].as_str().unwrap().to_owned();
  let refresh = body["tokens"]["refresh_token"].as_str().unwrap().to_owned();

  let (status, _) = send(
    &state,
    "PATCH",
    &format!("/users/{id}"),
    Some(&format!("Bearer {access}")),
    Some(json!({ "name": "Alice A." })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) =
    send(&state, "POST", "/token/refresh", None, Some(json!({ "refresh_token": access }))).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, body) =
    send(&state, "POST", "/token/refresh", None, Some(json!({ "refresh_token": refresh }))).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["data"]["access_token"].is_string());
}

#[tokio::test]
async fn users_only_modify_themselves() {
  let state = make_state();
  let (alice_id, alice) = seed_user(&state, "alice", Role::Default).await;
  let (bob_id, bob) = seed_user(&state, "bob", Role::Default).await;
  let (_, staff) = seed_user(&state, "admin", Role::Staff).await;

  let (status, _) = send(
    &state,
    "PATCH",
    &format!("/users/{alice_id}"),
    Some(&bob),
    Some(json!({ "name": "Mallory" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, body) = send(
    &state,
    "PATCH",
    &format!("/users/{alice_id}"),
    Some(&alice),
    Some(json!({ "username": "bob" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "username already in use");

  let (status, _) = send(&state, "DELETE", &format!("/users/{bob_id}"), Some(&alice), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = send(&state, "DELETE", &format!("/users/{bob_id}"), Some(&staff), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&state, "DELETE", &format!("/users/{alice_id}"), Some(&alice), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn user_listing_by_username_and_query() {
  let state = make_state();
  let (alice_id, _) = seed_user(&state, "alice", Role::Default).await;
  seed_user(&state, "alfred", Role::Default).await;
  seed_user(&state, "bob", Role::Default).await;

  let (status, body) = send(&state, "GET", "/users?username=ALICE", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["id"], alice_id.to_string());

  let (status, body) = send(&state, "GET", "/users?username=carol", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "username not found");

  let (_, body) = send(&state, "GET", "/users?q=al", None, None).await;
  assert_eq!(body["data"].as_array().unwrap().len(), 2);

  let (_, body) = send(&state, "GET", "/users?all=true", None, None).await;
  assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn interests_are_bucketed() {
  let state = make_state();
  let (_, staff) = seed_user(&state, "admin", Role::Staff).await;
  let (alice_id, alice) = seed_user(&state, "alice", Role::Default).await;
  let dune = seed_book(&state, &staff, "Dune").await;
  let emma = seed_book(&state, &staff, "Emma").await;

  for (book, status) in [(dune, "reading"), (emma, "done")] {
    let (code, body) = send(
      &state,
      "PATCH",
      &format!("/user/interests/{book}"),
      Some(&alice),
      Some(json!({ "status": status })),
    )
    .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["data"]["interests"][book.to_string()], status);
  }

  let (status, _) = send(
    &state,
    "PATCH",
    &format!("/user/interests/{}", Uuid::new_v4()),
    Some(&alice),
    Some(json!({ "status": "pending" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  // A deleted book drops out of the buckets.
  send(&state, "DELETE", &format!("/books/{emma}"), Some(&staff), None).await;
  let (_, body) = send(&state, "GET", &format!("/users/{alice_id}/interests"), None, None).await;
  assert_eq!(body["data"]["reading"][0]["title"], "Dune");
  assert_eq!(body["data"]["done"], json!([]));
  assert_eq!(body["data"]["pending"], json!([]));

  let (status, body) =
    send(&state, "DELETE", &format!("/user/interests/{dune}"), Some(&alice), None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["data"]["interests"].get(dune.to_string()).is_none());
}

// ── Follows ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn follow_and_unfollow() {
  let state = make_state();
  let (alice_id, alice) = seed_user(&state, "alice", Role::Default).await;
  let (bob_id, _) = seed_user(&state, "bob", Role::Default).await;

  let (status, _) = send(&state, "POST", &format!("/user/follow/{alice_id}"), Some(&alice), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) =
    send(&state, "POST", &format!("/user/follow/{}", Uuid::new_v4()), Some(&alice), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(&state, "POST", &format!("/user/follow/{bob_id}"), Some(&alice), None).await;
  assert_eq!(status, StatusCode::OK);

  let (_, body) = send(&state, "GET", &format!("/users/{bob_id}/followers"), None, None).await;
  assert_eq!(body["data"][0]["username"], "alice");
  assert!(body["data"][0]["follow_at"].is_string());
  let (_, body) = send(&state, "GET", &format!("/users/{alice_id}/following"), None, None).await;
  assert_eq!(body["data"][0]["id"], bob_id.to_string());

  let (status, _) =
    send(&state, "POST", &format!("/user/unfollow/{bob_id}"), Some(&alice), None).await;
  assert_eq!(status, StatusCode::OK);
  let (_, body) = send(&state, "GET", &format!("/users/{bob_id}/followers"), None, None).await;
  assert_eq!(body["data"], json!([]));
  let (_, body) = send(&state, "GET", &format!("/users/{alice_id}/following"), None, None).await;
  assert_eq!(body["data"], json!([]));
}
