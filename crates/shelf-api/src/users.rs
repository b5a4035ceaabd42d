//! Handlers for users, interests and sign-in.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/users` | `?username=` exact lookup, else paged `?page`, `per_page`, `q`; `all=true` skips paging |
//! | `GET`    | `/users/:id` | Public profile |
//! | `PUT`    | `/users/:id` | Registration; body: [`UserCommand`] |
//! | `PATCH`  | `/users/:id` | Self only; body: [`UserPatch`] |
//! | `DELETE` | `/users/:id` | Self or staff |
//! | `GET`    | `/users/:id/interests` | Interests bucketed by status |
//! | `PATCH`  | `/user/interests/:book_id` | body: [`InterestCommand`] |
//! | `DELETE` | `/user/interests/:book_id` | |
//! | `POST`   | `/login` | body: [`LoginCommand`] |
//! | `POST`   | `/token/refresh` | body: [`RefreshRequest`] |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use shelf_core::{
  criteria::{Page, UserCriteria},
  store::Store,
  user::{InterestCommand, LoginCommand, UserCommand, UserPatch, UserProfile},
  view::{self, InterestBuckets},
};
use uuid::Uuid;

use crate::{
  AppState, Data,
  auth::{Authenticated, TokenKind, TokenPair},
  data,
  error::ApiError,
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  /// Exact, case-insensitive username lookup. Takes precedence.
  pub username: Option<String>,
  pub page:     Option<u32>,
  pub per_page: Option<u32>,
  /// Matched against name and username.
  pub q:        Option<String>,
  #[serde(default)]
  pub all:      bool,
}

/// A username lookup yields one profile; everything else a list.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Listing {
  One(UserProfile),
  Many(Vec<UserProfile>),
}

/// `GET /users[?username=..][?page=..&per_page=..&q=..][&all=true]`
pub async fn list<S: Store>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Data<Listing>>, ApiError> {
  let users = state.users();
  let listing = match params.username.as_deref().filter(|u| !u.trim().is_empty()) {
    Some(username) => Listing::One(users.by_username(username).await?),
    None if params.all => Listing::Many(users.all().await?),
    None => {
      let criteria = UserCriteria::new(Page::new(params.page, params.per_page), params.q);
      Listing::Many(users.find(&criteria).await?)
    }
  };
  Ok(data(listing))
}

// ─── Single user ──────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<S: Store>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Data<UserProfile>>, ApiError> {
  Ok(data(state.users().get(id).await?))
}

/// `PUT /users/:id`
pub async fn create<S: Store>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UserCommand>,
) -> Result<impl IntoResponse, ApiError> {
  let profile = state.users().create(id, body).await?;
  tracing::info!(user_id = %profile.id, username = %profile.username, "user registered");
  Ok((StatusCode::CREATED, data(profile)))
}

/// `PATCH /users/:id`
pub async fn update<S: Store>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<UserPatch>,
) -> Result<impl IntoResponse, ApiError> {
  if auth.user_id != id {
    return Err(ApiError::Forbidden);
  }
  let profile = state.users().update(id, body).await?;
  tracing::info!(user_id = %id, "user updated");
  Ok(data(profile))
}

/// `DELETE /users/:id`
pub async fn delete<S: Store>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  if auth.user_id != id && !auth.is_staff() {
    return Err(ApiError::Forbidden);
  }
  state.users().delete(id).await?;
  tracing::info!(user_id = %id, by = %auth.user_id, "user deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Interests ────────────────────────────────────────────────────────────────

/// `GET /users/:id/interests`
pub async fn interests<S: Store>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Data<InterestBuckets>>, ApiError> {
  let profile = state.users().get(id).await?;
  let buckets =
    view::classify_interests(&state.books(), &state.reviews(), &profile.interests).await?;
  Ok(data(buckets))
}

/// `PATCH /user/interests/:book_id`
pub async fn set_interest<S: Store>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path(book_id): Path<Uuid>,
  Json(body): Json<InterestCommand>,
) -> Result<impl IntoResponse, ApiError> {
  state.books().get(book_id).await?;
  let profile = state.users().set_interest(auth.user_id, book_id, body.status).await?;
  tracing::info!(user_id = %auth.user_id, book_id = %book_id, status = %body.status, "interest set");
  Ok(data(profile))
}

/// `DELETE /user/interests/:book_id`
pub async fn remove_interest<S: Store>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path(book_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  state.books().get(book_id).await?;
  let profile = state.users().remove_interest(auth.user_id, book_id).await?;
  tracing::info!(user_id = %auth.user_id, book_id = %book_id, "interest removed");
  Ok(data(profile))
}

// ─── Sign-in ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub data:   UserProfile,
  pub tokens: TokenPair,
}

/// `POST /login`
pub async fn login<S: Store>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginCommand>,
) -> Result<Json<LoginResponse>, ApiError> {
  let profile = state.users().login(body).await?;
  let tokens = state.tokens.issue(profile.id, profile.role)?;
  tracing::info!(user_id = %profile.id, "user logged in");
  Ok(Json(LoginResponse { data: profile, tokens }))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
  pub refresh_token: String,
}

/// `POST /token/refresh`
///
/// The new pair carries the user's current role, not the one in the old
/// token.
pub async fn refresh<S: Store>(
  State(state): State<AppState<S>>,
  Json(body): Json<RefreshRequest>,
) -> Result<Json<Data<TokenPair>>, ApiError> {
  let claims = state.tokens.verify(&body.refresh_token, TokenKind::Refresh)?;
  let profile = state.users().get(claims.sub).await.map_err(|e| match e {
    shelf_core::Error::NotFound(_) => ApiError::Unauthorized("unknown user".to_owned()),
    e => e.into(),
  })?;
  Ok(data(state.tokens.issue(profile.id, profile.role)?))
}
