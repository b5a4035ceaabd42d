//! Handlers for the follow graph.

use axum::{
  Json,
  extract::{Path, State},
};
use shelf_core::{
  follow::UserFollow,
  store::Store,
  view::{self, Counterpart, FollowView},
};
use uuid::Uuid;

use crate::{AppState, Data, auth::Authenticated, data, error::ApiError};

/// `GET /users/:id/followers`
pub async fn followers<S: Store>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Data<Vec<FollowView>>>, ApiError> {
  let edges = state.follows().followers(id).await?;
  Ok(data(view::follow_views(&state.users(), edges, Counterpart::Follower).await?))
}

/// `GET /users/:id/following`
pub async fn following<S: Store>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Data<Vec<FollowView>>>, ApiError> {
  let edges = state.follows().following(id).await?;
  Ok(data(view::follow_views(&state.users(), edges, Counterpart::Followed).await?))
}

fn not_self(auth: &Authenticated, target: Uuid) -> Result<(), ApiError> {
  if auth.user_id == target {
    return Err(ApiError::BadRequest("users cannot follow themselves".to_owned()));
  }
  Ok(())
}

/// `POST /user/follow/:id`
pub async fn follow<S: Store>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path(target): Path<Uuid>,
) -> Result<Json<Data<UserFollow>>, ApiError> {
  not_self(&auth, target)?;
  let edge = state.follows().follow(auth.user_id, target).await?;
  tracing::info!(from = %auth.user_id, to = %target, "followed");
  Ok(data(edge))
}

/// `POST /user/unfollow/:id`
pub async fn unfollow<S: Store>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path(target): Path<Uuid>,
) -> Result<Json<Data<&'static str>>, ApiError> {
  not_self(&auth, target)?;
  state.follows().unfollow(auth.user_id, target).await?;
  tracing::info!(from = %auth.user_id, to = %target, "unfollowed");
  Ok(data("unfollowed"))
}
