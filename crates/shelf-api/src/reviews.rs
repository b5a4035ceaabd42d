//! Handlers for book review endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/books/:id/reviews` | Reviews of a book, with reviewer names |
//! | `PUT`    | `/books/:id/reviews/:review_id` | Caller becomes the author |
//! | `GET`    | `/book/reviews/:review_id` | |
//! | `PATCH`  | `/book/reviews/:review_id` | Author only; text only |
//! | `DELETE` | `/book/reviews/:review_id` | Staff only |
//! | `GET`    | `/reviews/ranking` | `?order=asc\|desc` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use shelf_core::{
  criteria::{RankingCriteria, SortOrder},
  rating::RatingSummary,
  review::{ReviewCommand, ReviewPatch},
  store::Store,
  view::{self, ReviewView},
};
use uuid::Uuid;

use crate::{
  AppState, Data,
  auth::{Authenticated, Staff},
  data,
  error::ApiError,
};

/// `GET /books/:id/reviews`
pub async fn for_book<S: Store>(
  State(state): State<AppState<S>>,
  Path(book_id): Path<Uuid>,
) -> Result<Json<Data<Vec<ReviewView>>>, ApiError> {
  let reviews = state.reviews().for_book(book_id).await?;
  Ok(data(view::review_views(&state.users(), reviews).await?))
}

/// `PUT /books/:id/reviews/:review_id`
pub async fn create<S: Store>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path((book_id, review_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<ReviewCommand>,
) -> Result<impl IntoResponse, ApiError> {
  let review = state.reviews().create(review_id, book_id, auth.user_id, body).await?;
  tracing::info!(review_id = %review.id, book_id = %book_id, user_id = %auth.user_id, "review created");
  Ok((StatusCode::CREATED, data(review)))
}

/// `GET /book/reviews/:review_id`
pub async fn get_one<S: Store>(
  State(state): State<AppState<S>>,
  Path(review_id): Path<Uuid>,
) -> Result<Json<Data<ReviewView>>, ApiError> {
  let review = state.reviews().get(review_id).await?;
  Ok(data(view::review_view(&state.users(), review).await?))
}

/// `PATCH /book/reviews/:review_id`
pub async fn update<S: Store>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path(review_id): Path<Uuid>,
  Json(body): Json<ReviewPatch>,
) -> Result<impl IntoResponse, ApiError> {
  let review = state.reviews().update(review_id, auth.user_id, body).await?;
  tracing::info!(review_id = %review_id, user_id = %auth.user_id, "review updated");
  Ok(data(review))
}

/// `DELETE /book/reviews/:review_id`
pub async fn delete<S: Store>(
  State(state): State<AppState<S>>,
  Staff(auth): Staff,
  Path(review_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.reviews().delete(review_id).await?;
  tracing::info!(review_id = %review_id, staff_id = %auth.user_id, "review deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Ranking ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RankingParams {
  #[serde(default)]
  pub order: SortOrder,
}

/// `GET /reviews/ranking[?order=asc|desc]`
pub async fn ranking<S: Store>(
  State(state): State<AppState<S>>,
  Query(params): Query<RankingParams>,
) -> Result<Json<Data<Vec<RatingSummary>>>, ApiError> {
  let ranking = state.reviews().ranking(RankingCriteria::new(params.order)).await?;
  Ok(data(ranking))
}
