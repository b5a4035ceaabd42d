//! Handlers for `/books` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/books` | `?page`, `per_page`, `q`, `genre`, `author`; `all=true` skips paging |
//! | `GET`    | `/books/:id` | Book with its rating |
//! | `PUT`    | `/books/:id` | Staff only; body: [`BookCommand`] |
//! | `PATCH`  | `/books/:id` | Staff only; body: [`BookPatch`] |
//! | `DELETE` | `/books/:id` | Staff only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use shelf_core::{
  book::{BookCommand, BookPatch},
  criteria::{BookCriteria, Page},
  store::Store,
  view::{self, BookView},
};
use uuid::Uuid;

use crate::{AppState, Data, auth::Staff, data, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub page:     Option<u32>,
  pub per_page: Option<u32>,
  /// Free text matched against title, author and genre.
  pub q:        Option<String>,
  pub genre:    Option<String>,
  pub author:   Option<String>,
  /// Return every book, ignoring paging and filters.
  #[serde(default)]
  pub all:      bool,
}

/// `GET /books[?page=..&per_page=..&q=..&genre=..&author=..][&all=true]`
pub async fn list<S: Store>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Data<Vec<BookView>>>, ApiError> {
  let books = state.books();
  let found = if params.all {
    books.all().await?
  } else {
    let criteria = BookCriteria::new(
      Page::new(params.page, params.per_page),
      params.q,
      params.genre,
      params.author,
    );
    books.find(&criteria).await?
  };
  Ok(data(view::book_views(&state.reviews(), found).await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /books/:id`
pub async fn get_one<S: Store>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Data<BookView>>, ApiError> {
  let book = state.books().get(id).await?;
  Ok(data(view::book_view(&state.reviews(), book).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `PUT /books/:id`
pub async fn create<S: Store>(
  State(state): State<AppState<S>>,
  Staff(auth): Staff,
  Path(id): Path<Uuid>,
  Json(body): Json<BookCommand>,
) -> Result<impl IntoResponse, ApiError> {
  let book = state.books().create(id, body).await?;
  tracing::info!(book_id = %book.id, staff_id = %auth.user_id, "book created");
  Ok((StatusCode::CREATED, data(book)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /books/:id`
pub async fn update<S: Store>(
  State(state): State<AppState<S>>,
  Staff(auth): Staff,
  Path(id): Path<Uuid>,
  Json(body): Json<BookPatch>,
) -> Result<impl IntoResponse, ApiError> {
  let book = state.books().update(id, body).await?;
  tracing::info!(book_id = %id, staff_id = %auth.user_id, "book updated");
  Ok(data(book))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /books/:id`
pub async fn delete<S: Store>(
  State(state): State<AppState<S>>,
  Staff(auth): Staff,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.books().delete(id).await?;
  tracing::info!(book_id = %id, staff_id = %auth.user_id, "book deleted");
  Ok(StatusCode::NO_CONTENT)
}
