//! JSON REST API for Shelf.
//!
//! Exposes an axum [`Router`] backed by any [`shelf_core::store::Store`].
//! Successful responses are wrapped as `{"data": …}`; failures as
//! `{"error": "…"}`. TLS and middleware layers are the caller's
//! responsibility.

pub mod auth;
pub mod books;
pub mod error;
pub mod follows;
pub mod password;
pub mod reviews;
pub mod users;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, patch, post, put},
};
use serde::Serialize;
use serde_json::{Value, json};
use shelf_core::{
  service::{BookService, FollowService, ReviewService, UserService},
  store::Store,
};

pub use auth::{TokenConfig, TokenIssuer};
pub use error::ApiError;
pub use password::Argon2Passwords;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: Store> {
  pub store:     Arc<S>,
  pub tokens:    Arc<TokenIssuer>,
  pub passwords: Arc<Argon2Passwords>,
}

impl<S: Store> AppState<S> {
  pub fn new(store: S, tokens: TokenIssuer) -> Self {
    Self {
      store:     Arc::new(store),
      tokens:    Arc::new(tokens),
      passwords: Arc::new(Argon2Passwords::default()),
    }
  }

  pub fn books(&self) -> BookService<S> { BookService::new(self.store.clone()) }

  pub fn reviews(&self) -> ReviewService<S, S> {
    ReviewService::new(self.store.clone(), self.store.clone())
  }

  pub fn users(&self) -> UserService<S, Argon2Passwords> {
    UserService::new(self.store.clone(), self.passwords.clone())
  }

  pub fn follows(&self) -> FollowService<S, S> {
    FollowService::new(self.store.clone(), self.store.clone())
  }
}

// ─── Envelope ────────────────────────────────────────────────────────────────

/// The `{"data": …}` success envelope.
#[derive(Debug, Serialize)]
pub struct Data<T> {
  pub data: T,
}

pub fn data<T: Serialize>(data: T) -> Json<Data<T>> { Json(Data { data }) }

// ─── Router ──────────────────────────────────────────────────────────────────

/// `GET /health-check`
pub async fn health_check() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// Build the API router for `state`.
pub fn router<S: Store>(state: AppState<S>) -> Router {
  Router::new()
    .route("/health-check", get(health_check))
    // Books
    .route("/books", get(books::list::<S>))
    .route(
      "/books/{id}",
      get(books::get_one::<S>)
        .put(books::create::<S>)
        .patch(books::update::<S>)
        .delete(books::delete::<S>),
    )
    // Reviews
    .route("/books/{id}/reviews", get(reviews::for_book::<S>))
    .route("/books/{id}/reviews/{review_id}", put(reviews::create::<S>))
    .route(
      "/book/reviews/{review_id}",
      get(reviews::get_one::<S>)
        .patch(reviews::update::<S>)
        .delete(reviews::delete::<S>),
    )
    .route("/reviews/ranking", get(reviews::ranking::<S>))
    // Users
    .route("/users", get(users::list::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>)
        .put(users::create::<S>)
        .patch(users::update::<S>)
        .delete(users::delete::<S>),
    )
    .route("/users/{id}/interests", get(users::interests::<S>))
    .route(
      "/user/interests/{book_id}",
      patch(users::set_interest::<S>).delete(users::remove_interest::<S>),
    )
    .route("/login", post(users::login::<S>))
    .route("/token/refresh", post(users::refresh::<S>))
    // Follows
    .route("/users/{id}/followers", get(follows::followers::<S>))
    .route("/users/{id}/following", get(follows::following::<S>))
    .route("/user/follow/{id}", post(follows::follow::<S>))
    .route("/user/unfollow/{id}", post(follows::unfollow::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
