//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use shelf_core::Error as CoreError;
use thiserror::Error;

/// Body text for every 500; details only go to the log.
pub const INTERNAL_MESSAGE: &str = "Something wrong happened, try again later";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  /// Missing, malformed or expired credentials, or an ownership failure.
  #[error("{0}")]
  Unauthorized(String),

  /// Authenticated, but the role or identity does not allow this.
  #[error("forbidden")]
  Forbidden,

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn internal<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Internal(Box::new(e))
  }
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    let message = e.to_string();
    match e {
      CoreError::NotFound(_) => Self::NotFound(message),
      CoreError::DuplicateId(_)
      | CoreError::DuplicateUsername
      | CoreError::DuplicateEmail
      | CoreError::Validation(_) => Self::BadRequest(message),
      CoreError::Unauthorized | CoreError::InvalidCredentials => Self::Unauthorized(message),
      e @ (CoreError::Password(_) | CoreError::Store(_)) => Self::internal(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use shelf_core::Resource;

  #[test]
  fn core_errors_map_to_statuses() {
    let cases = [
      (CoreError::NotFound(Resource::Book), StatusCode::NOT_FOUND),
      (CoreError::DuplicateEmail, StatusCode::BAD_REQUEST),
      (CoreError::DuplicateId(Resource::User), StatusCode::BAD_REQUEST),
      (CoreError::Unauthorized, StatusCode::UNAUTHORIZED),
      (CoreError::InvalidCredentials, StatusCode::UNAUTHORIZED),
      (CoreError::Store("disk full".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (core, status) in cases {
      assert_eq!(ApiError::from(core).into_response().status(), status);
    }
  }
}
