//! Error types for `shelf-core`.

use thiserror::Error;

/// The kind of record a lookup or uniqueness probe was about.
///
/// The display form doubles as the subject of user-facing messages, e.g.
/// `"book review not found"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Resource {
  #[strum(to_string = "book")]
  Book,
  #[strum(to_string = "book review")]
  Review,
  #[strum(to_string = "user")]
  User,
  #[strum(to_string = "email")]
  Email,
  #[strum(to_string = "username")]
  Username,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} not found")]
  NotFound(Resource),

  #[error("{0} id already exists")]
  DuplicateId(Resource),

  #[error("username already in use")]
  DuplicateUsername,

  #[error("email already in use")]
  DuplicateEmail,

  /// The caller is not allowed to touch the record (e.g. not its author).
  #[error("unauthorized")]
  Unauthorized,

  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("validation failed: {0}")]
  Validation(#[from] validator::ValidationErrors),

  #[error("password hashing failed: {0}")]
  Password(String),

  /// A repository failure, passed through unchanged.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages_name_the_resource() {
    assert_eq!(Error::NotFound(Resource::Review).to_string(), "book review not found");
    assert_eq!(Error::NotFound(Resource::Email).to_string(), "email not found");
    assert_eq!(Error::DuplicateId(Resource::User).to_string(), "user id already exists");
  }
}
