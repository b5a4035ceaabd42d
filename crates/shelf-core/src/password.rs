//! Password hashing seam.
//!
//! The core never sees a concrete algorithm; `shelf-api` supplies one.

use crate::Result;

pub trait PasswordScheme: Send + Sync {
  /// Produce a self-describing hash string for `plain`.
  fn hash(&self, plain: &str) -> Result<String>;

  /// Constant-time check of `plain` against a stored hash. Malformed hashes
  /// simply fail verification.
  fn verify(&self, plain: &str, hash: &str) -> bool;
}
