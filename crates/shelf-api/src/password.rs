//! Argon2id implementation of [`PasswordScheme`].

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;
use shelf_core::{Error, Result, password::PasswordScheme};

/// Hashes to PHC strings (`$argon2id$v=19$…`) with a fresh random salt.
#[derive(Default)]
pub struct Argon2Passwords {
  argon2: Argon2<'static>,
}

impl PasswordScheme for Argon2Passwords {
  fn hash(&self, plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    self
      .argon2
      .hash_password(plain.as_bytes(), &salt)
      .map(|hash| hash.to_string())
      .map_err(|e| Error::Password(e.to_string()))
  }

  fn verify(&self, plain: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
      .and_then(|parsed| self.argon2.verify_password(plain.as_bytes(), &parsed))
      .is_ok()
  }
}
