//! Users, their roles and their reading interests.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{Resource, crud::Patch, store::Entity};

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  #[default]
  Default,
  /// May manage books and delete reviews.
  Staff,
}

/// Where a user is with a book they are interested in.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InterestStatus {
  Pending,
  Reading,
  Done,
}

/// Reading interests keyed by book id.
pub type Interests = BTreeMap<Uuid, InterestStatus>;

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A registered user. Never serialised directly; see [`UserProfile`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
  pub id:            Uuid,
  pub name:          String,
  /// Trimmed and lower-cased; unique.
  pub username:      String,
  /// Trimmed and lower-cased; unique.
  pub email:         String,
  /// PHC string from the configured password scheme.
  pub password_hash: String,
  pub role:          Role,
  pub interests:     Interests,
  pub created_on:    DateTime<Utc>,
}

/// Canonical form of usernames and emails.
pub fn normalize(value: &str) -> String { value.trim().to_lowercase() }

/// Usernames are stored normalised, so whitespace alone would store `""`.
fn not_blank(value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(ValidationError::new("blank"));
  }
  Ok(())
}

impl User {
  pub fn new(id: Uuid, command: UserCommand, password_hash: String) -> Self {
    Self {
      id,
      name: command.name,
      username: normalize(&command.username),
      email: normalize(&command.email),
      password_hash,
      role: Role::default(),
      interests: Interests::new(),
      created_on: Utc::now(),
    }
  }

  pub fn profile(&self) -> UserProfile {
    UserProfile {
      id:         self.id,
      name:       self.name.clone(),
      username:   self.username.clone(),
      email:      self.email.clone(),
      role:       self.role,
      interests:  self.interests.clone(),
      created_on: self.created_on,
    }
  }
}

impl Entity for User {
  const RESOURCE: Resource = Resource::User;

  fn id(&self) -> Uuid { self.id }
}

/// The public projection of a [`User`]: everything but the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
  pub id:         Uuid,
  pub name:       String,
  pub username:   String,
  pub email:      String,
  pub role:       Role,
  pub interests:  Interests,
  pub created_on: DateTime<Utc>,
}

// ─── Commands ────────────────────────────────────────────────────────────────

/// Registration body. Holds the plaintext password only until it is hashed.
#[derive(Clone, Deserialize, Validate)]
pub struct UserCommand {
  #[validate(length(min = 1, max = 45))]
  pub name:     String,
  #[validate(length(min = 1, max = 45), custom(function = "not_blank"))]
  pub username: String,
  #[validate(email)]
  pub email:    String,
  #[validate(length(min = 8, max = 64))]
  pub password: String,
}

/// Profile merge-patch; email and password cannot be changed this way.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserPatch {
  #[validate(length(min = 1, max = 45))]
  pub name:     Option<String>,
  #[validate(length(min = 1, max = 45), custom(function = "not_blank"))]
  pub username: Option<String>,
}

impl Patch<User> for UserPatch {
  fn apply(self, user: &mut User) {
    if let Some(name) = self.name {
      user.name = name;
    }
    if let Some(username) = self.username {
      user.username = normalize(&username);
    }
  }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InterestCommand {
  pub status: InterestStatus,
}

#[derive(Clone, Deserialize)]
pub struct LoginCommand {
  pub email:    String,
  pub password: String,
}
