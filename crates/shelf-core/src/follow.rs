//! Directed follow edges between users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `from` follows `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFollow {
  pub from:       Uuid,
  pub to:         Uuid,
  pub created_on: DateTime<Utc>,
}

impl UserFollow {
  pub fn new(from: Uuid, to: Uuid) -> Self {
    Self { from, to, created_on: Utc::now() }
  }
}
