//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (nanosecond
//! precision, `Z` suffix) so that text order is time order. UUIDs are stored
//! as hyphenated lowercase strings; interests as a compact JSON object.

use chrono::{DateTime, SecondsFormat, Utc};
use shelf_core::{
  book::Book,
  follow::UserFollow,
  review::BookReview,
  user::{Interests, Role, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Nanos, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> String { role.to_string() }

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse().map_err(|_| Error::UnknownVariant { kind: "role", value: s.to_owned() })
}

// ─── Interests ───────────────────────────────────────────────────────────────

pub fn encode_interests(interests: &Interests) -> Result<String> {
  Ok(serde_json::to_string(interests)?)
}

pub fn decode_interests(s: &str) -> Result<Interests> { Ok(serde_json::from_str(s)?) }

/// JSON path of one book's entry inside the `interests` column.
pub fn interest_path(book_id: Uuid) -> String { format!("$.\"{}\"", encode_uuid(book_id)) }

// ─── Row types ───────────────────────────────────────────────────────────────

pub const BOOK_COLUMNS: &str = "book_id, title, description, author, genre, pages, created_on";

/// Raw values read directly from a `books` row.
pub struct RawBook {
  pub book_id:     String,
  pub title:       String,
  pub description: String,
  pub author:      String,
  pub genre:       String,
  pub pages:       u32,
  pub created_on:  String,
}

impl RawBook {
  /// Read a row selected with [`BOOK_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      book_id:     row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      author:      row.get(3)?,
      genre:       row.get(4)?,
      pages:       row.get(5)?,
      created_on:  row.get(6)?,
    })
  }

  pub fn into_book(self) -> Result<Book> {
    Ok(Book {
      id:          decode_uuid(&self.book_id)?,
      title:       self.title,
      description: self.description,
      author:      self.author,
      genre:       self.genre,
      pages:       self.pages,
      created_on:  decode_dt(&self.created_on)?,
    })
  }
}

pub const REVIEW_COLUMNS: &str = "review_id, book_id, user_id, text, rating, created_on";

/// Raw values read directly from a `reviews` row.
pub struct RawReview {
  pub review_id:  String,
  pub book_id:    String,
  pub user_id:    String,
  pub text:       String,
  pub rating:     f64,
  pub created_on: String,
}

impl RawReview {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      review_id:  row.get(0)?,
      book_id:    row.get(1)?,
      user_id:    row.get(2)?,
      text:       row.get(3)?,
      rating:     row.get(4)?,
      created_on: row.get(5)?,
    })
  }

  pub fn into_review(self) -> Result<BookReview> {
    Ok(BookReview {
      id:         decode_uuid(&self.review_id)?,
      text:       self.text,
      rating:     self.rating,
      book_id:    decode_uuid(&self.book_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      created_on: decode_dt(&self.created_on)?,
    })
  }
}

pub const USER_COLUMNS: &str =
  "user_id, name, username, email, password_hash, role, interests, created_on";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub name:          String,
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub role:          String,
  pub interests:     String,
  pub created_on:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      name:          row.get(1)?,
      username:      row.get(2)?,
      email:         row.get(3)?,
      password_hash: row.get(4)?,
      role:          row.get(5)?,
      interests:     row.get(6)?,
      created_on:    row.get(7)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            decode_uuid(&self.user_id)?,
      name:          self.name,
      username:      self.username,
      email:         self.email,
      password_hash: self.password_hash,
      role:          decode_role(&self.role)?,
      interests:     decode_interests(&self.interests)?,
      created_on:    decode_dt(&self.created_on)?,
    })
  }
}

/// Raw values read directly from a `follows` row.
pub struct RawFollow {
  pub from_user:  String,
  pub to_user:    String,
  pub created_on: String,
}

impl RawFollow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { from_user: row.get(0)?, to_user: row.get(1)?, created_on: row.get(2)? })
  }

  pub fn into_follow(self) -> Result<UserFollow> {
    Ok(UserFollow {
      from:       decode_uuid(&self.from_user)?,
      to:         decode_uuid(&self.to_user)?,
      created_on: decode_dt(&self.created_on)?,
    })
  }
}
