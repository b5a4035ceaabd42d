//! Books and the commands that create or patch them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{Resource, crud::Patch, store::Entity};

/// A catalogued book. The id is chosen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
  pub id:          Uuid,
  pub title:       String,
  pub description: String,
  pub author:      String,
  pub genre:       String,
  pub pages:       u32,
  pub created_on:  DateTime<Utc>,
}

impl Book {
  /// Build a book from an already-validated command, stamping the creation
  /// time.
  pub fn new(id: Uuid, command: BookCommand) -> Self {
    Self {
      id,
      title: command.title,
      description: command.description,
      author: command.author,
      genre: command.genre,
      pages: command.pages,
      created_on: Utc::now(),
    }
  }
}

impl Entity for Book {
  const RESOURCE: Resource = Resource::Book;

  fn id(&self) -> Uuid { self.id }
}

/// Body of a book creation request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookCommand {
  #[validate(length(min = 1, max = 75))]
  pub title:       String,
  #[validate(length(min = 1, max = 1500))]
  pub description: String,
  /// Optional; an empty author is accepted.
  #[serde(default)]
  #[validate(length(max = 75))]
  pub author:      String,
  #[validate(length(min = 1, max = 150))]
  pub genre:       String,
  #[validate(range(min = 1))]
  pub pages:       u32,
}

/// Body of a book merge-patch request.
///
/// A patch may set `pages` to 0; only creation requires at least one page.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BookPatch {
  #[validate(length(min = 1, max = 75))]
  pub title:       Option<String>,
  #[validate(length(min = 1, max = 1500))]
  pub description: Option<String>,
  #[validate(length(max = 75))]
  pub author:      Option<String>,
  #[validate(length(min = 1, max = 150))]
  pub genre:       Option<String>,
  pub pages:       Option<u32>,
}

impl Patch<Book> for BookPatch {
  fn apply(self, book: &mut Book) {
    if let Some(title) = self.title {
      book.title = title;
    }
    if let Some(description) = self.description {
      book.description = description;
    }
    if let Some(author) = self.author {
      book.author = author;
    }
    if let Some(genre) = self.genre {
      book.genre = genre;
    }
    if let Some(pages) = self.pages {
      book.pages = pages;
    }
  }
}
