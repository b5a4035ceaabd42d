//! Book reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{Resource, crud::Patch, store::Entity};

/// A user's rated review of a book.
///
/// `rating`, `book_id` and `user_id` are fixed at creation; only `text` can
/// be patched afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookReview {
  pub id:         Uuid,
  pub text:       String,
  pub rating:     f64,
  pub book_id:    Uuid,
  pub user_id:    Uuid,
  pub created_on: DateTime<Utc>,
}

impl BookReview {
  pub fn new(id: Uuid, book_id: Uuid, user_id: Uuid, command: ReviewCommand) -> Self {
    Self {
      id,
      text: command.text,
      rating: command.rating,
      book_id,
      user_id,
      created_on: Utc::now(),
    }
  }
}

impl Entity for BookReview {
  const RESOURCE: Resource = Resource::Review;

  fn id(&self) -> Uuid { self.id }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewCommand {
  #[validate(length(min = 1, max = 250))]
  pub text:   String,
  #[validate(range(min = 0.5, max = 5.0))]
  pub rating: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReviewPatch {
  #[validate(length(min = 1, max = 250))]
  pub text: Option<String>,
}

impl Patch<BookReview> for ReviewPatch {
  fn apply(self, review: &mut BookReview) {
    if let Some(text) = self.text {
      review.text = text;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rating_bounds() {
    let ok = ReviewCommand { text: "fine".into(), rating: 0.5 };
    assert!(ok.validate().is_ok());

    let low = ReviewCommand { text: "meh".into(), rating: 0.0 };
    assert!(low.validate().is_err());

    let high = ReviewCommand { text: "wow".into(), rating: 5.5 };
    assert!(high.validate().is_err());
  }

  #[test]
  fn empty_text_is_rejected() {
    let cmd = ReviewCommand { text: String::new(), rating: 3.0 };
    assert!(cmd.validate().is_err());
  }
}
