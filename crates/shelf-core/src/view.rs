//! Response shaping across record families.
//!
//! Each function here is an explicit join: it walks a list of records and
//! asks a lookup for the related record, one call per item. Lookups are
//! traits so the joins can be tested against fakes; the services implement
//! them.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  book::Book,
  follow::UserFollow,
  review::BookReview,
  user::{InterestStatus, Interests, UserProfile},
};

// ─── Lookups ─────────────────────────────────────────────────────────────────

pub trait BookLookup: Send + Sync {
  fn book(&self, id: Uuid) -> impl Future<Output = Result<Book>> + Send + '_;
}

pub trait RatingLookup: Send + Sync {
  fn rating(&self, book_id: Uuid) -> impl Future<Output = Result<f64>> + Send + '_;
}

pub trait ProfileLookup: Send + Sync {
  fn profile(&self, id: Uuid) -> impl Future<Output = Result<UserProfile>> + Send + '_;
}

/// `Ok(None)` for records that have disappeared; other errors propagate.
fn tolerate_missing<T>(result: Result<T>) -> Result<Option<T>> {
  match result {
    Ok(value) => Ok(Some(value)),
    Err(Error::NotFound(_)) => Ok(None),
    Err(e) => Err(e),
  }
}

// ─── Books ───────────────────────────────────────────────────────────────────

/// A book with its derived rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookView {
  #[serde(flatten)]
  pub book:   Book,
  pub rating: f64,
}

pub async fn book_view<R: RatingLookup>(ratings: &R, book: Book) -> Result<BookView> {
  let rating = ratings.rating(book.id).await?;
  Ok(BookView { book, rating })
}

pub async fn book_views<R: RatingLookup>(ratings: &R, books: Vec<Book>) -> Result<Vec<BookView>> {
  let mut views = Vec::with_capacity(books.len());
  for book in books {
    views.push(book_view(ratings, book).await?);
  }
  Ok(views)
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reviewer {
  pub id:       Uuid,
  pub name:     String,
  pub username: String,
}

/// A review with its author's public name attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewView {
  #[serde(flatten)]
  pub review:   BookReview,
  pub reviewer: Reviewer,
}

/// Attach the reviewer. A deleted author leaves the name fields blank.
pub async fn review_view<P: ProfileLookup>(profiles: &P, review: BookReview) -> Result<ReviewView> {
  let reviewer = match tolerate_missing(profiles.profile(review.user_id).await)? {
    Some(p) => Reviewer { id: p.id, name: p.name, username: p.username },
    None => Reviewer { id: review.user_id, name: String::new(), username: String::new() },
  };
  Ok(ReviewView { review, reviewer })
}

pub async fn review_views<P: ProfileLookup>(
  profiles: &P,
  reviews: Vec<BookReview>,
) -> Result<Vec<ReviewView>> {
  let mut views = Vec::with_capacity(reviews.len());
  for review in reviews {
    views.push(review_view(profiles, review).await?);
  }
  Ok(views)
}

// ─── Follows ─────────────────────────────────────────────────────────────────

/// Which end of an edge to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counterpart {
  /// The follower (`from`); used when listing someone's followers.
  Follower,
  /// The followed user (`to`); used when listing whom someone follows.
  Followed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowView {
  pub id:        Uuid,
  pub name:      String,
  pub username:  String,
  pub follow_at: DateTime<Utc>,
}

/// Describe the counterpart of each edge. Edges to deleted users are dropped.
pub async fn follow_views<P: ProfileLookup>(
  profiles: &P,
  edges: Vec<UserFollow>,
  side: Counterpart,
) -> Result<Vec<FollowView>> {
  let mut views = Vec::with_capacity(edges.len());
  for edge in edges {
    let id = match side {
      Counterpart::Follower => edge.from,
      Counterpart::Followed => edge.to,
    };
    if let Some(p) = tolerate_missing(profiles.profile(id).await)? {
      views.push(FollowView {
        id:        p.id,
        name:      p.name,
        username:  p.username,
        follow_at: edge.created_on,
      });
    }
  }
  Ok(views)
}

// ─── Interests ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestedBook {
  pub id:     Uuid,
  pub title:  String,
  pub author: String,
  pub rating: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterestBuckets {
  pub pending: Vec<InterestedBook>,
  pub reading: Vec<InterestedBook>,
  pub done:    Vec<InterestedBook>,
}

/// Partition a user's interests by status, describing each book.
///
/// Books that no longer exist are skipped silently.
pub async fn classify_interests<B, R>(
  books: &B,
  ratings: &R,
  interests: &Interests,
) -> Result<InterestBuckets>
where
  B: BookLookup,
  R: RatingLookup,
{
  let mut buckets = InterestBuckets::default();
  for (&book_id, &status) in interests {
    let Some(book) = tolerate_missing(books.book(book_id).await)? else {
      continue;
    };
    let rating = ratings.rating(book_id).await?;
    let entry = InterestedBook { id: book.id, title: book.title, author: book.author, rating };
    match status {
      InterestStatus::Pending => buckets.pending.push(entry),
      InterestStatus::Reading => buckets.reading.push(entry),
      InterestStatus::Done => buckets.done.push(entry),
    }
  }
  Ok(buckets)
}

#[cfg(test)]
mod tests {
  use std::{collections::HashMap, sync::Mutex};

  use super::*;
  use crate::{
    Resource,
    book::BookCommand,
    user::{Interests, Role},
  };

  struct FakeBooks(HashMap<Uuid, Book>);

  impl BookLookup for FakeBooks {
    async fn book(&self, id: Uuid) -> Result<Book> {
      self.0.get(&id).cloned().ok_or(Error::NotFound(Resource::Book))
    }
  }

  struct FixedRating(f64);

  impl RatingLookup for FixedRating {
    async fn rating(&self, _: Uuid) -> Result<f64> { Ok(self.0) }
  }

  /// Counts calls so the per-item fan-out is observable.
  struct FakeProfiles {
    known: HashMap<Uuid, UserProfile>,
    calls: Mutex<usize>,
  }

  impl ProfileLookup for FakeProfiles {
    async fn profile(&self, id: Uuid) -> Result<UserProfile> {
      *self.calls.lock().unwrap() += 1;
      self.known.get(&id).cloned().ok_or(Error::NotFound(Resource::User))
    }
  }

  struct BrokenProfiles;

  impl ProfileLookup for BrokenProfiles {
    async fn profile(&self, _: Uuid) -> Result<UserProfile> {
      Err(Error::Store("connection reset".into()))
    }
  }

  fn book(title: &str) -> Book {
    Book::new(Uuid::new_v4(), BookCommand {
      title:       title.into(),
      description: "d".into(),
      author:      "a".into(),
      genre:       "g".into(),
      pages:       10,
    })
  }

  fn profile(name: &str) -> UserProfile {
    UserProfile {
      id:         Uuid::new_v4(),
      name:       name.into(),
      username:   name.to_lowercase(),
      email:      format!("{}@example.com", name.to_lowercase()),
      role:       Role::Default,
      interests:  Interests::new(),
      created_on: Utc::now(),
    }
  }

  #[tokio::test]
  async fn interests_are_bucketed_and_missing_books_dropped() {
    let (kept, other) = (book("Kept"), book("Other"));
    let books = FakeBooks(HashMap::from([(kept.id, kept.clone()), (other.id, other.clone())]));

    let mut interests = Interests::new();
    interests.insert(kept.id, InterestStatus::Reading);
    interests.insert(other.id, InterestStatus::Done);
    interests.insert(Uuid::new_v4(), InterestStatus::Pending);

    let buckets = classify_interests(&books, &FixedRating(4.5), &interests).await.unwrap();
    assert!(buckets.pending.is_empty());
    assert_eq!(buckets.reading.len(), 1);
    assert_eq!(buckets.reading[0].title, "Kept");
    assert_eq!(buckets.reading[0].rating, 4.5);
    assert_eq!(buckets.done[0].id, other.id);
  }

  #[tokio::test]
  async fn follow_views_drop_deleted_users_and_call_once_per_edge() {
    let alice = profile("Alice");
    let bob = profile("Bob");
    let profiles = FakeProfiles {
      known: HashMap::from([(alice.id, alice.clone())]),
      calls: Mutex::new(0),
    };

    let edges = vec![UserFollow::new(alice.id, bob.id), UserFollow::new(Uuid::new_v4(), bob.id)];
    let views = follow_views(&profiles, edges, Counterpart::Follower).await.unwrap();

    assert_eq!(views.len(), 1);
    assert_eq!(views[0].username, "alice");
    assert_eq!(*profiles.calls.lock().unwrap(), 2);
  }

  #[tokio::test]
  async fn review_view_blanks_deleted_reviewer() {
    let profiles = FakeProfiles { known: HashMap::new(), calls: Mutex::new(0) };
    let review = BookReview::new(
      Uuid::new_v4(),
      Uuid::new_v4(),
      Uuid::new_v4(),
      crate::review::ReviewCommand { text: "ok".into(), rating: 3.0 },
    );
    let view = review_view(&profiles, review.clone()).await.unwrap();
    assert_eq!(view.reviewer.id, review.user_id);
    assert!(view.reviewer.name.is_empty());
  }

  #[tokio::test]
  async fn lookup_failures_propagate() {
    let edges = vec![UserFollow::new(Uuid::new_v4(), Uuid::new_v4())];
    let err = follow_views(&BrokenProfiles, edges, Counterpart::Followed).await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
  }
}
