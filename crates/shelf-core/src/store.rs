//! Repository traits.
//!
//! Every record family is persisted through a generic [`Repository`] plus an
//! extension trait for its family-specific queries. Backends implement them
//! all (see [`crate::memory::MemoryStore`] and `shelf-store-sqlite`); services
//! depend on the narrowest trait they need.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Resource,
  book::Book,
  criteria::{BookCriteria, RankingCriteria, UserCriteria},
  follow::UserFollow,
  rating::RatingSummary,
  review::BookReview,
  user::{InterestStatus, Role, User},
};

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A record with a caller-supplied UUID primary key.
pub trait Entity: Clone + Send + Sync + 'static {
  /// Which resource this is, for not-found and duplicate-id errors.
  const RESOURCE: Resource;

  fn id(&self) -> Uuid;
}

// ─── Backend ─────────────────────────────────────────────────────────────────

/// Anything that can fail the way a storage backend fails.
///
/// Split out from [`Repository`] so a backend implementing several
/// repositories has exactly one error type.
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Generic repository ──────────────────────────────────────────────────────

/// Keyed storage for one entity type.
///
/// Implementations report absence through `Option`/`bool`; turning that into
/// a business error is the service's job.
pub trait Repository<E: Entity>: Backend {
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<E>, Self::Error>> + Send + '_;

  /// Persist a new record. The caller has already checked the id is free.
  fn insert(
    &self,
    entity: E,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Overwrite an existing record in full.
  fn replace(
    &self,
    entity: E,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a record; returns `false` if nothing was there.
  fn remove(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Family extensions ───────────────────────────────────────────────────────

pub trait BookRepository: Repository<Book> {
  /// Filtered, paginated listing ordered by creation time.
  fn list_books<'a>(
    &'a self,
    criteria: &'a BookCriteria,
  ) -> impl Future<Output = Result<Vec<Book>, Self::Error>> + Send + 'a;

  /// Every book, unpaginated.
  fn all_books(
    &self,
  ) -> impl Future<Output = Result<Vec<Book>, Self::Error>> + Send + '_;
}

pub trait ReviewRepository: Repository<BookReview> {
  fn reviews_for_book(
    &self,
    book_id: Uuid,
  ) -> impl Future<Output = Result<Vec<BookReview>, Self::Error>> + Send + '_;

  /// Group reviews by book, average and count them, sort by the average and
  /// keep the first `criteria.limit` groups. Averages are returned unrounded.
  fn rank_books(
    &self,
    criteria: RankingCriteria,
  ) -> impl Future<Output = Result<Vec<RatingSummary>, Self::Error>> + Send + '_;
}

pub trait UserRepository: Repository<User> {
  /// Exact match on the already-normalised email.
  fn user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Exact match on the already-normalised username.
  fn user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn list_users<'a>(
    &'a self,
    criteria: &'a UserCriteria,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;

  fn all_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Set (or overwrite) the status stored under `book_id`.
  fn set_interest(
    &self,
    user_id: Uuid,
    book_id: Uuid,
    status: InterestStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Drop the `book_id` key entirely.
  fn unset_interest(
    &self,
    user_id: Uuid,
    book_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn set_role(
    &self,
    user_id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Storage for the directed follow graph.
pub trait FollowRepository: Backend {
  fn follow(
    &self,
    edge: UserFollow,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove the first edge `from -> to`; returns `false` if there was none.
  fn unfollow(
    &self,
    from: Uuid,
    to: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn find_follow(
    &self,
    from: Uuid,
    to: Uuid,
  ) -> impl Future<Output = Result<Option<UserFollow>, Self::Error>> + Send + '_;

  /// Edges pointing at `user_id`.
  fn followers(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<UserFollow>, Self::Error>> + Send + '_;

  /// Edges leaving `user_id`.
  fn following(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<UserFollow>, Self::Error>> + Send + '_;
}

// ─── Umbrella ────────────────────────────────────────────────────────────────

/// A backend holding every record family; what the HTTP layer is generic over.
pub trait Store:
  BookRepository
  + ReviewRepository
  + UserRepository
  + FollowRepository
  + Clone
  + 'static
{
}

impl<T> Store for T where
  T: BookRepository
    + ReviewRepository
    + UserRepository
    + FollowRepository
    + Clone
    + 'static
{
}
