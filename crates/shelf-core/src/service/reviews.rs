use std::sync::Arc;

use uuid::Uuid;
use validator::Validate as _;

use crate::{
  Error, Resource, Result,
  book::Book,
  criteria::RankingCriteria,
  crud::Crud,
  rating::{self, RATING_UNIT, RatingSummary},
  review::{BookReview, ReviewCommand, ReviewPatch},
  store::{Repository, ReviewRepository},
  view::RatingLookup,
};

/// Reviews, plus the rating figures derived from them.
pub struct ReviewService<R, B> {
  reviews: Crud<R, BookReview>,
  books:   Crud<B, Book>,
}

impl<R, B> Clone for ReviewService<R, B> {
  fn clone(&self) -> Self {
    Self { reviews: self.reviews.clone(), books: self.books.clone() }
  }
}

impl<R, B> ReviewService<R, B>
where
  R: ReviewRepository,
  B: Repository<Book>,
{
  pub fn new(reviews: Arc<R>, books: Arc<B>) -> Self {
    Self { reviews: Crud::new(reviews), books: Crud::new(books) }
  }

  async fn require_book(&self, book_id: Uuid) -> Result<()> {
    if self.books.exists(book_id).await? {
      Ok(())
    } else {
      Err(Error::NotFound(Resource::Book))
    }
  }

  /// Review `book_id` as `user_id`. The book has to exist.
  pub async fn create(
    &self,
    id: Uuid,
    book_id: Uuid,
    user_id: Uuid,
    command: ReviewCommand,
  ) -> Result<BookReview> {
    command.validate()?;
    self.require_book(book_id).await?;
    self.reviews.create(BookReview::new(id, book_id, user_id, command)).await
  }

  /// Edit a review's text. Only its author may do so.
  pub async fn update(&self, id: Uuid, user_id: Uuid, patch: ReviewPatch) -> Result<BookReview> {
    patch.validate()?;
    self
      .reviews
      .update_guarded(id, patch, |review| {
        if review.user_id == user_id {
          Ok(())
        } else {
          Err(Error::Unauthorized)
        }
      })
      .await
  }

  pub async fn delete(&self, id: Uuid) -> Result<()> { self.reviews.delete(id).await }

  pub async fn get(&self, id: Uuid) -> Result<BookReview> { self.reviews.get(id).await }

  pub async fn for_book(&self, book_id: Uuid) -> Result<Vec<BookReview>> {
    self.require_book(book_id).await?;
    self.reviews.repo().reviews_for_book(book_id).await.map_err(Error::store)
  }

  /// Top (or bottom) rated books, averages rounded to half units.
  pub async fn ranking(&self, criteria: RankingCriteria) -> Result<Vec<RatingSummary>> {
    let mut ranked = self.reviews.repo().rank_books(criteria).await.map_err(Error::store)?;
    for summary in &mut ranked {
      summary.rating = rating::round_to_unit(summary.rating, RATING_UNIT);
    }
    Ok(ranked)
  }

  /// Rounded average rating of a book; 0 when it has no reviews.
  pub async fn book_rating(&self, book_id: Uuid) -> Result<f64> {
    let reviews = self.reviews.repo().reviews_for_book(book_id).await.map_err(Error::store)?;
    Ok(rating::average_rating(reviews.iter().map(|r| r.rating)))
  }
}

impl<R, B> RatingLookup for ReviewService<R, B>
where
  R: ReviewRepository,
  B: Repository<Book>,
{
  async fn rating(&self, book_id: Uuid) -> Result<f64> { self.book_rating(book_id).await }
}
