use std::sync::Arc;

use uuid::Uuid;
use validator::Validate as _;

use crate::{
  Error, Result,
  book::{Book, BookCommand, BookPatch},
  criteria::BookCriteria,
  crud::Crud,
  store::BookRepository,
  view::BookLookup,
};

pub struct BookService<R> {
  books: Crud<R, Book>,
}

impl<R> Clone for BookService<R> {
  fn clone(&self) -> Self { Self { books: self.books.clone() } }
}

impl<R: BookRepository> BookService<R> {
  pub fn new(repo: Arc<R>) -> Self { Self { books: Crud::new(repo) } }

  /// Validate and persist a new book under the caller's id.
  pub async fn create(&self, id: Uuid, command: BookCommand) -> Result<Book> {
    command.validate()?;
    self.books.create(Book::new(id, command)).await
  }

  /// Merge-patch a book. Creation time is never touched.
  pub async fn update(&self, id: Uuid, patch: BookPatch) -> Result<Book> {
    patch.validate()?;
    self.books.update(id, patch).await
  }

  pub async fn delete(&self, id: Uuid) -> Result<()> { self.books.delete(id).await }

  pub async fn get(&self, id: Uuid) -> Result<Book> { self.books.get(id).await }

  pub async fn exists(&self, id: Uuid) -> Result<bool> { self.books.exists(id).await }

  pub async fn find(&self, criteria: &BookCriteria) -> Result<Vec<Book>> {
    self.books.repo().list_books(criteria).await.map_err(Error::store)
  }

  /// Every book, unpaginated.
  pub async fn all(&self) -> Result<Vec<Book>> {
    self.books.repo().all_books().await.map_err(Error::store)
  }
}

impl<R: BookRepository> BookLookup for BookService<R> {
  async fn book(&self, id: Uuid) -> Result<Book> { self.get(id).await }
}
