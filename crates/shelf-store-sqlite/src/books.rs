//! `books` table: [`Repository<Book>`] and [`BookRepository`].

use rusqlite::OptionalExtension as _;
use shelf_core::{
  book::Book,
  criteria::BookCriteria,
  store::{BookRepository, Repository},
};
use uuid::Uuid;

use crate::{
  Error, Result, SqliteStore,
  encode::{BOOK_COLUMNS, RawBook, encode_dt, encode_uuid},
};

impl Repository<Book> for SqliteStore {
  async fn get(&self, id: Uuid) -> Result<Option<Book>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE book_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawBook::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawBook::into_book).transpose()
  }

  async fn insert(&self, book: Book) -> Result<()> {
    let id_str = encode_uuid(book.id);
    let at_str = encode_dt(book.created_on);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO books (
             book_id, title, description, author, genre, pages, created_on
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            book.title,
            book.description,
            book.author,
            book.genre,
            book.pages,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn replace(&self, book: Book) -> Result<()> {
    let id = book.id;
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE books
           SET title = ?2, description = ?3, author = ?4, genre = ?5, pages = ?6
           WHERE book_id = ?1",
          rusqlite::params![
            id_str,
            book.title,
            book.description,
            book.author,
            book.genre,
            book.pages,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::MissingRow { table: "books", id });
    }
    Ok(())
  }

  async fn remove(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM books WHERE book_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(changed > 0)
  }
}

impl BookRepository for SqliteStore {
  async fn list_books(&self, criteria: &BookCriteria) -> Result<Vec<Book>> {
    let query      = criteria.query.clone();
    let genre      = criteria.genre.clone();
    let author     = criteria.author.clone();
    let limit_val  = i64::from(criteria.page.per_page());
    let offset_val = i64::try_from(criteria.page.offset()).unwrap_or(i64::MAX);

    let raws: Vec<RawBook> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {BOOK_COLUMNS} FROM books
           WHERE (?1 IS NULL
                  OR instr(fold(title),  fold(?1)) > 0
                  OR instr(fold(author), fold(?1)) > 0
                  OR instr(fold(genre),  fold(?1)) > 0)
             AND (?2 IS NULL OR instr(fold(genre),  fold(?2)) > 0)
             AND (?3 IS NULL OR instr(fold(author), fold(?3)) > 0)
           ORDER BY created_on, book_id
           LIMIT ?4 OFFSET ?5"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              query.as_deref(),
              genre.as_deref(),
              author.as_deref(),
              limit_val,
              offset_val,
            ],
            RawBook::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBook::into_book).collect()
  }

  async fn all_books(&self) -> Result<Vec<Book>> {
    let raws: Vec<RawBook> = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY created_on, book_id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawBook::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBook::into_book).collect()
  }
}
