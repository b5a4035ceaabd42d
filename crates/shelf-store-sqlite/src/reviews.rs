//! `reviews` table: [`Repository<BookReview>`] and [`ReviewRepository`],
//! including the grouped rating ranking.

use rusqlite::OptionalExtension as _;
use shelf_core::{
  criteria::RankingCriteria,
  rating::RatingSummary,
  review::BookReview,
  store::{Repository, ReviewRepository},
};
use uuid::Uuid;

use crate::{
  Error, Result, SqliteStore,
  encode::{REVIEW_COLUMNS, RawReview, decode_uuid, encode_dt, encode_uuid},
};

impl Repository<BookReview> for SqliteStore {
  async fn get(&self, id: Uuid) -> Result<Option<BookReview>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE review_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawReview::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReview::into_review).transpose()
  }

  async fn insert(&self, review: BookReview) -> Result<()> {
    let id_str      = encode_uuid(review.id);
    let book_id_str = encode_uuid(review.book_id);
    let user_id_str = encode_uuid(review.user_id);
    let at_str      = encode_dt(review.created_on);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reviews (
             review_id, book_id, user_id, text, rating, created_on
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, book_id_str, user_id_str, review.text, review.rating, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Only `text` is mutable once a review exists.
  async fn replace(&self, review: BookReview) -> Result<()> {
    let id = review.id;
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE reviews SET text = ?2 WHERE review_id = ?1",
          rusqlite::params![id_str, review.text],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::MissingRow { table: "reviews", id });
    }
    Ok(())
  }

  async fn remove(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM reviews WHERE review_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(changed > 0)
  }
}

impl ReviewRepository for SqliteStore {
  async fn reviews_for_book(&self, book_id: Uuid) -> Result<Vec<BookReview>> {
    let book_id_str = encode_uuid(book_id);

    let raws: Vec<RawReview> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {REVIEW_COLUMNS} FROM reviews
           WHERE book_id = ?1
           ORDER BY created_on, review_id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![book_id_str], RawReview::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReview::into_review).collect()
  }

  async fn rank_books(&self, criteria: RankingCriteria) -> Result<Vec<RatingSummary>> {
    let order     = criteria.order.as_sql();
    let limit_val = i64::try_from(criteria.limit).unwrap_or(i64::MAX);

    let rows: Vec<(String, f64, i64)> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT book_id, AVG(rating) AS average, COUNT(*) AS total
           FROM reviews
           GROUP BY book_id
           ORDER BY average {order}, book_id
           LIMIT ?1"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(book_id, rating, total)| {
        Ok(RatingSummary {
          book_id: decode_uuid(&book_id)?,
          rating,
          total: u64::try_from(total).unwrap_or_default(),
        })
      })
      .collect()
  }
}
