//! `follows` table: [`FollowRepository`].

use rusqlite::OptionalExtension as _;
use shelf_core::{follow::UserFollow, store::FollowRepository};
use uuid::Uuid;

use crate::{
  Result, SqliteStore,
  encode::{RawFollow, encode_dt, encode_uuid},
};

impl SqliteStore {
  /// All edges whose `column` equals `user_id`, oldest first.
  async fn edges_where(&self, column: &'static str, user_id: Uuid) -> Result<Vec<UserFollow>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawFollow> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT from_user, to_user, created_on FROM follows
           WHERE {column} = ?1
           ORDER BY follow_id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawFollow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFollow::into_follow).collect()
  }
}

impl FollowRepository for SqliteStore {
  async fn follow(&self, edge: UserFollow) -> Result<()> {
    let from_str = encode_uuid(edge.from);
    let to_str   = encode_uuid(edge.to);
    let at_str   = encode_dt(edge.created_on);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO follows (from_user, to_user, created_on) VALUES (?1, ?2, ?3)",
          rusqlite::params![from_str, to_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn unfollow(&self, from: Uuid, to: Uuid) -> Result<bool> {
    let from_str = encode_uuid(from);
    let to_str   = encode_uuid(to);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM follows WHERE follow_id = (
             SELECT MIN(follow_id) FROM follows WHERE from_user = ?1 AND to_user = ?2
           )",
          rusqlite::params![from_str, to_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn find_follow(&self, from: Uuid, to: Uuid) -> Result<Option<UserFollow>> {
    let from_str = encode_uuid(from);
    let to_str   = encode_uuid(to);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT from_user, to_user, created_on FROM follows
               WHERE from_user = ?1 AND to_user = ?2
               ORDER BY follow_id LIMIT 1",
              rusqlite::params![from_str, to_str],
              RawFollow::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFollow::into_follow).transpose()
  }

  async fn followers(&self, user_id: Uuid) -> Result<Vec<UserFollow>> {
    self.edges_where("to_user", user_id).await
  }

  async fn following(&self, user_id: Uuid) -> Result<Vec<UserFollow>> {
    self.edges_where("from_user", user_id).await
  }
}
