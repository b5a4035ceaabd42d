//! `users` table: [`Repository<User>`] and [`UserRepository`].
//!
//! Interests live in a JSON column and are edited in place with SQLite's
//! `json_set` / `json_remove`, so concurrent interest updates for different
//! books do not overwrite each other.

use rusqlite::OptionalExtension as _;
use shelf_core::{
  criteria::UserCriteria,
  store::{Repository, UserRepository},
  user::{InterestStatus, Role, User},
};
use uuid::Uuid;

use crate::{
  Error, Result, SqliteStore,
  encode::{
    RawUser, USER_COLUMNS, encode_dt, encode_interests, encode_role, encode_uuid, interest_path,
  },
};

impl SqliteStore {
  /// Fetch at most one user matching `column = value`.
  async fn user_where(&self, column: &'static str, value: String) -> Result<Option<User>> {
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  /// Run an `UPDATE users ... WHERE user_id = ?1` and insist it hit a row.
  async fn update_user(
    &self,
    user_id: Uuid,
    sql: &'static str,
    value: String,
    extra: Option<String>,
  ) -> Result<()> {
    let id_str = encode_uuid(user_id);
    let changed = self
      .conn
      .call(move |conn| {
        let changed = match extra {
          Some(extra) => conn.execute(sql, rusqlite::params![id_str, value, extra])?,
          None => conn.execute(sql, rusqlite::params![id_str, value])?,
        };
        Ok(changed)
      })
      .await?;

    if changed == 0 {
      return Err(Error::MissingRow { table: "users", id: user_id });
    }
    Ok(())
  }
}

impl Repository<User> for SqliteStore {
  async fn get(&self, id: Uuid) -> Result<Option<User>> {
    self.user_where("user_id", encode_uuid(id)).await
  }

  async fn insert(&self, user: User) -> Result<()> {
    let id_str        = encode_uuid(user.id);
    let role_str      = encode_role(user.role);
    let interests_str = encode_interests(&user.interests)?;
    let at_str        = encode_dt(user.created_on);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, name, username, email, password_hash, role, interests, created_on
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            user.name,
            user.username,
            user.email,
            user.password_hash,
            role_str,
            interests_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn replace(&self, user: User) -> Result<()> {
    let id = user.id;
    let id_str        = encode_uuid(id);
    let role_str      = encode_role(user.role);
    let interests_str = encode_interests(&user.interests)?;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users
           SET name = ?2, username = ?3, email = ?4, password_hash = ?5,
               role = ?6, interests = ?7
           WHERE user_id = ?1",
          rusqlite::params![
            id_str,
            user.name,
            user.username,
            user.email,
            user.password_hash,
            role_str,
            interests_str,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::MissingRow { table: "users", id });
    }
    Ok(())
  }

  async fn remove(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM users WHERE user_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(changed > 0)
  }
}

impl UserRepository for SqliteStore {
  async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
    self.user_where("email", email.to_owned()).await
  }

  async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
    self.user_where("username", username.to_owned()).await
  }

  async fn list_users(&self, criteria: &UserCriteria) -> Result<Vec<User>> {
    let query      = criteria.query.clone();
    let limit_val  = i64::from(criteria.page.per_page());
    let offset_val = i64::try_from(criteria.page.offset()).unwrap_or(i64::MAX);

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {USER_COLUMNS} FROM users
           WHERE ?1 IS NULL
              OR instr(fold(name),     fold(?1)) > 0
              OR instr(fold(username), fold(?1)) > 0
           ORDER BY created_on, user_id
           LIMIT ?2 OFFSET ?3"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![query.as_deref(), limit_val, offset_val],
            RawUser::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn all_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_on, user_id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn set_interest(&self, user_id: Uuid, book_id: Uuid, status: InterestStatus) -> Result<()> {
    self
      .update_user(
        user_id,
        "UPDATE users SET interests = json_set(interests, ?2, ?3) WHERE user_id = ?1",
        interest_path(book_id),
        Some(status.to_string()),
      )
      .await
  }

  async fn unset_interest(&self, user_id: Uuid, book_id: Uuid) -> Result<()> {
    self
      .update_user(
        user_id,
        "UPDATE users SET interests = json_remove(interests, ?2) WHERE user_id = ?1",
        interest_path(book_id),
        None,
      )
      .await
  }

  async fn set_role(&self, user_id: Uuid, role: Role) -> Result<()> {
    self
      .update_user(
        user_id,
        "UPDATE users SET role = ?2 WHERE user_id = ?1",
        encode_role(role),
        None,
      )
      .await
  }
}
