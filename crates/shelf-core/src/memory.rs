//! A map-backed implementation of every repository trait.
//!
//! Used by the core and API test suites. Listings are ordered by creation
//! time, then id, to match the SQLite backend.

use std::{
  collections::HashMap,
  sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use thiserror::Error;
use uuid::Uuid;

use crate::{
  book::Book,
  criteria::{BookCriteria, RankingCriteria, UserCriteria},
  follow::UserFollow,
  rating::{self, RatingSummary},
  review::BookReview,
  store::{
    Backend, BookRepository, FollowRepository, Repository, ReviewRepository,
    UserRepository,
  },
  user::{InterestStatus, Role, User},
};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("{0} table lock poisoned")]
  Poisoned(&'static str),

  #[error("duplicate key {0} in {1}")]
  Duplicate(Uuid, &'static str),

  #[error("no row {0} in {1}")]
  Missing(Uuid, &'static str),
}

type Table<T> = RwLock<HashMap<Uuid, T>>;

#[derive(Default)]
struct Tables {
  books:   Table<Book>,
  reviews: Table<BookReview>,
  users:   Table<User>,
  follows: RwLock<Vec<UserFollow>>,
}

/// In-process store. Cloning is cheap; clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
  tables: Arc<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

fn read<'a, T>(lock: &'a RwLock<T>, name: &'static str) -> Result<RwLockReadGuard<'a, T>, MemoryError> {
  lock.read().map_err(|_| MemoryError::Poisoned(name))
}

fn write<'a, T>(lock: &'a RwLock<T>, name: &'static str) -> Result<RwLockWriteGuard<'a, T>, MemoryError> {
  lock.write().map_err(|_| MemoryError::Poisoned(name))
}

/// Sorted snapshot of the rows accepted by `keep`.
fn ordered<T, K, F>(table: &HashMap<Uuid, T>, keep: F, key: K) -> Vec<T>
where
  T: Clone,
  F: Fn(&T) -> bool,
  K: Fn(&T) -> (chrono::DateTime<chrono::Utc>, Uuid),
{
  let mut rows: Vec<T> = table.values().filter(|row| keep(row)).cloned().collect();
  rows.sort_by_key(|row| key(row));
  rows
}

impl Backend for MemoryStore {
  type Error = MemoryError;
}

/// Generic keyed-table operations; one expansion per entity.
macro_rules! keyed_repository {
  ($entity:ty, $field:ident) => {
    impl Repository<$entity> for MemoryStore {
      async fn get(&self, id: Uuid) -> Result<Option<$entity>, MemoryError> {
        let table = read(&self.tables.$field, stringify!($field))?;
        Ok(table.get(&id).cloned())
      }

      async fn insert(&self, entity: $entity) -> Result<(), MemoryError> {
        let mut table = write(&self.tables.$field, stringify!($field))?;
        if table.contains_key(&entity.id) {
          return Err(MemoryError::Duplicate(entity.id, stringify!($field)));
        }
        table.insert(entity.id, entity);
        Ok(())
      }

      async fn replace(&self, entity: $entity) -> Result<(), MemoryError> {
        let mut table = write(&self.tables.$field, stringify!($field))?;
        match table.get_mut(&entity.id) {
          Some(row) => {
            *row = entity;
            Ok(())
          }
          None => Err(MemoryError::Missing(entity.id, stringify!($field))),
        }
      }

      async fn remove(&self, id: Uuid) -> Result<bool, MemoryError> {
        let mut table = write(&self.tables.$field, stringify!($field))?;
        Ok(table.remove(&id).is_some())
      }
    }
  };
}

keyed_repository!(Book, books);
keyed_repository!(BookReview, reviews);
keyed_repository!(User, users);

// ─── Books ───────────────────────────────────────────────────────────────────

impl BookRepository for MemoryStore {
  async fn list_books(&self, criteria: &BookCriteria) -> Result<Vec<Book>, MemoryError> {
    let table = read(&self.tables.books, "books")?;
    let rows = ordered(&table, |b| criteria.matches(b), |b| (b.created_on, b.id));
    Ok(criteria.page.slice(rows))
  }

  async fn all_books(&self) -> Result<Vec<Book>, MemoryError> {
    let table = read(&self.tables.books, "books")?;
    Ok(ordered(&table, |_| true, |b| (b.created_on, b.id)))
  }
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

impl ReviewRepository for MemoryStore {
  async fn reviews_for_book(&self, book_id: Uuid) -> Result<Vec<BookReview>, MemoryError> {
    let table = read(&self.tables.reviews, "reviews")?;
    Ok(ordered(&table, |r| r.book_id == book_id, |r| (r.created_on, r.id)))
  }

  async fn rank_books(&self, criteria: RankingCriteria) -> Result<Vec<RatingSummary>, MemoryError> {
    let table = read(&self.tables.reviews, "reviews")?;
    Ok(rating::rank(table.values(), criteria))
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

impl MemoryStore {
  fn find_user<F>(&self, pred: F) -> Result<Option<User>, MemoryError>
  where
    F: Fn(&User) -> bool,
  {
    let table = read(&self.tables.users, "users")?;
    Ok(table.values().find(|u| pred(u)).cloned())
  }

  fn with_user<F>(&self, user_id: Uuid, f: F) -> Result<(), MemoryError>
  where
    F: FnOnce(&mut User),
  {
    let mut table = write(&self.tables.users, "users")?;
    let user = table.get_mut(&user_id).ok_or(MemoryError::Missing(user_id, "users"))?;
    f(user);
    Ok(())
  }
}

impl UserRepository for MemoryStore {
  async fn user_by_email(&self, email: &str) -> Result<Option<User>, MemoryError> {
    self.find_user(|u| u.email == email)
  }

  async fn user_by_username(&self, username: &str) -> Result<Option<User>, MemoryError> {
    self.find_user(|u| u.username == username)
  }

  async fn list_users(&self, criteria: &UserCriteria) -> Result<Vec<User>, MemoryError> {
    let table = read(&self.tables.users, "users")?;
    let rows = ordered(&table, |u| criteria.matches(u), |u| (u.created_on, u.id));
    Ok(criteria.page.slice(rows))
  }

  async fn all_users(&self) -> Result<Vec<User>, MemoryError> {
    let table = read(&self.tables.users, "users")?;
    Ok(ordered(&table, |_| true, |u| (u.created_on, u.id)))
  }

  async fn set_interest(
    &self,
    user_id: Uuid,
    book_id: Uuid,
    status: InterestStatus,
  ) -> Result<(), MemoryError> {
    self.with_user(user_id, |u| {
      u.interests.insert(book_id, status);
    })
  }

  async fn unset_interest(&self, user_id: Uuid, book_id: Uuid) -> Result<(), MemoryError> {
    self.with_user(user_id, |u| {
      u.interests.remove(&book_id);
    })
  }

  async fn set_role(&self, user_id: Uuid, role: Role) -> Result<(), MemoryError> {
    self.with_user(user_id, |u| u.role = role)
  }
}

// ─── Follows ─────────────────────────────────────────────────────────────────

impl FollowRepository for MemoryStore {
  async fn follow(&self, edge: UserFollow) -> Result<(), MemoryError> {
    write(&self.tables.follows, "follows")?.push(edge);
    Ok(())
  }

  async fn unfollow(&self, from: Uuid, to: Uuid) -> Result<bool, MemoryError> {
    let mut edges = write(&self.tables.follows, "follows")?;
    match edges.iter().position(|e| e.from == from && e.to == to) {
      Some(idx) => {
        edges.remove(idx);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn find_follow(&self, from: Uuid, to: Uuid) -> Result<Option<UserFollow>, MemoryError> {
    let edges = read(&self.tables.follows, "follows")?;
    Ok(edges.iter().find(|e| e.from == from && e.to == to).cloned())
  }

  async fn followers(&self, user_id: Uuid) -> Result<Vec<UserFollow>, MemoryError> {
    let edges = read(&self.tables.follows, "follows")?;
    Ok(edges.iter().filter(|e| e.to == user_id).cloned().collect())
  }

  async fn following(&self, user_id: Uuid) -> Result<Vec<UserFollow>, MemoryError> {
    let edges = read(&self.tables.follows, "follows")?;
    Ok(edges.iter().filter(|e| e.from == user_id).cloned().collect())
  }
}
