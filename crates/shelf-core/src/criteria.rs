//! Query criteria: pagination, free-text filters and ranking order.

use serde::{Deserialize, Serialize};

use crate::{book::Book, user::User};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 50;
pub const MAX_PER_PAGE: u32 = 1000;
/// How many books the rating ranking returns.
pub const RANKING_LIMIT: usize = 25;

// ─── Pagination ──────────────────────────────────────────────────────────────

/// A normalised page request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  page:     u32,
  per_page: u32,
}

impl Page {
  /// Missing or zero `page` becomes 1; missing, zero or oversized `per_page`
  /// falls back to the default.
  pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
    let page = match page {
      Some(p) if p > 0 => p,
      _ => DEFAULT_PAGE,
    };
    let per_page = match per_page {
      Some(n) if n > 0 && n <= MAX_PER_PAGE => n,
      _ => DEFAULT_PER_PAGE,
    };
    Self { page, per_page }
  }

  pub fn page(&self) -> u32 { self.page }

  pub fn per_page(&self) -> u32 { self.per_page }

  pub fn offset(&self) -> u64 { u64::from(self.page - 1) * u64::from(self.per_page) }

  /// Cut the requested page out of an already-ordered list.
  pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
    let skip = usize::try_from(self.offset()).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(self.per_page as usize).collect()
  }
}

impl Default for Page {
  fn default() -> Self { Self::new(None, None) }
}

/// Case-insensitive substring test.
fn contains_ci(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Blank filters mean "no filter".
fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

// ─── Books ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct BookCriteria {
  pub page:   Page,
  /// Matched against title, author or genre.
  pub query:  Option<String>,
  pub genre:  Option<String>,
  pub author: Option<String>,
}

impl BookCriteria {
  pub fn new(
    page: Page,
    query: Option<String>,
    genre: Option<String>,
    author: Option<String>,
  ) -> Self {
    Self {
      page,
      query: non_blank(query),
      genre: non_blank(genre),
      author: non_blank(author),
    }
  }

  pub fn matches(&self, book: &Book) -> bool {
    let query = self.query.as_deref().is_none_or(|q| {
      contains_ci(&book.title, q) || contains_ci(&book.author, q) || contains_ci(&book.genre, q)
    });
    let genre = self.genre.as_deref().is_none_or(|g| contains_ci(&book.genre, g));
    let author = self.author.as_deref().is_none_or(|a| contains_ci(&book.author, a));
    query && genre && author
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct UserCriteria {
  pub page:  Page,
  /// Matched against name or username.
  pub query: Option<String>,
}

impl UserCriteria {
  pub fn new(page: Page, query: Option<String>) -> Self {
    Self { page, query: non_blank(query) }
  }

  pub fn matches(&self, user: &User) -> bool {
    self
      .query
      .as_deref()
      .is_none_or(|q| contains_ci(&user.name, q) || contains_ci(&user.username, q))
  }
}

// ─── Ranking ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

impl SortOrder {
  pub fn as_sql(self) -> &'static str {
    match self {
      SortOrder::Asc => "ASC",
      SortOrder::Desc => "DESC",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingCriteria {
  pub order: SortOrder,
  pub limit: usize,
}

impl RankingCriteria {
  pub fn new(order: SortOrder) -> Self { Self { order, limit: RANKING_LIMIT } }
}

impl Default for RankingCriteria {
  fn default() -> Self { Self::new(SortOrder::default()) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::book::{Book, BookCommand};
  use uuid::Uuid;

  #[test]
  fn page_defaults() {
    assert_eq!(Page::new(None, None), Page::new(Some(1), Some(50)));
    assert_eq!(Page::new(Some(0), Some(0)).per_page(), DEFAULT_PER_PAGE);
    assert_eq!(Page::new(Some(0), Some(0)).page(), DEFAULT_PAGE);
    assert_eq!(Page::new(None, Some(1001)).per_page(), DEFAULT_PER_PAGE);
    assert_eq!(Page::new(None, Some(1000)).per_page(), 1000);
  }

  #[test]
  fn page_offset_and_slice() {
    let page = Page::new(Some(3), Some(2));
    assert_eq!(page.offset(), 4);
    assert_eq!(page.slice((0..10).collect()), vec![4, 5]);
    assert!(Page::new(Some(9), Some(2)).slice((0..10).collect::<Vec<_>>()).is_empty());
  }

  fn book(title: &str, author: &str, genre: &str) -> Book {
    Book::new(Uuid::new_v4(), BookCommand {
      title:       title.into(),
      description: "d".into(),
      author:      author.into(),
      genre:       genre.into(),
      pages:       1,
    })
  }

  #[test]
  fn query_matches_any_of_title_author_genre() {
    let criteria = BookCriteria::new(Page::default(), Some("LEGUIN".into()), None, None);
    assert!(criteria.matches(&book("Earthsea", "Ursula K. LeGuin", "fantasy")));
    assert!(!criteria.matches(&book("Dune", "Frank Herbert", "sci-fi")));

    let criteria = BookCriteria::new(Page::default(), Some("fant".into()), None, None);
    assert!(criteria.matches(&book("Earthsea", "Ursula K. LeGuin", "Fantasy")));
  }

  #[test]
  fn filters_combine() {
    let criteria =
      BookCriteria::new(Page::default(), None, Some("sci".into()), Some("herbert".into()));
    assert!(criteria.matches(&book("Dune", "Frank Herbert", "sci-fi")));
    assert!(!criteria.matches(&book("Hyperion", "Dan Simmons", "sci-fi")));
  }

  #[test]
  fn blank_filters_are_ignored() {
    let criteria = BookCriteria::new(Page::default(), Some("  ".into()), Some(String::new()), None);
    assert!(criteria.query.is_none());
    assert!(criteria.genre.is_none());
    assert!(criteria.matches(&book("Anything", "", "x")));
  }
}
