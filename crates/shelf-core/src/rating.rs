//! Book rating arithmetic.
//!
//! Ratings are never stored on the book; they are derived from its reviews
//! on every read and rounded to the nearest half star.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  criteria::{RankingCriteria, SortOrder},
  review::BookReview,
};

/// Granularity of displayed ratings.
pub const RATING_UNIT: f64 = 0.5;

/// Round `x` to the nearest multiple of `unit`, halves away from zero.
pub fn round_to_unit(x: f64, unit: f64) -> f64 { (x / unit).round() * unit }

/// Rounded mean of `ratings`; an unreviewed book rates 0.
pub fn average_rating(ratings: impl IntoIterator<Item = f64>) -> f64 {
  let (sum, count) = ratings
    .into_iter()
    .fold((0.0, 0u32), |(sum, count), r| (sum + r, count + 1));
  if count == 0 {
    return 0.0;
  }
  round_to_unit(sum / f64::from(count), RATING_UNIT)
}

/// One row of the per-book rating ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
  pub book_id: Uuid,
  pub rating:  f64,
  pub total:   u64,
}

/// In-process version of [`crate::store::ReviewRepository::rank_books`]:
/// group by book, average, count, sort and truncate.
///
/// Ties on the average are broken by book id so the order is stable.
pub fn rank<'a>(
  reviews: impl IntoIterator<Item = &'a BookReview>,
  criteria: RankingCriteria,
) -> Vec<RatingSummary> {
  let mut groups: BTreeMap<Uuid, (f64, u64)> = BTreeMap::new();
  for review in reviews {
    let entry = groups.entry(review.book_id).or_insert((0.0, 0));
    entry.0 += review.rating;
    entry.1 += 1;
  }

  let mut ranked: Vec<RatingSummary> = groups
    .into_iter()
    .map(|(book_id, (sum, total))| RatingSummary { book_id, rating: sum / total as f64, total })
    .collect();

  ranked.sort_by(|a, b| {
    let by_rating = match criteria.order {
      SortOrder::Asc => a.rating.total_cmp(&b.rating),
      SortOrder::Desc => b.rating.total_cmp(&a.rating),
    };
    by_rating.then_with(|| a.book_id.cmp(&b.book_id))
  });
  ranked.truncate(criteria.limit);
  ranked
}
