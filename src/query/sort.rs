use icu::collator::{Collator, CollatorOptions};
use icu::locid::locale;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use super::dates::parse_timestamp;
use crate::books::types::Book;
use crate::reviews::types::Review;

/// Number of books returned by the top-rated ranking.
pub const TOP_RATED_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Price,
    Rating,
    DatePublished,
    Title,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(SortField::Price),
            "rating" => Ok(SortField::Rating),
            "datePublished" => Ok(SortField::DatePublished),
            "title" => Ok(SortField::Title),
            other => Err(format!("Invalid sortBy field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Order must be asc or desc, got {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookSort {
    pub field: SortField,
    pub order: SortOrder,
}

/// Stable sort; elements that compare equal keep their collection order.
pub fn sort_books(books: &mut [Book], sort: BookSort) {
    books.sort_by(|a, b| {
        let ord = match sort.field {
            SortField::Price => compare_numbers(a.price, b.price),
            SortField::Rating => compare_numbers(a.rating, b.rating),
            // Publication dates are stored as text and ordered as text.
            SortField::DatePublished => compare_text(&a.date_published, &b.date_published),
            SortField::Title => compare_text(&a.title, &b.title),
        };
        match sort.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// Incomparable values (NaN) are treated as equal.
pub fn compare_numbers(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

thread_local! {
    static COLLATOR: Option<Collator> =
        match Collator::try_new(&locale!("en").into(), CollatorOptions::new()) {
            Ok(collator) => Some(collator),
            Err(e) => {
                tracing::warn!("Collator unavailable, falling back to case-folded ordering: {}", e);
                None
            }
        };
}

/// Locale-aware text ordering (Unicode collation, English tailoring).
///
/// Accents and case are secondary differences: `apple < Apple < Éclair < Zebra`.
/// Exact bytes break the remaining ties.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        })
        .then_with(|| a.cmp(b))
}

/// Newest first. Reviews with an unreadable timestamp sink to the end.
pub fn sort_reviews_newest_first(reviews: &mut [Review]) {
    reviews.sort_by_cached_key(|review| std::cmp::Reverse(parse_timestamp(&review.timestamp)));
}

/// Popularity score used by the top-rated ranking.
pub fn popularity(book: &Book) -> f64 {
    book.rating * f64::from(book.review_count)
}

/// Top [`TOP_RATED_LIMIT`] books by `rating * reviewCount`, ties in collection order.
pub fn rank_top_rated(mut books: Vec<Book>) -> Vec<Book> {
    books.sort_by(|a, b| compare_numbers(popularity(b), popularity(a)));
    books.truncate(TOP_RATED_LIMIT);
    books
}
