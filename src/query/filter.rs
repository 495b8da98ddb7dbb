use chrono::{DateTime, Utc};

use super::dates::parse_timestamp;
use crate::books::types::Book;
use crate::reviews::types::Review;

/// Conjunctive set of book predicates. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    /// Substring of any genre entry, case-insensitive.
    pub genre: Option<String>,
    /// Substring of the author, case-insensitive.
    pub author: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    /// Free-text term matched against title, author, description and tags.
    pub search: Option<String>,
    pub published_after: Option<DateTime<Utc>>,
    pub published_before: Option<DateTime<Utc>>,
}

impl BookFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, book: &Book) -> bool {
        if let Some(genre) = &self.genre {
            let genre = genre.to_lowercase();
            if !book.genre.iter().any(|g| contains_ci(g, &genre)) {
                return false;
            }
        }

        if let Some(author) = &self.author {
            if !contains_ci(&book.author, &author.to_lowercase()) {
                return false;
            }
        }

        if self.min_price.is_some_and(|min| book.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| book.price > max) {
            return false;
        }

        if self.in_stock.is_some_and(|flag| book.in_stock != flag) {
            return false;
        }
        if self.featured.is_some_and(|flag| book.featured != flag) {
            return false;
        }

        if let Some(term) = &self.search {
            if !matches_search(book, &term.to_lowercase()) {
                return false;
            }
        }

        if self.published_after.is_some() || self.published_before.is_some() {
            // An unparseable publication date never satisfies a range bound.
            let Some(published) = parse_timestamp(&book.date_published) else {
                return false;
            };
            if self.published_after.is_some_and(|after| published < after) {
                return false;
            }
            if self.published_before.is_some_and(|before| published > before) {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, mut books: Vec<Book>) -> Vec<Book> {
        if !self.is_empty() {
            books.retain(|book| self.matches(book));
        }
        books
    }
}

/// `term` must already be lower-cased.
pub fn matches_search(book: &Book, term: &str) -> bool {
    contains_ci(&book.title, term)
        || contains_ci(&book.author, term)
        || contains_ci(&book.description, term)
        || book.tags.iter().any(|tag| contains_ci(tag, term))
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    pub book_id: Option<String>,
    pub min_rating: Option<u8>,
    pub verified: Option<bool>,
}

impl ReviewFilter {
    pub fn matches(&self, review: &Review) -> bool {
        self.book_id.as_deref().map_or(true, |id| review.book_id == id)
            && self.min_rating.map_or(true, |min| review.rating >= min)
            && self.verified.map_or(true, |flag| review.verified == flag)
    }

    pub fn apply(&self, mut reviews: Vec<Review>) -> Vec<Review> {
        reviews.retain(|review| self.matches(review));
        reviews
    }
}

/// Query-string boolean coercion: only the literal `"true"` is true.
pub fn parse_flag(raw: &str) -> bool {
    raw.trim() == "true"
}
