use anyhow::Result;
use std::sync::Arc;

use crate::books::types::Book;
use crate::reviews::types::Review;
use crate::storage::DocumentStore;

/// Which maintenance policy to run for a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingUpdate {
    /// A review with this rating was just added: O(1) running-mean update.
    NewReview(u8),
    /// A review was edited or removed: reload every review of the book.
    Recompute,
}

/// Keeps `Book::rating` and `Book::review_count` in step with the reviews
/// that reference the book.
pub struct RatingAggregator {
    store: Arc<DocumentStore>,
}

impl RatingAggregator {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Applies `update` to the book and persists the whole books collection.
    ///
    /// An unknown `book_id` is a no-op: the call succeeds without touching the
    /// store. Only store I/O failures are returned.
    pub async fn update_book_rating(&self, book_id: &str, update: RatingUpdate) -> Result<()> {
        let mut books: Vec<Book> = self.store.load().await?;

        let Some(book) = books.iter_mut().find(|b| b.id == book_id) else {
            // Orphaned review: the book was deleted or never existed.
            tracing::warn!("Rating update skipped: book {} not found", book_id);
            return Ok(());
        };

        match update {
            RatingUpdate::NewReview(rating) => apply_new_review(book, rating),
            RatingUpdate::Recompute => {
                let reviews: Vec<Review> = self.store.load().await?;
                recompute(book, reviews.iter().filter(|r| r.book_id == book_id));
            }
        }

        tracing::debug!(
            "Book {} rating is now {:.3} over {} reviews",
            book_id,
            book.rating,
            book.review_count
        );

        self.store.save(&books).await
    }
}

/// `rating' = (rating * n + new) / (n + 1)`, `n' = n + 1`.
///
/// Assumes the book's current aggregate already reflects every other review.
pub fn apply_new_review(book: &mut Book, rating: u8) {
    let count = f64::from(book.review_count);
    let total = book.rating * count + f64::from(rating);
    book.review_count += 1;
    book.rating = total / f64::from(book.review_count);
}

/// Mean and count over `reviews`; both zero when there are none.
pub fn recompute<'a, I>(book: &mut Book, reviews: I)
where
    I: IntoIterator<Item = &'a Review>,
{
    let (sum, count) = reviews
        .into_iter()
        .fold((0u64, 0u32), |(sum, count), review| {
            (sum + u64::from(review.rating), count + 1)
        });

    if count == 0 {
        book.rating = 0.0;
        book.review_count = 0;
    } else {
        book.rating = sum as f64 / f64::from(count);
        book.review_count = count;
    }
}
