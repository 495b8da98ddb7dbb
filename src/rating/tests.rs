//! Rating Aggregation Tests
//!
//! ## Test Scopes
//! - **Pure updates**: running mean on insert, full recompute on edit/delete.
//! - **Persisted updates**: `RatingAggregator` against a temporary store, including
//!   the silent no-op for an unknown book.

#[cfg(test)]
mod tests {
    use crate::books::types::Book;
    use crate::config::DataConfig;
    use crate::rating::aggregator::{apply_new_review, recompute};
    use crate::rating::{RatingAggregator, RatingUpdate};
    use crate::reviews::types::Review;
    use crate::storage::DocumentStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn book(id: &str, rating: f64, review_count: u32) -> Book {
        Book {
            id: id.to_string(),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            description: "Spice, sand and politics.".to_string(),
            price: 9.99,
            image: String::new(),
            isbn: format!("isbn-{}", id),
            genre: vec!["Science Fiction".to_string()],
            tags: vec![],
            date_published: "1965-08-01".to_string(),
            pages: 412,
            language: "English".to_string(),
            publisher: "Chilton".to_string(),
            rating,
            review_count,
            in_stock: true,
            featured: false,
            extra: Default::default(),
        }
    }

    fn review(id: &str, book_id: &str, rating: u8) -> Review {
        Review {
            id: id.to_string(),
            book_id: book_id.to_string(),
            author: "Reader".to_string(),
            rating,
            title: "Opinion".to_string(),
            comment: "Long but rewarding.".to_string(),
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
            verified: false,
            extra: Default::default(),
        }
    }

    async fn store_with(dir: &TempDir, books: &[Book], reviews: &[Review]) -> Arc<DocumentStore> {
        let store = DocumentStore::new(&DataConfig {
            books_path: dir.path().join("books.json"),
            reviews_path: dir.path().join("reviews.json"),
        });
        store.ensure_initialized().await.unwrap();
        store.save(books).await.unwrap();
        store.save(reviews).await.unwrap();
        Arc::new(store)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    // ============================================================
    // PURE UPDATE TESTS
    // ============================================================

    #[test]
    fn test_first_review_sets_rating() {
        let mut b = book("b1", 0.0, 0);
        apply_new_review(&mut b, 4);

        assert_close(b.rating, 4.0);
        assert_eq!(b.review_count, 1);
    }

    #[test]
    fn test_incremental_update_is_running_mean() {
        // ARRANGE
        let mut b = book("b1", 4.0, 2);

        // ACT
        apply_new_review(&mut b, 5);

        // ASSERT
        assert_close(b.rating, 13.0 / 3.0);
        assert_eq!(b.review_count, 3);
    }

    #[test]
    fn test_recompute_matches_mean_of_reviews() {
        let mut b = book("b1", 1.0, 7);
        let reviews = vec![review("r1", "b1", 3), review("r2", "b1", 4), review("r3", "b1", 5)];

        recompute(&mut b, &reviews);

        assert_close(b.rating, 4.0);
        assert_eq!(b.review_count, 3);
    }

    #[test]
    fn test_recompute_with_no_reviews_resets_to_zero() {
        let mut b = book("b1", 4.5, 2);
        recompute(&mut b, &Vec::<Review>::new());

        assert_close(b.rating, 0.0);
        assert_eq!(b.review_count, 0);
    }

    #[test]
    fn test_incremental_and_recompute_agree() {
        let ratings = [5u8, 3, 4, 1, 2, 5];
        let reviews: Vec<Review> = ratings
            .iter()
            .enumerate()
            .map(|(i, r)| review(&format!("r{}", i), "b1", *r))
            .collect();

        let mut incremental = book("b1", 0.0, 0);
        for r in ratings {
            apply_new_review(&mut incremental, r);
        }
        let mut recomputed = book("b1", 0.0, 0);
        recompute(&mut recomputed, &reviews);

        assert_close(incremental.rating, recomputed.rating);
        assert_eq!(incremental.review_count, recomputed.review_count);
    }

    // ============================================================
    // PERSISTED UPDATE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_new_review_update_is_persisted() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, &[book("b1", 4.0, 2)], &[]).await;
        let aggregator = RatingAggregator::new(store.clone());

        aggregator
            .update_book_rating("b1", RatingUpdate::NewReview(5))
            .await
            .unwrap();

        let books: Vec<Book> = store.load().await.unwrap();
        assert_close(books[0].rating, 13.0 / 3.0);
        assert_eq!(books[0].review_count, 3);
    }

    #[tokio::test]
    async fn test_recompute_only_counts_reviews_of_that_book() {
        // ARRANGE
        let dir = TempDir::new().unwrap();
        let books = [book("b1", 0.0, 0), book("b2", 0.0, 0)];
        let reviews = [review("r1", "b1", 2), review("r2", "b2", 5), review("r3", "b1", 4)];
        let store = store_with(&dir, &books, &reviews).await;
        let aggregator = RatingAggregator::new(store.clone());

        // ACT
        aggregator
            .update_book_rating("b1", RatingUpdate::Recompute)
            .await
            .unwrap();

        // ASSERT
        let books: Vec<Book> = store.load().await.unwrap();
        assert_close(books[0].rating, 3.0);
        assert_eq!(books[0].review_count, 2);
        assert_eq!(books[1].review_count, 0, "Other books are untouched");
    }

    #[tokio::test]
    async fn test_unknown_book_is_a_silent_noop() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, &[book("b1", 4.0, 2)], &[]).await;
        let before = std::fs::read_to_string(dir.path().join("books.json")).unwrap();
        let aggregator = RatingAggregator::new(store);

        let result = aggregator
            .update_book_rating("missing", RatingUpdate::NewReview(1))
            .await;

        assert!(result.is_ok());
        let after = std::fs::read_to_string(dir.path().join("books.json")).unwrap();
        assert_eq!(before, after, "Books document must not be rewritten");
    }

    #[tokio::test]
    async fn test_store_failure_is_propagated() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(DocumentStore::new(&DataConfig {
            books_path: dir.path().join("absent-books.json"),
            reviews_path: dir.path().join("absent-reviews.json"),
        }));
        let aggregator = RatingAggregator::new(store);

        let result = aggregator
            .update_book_rating("b1", RatingUpdate::Recompute)
            .await;

        assert!(result.is_err());
    }
}
