use std::sync::Arc;

use super::types::{NewReview, Review, ReviewListQuery, ReviewPatch};
use crate::books::repository::BookRepository;
use crate::config::PaginationConfig;
use crate::error::{ApiError, ApiResult};
use crate::query::dates::now_iso;
use crate::query::sort::sort_reviews_newest_first;
use crate::query::{paginate, Page, PageRequest};
use crate::rating::{RatingAggregator, RatingUpdate};
use crate::storage::{generate_id, DocumentStore};

/// CRUD over the reviews collection, with referential checks against the
/// books collection and rating maintenance after every write.
pub struct ReviewRepository {
    store: Arc<DocumentStore>,
    books: Arc<BookRepository>,
    aggregator: RatingAggregator,
    pagination: PaginationConfig,
}

impl ReviewRepository {
    pub fn new(
        store: Arc<DocumentStore>,
        books: Arc<BookRepository>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            aggregator: RatingAggregator::new(store.clone()),
            store,
            books,
            pagination,
        }
    }

    async fn load(&self) -> ApiResult<Vec<Review>> {
        Ok(self.store.load::<Review>().await?)
    }

    async fn ensure_book_exists(&self, book_id: &str) -> ApiResult<()> {
        if self.books.exists(book_id).await? {
            Ok(())
        } else {
            Err(ApiError::book_not_found())
        }
    }

    /// Filter, newest first, then paginate.
    pub async fn list(&self, query: &ReviewListQuery) -> ApiResult<Page<Review>> {
        let mut reviews = query.filter.apply(self.load().await?);
        sort_reviews_newest_first(&mut reviews);

        let page = PageRequest::resolve(Some(query.page.page), Some(query.page.limit), &self.pagination);
        Ok(paginate(reviews, page))
    }

    pub async fn get_by_id(&self, id: &str) -> ApiResult<Review> {
        self.load()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(ApiError::review_not_found)
    }

    /// Every review of an existing book, newest first.
    pub async fn list_by_book(&self, book_id: &str) -> ApiResult<Vec<Review>> {
        self.ensure_book_exists(book_id).await?;

        let mut reviews = self.load().await?;
        reviews.retain(|r| r.book_id == book_id);
        sort_reviews_newest_first(&mut reviews);
        Ok(reviews)
    }

    pub async fn create(&self, new_review: NewReview) -> ApiResult<Review> {
        self.ensure_book_exists(&new_review.book_id).await?;

        let mut reviews = self.load().await?;
        let review = new_review.into_review(generate_id("review"), now_iso());
        reviews.push(review.clone());
        self.store.save(&reviews).await?;

        self.aggregator
            .update_book_rating(&review.book_id, RatingUpdate::NewReview(review.rating))
            .await?;

        tracing::info!("Created review {} for book {}", review.id, review.book_id);
        Ok(review)
    }

    /// Applies the patch; a changed rating triggers a full recompute for the book.
    pub async fn update(&self, id: &str, patch: ReviewPatch) -> ApiResult<Review> {
        let mut reviews = self.load().await?;

        let review = reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(ApiError::review_not_found)?;

        let previous_rating = patch.apply(review);
        let updated = review.clone();
        self.store.save(&reviews).await?;

        if let Some(previous) = previous_rating {
            tracing::debug!(
                "Review {} rating changed {} -> {}",
                id,
                previous,
                updated.rating
            );
            self.aggregator
                .update_book_rating(&updated.book_id, RatingUpdate::Recompute)
                .await?;
        }

        tracing::info!("Updated review {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let mut reviews = self.load().await?;

        let index = reviews
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(ApiError::review_not_found)?;

        let removed = reviews.remove(index);
        self.store.save(&reviews).await?;

        self.aggregator
            .update_book_rating(&removed.book_id, RatingUpdate::Recompute)
            .await?;

        tracing::info!("Deleted review {}", id);
        Ok(())
    }
}
