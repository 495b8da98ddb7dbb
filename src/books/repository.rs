use std::sync::Arc;

use super::types::{Book, BookListQuery, BookPatch, NewBook};
use crate::config::PaginationConfig;
use crate::error::{ApiError, ApiResult};
use crate::query::filter::matches_search;
use crate::query::sort::{rank_top_rated, sort_books};
use crate::query::{paginate, Page, PageRequest};
use crate::storage::{generate_id, DocumentStore};

/// CRUD over the books collection.
///
/// Every operation loads the full collection; writes save it back whole.
pub struct BookRepository {
    store: Arc<DocumentStore>,
    pagination: PaginationConfig,
}

impl BookRepository {
    pub fn new(store: Arc<DocumentStore>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    async fn load(&self) -> ApiResult<Vec<Book>> {
        Ok(self.store.load::<Book>().await?)
    }

    fn clamp(&self, page: PageRequest) -> PageRequest {
        PageRequest::resolve(Some(page.page), Some(page.limit), &self.pagination)
    }

    /// Filter, then optional sort, then paginate.
    pub async fn list(&self, query: &BookListQuery) -> ApiResult<Page<Book>> {
        let mut books = query.filter.apply(self.load().await?);

        if let Some(sort) = query.sort {
            sort_books(&mut books, sort);
        }

        Ok(paginate(books, self.clamp(query.page)))
    }

    pub async fn get_by_id(&self, id: &str) -> ApiResult<Book> {
        self.load()
            .await?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(ApiError::book_not_found)
    }

    pub async fn exists(&self, id: &str) -> ApiResult<bool> {
        Ok(self.load().await?.iter().any(|b| b.id == id))
    }

    pub async fn featured(&self) -> ApiResult<Vec<Book>> {
        let mut books = self.load().await?;
        books.retain(|b| b.featured);
        Ok(books)
    }

    /// Ten most popular books by `rating * reviewCount`.
    pub async fn top_rated(&self) -> ApiResult<Vec<Book>> {
        Ok(rank_top_rated(self.load().await?))
    }

    pub async fn search(&self, q: &str, page: PageRequest) -> ApiResult<Page<Book>> {
        let term = q.trim().to_lowercase();
        if term.is_empty() {
            return Err(ApiError::InvalidArgument(
                "Search query (q) is required".to_string(),
            ));
        }

        let mut books = self.load().await?;
        books.retain(|b| matches_search(b, &term));

        Ok(paginate(books, self.clamp(page)))
    }

    pub async fn create(&self, new_book: NewBook) -> ApiResult<Book> {
        let mut books = self.load().await?;

        if books.iter().any(|b| b.isbn == new_book.isbn) {
            return Err(ApiError::duplicate_isbn());
        }

        let book = new_book.into_book(generate_id("book"));
        books.push(book.clone());
        self.store.save(&books).await?;

        tracing::info!("Created book {} ({})", book.id, book.isbn);
        Ok(book)
    }

    pub async fn update(&self, id: &str, patch: BookPatch) -> ApiResult<Book> {
        let mut books = self.load().await?;

        let index = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(ApiError::book_not_found)?;

        if let Some(isbn) = patch.isbn.as_deref() {
            if isbn != books[index].isbn && books.iter().any(|b| b.isbn == isbn) {
                return Err(ApiError::duplicate_isbn());
            }
        }

        patch.apply(&mut books[index]);
        let updated = books[index].clone();
        self.store.save(&books).await?;

        tracing::info!("Updated book {}", id);
        Ok(updated)
    }

    /// Removes the book only; reviews that reference it are left in place.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let mut books = self.load().await?;

        let index = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(ApiError::book_not_found)?;

        books.remove(index);
        self.store.save(&books).await?;

        tracing::info!("Deleted book {}", id);
        Ok(())
    }
}
