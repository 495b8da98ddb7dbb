use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use super::repository::BookRepository;
use super::types::{Book, BookListParams, BookPatch, CreateBookRequest, SearchParams};
use crate::api::response::{ApiResponse, PaginatedResponse};
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::reviews::repository::ReviewRepository;
use crate::reviews::types::Review;

pub async fn handle_list_books(
    Extension(books): Extension<Arc<BookRepository>>,
    Extension(config): Extension<Arc<Config>>,
    Query(params): Query<BookListParams>,
) -> ApiResult<Json<PaginatedResponse<Book>>> {
    let query = params.validate(&config.pagination)?;
    let page = books.list(&query).await?;

    tracing::debug!(
        "Listed {} of {} books (page {})",
        page.items.len(),
        page.pagination.total,
        page.pagination.page
    );
    Ok(Json(page.into()))
}

pub async fn handle_top_rated_books(
    Extension(books): Extension<Arc<BookRepository>>,
) -> ApiResult<Json<ApiResponse<Vec<Book>>>> {
    Ok(Json(ApiResponse::ok(books.top_rated().await?)))
}

pub async fn handle_featured_books(
    Extension(books): Extension<Arc<BookRepository>>,
) -> ApiResult<Json<ApiResponse<Vec<Book>>>> {
    Ok(Json(ApiResponse::ok(books.featured().await?)))
}

pub async fn handle_search_books(
    Extension(books): Extension<Arc<BookRepository>>,
    Extension(config): Extension<Arc<Config>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<PaginatedResponse<Book>>> {
    let (q, page) = params.validate(&config.pagination)?;
    let results = books.search(&q, page).await?;

    tracing::debug!("Search '{}' matched {} books", q, results.pagination.total);
    Ok(Json(results.into()))
}

pub async fn handle_get_book(
    Extension(books): Extension<Arc<BookRepository>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Book>>> {
    Ok(Json(ApiResponse::ok(books.get_by_id(id.trim()).await?)))
}

/// `GET /api/books/:id/reviews`
pub async fn handle_book_reviews(
    Extension(reviews): Extension<Arc<ReviewRepository>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Review>>>> {
    Ok(Json(ApiResponse::ok(reviews.list_by_book(id.trim()).await?)))
}

pub async fn handle_create_book(
    Extension(books): Extension<Arc<BookRepository>>,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Book>>)> {
    let Json(request) = payload.map_err(invalid_body)?;
    let book = books.create(request.validate()?).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(book).with_message("Book created successfully")),
    ))
}

pub async fn handle_update_book(
    Extension(books): Extension<Arc<BookRepository>>,
    Path(id): Path<String>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Book>>> {
    let Json(patch) = payload.map_err(invalid_body)?;
    let book = books.update(id.trim(), patch.validate()?).await?;

    Ok(Json(
        ApiResponse::ok(book).with_message("Book updated successfully"),
    ))
}

pub async fn handle_delete_book(
    Extension(books): Extension<Arc<BookRepository>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    books.delete(id.trim()).await?;
    Ok(Json(ApiResponse::message("Book deleted successfully")))
}

pub(crate) fn invalid_body(rejection: JsonRejection) -> ApiError {
    tracing::debug!("Rejected request body: {}", rejection);
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge;
    }
    ApiError::InvalidArgument(rejection.body_text())
}
