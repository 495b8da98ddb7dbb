//! HTTP API Module
//!
//! Wires the repositories to an axum `Router` and owns the cross-cutting request
//! concerns: response envelopes, field validation, token auth and request logging.
//!
//! ## Routes (mounted under the configured prefix, `/api` by default)
//! - `GET  /books`, `/books/top-rated`, `/books/search?q=`, `/books/featured`,
//!   `/books/:id`, `/books/:id/reviews`
//! - `POST /books`, `PUT /books/:id`, `DELETE /books/:id` (token required)
//! - `GET  /reviews`, `/reviews/:id`, `/reviews/book/:bookId`
//! - `POST /reviews`, `PUT /reviews/:id`, `DELETE /reviews/:id` (token required)
//! - `GET  /health`
//!
//! `GET /` returns a welcome document. Unknown paths and unsupported methods
//! both answer 404 with the error envelope.
//!
//! Every response passes through request logging, the default security
//! headers, CORS, gzip compression and the request body limit. Routes under
//! the prefix are additionally rate limited per client IP.
//!
//! ## Submodules
//! - **`auth`**: shared-secret token middleware for the write routes.
//! - **`logging`**: per-request log line with status and latency.
//! - **`rate_limit`**: fixed-window request limit per client IP.
//! - **`response`**: `ApiResponse` / `PaginatedResponse` envelopes.
//! - **`security`**: CORS policy and security headers.
//! - **`validation`**: field rule collection and ISBN format check.

pub mod auth;
pub mod logging;
pub mod rate_limit;
pub mod response;
pub mod security;
pub mod validation;

use axum::extract::{DefaultBodyLimit, Extension, OriginalUri};
use axum::routing::{get, post, put};
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;

use crate::books::handlers::*;
use crate::books::repository::BookRepository;
use crate::config::Config;
use crate::error::{self, ApiError};
use crate::query::dates::now_iso;
use crate::reviews::handlers::*;
use crate::reviews::repository::ReviewRepository;
use crate::storage::DocumentStore;

/// Builds the repositories over `store` and the full application router.
pub fn build_router(config: Arc<Config>, store: Arc<DocumentStore>) -> Router {
    let books = Arc::new(BookRepository::new(store.clone(), config.pagination));
    let reviews = Arc::new(ReviewRepository::new(
        store,
        books.clone(),
        config.pagination,
    ));

    let auth = middleware::from_fn_with_state(Arc::new(config.auth.clone()), auth::require_auth);
    let limiter = Arc::new(rate_limit::RateLimiter::new(config.http.rate_limit));

    let api = Router::new()
        .route("/health", get(handle_health))
        .route(
            "/books",
            get(handle_list_books).merge(post(handle_create_book).route_layer(auth.clone())),
        )
        .route("/books/top-rated", get(handle_top_rated_books))
        .route("/books/search", get(handle_search_books))
        .route("/books/featured", get(handle_featured_books))
        .route(
            "/books/:id",
            get(handle_get_book).merge(
                put(handle_update_book)
                    .delete(handle_delete_book)
                    .route_layer(auth.clone()),
            ),
        )
        .route("/books/:id/reviews", get(handle_book_reviews))
        .route(
            "/reviews",
            get(handle_list_reviews).merge(post(handle_create_review).route_layer(auth.clone())),
        )
        .route("/reviews/book/:bookId", get(handle_reviews_by_book))
        .route(
            "/reviews/:id",
            get(handle_get_review).merge(
                put(handle_update_review)
                    .delete(handle_delete_review)
                    .route_layer(auth),
            ),
        )
        .method_not_allowed_fallback(handle_not_found)
        .layer(middleware::from_fn_with_state(limiter, rate_limit::limit_requests));

    let mut app = Router::new()
        .route("/", get(handle_root))
        .nest(&config.api_prefix, api)
        .fallback(handle_not_found)
        .method_not_allowed_fallback(handle_not_found)
        .layer(Extension(books))
        .layer(Extension(reviews))
        .layer(Extension(config.clone()));

    if config.is_development() {
        app = app.layer(middleware::from_fn(error::expose_error_details));
    }

    app.layer(DefaultBodyLimit::max(config.http.body_limit))
        .layer(CompressionLayer::new())
        .layer(security::cors_layer(&config.http.cors_origins))
        .layer(middleware::from_fn(security::security_headers))
        .layer(middleware::from_fn(logging::log_requests))
}

async fn handle_health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Bookstore API is running",
        "timestamp": now_iso(),
    }))
}

async fn handle_root(Extension(config): Extension<Arc<Config>>) -> Json<Value> {
    let prefix = &config.api_prefix;
    let endpoints: Vec<String> = [
        ("GET", "/books"),
        ("GET", "/books/:id"),
        ("GET", "/books/top-rated"),
        ("GET", "/books/featured"),
        ("GET", "/books/search"),
        ("GET", "/books/:id/reviews"),
        ("POST", "/books"),
        ("PUT", "/books/:id"),
        ("DELETE", "/books/:id"),
        ("GET", "/reviews"),
        ("GET", "/reviews/:id"),
        ("GET", "/reviews/book/:bookId"),
        ("POST", "/reviews"),
        ("PUT", "/reviews/:id"),
        ("DELETE", "/reviews/:id"),
        ("GET", "/health"),
    ]
    .iter()
    .map(|(method, path)| format!("{} {}{}", method, prefix, path))
    .collect();

    Json(json!({
        "success": true,
        "message": "Welcome to the Bookstore API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
        "notes": [
            "Write endpoints require a token listed in ALLOWED_TOKENS.",
            "Use publishedAfter / publishedBefore to filter books by publication date.",
            format!("Send the token as '{}: Bearer <token>' or 'X-API-KEY: <token>'.", config.auth.header_name),
        ],
    }))
}

async fn handle_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("Route not found: {}", uri))
}
