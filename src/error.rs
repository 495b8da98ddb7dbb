//! Error taxonomy shared by the repositories and the HTTP layer.
//!
//! Every domain failure carries the HTTP status it maps to. The message of a
//! domain error is returned to the client verbatim; `Internal` errors are
//! logged with their full chain and masked as "Internal Server Error". In
//! development the chain is also returned as `stack` (see [`expose_error_details`]).

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::api::response::ApiResponse;

/// Result type alias for repository and handler operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing book/review, or a review pointing at a book that does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate ISBN.
    #[error("{0}")]
    Conflict(String),

    /// Malformed query or body that is not a field-level validation failure.
    #[error("{0}")]
    InvalidArgument(String),

    /// Field validation failed; holds one message per failed rule.
    #[error("Validation Error: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Forbidden")]
    Forbidden,

    #[error("Too many requests from this IP, please try again later.")]
    RateLimited,

    #[error("Request body too large")]
    PayloadTooLarge,

    /// Document store I/O or anything unexpected.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn book_not_found() -> Self {
        Self::NotFound("Book not found".to_string())
    }

    pub fn review_not_found() -> Self {
        Self::NotFound("Review not found".to_string())
    }

    pub fn duplicate_isbn() -> Self {
        Self::Conflict("Book with this ISBN already exists".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidArgument(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthRequired => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let mut detail = None;
        let body = match self {
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                detail = Some(ErrorDetail(format!("{:?}", err)));
                ApiResponse::<()>::failure(INTERNAL_MESSAGE)
            }
            ApiError::Validation(details) => {
                tracing::debug!("Validation failed: {:?}", details);
                ApiResponse::<()>::failure("Validation Error").with_details(details)
            }
            other => {
                tracing::debug!("Request failed with {}: {}", status, other);
                ApiResponse::<()>::failure(other.to_string())
            }
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(detail);
        }
        response
    }
}

const INTERNAL_MESSAGE: &str = "Internal Server Error";

/// Full error chain of a masked internal error, carried on the response.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

/// Development-only layer: re-renders masked 500s with their error chain as `stack`.
pub async fn expose_error_details(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<ErrorDetail>() {
        Some(ErrorDetail(stack)) => {
            let body = ApiResponse::<()>::failure(INTERNAL_MESSAGE).with_stack(stack);
            (response.status(), Json(body)).into_response()
        }
        None => response,
    }
}
