use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use super::repository::ReviewRepository;
use super::types::{CreateReviewRequest, Review, ReviewListParams, ReviewPatchRequest};
use crate::api::response::{ApiResponse, PaginatedResponse};
use crate::books::handlers::invalid_body;
use crate::config::Config;
use crate::error::ApiResult;

pub async fn handle_list_reviews(
    Extension(reviews): Extension<Arc<ReviewRepository>>,
    Extension(config): Extension<Arc<Config>>,
    Query(params): Query<ReviewListParams>,
) -> ApiResult<Json<PaginatedResponse<Review>>> {
    let query = params.validate(&config.pagination)?;
    Ok(Json(reviews.list(&query).await?.into()))
}

pub async fn handle_get_review(
    Extension(reviews): Extension<Arc<ReviewRepository>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Review>>> {
    Ok(Json(ApiResponse::ok(reviews.get_by_id(id.trim()).await?)))
}

/// `GET /api/reviews/book/:bookId`
pub async fn handle_reviews_by_book(
    Extension(reviews): Extension<Arc<ReviewRepository>>,
    Path(book_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Review>>>> {
    Ok(Json(ApiResponse::ok(
        reviews.list_by_book(book_id.trim()).await?,
    )))
}

pub async fn handle_create_review(
    Extension(reviews): Extension<Arc<ReviewRepository>>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let Json(request) = payload.map_err(invalid_body)?;
    let review = reviews.create(request.validate()?).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(review).with_message("Review created successfully")),
    ))
}

pub async fn handle_update_review(
    Extension(reviews): Extension<Arc<ReviewRepository>>,
    Path(id): Path<String>,
    payload: Result<Json<ReviewPatchRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Review>>> {
    let Json(request) = payload.map_err(invalid_body)?;
    let review = reviews.update(id.trim(), request.validate()?).await?;

    Ok(Json(
        ApiResponse::ok(review).with_message("Review updated successfully"),
    ))
}

pub async fn handle_delete_review(
    Extension(reviews): Extension<Arc<ReviewRepository>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    reviews.delete(id.trim()).await?;
    Ok(Json(ApiResponse::message("Review deleted successfully")))
}
