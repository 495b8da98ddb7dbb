//! Review Data Types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::validation::Validator;
use crate::books::types::{non_blank, validate_page};
use crate::config::PaginationConfig;
use crate::error::ApiResult;
use crate::query::filter::parse_flag;
use crate::query::{PageRequest, ReviewFilter};
use crate::storage::{Collection, Document};

const AUTHOR_LEN: (usize, usize) = (2, 100);
const TITLE_LEN: (usize, usize) = (2, 200);
const COMMENT_LEN: (usize, usize) = (10, 2000);

const MSG_AUTHOR_LEN: &str = "Author name must be between 2 and 100 characters";
const MSG_TITLE_LEN: &str = "Title must be between 2 and 200 characters";
const MSG_COMMENT_LEN: &str = "Comment must be between 10 and 2000 characters";
const MSG_RATING: &str = "Rating must be an integer between 1 and 5";

/// A review as stored in the reviews document.
///
/// `book_id` is a weak reference: it is checked when the review is created
/// and never again, so deleting the book leaves the review in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub book_id: String,
    pub author: String,
    /// 1 to 5.
    pub rating: u8,
    pub title: String,
    pub comment: String,
    /// RFC 3339 creation time; never changes after creation.
    pub timestamp: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document for Review {
    const COLLECTION: Collection = Collection::Reviews;
}

/// Body of `POST /api/reviews`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub book_id: Option<String>,
    pub author: Option<String>,
    pub rating: Option<i64>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub book_id: String,
    pub author: String,
    pub rating: u8,
    pub title: String,
    pub comment: String,
    pub verified: bool,
}

impl CreateReviewRequest {
    pub fn validate(self) -> ApiResult<NewReview> {
        let mut v = Validator::new();

        let book_id = v.required(self.book_id, "Book ID is required");
        let author = v.required_len(
            self.author,
            "Author name is required",
            AUTHOR_LEN,
            MSG_AUTHOR_LEN,
        );
        let rating = match self.rating {
            Some(_) => validate_rating(&mut v, self.rating).unwrap_or_default(),
            None => {
                v.error(MSG_RATING);
                0
            }
        };
        let title = v.required_len(self.title, "Review title is required", TITLE_LEN, MSG_TITLE_LEN);
        let comment = v.required_len(
            self.comment,
            "Review comment is required",
            COMMENT_LEN,
            MSG_COMMENT_LEN,
        );

        v.finish()?;

        Ok(NewReview {
            book_id,
            author,
            rating,
            title,
            comment,
            verified: self.verified.unwrap_or(false),
        })
    }
}

impl NewReview {
    pub fn into_review(self, id: String, timestamp: String) -> Review {
        Review {
            id,
            book_id: self.book_id,
            author: self.author,
            rating: self.rating,
            title: self.title,
            comment: self.comment,
            timestamp,
            verified: self.verified,
            extra: Map::new(),
        }
    }
}

/// Body of `PUT /api/reviews/:id`. A review cannot be moved to another book,
/// and its id and timestamp are fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatchRequest {
    pub author: Option<String>,
    pub rating: Option<i64>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub verified: Option<bool>,
}

/// A validated review patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    pub author: Option<String>,
    pub rating: Option<u8>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub verified: Option<bool>,
}

impl ReviewPatchRequest {
    pub fn validate(self) -> ApiResult<ReviewPatch> {
        let mut v = Validator::new();

        let author = v.optional_len(self.author, AUTHOR_LEN, MSG_AUTHOR_LEN);
        let rating = validate_rating(&mut v, self.rating);
        let title = v.optional_len(self.title, TITLE_LEN, MSG_TITLE_LEN);
        let comment = v.optional_len(self.comment, COMMENT_LEN, MSG_COMMENT_LEN);

        v.finish()?;

        Ok(ReviewPatch {
            author,
            rating,
            title,
            comment,
            verified: self.verified,
        })
    }
}

impl ReviewPatch {
    /// Shallow merge. Returns the previous rating when the patch changed it.
    pub fn apply(self, review: &mut Review) -> Option<u8> {
        if let Some(author) = self.author {
            review.author = author;
        }
        if let Some(title) = self.title {
            review.title = title;
        }
        if let Some(comment) = self.comment {
            review.comment = comment;
        }
        if let Some(verified) = self.verified {
            review.verified = verified;
        }

        match self.rating {
            Some(rating) if rating != review.rating => {
                let previous = review.rating;
                review.rating = rating;
                Some(previous)
            }
            _ => None,
        }
    }
}

fn validate_rating(v: &mut Validator, rating: Option<i64>) -> Option<u8> {
    let rating = rating?;
    match u8::try_from(rating) {
        Ok(r) if (1..=5).contains(&r) => Some(r),
        _ => {
            v.error(MSG_RATING);
            None
        }
    }
}

/// Raw query string of `GET /api/reviews`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListParams {
    pub book_id: Option<String>,
    pub min_rating: Option<String>,
    pub verified: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewListQuery {
    pub filter: ReviewFilter,
    pub page: PageRequest,
}

impl ReviewListParams {
    pub fn validate(self, pagination: &PaginationConfig) -> ApiResult<ReviewListQuery> {
        let mut v = Validator::new();
        let page = validate_page(&mut v, self.page.as_deref(), self.limit.as_deref(), pagination);
        let min_rating = v.query_int(
            self.min_rating.as_deref(),
            1..=5,
            "minRating must be between 1 and 5",
        );

        v.finish()?;

        Ok(ReviewListQuery {
            filter: ReviewFilter {
                book_id: non_blank(self.book_id),
                min_rating: min_rating.and_then(|r| u8::try_from(r).ok()),
                verified: self.verified.as_deref().map(parse_flag),
            },
            page,
        })
    }
}
