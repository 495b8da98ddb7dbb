//! Book Data Types
//!
//! The persisted `Book` record, the typed create/patch payloads accepted by the
//! write endpoints, and the query-string shapes of the read endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::validation::{is_valid_isbn, Validator};
use crate::config::PaginationConfig;
use crate::error::{ApiError, ApiResult};
use crate::query::dates::parse_timestamp;
use crate::query::filter::parse_flag;
use crate::query::{BookFilter, BookSort, PageRequest, SortField, SortOrder};
use crate::storage::{serialize_number, Collection, Document};

const TITLE_LEN: (usize, usize) = (2, 200);
const AUTHOR_LEN: (usize, usize) = (2, 100);
const DESCRIPTION_LEN: (usize, usize) = (10, 2000);

const MSG_TITLE_LEN: &str = "Title must be between 2 and 200 characters";
const MSG_AUTHOR_LEN: &str = "Author must be between 2 and 100 characters";
const MSG_DESCRIPTION_LEN: &str = "Description must be between 10 and 2000 characters";
const MSG_PRICE: &str = "Price must be a positive number";
const MSG_GENRE: &str = "Genre must be an array with at least one item";
const MSG_GENRE_ITEM: &str = "Genre items cannot be empty";
const MSG_TAGS: &str = "Tags must be an array with at least one item";
const MSG_TAGS_ITEM: &str = "Tag items cannot be empty";
const MSG_DATE: &str = "Date published must be a valid date";
const MSG_PAGES: &str = "Pages must be a positive integer";
const MSG_IN_STOCK: &str = "InStock must be a boolean";
const MSG_FEATURED: &str = "Featured must be a boolean";

/// A catalog entry as stored in the books document.
///
/// `rating` and `review_count` are derived from the reviews that reference
/// this book and are only written by the rating aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    #[serde(serialize_with = "serialize_number")]
    pub price: f64,
    /// Cover image URL.
    #[serde(default)]
    pub image: String,
    pub isbn: String,
    pub genre: Vec<String>,
    pub tags: Vec<String>,
    /// ISO-8601 date, kept as the client sent it.
    pub date_published: String,
    pub pages: u32,
    pub language: String,
    pub publisher: String,
    #[serde(default, serialize_with = "serialize_number")]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    pub in_stock: bool,
    pub featured: bool,
    /// Fields present in the data file that the API does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document for Book {
    const COLLECTION: Collection = Collection::Books;
}

/// Body of `POST /api/books`. Every field is optional at the wire level so
/// that all missing fields are reported together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub date_published: Option<String>,
    pub pages: Option<i64>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub isbn: String,
    pub genre: Vec<String>,
    pub tags: Vec<String>,
    pub date_published: String,
    pub pages: u32,
    pub language: String,
    pub publisher: String,
    pub in_stock: bool,
    pub featured: bool,
}

impl CreateBookRequest {
    pub fn validate(self) -> ApiResult<NewBook> {
        let mut v = Validator::new();

        let title = v.required_len(self.title, "Title is required", TITLE_LEN, MSG_TITLE_LEN);
        let author = v.required_len(self.author, "Author is required", AUTHOR_LEN, MSG_AUTHOR_LEN);
        let description = v.required_len(
            self.description,
            "Description is required",
            DESCRIPTION_LEN,
            MSG_DESCRIPTION_LEN,
        );

        let price = v.present(self.price, MSG_PRICE);
        v.check(price.is_finite() && price >= 0.0, MSG_PRICE);

        let image = v.required(self.image, "Image URL is required");
        let isbn = v.required(self.isbn, "ISBN is required");
        let genre = v.list(self.genre, MSG_GENRE, MSG_GENRE_ITEM);
        let tags = v.list(self.tags, MSG_TAGS, MSG_TAGS_ITEM);

        let date_published = v.required(self.date_published, MSG_DATE);
        if !date_published.is_empty() {
            v.iso_date(&date_published, MSG_DATE);
        }

        let pages = match self.pages.map(u32::try_from) {
            Some(Ok(p)) if p >= 1 => p,
            _ => {
                v.error(MSG_PAGES);
                0
            }
        };

        let language = v.required(self.language, "Language is required");
        let publisher = v.required(self.publisher, "Publisher is required");
        let in_stock = v.present(self.in_stock, MSG_IN_STOCK);
        let featured = v.present(self.featured, MSG_FEATURED);

        v.finish()?;

        Ok(NewBook {
            title,
            author,
            description,
            price,
            image,
            isbn,
            genre,
            tags,
            date_published,
            pages,
            language,
            publisher,
            in_stock,
            featured,
        })
    }
}

impl NewBook {
    /// Materializes the record with its derived fields zeroed.
    pub fn into_book(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            price: self.price,
            image: self.image,
            isbn: self.isbn,
            genre: self.genre,
            tags: self.tags,
            date_published: self.date_published,
            pages: self.pages,
            language: self.language,
            publisher: self.publisher,
            rating: 0.0,
            review_count: 0,
            in_stock: self.in_stock,
            featured: self.featured,
            extra: Map::new(),
        }
    }
}

/// Body of `PUT /api/books/:id`. Only the fields present are applied; the
/// identity and the derived rating fields cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub date_published: Option<String>,
    pub pages: Option<i64>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
}

impl BookPatch {
    /// Checks the present fields and returns the patch with text trimmed.
    pub fn validate(self) -> ApiResult<Self> {
        let mut v = Validator::new();

        let title = v.optional_len(self.title, TITLE_LEN, MSG_TITLE_LEN);
        let author = v.optional_len(self.author, AUTHOR_LEN, MSG_AUTHOR_LEN);
        let description = v.optional_len(self.description, DESCRIPTION_LEN, MSG_DESCRIPTION_LEN);

        if let Some(price) = self.price {
            v.check(price.is_finite() && price >= 0.0, MSG_PRICE);
        }

        let image = v.optional_non_blank(self.image, "Image URL cannot be empty");

        let isbn = self.isbn.map(|i| i.trim().to_string());
        if let Some(isbn) = &isbn {
            v.check(is_valid_isbn(isbn), "Invalid ISBN format");
        }

        let genre = self.genre.map(|g| v.list(Some(g), MSG_GENRE, MSG_GENRE_ITEM));
        let tags = self.tags.map(|t| v.list(Some(t), MSG_TAGS, MSG_TAGS_ITEM));

        let date_published = self.date_published.map(|d| d.trim().to_string());
        if let Some(date) = &date_published {
            v.iso_date(date, MSG_DATE);
        }

        if let Some(pages) = self.pages {
            v.check(pages >= 1 && u32::try_from(pages).is_ok(), MSG_PAGES);
        }

        let language = v.optional_non_blank(self.language, "Language cannot be empty");
        let publisher = v.optional_non_blank(self.publisher, "Publisher cannot be empty");

        v.finish()?;

        Ok(Self {
            title,
            author,
            description,
            price: self.price,
            image,
            isbn,
            genre,
            tags,
            date_published,
            pages: self.pages,
            language,
            publisher,
            in_stock: self.in_stock,
            featured: self.featured,
        })
    }

    /// Shallow merge: overwrites exactly the fields present in the patch.
    pub fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(description) = self.description {
            book.description = description;
        }
        if let Some(price) = self.price {
            book.price = price;
        }
        if let Some(image) = self.image {
            book.image = image;
        }
        if let Some(isbn) = self.isbn {
            book.isbn = isbn;
        }
        if let Some(genre) = self.genre {
            book.genre = genre;
        }
        if let Some(tags) = self.tags {
            book.tags = tags;
        }
        if let Some(date_published) = self.date_published {
            book.date_published = date_published;
        }
        if let Some(pages) = self.pages.and_then(|p| u32::try_from(p).ok()) {
            book.pages = pages;
        }
        if let Some(language) = self.language {
            book.language = language;
        }
        if let Some(publisher) = self.publisher {
            book.publisher = publisher;
        }
        if let Some(in_stock) = self.in_stock {
            book.in_stock = in_stock;
        }
        if let Some(featured) = self.featured {
            book.featured = featured;
        }
    }
}

/// Raw query string of `GET /api/books`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookListParams {
    pub genre: Option<String>,
    pub author: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub in_stock: Option<String>,
    pub featured: Option<String>,
    pub search: Option<String>,
    pub published_after: Option<String>,
    pub published_before: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A validated `GET /api/books` request.
#[derive(Debug, Clone, PartialEq)]
pub struct BookListQuery {
    pub filter: BookFilter,
    pub sort: Option<BookSort>,
    pub page: PageRequest,
}

impl BookListParams {
    pub fn validate(self, pagination: &PaginationConfig) -> ApiResult<BookListQuery> {
        let mut v = Validator::new();
        let page = validate_page(&mut v, self.page.as_deref(), self.limit.as_deref(), pagination);

        let min_price =
            v.query_non_negative(self.min_price.as_deref(), "minPrice must be a positive number");
        let max_price =
            v.query_non_negative(self.max_price.as_deref(), "maxPrice must be a positive number");

        let published_after = match non_blank(self.published_after) {
            Some(raw) => {
                let parsed = parse_timestamp(&raw);
                v.check(parsed.is_some(), "publishedAfter must be a valid ISO8601 date");
                parsed
            }
            None => None,
        };
        let published_before = match non_blank(self.published_before) {
            Some(raw) => {
                let parsed = parse_timestamp(&raw);
                v.check(parsed.is_some(), "publishedBefore must be a valid ISO8601 date");
                parsed
            }
            None => None,
        };

        let field = match self.sort_by.as_deref() {
            Some(raw) => match raw.parse::<SortField>() {
                Ok(field) => Some(field),
                Err(_) => {
                    v.error("Invalid sortBy field");
                    None
                }
            },
            None => None,
        };
        let order = match self.order.as_deref() {
            Some(raw) => raw.parse::<SortOrder>().unwrap_or_else(|_| {
                v.error("Order must be asc or desc");
                SortOrder::Asc
            }),
            None => SortOrder::Asc,
        };

        v.finish()?;

        Ok(BookListQuery {
            filter: BookFilter {
                genre: non_blank(self.genre),
                author: non_blank(self.author),
                min_price,
                max_price,
                in_stock: self.in_stock.as_deref().map(parse_flag),
                featured: self.featured.as_deref().map(parse_flag),
                search: non_blank(self.search),
                published_after,
                published_before,
            },
            sort: field.map(|field| BookSort { field, order }),
            page,
        })
    }
}

/// Raw query string of `GET /api/books/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl SearchParams {
    /// Returns the trimmed search term and the page to show.
    pub fn validate(self, pagination: &PaginationConfig) -> ApiResult<(String, PageRequest)> {
        let mut v = Validator::new();
        let page = validate_page(&mut v, self.page.as_deref(), self.limit.as_deref(), pagination);

        let Some(q) = non_blank(self.q) else {
            return Err(ApiError::InvalidArgument(
                "Search query (q) is required".to_string(),
            ));
        };

        v.finish()?;
        Ok((q, page))
    }
}

/// Shared `page` / `limit` query validation.
pub fn validate_page(
    v: &mut Validator,
    page: Option<&str>,
    limit: Option<&str>,
    pagination: &PaginationConfig,
) -> PageRequest {
    let max = i64::try_from(pagination.max_limit).unwrap_or(i64::MAX);
    let page = v.query_int(page, 1..=i64::MAX, "Page must be a positive integer");
    let limit = v.query_int(
        limit,
        1..=max,
        &format!("Limit must be between 1 and {}", pagination.max_limit),
    );

    PageRequest::resolve(
        page.and_then(|p| usize::try_from(p).ok()),
        limit.and_then(|l| usize::try_from(l).ok()),
        pagination,
    )
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
