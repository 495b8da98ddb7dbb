//! Bookstore Catalog API Library
//!
//! A REST service for a bookstore catalog (books and their reviews) persisted as two
//! flat JSON documents. The binary (`main.rs`) loads the configuration, prepares the
//! data files and serves the router built by [`api::build_router`].
//!
//! ## Architecture Modules
//! - **`storage`**: the document store. Loads and saves a whole collection per call.
//! - **`query`**: pure filter/sort/paginate pipeline applied to loaded collections.
//! - **`rating`**: keeps each book's `rating` and `reviewCount` consistent with its reviews.
//! - **`books`**: book repository and handlers (ISBN uniqueness, search, top-rated).
//! - **`reviews`**: review repository and handlers (book existence check, rating upkeep).
//! - **`api`**: router, envelopes, validation, token auth and request logging.
//! - **`config`** / **`error`**: startup configuration and the error taxonomy.
//!
//! ## Concurrency
//! Requests are served concurrently and every write is load-mutate-save of a whole file
//! with no locking. Two writes to the same collection that interleave can lose one of
//! the updates. This is a known limitation of the flat-file store.

pub mod api;
pub mod books;
pub mod config;
pub mod error;
pub mod query;
pub mod rating;
pub mod reviews;
pub mod storage;
