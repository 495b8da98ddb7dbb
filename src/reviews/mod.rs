//! Reviews Module
//!
//! CRUD over the reviews collection.
//!
//! A review may only be created for a book that exists at that moment; afterwards the
//! `bookId` is a weak reference. Every write hands off to the rating aggregator:
//! creation folds the new rating in incrementally, while a rating change or a deletion
//! triggers a full recompute for the review's book. Listings are always newest first.
//!
//! ## Submodules
//! - **`types`**: the `Review` record, create/patch payloads and list query.
//! - **`repository`**: `ReviewRepository`, including the referential check.
//! - **`handlers`**: axum handlers for the `/reviews` routes.

pub mod handlers;
pub mod repository;
pub mod types;
