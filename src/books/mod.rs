//! Book Catalog Module
//!
//! CRUD and read-side queries over the books collection.
//!
//! ## Responsibilities
//! - **Uniqueness**: no two books share an ISBN, on create and on ISBN-changing updates.
//! - **Reads**: filtered/sorted/paginated listing, featured list, top-rated ranking
//!   (`rating * reviewCount`, top 10) and a dedicated free-text search.
//! - **Writes**: create (derived rating fields start at zero), shallow patch, delete.
//!   Deleting a book does not touch the reviews that reference it.
//!
//! ## Submodules
//! - **`types`**: the `Book` record, create/patch payloads and query-string shapes.
//! - **`repository`**: `BookRepository`, the load-mutate-save operations.
//! - **`handlers`**: axum handlers for the `/books` routes.

pub mod handlers;
pub mod repository;
pub mod types;
