//! Query Pipeline Module
//!
//! Pure functions that turn a loaded collection into the slice a client asked for.
//! Nothing here touches the document store; repositories load a collection and
//! pass it through the pipeline.
//!
//! ## Pipeline Order
//! 1. **Filter**: conjunctive predicates across fields (`filter`). Free-text search
//!    is itself a disjunction over title, author, description and tags.
//! 2. **Sort**: optional, stable, by price, rating, publication date or title (`sort`).
//! 3. **Paginate**: 1-based pages with a clamped limit; out-of-range pages are empty
//!    rather than an error (`pagination`).
//!
//! ## Submodules
//! - **`dates`**: ISO-8601 parsing shared by range filters, review ordering and validation.
//! - **`filter`**: `BookFilter` and `ReviewFilter` predicate sets.
//! - **`sort`**: sort keys, text/number comparison and the top-rated ranking.
//! - **`pagination`**: `PageRequest`, `PaginationMeta` and `paginate`.

pub mod dates;
pub mod filter;
pub mod pagination;
pub mod sort;

pub use filter::{BookFilter, ReviewFilter};
pub use pagination::{paginate, Page, PageRequest, PaginationMeta};
pub use sort::{BookSort, SortField, SortOrder};

#[cfg(test)]
mod tests;
