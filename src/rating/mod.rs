//! Rating Aggregation Module
//!
//! Maintains each book's derived `rating` (mean of its reviews' ratings) and
//! `reviewCount` whenever a review is created, updated or deleted.
//!
//! ## Policies
//! - **Incremental** (`RatingUpdate::NewReview`): used on review creation. Folds the new
//!   rating into the running mean without reading the reviews collection.
//! - **Full recompute** (`RatingUpdate::Recompute`): used on review update and delete.
//!   The previous contribution of the changed review is unknown here, so every review
//!   of the book is reloaded and the mean is rebuilt from scratch.
//!
//! Both policies load the books collection, mutate one record and save the whole
//! collection back. A `book_id` that no longer resolves is skipped silently (with a
//! warning in the log); reviews orphaned by a book deletion are not reconciled.

pub mod aggregator;

pub use aggregator::{RatingAggregator, RatingUpdate};

#[cfg(test)]
mod tests;
