//! Document Store Module
//!
//! Persists the catalog as two flat JSON documents, one per collection:
//! `{"books": [...]}` and `{"reviews": [...]}`.
//!
//! ## Core Concepts
//! - **Whole-file I/O**: `load` reads and parses the complete document, `save` serializes
//!   the complete array and overwrites the file. There is no partial write and no index.
//! - **Faithful rewrites**: records keep their field order and any fields the API does
//!   not model, so a load/save cycle leaves untouched records byte-for-byte stable.
//! - **Typed collections**: record types implement [`store::Document`] to name the
//!   collection they live in, so callers write `store.load::<Book>()`.
//! - **No concurrency control**: no locks, transactions or version tokens. Two requests
//!   that interleave their load/save against the same file can lose an update.

pub mod store;

pub use store::{generate_id, serialize_number, Collection, Document, DocumentStore};
