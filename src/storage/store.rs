use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::config::DataConfig;

/// The two top-level arrays the store knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Books,
    Reviews,
}

impl Collection {
    /// Name of the array field inside the document (`{"books": [...]}`).
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Books => "books",
            Collection::Reviews => "reviews",
        }
    }
}

/// A record type that lives in exactly one collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;
}

/// Flat-file JSON document store.
///
/// Every `load` reads the whole file and every `save` rewrites it. There is
/// no locking: two writers that interleave load/save will lose one update.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    books_path: PathBuf,
    reviews_path: PathBuf,
}

impl DocumentStore {
    pub fn new(data: &DataConfig) -> Self {
        Self {
            books_path: data.books_path.clone(),
            reviews_path: data.reviews_path.clone(),
        }
    }

    pub fn path(&self, collection: Collection) -> &Path {
        match collection {
            Collection::Books => &self.books_path,
            Collection::Reviews => &self.reviews_path,
        }
    }

    /// Creates any missing document as an empty collection.
    ///
    /// Existing files are left untouched.
    pub async fn ensure_initialized(&self) -> Result<()> {
        for collection in [Collection::Books, Collection::Reviews] {
            let path = self.path(collection);
            let exists = tokio::fs::try_exists(path)
                .await
                .with_context(|| format!("Failed to stat {}", path.display()))?;

            if exists {
                continue;
            }

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }

            self.write_document(collection, &[] as &[Value]).await?;
            tracing::info!(
                "Initialized empty {} collection at {}",
                collection.name(),
                path.display()
            );
        }

        Ok(())
    }

    pub async fn load<T: Document>(&self) -> Result<Vec<T>> {
        let collection = T::COLLECTION;
        let path = self.path(collection);

        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file {}", path.display()))?;

        let mut document: Map<String, Value> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse file {}", path.display()))?;

        let items = document.remove(collection.name()).with_context(|| {
            format!(
                "File {} has no \"{}\" array",
                path.display(),
                collection.name()
            )
        })?;

        let items: Vec<T> = serde_json::from_value(items).with_context(|| {
            format!(
                "Malformed {} collection in {}",
                collection.name(),
                path.display()
            )
        })?;

        tracing::debug!("Loaded {} {}", items.len(), collection.name());
        Ok(items)
    }

    /// Rewrites the collection's document with `items`.
    ///
    /// Records are serialized field by field in declaration order, followed by
    /// any fields they carried through from the file.
    pub async fn save<T: Document>(&self, items: &[T]) -> Result<()> {
        let collection = T::COLLECTION;
        self.write_document(collection, items).await?;
        tracing::debug!("Saved {} {}", items.len(), collection.name());
        Ok(())
    }

    async fn write_document<T: Serialize>(
        &self,
        collection: Collection,
        items: &[T],
    ) -> Result<()> {
        let path = self.path(collection);

        let document = DocumentBody {
            name: collection.name(),
            items,
        };
        let body = serde_json::to_string_pretty(&document)
            .with_context(|| format!("Failed to serialize {}", collection.name()))?;

        tokio::fs::write(path, body)
            .await
            .with_context(|| format!("Failed to write file {}", path.display()))
    }
}

/// `{"<name>": [items...]}`, serialized straight from the borrowed slice.
struct DocumentBody<'a, T> {
    name: &'static str,
    items: &'a [T],
}

impl<T: Serialize> Serialize for DocumentBody<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(std::iter::once((self.name, self.items)))
    }
}

/// Writes whole numbers without a fractional part (`10`, not `10.0`), the way
/// the data files are written by hand and by other JSON tools.
pub fn serialize_number<S: Serializer>(
    value: &f64,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    if value.fract() == 0.0 && value.abs() < MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// `<prefix>-<unix-ms>-<7 random base-16 chars>`, e.g. `book-1718000000000-3f9a1c2`.
pub fn generate_id(prefix: &str) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, crate::query::dates::now_ms(), &random[..7])
}
