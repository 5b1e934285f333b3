//! Domain types for the game catalog.

use serde::Serialize;
use serde_json::{Map, Value};

/// One listed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    /// Lowercased category key (`action`, `puzzle`, ...).
    pub category: String,
    /// Raw filename or absolute URL, from `img` or `image`.
    pub image: Option<String>,
    pub description: Option<String>,
    /// Rating clamped to 0–5, `None` when the document has none.
    pub rating: Option<u8>,
    /// Download counter as display text (`"1.2K"`, `"350"`).
    pub downloads: Option<String>,
}

impl CatalogEntry {
    /// Returns true if the entry belongs to `key`, ignoring case.
    pub fn in_category(&self, key: &str) -> bool {
        self.category == normalize_category(key)
    }

    /// Whether the entry can be shown as a recommendation card.
    pub fn is_listable(&self) -> bool {
        !self.name.trim().is_empty() && self.image.as_deref().is_some_and(|i| !i.is_empty())
    }
}

/// The leading metadata record of a catalog document.
///
/// Holds the raw `info{N}` fields; interpretation is left to
/// [`categories`](crate::categories).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogMetadata {
    pub fields: Map<String, Value>,
}

impl CatalogMetadata {
    /// Returns the metadata field named `key` (e.g. `info2`).
    pub fn info(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Iterates over all `info{N}` fields in key order.
    pub fn info_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter(|(k, _)| k.starts_with("info"))
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// A decoded catalog snapshot.
///
/// Built once per session and shared read-only. An empty catalog stands in
/// for any failed load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub metadata: Option<CatalogMetadata>,
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Returns an empty catalog (no metadata, no entries).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Looks up an entry by exact id.
    pub fn find(&self, id: i64) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Iterates over entries in the given category, ignoring case.
    pub fn in_category<'a>(
        &'a self,
        key: &str,
    ) -> impl Iterator<Item = &'a CatalogEntry> + use<'a> {
        let key = normalize_category(key);
        self.entries.iter().filter(move |e| e.category == key)
    }
}

/// Normalizes a category key for comparison: trimmed and lowercased.
pub fn normalize_category(key: &str) -> String {
    key.trim().to_lowercase()
}
