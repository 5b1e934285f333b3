//! Category ordering and display names.
//!
//! The metadata record may carry `info{N}` fields. A sequence value lists
//! category keys in section order; a mapping value maps keys to display
//! names. Deployments pick which `info{N}` drives their menus.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::types::{Catalog, normalize_category};

/// Section order used when the catalog carries no usable ordering.
pub const DEFAULT_CATEGORY_ORDER: [&str; 7] = [
    "action",
    "adventure",
    "racing",
    "puzzle",
    "sports",
    "kids",
    "girl",
];

/// Object fields that may name a category, in priority order.
const CATEGORY_KEY_FIELDS: [&str; 3] = ["category", "name", "key"];

/// Returns the category keys in section order.
///
/// Falls back to [`DEFAULT_CATEGORY_ORDER`] when `info_key` is absent,
/// not a sequence, or normalizes to nothing.
pub fn order(catalog: &Catalog, info_key: &str) -> Vec<String> {
    let defaults: Vec<String> = DEFAULT_CATEGORY_ORDER.iter().map(|k| k.to_string()).collect();
    order_or(catalog, info_key, &defaults)
}

/// Same as [`order`] with a deployment-specific fallback sequence.
pub fn order_or(catalog: &Catalog, info_key: &str, fallback: &[String]) -> Vec<String> {
    let from_metadata = catalog
        .metadata
        .as_ref()
        .and_then(|m| m.info(info_key))
        .and_then(Value::as_array)
        .map(|items| dedup(items.iter().filter_map(item_key)))
        .unwrap_or_default();

    if from_metadata.is_empty() {
        debug!(info_key, "no category order in catalog, using fallback");
        return dedup(fallback.iter().map(|k| normalize_category(k)).filter(|k| !k.is_empty()));
    }

    from_metadata
}

/// Returns display names keyed by lowercase category key.
///
/// Prefers the mapping stored under `info_key`; otherwise the first
/// `info{N}` field holding a mapping. Empty when none exists.
pub fn display_names(catalog: &Catalog, info_key: &str) -> HashMap<String, String> {
    let Some(metadata) = catalog.metadata.as_ref() else {
        return HashMap::new();
    };

    let mapping = metadata
        .info(info_key)
        .and_then(Value::as_object)
        .or_else(|| metadata.info_fields().find_map(|(_, v)| v.as_object()));

    mapping
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| {
                    let name = v.as_str()?.trim();
                    let key = normalize_category(k);
                    (!name.is_empty() && !key.is_empty()).then(|| (key, name.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Returns the display name for `key`, capitalizing the key when unnamed.
pub fn display_name(names: &HashMap<String, String>, key: &str) -> String {
    let key = normalize_category(key);
    if let Some(name) = names.get(&key) {
        return name.clone();
    }
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalizes one ordering item to a category key.
fn item_key(item: &Value) -> Option<String> {
    let raw = match item {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => CATEGORY_KEY_FIELDS
            .iter()
            .find_map(|field| obj.get(*field).and_then(Value::as_str))?,
        _ => return None,
    };
    let key = normalize_category(raw);
    (!key.is_empty()).then_some(key)
}

fn dedup(keys: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for key in keys {
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}
