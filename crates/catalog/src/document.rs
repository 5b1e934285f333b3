//! Catalog document decoding.
//!
//! The remote document is a JSON array. Its first element may be a metadata
//! record (`info{N}` keys) instead of a game; that is decided here, once,
//! and the result is an explicit [`Catalog`] envelope so no consumer ever
//! has to sniff element shapes again.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::types::{Catalog, CatalogEntry, CatalogMetadata, normalize_category};

/// Highest rating a game can carry.
pub const MAX_RATING: u8 = 5;

/// Fields every game record carries. A leading object missing any of them
/// is the metadata record.
const REQUIRED_ENTRY_FIELDS: [&str; 2] = ["id", "name"];

/// Game record as it appears in the document (internal).
#[derive(Debug, Deserialize)]
struct RawEntry {
    id: RawId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    img: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    rating: Option<RawNumber>,
    #[serde(default)]
    downloads: Option<RawNumber>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(serde_json::Number),
    Text(String),
}

impl RawId {
    fn to_id(&self) -> Option<i64> {
        match self {
            RawId::Int(n) => Some(*n),
            RawId::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            RawId::Float(_) => None,
            RawId::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl RawNumber {
    fn as_f64(&self) -> Option<f64> {
        match self {
            RawNumber::Number(n) => n.as_f64(),
            RawNumber::Text(s) => s.trim().parse().ok(),
        }
    }

    fn display(&self) -> Option<String> {
        let text = match self {
            RawNumber::Number(n) => n.to_string(),
            RawNumber::Text(s) => s.trim().to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Decodes a catalog document from raw bytes.
pub fn decode(bytes: &[u8]) -> Result<Catalog, CatalogError> {
    let value: Value = serde_json::from_slice(bytes)?;
    decode_value(value)
}

/// Decodes an already-parsed catalog document.
///
/// Elements that are not valid game records are skipped; entries repeating an
/// earlier id are dropped.
pub fn decode_value(value: Value) -> Result<Catalog, CatalogError> {
    let Value::Array(mut items) = value else {
        return Err(CatalogError::Format(format!(
            "expected a JSON array, got {}",
            kind_of(&value)
        )));
    };

    let metadata = match items.first() {
        Some(Value::Object(obj)) if is_metadata(obj) => match items.remove(0) {
            Value::Object(fields) => Some(CatalogMetadata { fields }),
            _ => None,
        },
        _ => None,
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let Some(entry) = decode_entry(item, index) else {
            continue;
        };
        if !seen.insert(entry.id) {
            warn!(id = entry.id, "duplicate catalog id, keeping first occurrence");
            continue;
        }
        entries.push(entry);
    }

    Ok(Catalog { metadata, entries })
}

/// Returns true if a leading object is a metadata record rather than a game.
fn is_metadata(obj: &Map<String, Value>) -> bool {
    REQUIRED_ENTRY_FIELDS
        .iter()
        .any(|field| obj.get(*field).is_none_or(Value::is_null))
}

fn decode_entry(item: Value, index: usize) -> Option<CatalogEntry> {
    let raw: RawEntry = match serde_json::from_value(item) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(index, error = %e, "skipping undecodable catalog element");
            return None;
        }
    };

    let Some(id) = raw.id.to_id() else {
        debug!(index, "skipping catalog element with non-integer id");
        return None;
    };

    let name = raw.name.map(|n| n.trim().to_string()).unwrap_or_default();
    if name.is_empty() {
        debug!(index, id, "skipping catalog element without a name");
        return None;
    }

    let image = raw
        .img
        .or(raw.image)
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty());

    let description = raw
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Some(CatalogEntry {
        id,
        name,
        category: raw
            .category
            .as_deref()
            .map(normalize_category)
            .unwrap_or_default(),
        image,
        description,
        rating: raw.rating.as_ref().and_then(RawNumber::as_f64).map(clamp_rating),
        downloads: raw.downloads.as_ref().and_then(RawNumber::display),
    })
}

/// Rounds and clamps a rating into `0..=MAX_RATING`.
pub fn clamp_rating(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, f64::from(MAX_RATING)) as u8
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
