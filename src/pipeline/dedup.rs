//! Deduplication of aggregated items across chunks.
//!
//! The dedup key is a heuristic, not exact-duplicate detection: two
//! distinct items that share a description collide on purpose, since
//! the same record often appears in adjacent chunks with minor
//! formatting differences.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Compute the dedup key for an extracted item.
///
/// When the item has a textual `description` field, the key is that
/// value trimmed and lowercased. Otherwise it is a SHA-256 digest of a
/// canonical (recursively key-sorted) serialization of the whole item.
pub fn dedup_key(item: &Value) -> String {
    if let Some(Value::String(description)) = item.get("description") {
        return description.trim().to_lowercase();
    }

    let canonical = canonicalize(item);
    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Drop later duplicates (by [`dedup_key`]), keeping first-seen order.
pub fn dedup_items(items: Vec<Value>) -> Vec<Value> {
    let mut seen: IndexMap<String, Value> = IndexMap::with_capacity(items.len());
    for item in items {
        seen.entry(dedup_key(&item)).or_insert(item);
    }
    seen.into_values().collect()
}

/// Mean of per-item `confidence` fields.
///
/// Returns `None` (omitted, not zero) unless every item carries a
/// numeric `confidence`, or when there are no items.
pub fn average_confidence(items: &[Value]) -> Option<f64> {
    if items.is_empty() {
        return None;
    }

    let mut sum = 0.0;
    for item in items {
        sum += item.get("confidence").and_then(Value::as_f64)?;
    }
    Some(sum / items.len() as f64)
}

/// Recursively sort object keys so serialization is order-independent.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by_key(|(k, _)| k.as_str());

            let mut sorted = Map::with_capacity(entries.len());
            for (key, val) in entries {
                sorted.insert(key.clone(), canonicalize(val));
            }
            Value::Object(sorted)
        }
        Value::Array(values) => Value::Array(values.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
