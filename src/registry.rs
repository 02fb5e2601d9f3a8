//! Registry of named extractor definitions.
//!
//! Lets thin transport layers resolve a definition by identifier and
//! surface a typed failure when the identifier is unknown.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ExtractError, Result};
use crate::traits::Extractor;

/// A read-mostly map of extractor definitions keyed by their id.
///
/// Definitions are held as `Arc<dyn Extractor>` so one registration can
/// be shared across many concurrent pipeline runs.
#[derive(Default)]
pub struct ExtractorRegistry {
    entries: HashMap<String, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its own id, replacing any previous
    /// registration with the same id.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        self.entries.insert(extractor.id().to_string(), extractor);
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &str) -> Result<Arc<dyn Extractor>> {
        self.entries
            .get(id)
            .cloned()
            .ok_or_else(|| ExtractError::DefinitionNotFound { id: id.to_string() })
    }

    /// Whether a definition is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Registered identifiers, in no particular order.
    pub fn ids(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
