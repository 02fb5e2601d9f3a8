//! Chunk type - a bounded slice of input text processed by one extraction call.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A bounded slice of input text, immutable once produced.
///
/// Chunks are created by the [chunker](crate::chunker) or directly by the
/// caller, and consumed exactly once by the pipeline. Indices are 1-based
/// and must be unique and strictly increasing within one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk's text content
    pub content: String,

    /// 1-based ordinal within the source document
    pub index: usize,

    /// Opaque key-value bag carried through to diagnostics
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(content: impl Into<String>, index: usize) -> Self {
        Self {
            content: content.into(),
            index,
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Character count of the content (Unicode scalar values, not bytes).
    pub fn len_chars(&self) -> usize {
        self.content.chars().count()
    }
}
