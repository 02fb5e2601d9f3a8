//! Per-chunk outcomes and the aggregate extraction report.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorKind, ExtractError};

/// Outcome of one chunk's extraction call, created once and immutable after.
///
/// Held in the final report for diagnostics; error fields are present
/// exactly when `success` is false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkOutcome {
    /// 1-based index of the chunk this outcome describes
    pub chunk_index: usize,

    /// Extracted records, in the order the generator produced them
    pub items: Vec<Value>,

    /// Whether the chunk's extraction call succeeded
    pub success: bool,

    /// Rendered failure message, present iff `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Failure kind, present iff `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ChunkOutcome {
    /// Record a successful chunk.
    pub fn success(chunk_index: usize, items: Vec<Value>) -> Self {
        Self {
            chunk_index,
            items,
            success: true,
            error: None,
            error_kind: None,
        }
    }

    /// Record a failed chunk, converting the failure to data.
    pub fn failure(chunk_index: usize, error: &ExtractError) -> Self {
        Self {
            chunk_index,
            items: Vec::new(),
            success: false,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

/// Summary metrics for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMetrics {
    /// Number of items after deduplication
    pub total_items: usize,

    /// Number of items aggregated before deduplication
    pub items_before_dedup: usize,

    /// Wall-clock duration of the run in milliseconds
    pub processing_time_ms: u64,

    /// Mean of per-item `confidence` fields.
    ///
    /// Present only when every aggregated item carries a numeric
    /// `confidence`; omitted (not zero) otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_confidence: Option<f64>,
}

/// Result of a multi-chunk extraction run, created once at completion.
///
/// A run always completes with a report describing which chunks succeeded
/// and failed; deciding whether a non-zero failure count constitutes
/// overall failure is the caller's call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Deduplicated items across all chunks, first-seen order
    pub items: Vec<Value>,

    /// Total chunks the run attempted
    pub chunks_processed: usize,

    /// Chunks whose extraction call failed
    pub chunks_failed: usize,

    /// One outcome per chunk, in chunk order
    pub outcomes: Vec<ChunkOutcome>,

    /// Run-level metrics
    pub metrics: ExtractionMetrics,
}

impl ExtractionReport {
    /// Whether every chunk succeeded.
    pub fn is_complete(&self) -> bool {
        self.chunks_failed == 0
    }

    /// Outcomes for chunks that failed.
    pub fn failed_outcomes(&self) -> impl Iterator<Item = &ChunkOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }
}
