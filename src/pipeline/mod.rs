//! Extraction pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Per-chunk generation calls through the call scheduler
//! - Error isolation (a chunk's failure is data, not an abort)
//! - Envelope parsing and schema validation of generated output
//! - Aggregation, deduplication, and run metrics

pub mod dedup;
pub mod extract;
pub mod validate;

pub use dedup::{average_confidence, dedup_items, dedup_key};
pub use extract::{Pipeline, ProgressFn};
pub use validate::{parse_items, validate_items};
