//! Structured Extraction Orchestration Library
//!
//! A schema-driven library that extracts structured records from
//! unstructured text by repeatedly invoking a remote text-generation
//! capability, validating its output, and aggregating results across
//! document chunks.
//!
//! # Design Philosophy
//!
//! - The generation call is opaque: "prompt + schema in, validated
//!   items out, or a typed failure"
//! - Rate limiting and throttling retries live in one scheduler, not
//!   scattered across callers
//! - A chunk's failure is data, not an abort: every run completes with
//!   a report saying which chunks succeeded and why the rest failed
//! - Library handles mechanics, app handles semantics (prompts and
//!   schemas are caller-supplied definitions)
//!
//! # Usage
//!
//! ```rust,ignore
//! use structex::{chunker, Pipeline};
//!
//! let pipeline = Pipeline::new(generator);
//! let chunks = chunker::split_by_delimiter(&document, "\n---PAGE---\n");
//!
//! let report = pipeline.extract_from_chunks(&chunks, &*extractor).await?;
//! for outcome in report.failed_outcomes() {
//!     eprintln!("chunk {} failed: {:?}", outcome.chunk_index, outcome.error);
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (Extractor, Generator)
//! - [`types`] - Chunks, configs, outcomes, reports
//! - [`scheduler`] - Call spacing and throttling retries
//! - [`chunker`] - Delimiter- and size-based text splitting
//! - [`pipeline`] - The multi-chunk extraction pipeline
//! - [`registry`] - Named extractor definitions
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod chunker;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod scheduler;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{is_throttling_message, ErrorKind, ExtractError, SchemaViolation, THROTTLE_MARKERS};
pub use registry::ExtractorRegistry;
pub use scheduler::{CallScheduler, ScheduleMetrics};
pub use traits::{Extractor, Generator};
pub use types::{
    chunk::Chunk,
    config::{PipelineConfig, ScheduleConfig, DEFAULT_MAX_RETRIES, DEFAULT_MIN_INTERVAL_MS},
    outcome::{ChunkOutcome, ExtractionMetrics, ExtractionReport},
};

// Re-export the pipeline entry point
pub use pipeline::{Pipeline, ProgressFn};

// Re-export chunker functions
pub use chunker::{split_by_delimiter, split_by_size};

// Re-export credential handling
pub use security::{ApiCredentials, SecretString};
