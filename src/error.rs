//! Typed errors for the extraction orchestration library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Every failure crossing a
//! public boundary is an [`ExtractError`], so callers only ever handle
//! one failure shape.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Case-insensitive markers that classify a failure as throttling.
///
/// Different backends phrase "slow down" differently; this list is the
/// single source of truth for the classification and is reused by every
/// caller, including generator adapters.
pub const THROTTLE_MARKERS: &[&str] = &[
    "429",
    "rate limit",
    "rate_limit",
    "quota",
    "too many requests",
];

/// Check whether an error message signals throttling.
///
/// Matching is case-insensitive substring search over [`THROTTLE_MARKERS`].
pub fn is_throttling_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    THROTTLE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// A single schema violation found while validating generated output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    /// Path to the offending value (e.g. `items[2].name`)
    pub path: String,

    /// Human-readable description of the violation
    pub message: String,
}

impl SchemaViolation {
    /// Create a new violation.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur during extraction operations.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The generation capability reported throttling and retries were exhausted
    #[error("throttled after {attempts} attempts (next backoff would be {retry_after_ms}ms)")]
    Throttled {
        /// Attempts made before giving up
        attempts: u32,
        /// The backoff that would have preceded the next attempt
        retry_after_ms: u64,
    },

    /// API credential not present in the environment
    #[error("missing API credential: {var} is not set")]
    AuthMissing {
        /// Environment variable that was consulted
        var: String,
    },

    /// API credential present but unusable
    #[error("invalid API credential: {reason}")]
    AuthInvalid {
        /// Why the credential was rejected
        reason: String,
    },

    /// Generated output did not conform to the requested schema
    #[error("schema mismatch: {}", format_violations(.violations))]
    SchemaMismatch {
        /// Individual violations, with paths into the output
        violations: Vec<SchemaViolation>,
    },

    /// Generated output could not be parsed at all
    #[error("unparseable output: {message}")]
    UnparseableOutput {
        /// Parser diagnostic
        message: String,
    },

    /// The generation call timed out
    #[error("generation call timed out after {elapsed_ms}ms")]
    Timeout {
        /// Wall-clock time spent before giving up
        elapsed_ms: u64,
    },

    /// Caller supplied a malformed request
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the request
        reason: String,
    },

    /// No extractor definition registered under the given identifier
    #[error("no extractor definition registered for '{id}'")]
    DefinitionNotFound {
        /// The identifier that was looked up
        id: String,
    },

    /// Transport-level failure reaching the generation capability
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Operation was cancelled by the caller
    #[error("operation cancelled")]
    Cancelled,

    /// Anything the taxonomy cannot classify further
    #[error("unknown error: {0}")]
    Unknown(String),
}

fn format_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.path, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Stable discriminant for [`ExtractError`], recorded in per-chunk outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Throttled,
    AuthMissing,
    AuthInvalid,
    SchemaMismatch,
    UnparseableOutput,
    Timeout,
    InvalidInput,
    DefinitionNotFound,
    TransportError,
    Cancelled,
    Unknown,
}

impl ExtractError {
    /// The stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Throttled { .. } => ErrorKind::Throttled,
            Self::AuthMissing { .. } => ErrorKind::AuthMissing,
            Self::AuthInvalid { .. } => ErrorKind::AuthInvalid,
            Self::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            Self::UnparseableOutput { .. } => ErrorKind::UnparseableOutput,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::DefinitionNotFound { .. } => ErrorKind::DefinitionNotFound,
            Self::Transport(_) => ErrorKind::TransportError,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Whether the scheduler should retry this failure with backoff.
    ///
    /// Only rate-limit signals are retried; arbitrary errors abort
    /// immediately so real defects are not masked. A typed `Throttled`
    /// value is always throttling; for everything else the rendered
    /// message is checked against [`THROTTLE_MARKERS`].
    pub fn is_throttling(&self) -> bool {
        match self {
            Self::Throttled { .. } => true,
            other => is_throttling_message(&other.to_string()),
        }
    }
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
