//! Generator trait - the opaque text-generation capability.

use async_trait::async_trait;
use schemars::schema::RootSchema;
use serde_json::Value;

use crate::error::Result;

/// The remote generation capability consumed by the pipeline.
///
/// Implementations wrap a specific LLM provider and handle transport,
/// model selection, and token limits. The pipeline only needs one
/// operation: produce JSON conforming to the requested schema, or fail
/// with an [`ExtractError`](crate::error::ExtractError).
///
/// Adapters for backends without a typed throttling signal should
/// surface provider errors with their original message intact, so the
/// scheduler's [marker-based classification](crate::error::THROTTLE_MARKERS)
/// can recognize rate limiting. Backends that do report throttling in a
/// typed way should map it to `ExtractError::Throttled` directly.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate JSON output for the prompt, conforming to `schema`.
    ///
    /// The pipeline always requests an envelope of the form
    /// `{ "items": [...] }`; the returned value is parsed and validated
    /// by the caller.
    async fn generate(&self, prompt: &str, schema: &RootSchema, temperature: f32)
        -> Result<Value>;
}
