//! Extractor trait - a named, versionable extraction task definition.

use schemars::schema::RootSchema;

use crate::types::config::ScheduleConfig;

/// A caller-supplied bundle of output shape + prompt construction logic.
///
/// Definitions are plain immutable value objects behind a minimal
/// capability set; no hierarchy is needed since there is exactly one
/// prompt-building operation per definition. Implementations must be
/// safe for concurrent read - one definition may be shared across many
/// pipeline runs (typically as an `Arc<dyn Extractor>`).
pub trait Extractor: Send + Sync {
    /// Stable identifier for this definition (e.g. `"invoice/v2"`).
    fn id(&self) -> &str;

    /// Schema describing one extracted item.
    ///
    /// The pipeline requests generation output conforming to
    /// `{ "items": [ ...this schema ] }`.
    fn output_schema(&self) -> RootSchema;

    /// Build the generation prompt for a piece of input text.
    fn build_prompt(&self, text: &str) -> String;

    /// Scheduler settings for this definition, if it needs its own tuning.
    ///
    /// `None` means the pipeline's default [`ScheduleConfig`] applies.
    fn schedule_override(&self) -> Option<ScheduleConfig> {
        None
    }
}

impl std::fmt::Debug for dyn Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor").field("id", &self.id()).finish()
    }
}
