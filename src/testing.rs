//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the pipeline
//! without making real generation calls.

use async_trait::async_trait;
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, RwLock};

use crate::error::{ExtractError, Result};
use crate::traits::{Extractor, Generator};
use crate::types::config::ScheduleConfig;

/// A mock generation capability for testing.
///
/// Responses are keyed by prompt substring; failure rules take
/// precedence over responses, and unknown prompts get an empty items
/// envelope. All calls are recorded for assertions.
#[derive(Default)]
pub struct MockGenerator {
    /// Substring-keyed envelope responses
    responses: Arc<RwLock<Vec<(String, Value)>>>,

    /// Substring-keyed failure messages
    failures: Arc<RwLock<Vec<(String, String)>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockGeneratorCall>>>,
}

/// Record of a call made to the mock generator.
#[derive(Debug, Clone)]
pub struct MockGeneratorCall {
    /// The full prompt that was passed
    pub prompt: String,

    /// The sampling temperature that was passed
    pub temperature: f32,
}

impl MockGenerator {
    /// Create a new mock generator with default behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `items` for prompts containing `needle`.
    pub fn with_items(self, needle: impl Into<String>, items: Vec<Value>) -> Self {
        self.responses
            .write()
            .unwrap()
            .push((needle.into(), json!({ "items": items })));
        self
    }

    /// Respond with a raw (possibly malformed) value for prompts
    /// containing `needle`.
    pub fn with_raw_response(self, needle: impl Into<String>, value: Value) -> Self {
        self.responses.write().unwrap().push((needle.into(), value));
        self
    }

    /// Fail prompts containing `needle` with the given message.
    ///
    /// The failure surfaces as `ExtractError::Unknown`, so throttling
    /// behavior can be scripted by using a message the marker list
    /// matches (e.g. `"429"`).
    pub fn with_failure(self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures
            .write()
            .unwrap()
            .push((needle.into(), message.into()));
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockGeneratorCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _schema: &RootSchema,
        temperature: f32,
    ) -> Result<Value> {
        self.calls.write().unwrap().push(MockGeneratorCall {
            prompt: prompt.to_string(),
            temperature,
        });

        if let Some((_, message)) = self
            .failures
            .read()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle))
        {
            return Err(ExtractError::Unknown(message.clone()));
        }

        Ok(self
            .responses
            .read()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle))
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| json!({ "items": [] })))
    }
}

/// The item shape produced by [`MockExtractor`].
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MockRecord {
    /// What was extracted
    pub description: String,

    /// Optional confidence in the extraction
    pub confidence: Option<f64>,
}

/// A minimal extractor definition for testing.
///
/// The prompt embeds the input text, so [`MockGenerator`] needles can
/// match on chunk content.
pub struct MockExtractor {
    id: String,
    schedule: Option<ScheduleConfig>,
}

impl MockExtractor {
    /// Create a definition with the given id and no scheduler override.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            schedule: None,
        }
    }

    /// Attach a scheduler override.
    pub fn with_schedule(mut self, schedule: ScheduleConfig) -> Self {
        self.schedule = Some(schedule);
        self
    }
}

impl Extractor for MockExtractor {
    fn id(&self) -> &str {
        &self.id
    }

    fn output_schema(&self) -> RootSchema {
        schema_for!(MockRecord)
    }

    fn build_prompt(&self, text: &str) -> String {
        format!("[{}] extract items from:\n{}", self.id, text)
    }

    fn schedule_override(&self) -> Option<ScheduleConfig> {
        self.schedule
    }
}
