//! The Pipeline - main entry point for multi-chunk extraction.
//!
//! Drives the call scheduler once per chunk, isolates chunk-level
//! failures, aggregates and deduplicates items, and produces metrics.
//! Chunks are processed strictly sequentially: the scheduler's
//! minimum-interval guarantee is defined relative to a single last-call
//! timestamp, and chunk ordering must be preserved in outcomes and
//! progress reporting.

use async_stream::stream;
use futures::Stream;
use schemars::schema::{InstanceType, RootSchema, Schema, SchemaObject};
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ExtractError, Result};
use crate::pipeline::dedup::{average_confidence, dedup_items};
use crate::pipeline::validate::{parse_items, validate_items};
use crate::scheduler::CallScheduler;
use crate::traits::{Extractor, Generator};
use crate::types::chunk::Chunk;
use crate::types::config::PipelineConfig;
use crate::types::outcome::{ChunkOutcome, ExtractionMetrics, ExtractionReport};

/// Progress sink invoked once per chunk: `(current, total, status)`.
///
/// Reporting is a side effect, not a suspension point.
pub type ProgressFn = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

/// The extraction pipeline.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::new(generator);
/// let chunks = chunker::split_by_size(&document, 4000);
/// let report = pipeline.extract_from_chunks(&chunks, &*extractor).await?;
/// println!("{} items, {} chunks failed", report.items.len(), report.chunks_failed);
/// ```
pub struct Pipeline<G: Generator> {
    generator: G,
    config: PipelineConfig,
    progress: Option<ProgressFn>,
}

impl<G: Generator> Pipeline<G> {
    /// Create a pipeline with default configuration.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            config: PipelineConfig::default(),
            progress: None,
        }
    }

    /// Create with custom configuration.
    pub fn with_config(generator: G, config: PipelineConfig) -> Self {
        Self {
            generator,
            config,
            progress: None,
        }
    }

    /// Attach a progress sink.
    pub fn with_progress(
        mut self,
        progress: impl Fn(usize, usize, &str) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get a reference to the generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Extract items from one piece of text.
    ///
    /// Builds the prompt, requests output conforming to
    /// `{ "items": [ ...output_schema ] }`, parses the envelope, and
    /// validates the items. Failures propagate to the caller as typed
    /// errors; nothing is swallowed at this level.
    pub async fn extract_single(
        &self,
        text: &str,
        extractor: &dyn Extractor,
    ) -> Result<Vec<Value>> {
        let prompt = extractor.build_prompt(text);
        let item_schema = extractor.output_schema();
        let envelope = envelope_schema(&item_schema);

        let output = self
            .generator
            .generate(&prompt, &envelope, self.config.temperature)
            .await?;

        let items = parse_items(&output)?;
        validate_items(&items, &item_schema)?;

        debug!(extractor = extractor.id(), items = items.len(), "extracted");
        Ok(items)
    }

    /// Extract across an ordered sequence of chunks.
    ///
    /// A single chunk's failure never aborts the run: it is converted
    /// to a failed [`ChunkOutcome`] and the loop proceeds. The run
    /// itself only fails fast on malformed input, before any chunk is
    /// processed.
    pub async fn extract_from_chunks(
        &self,
        chunks: &[Chunk],
        extractor: &dyn Extractor,
    ) -> Result<ExtractionReport> {
        self.run_chunks(chunks, extractor, None).await
    }

    /// Extract across chunks with cooperative cancellation.
    ///
    /// The token is checked between chunks and raced against the
    /// in-flight call, so it also interrupts backoff sleeps.
    /// Cancellation aborts the whole run with
    /// [`ExtractError::Cancelled`].
    pub async fn extract_from_chunks_with_cancel(
        &self,
        chunks: &[Chunk],
        extractor: &dyn Extractor,
        cancel: CancellationToken,
    ) -> Result<ExtractionReport> {
        self.run_chunks(chunks, extractor, Some(cancel)).await
    }

    /// Stream one outcome per chunk as it completes.
    ///
    /// Same sequencing and scheduling rules as
    /// [`extract_from_chunks`](Self::extract_from_chunks); the only
    /// `Err` item is an up-front input validation failure.
    pub fn extract_stream<'a>(
        &'a self,
        chunks: &'a [Chunk],
        extractor: &'a dyn Extractor,
    ) -> Pin<Box<dyn Stream<Item = Result<ChunkOutcome>> + Send + 'a>> {
        Box::pin(stream! {
            if let Err(err) = validate_chunk_sequence(chunks) {
                yield Err(err);
                return;
            }

            let schedule = extractor.schedule_override().unwrap_or(self.config.schedule);
            let mut scheduler = CallScheduler::new(schedule);
            let total = chunks.len();

            for (pos, chunk) in chunks.iter().enumerate() {
                self.report_progress(
                    pos + 1,
                    total,
                    &format!("extracting chunk {}/{}", pos + 1, total),
                );

                let label = format!("{}/chunk-{}", extractor.id(), chunk.index);
                let result = scheduler
                    .execute(|| self.extract_single(&chunk.content, extractor), &label)
                    .await;

                match result {
                    Ok(items) => yield Ok(ChunkOutcome::success(chunk.index, items)),
                    Err(err) => {
                        warn!(chunk = chunk.index, error = %err, "chunk extraction failed");
                        yield Ok(ChunkOutcome::failure(chunk.index, &err));
                    }
                }
            }
        })
    }

    async fn run_chunks(
        &self,
        chunks: &[Chunk],
        extractor: &dyn Extractor,
        cancel: Option<CancellationToken>,
    ) -> Result<ExtractionReport> {
        validate_chunk_sequence(chunks)?;

        let started = Instant::now();
        let schedule = extractor.schedule_override().unwrap_or(self.config.schedule);
        let mut scheduler = CallScheduler::new(schedule);

        let total = chunks.len();
        let mut outcomes: Vec<ChunkOutcome> = Vec::with_capacity(total);
        let mut aggregate: Vec<Value> = Vec::new();

        info!(extractor = extractor.id(), chunks = total, "starting extraction run");

        for (pos, chunk) in chunks.iter().enumerate() {
            if let Some(token) = &cancel {
                if token.is_cancelled() {
                    return Err(ExtractError::Cancelled);
                }
            }

            self.report_progress(
                pos + 1,
                total,
                &format!("extracting chunk {}/{}", pos + 1, total),
            );

            let label = format!("{}/chunk-{}", extractor.id(), chunk.index);
            let call = scheduler.execute(|| self.extract_single(&chunk.content, extractor), &label);

            let result = match &cancel {
                Some(token) => tokio::select! {
                    result = call => result,
                    _ = token.cancelled() => return Err(ExtractError::Cancelled),
                },
                None => call.await,
            };

            match result {
                Ok(items) => {
                    aggregate.extend(items.iter().cloned());
                    outcomes.push(ChunkOutcome::success(chunk.index, items));
                }
                Err(err) => {
                    warn!(chunk = chunk.index, error = %err, "chunk extraction failed");
                    outcomes.push(ChunkOutcome::failure(chunk.index, &err));
                }
            }
        }

        let items_before_dedup = aggregate.len();
        let items = dedup_items(aggregate);
        let average_confidence = average_confidence(&items);
        let chunks_failed = outcomes.iter().filter(|o| !o.success).count();

        let metrics = ExtractionMetrics {
            total_items: items.len(),
            items_before_dedup,
            processing_time_ms: started.elapsed().as_millis() as u64,
            average_confidence,
        };

        info!(
            extractor = extractor.id(),
            chunks_processed = total,
            chunks_failed,
            items = metrics.total_items,
            deduped = items_before_dedup - metrics.total_items,
            "extraction run complete"
        );

        Ok(ExtractionReport {
            items,
            chunks_processed: total,
            chunks_failed,
            outcomes,
            metrics,
        })
    }

    fn report_progress(&self, current: usize, total: usize, status: &str) {
        if let Some(progress) = &self.progress {
            progress(current, total, status);
        }
    }
}

/// Wrap an item schema into the `{ "items": [...] }` envelope schema.
fn envelope_schema(item_schema: &RootSchema) -> RootSchema {
    let array = SchemaObject {
        instance_type: Some(InstanceType::Array.into()),
        array: Some(Box::new(schemars::schema::ArrayValidation {
            items: Some(Schema::Object(item_schema.schema.clone()).into()),
            ..Default::default()
        })),
        ..Default::default()
    };

    let mut envelope = SchemaObject {
        instance_type: Some(InstanceType::Object.into()),
        ..Default::default()
    };
    let object = envelope.object();
    object.required.insert("items".to_string());
    object
        .properties
        .insert("items".to_string(), Schema::Object(array));

    RootSchema {
        meta_schema: item_schema.meta_schema.clone(),
        schema: envelope,
        definitions: item_schema.definitions.clone(),
    }
}

/// Reject malformed chunk sequences before any chunk is processed.
///
/// Indices must be 1-based, unique, and strictly increasing. An empty
/// sequence is valid and produces an empty report.
fn validate_chunk_sequence(chunks: &[Chunk]) -> Result<()> {
    let mut previous = 0usize;
    for chunk in chunks {
        if chunk.index == 0 {
            return Err(ExtractError::InvalidInput {
                reason: "chunk indices are 1-based".to_string(),
            });
        }
        if chunk.index <= previous {
            return Err(ExtractError::InvalidInput {
                reason: format!(
                    "chunk indices must be strictly increasing (saw {} after {})",
                    chunk.index, previous
                ),
            });
        }
        previous = chunk.index;
    }
    Ok(())
}
