//! Configuration types for scheduling and the pipeline.

use serde::{Deserialize, Serialize};

/// Default minimum spacing between outbound generation calls.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 7000;

/// Default maximum attempts per call (including the first).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for the call scheduler.
///
/// Immutable per scheduler instance. Represented as an explicit value
/// passed at construction, not ambient global state, so multiple runs
/// with different tunings can coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Minimum spacing between consecutive calls, in milliseconds
    pub min_interval_ms: u64,

    /// Maximum attempts per `execute` call (always at least 1)
    pub max_retries: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ScheduleConfig {
    /// Create a new schedule config. `max_retries` is clamped to at least 1.
    pub fn new(min_interval_ms: u64, max_retries: u32) -> Self {
        Self {
            min_interval_ms,
            max_retries: max_retries.max(1),
        }
    }

    /// Set the minimum interval.
    pub fn with_min_interval_ms(mut self, ms: u64) -> Self {
        self.min_interval_ms = ms;
        self
    }

    /// Set the maximum retries (clamped to at least 1).
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries.max(1);
        self
    }
}

/// Configuration for the extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Scheduler settings used when an extractor supplies no override
    pub schedule: ScheduleConfig,

    /// Sampling temperature passed to the generation capability
    pub temperature: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            temperature: 0.2,
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default schedule.
    pub fn with_schedule(mut self, schedule: ScheduleConfig) -> Self {
        self.schedule = schedule;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}
