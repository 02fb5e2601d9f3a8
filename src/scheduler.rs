//! Call scheduler - minimum spacing and throttling retries for outbound calls.
//!
//! Guarantees that consecutive invocations of a caller-supplied async
//! operation are spaced by at least the configured interval, and retries
//! throttling failures with exponential backoff before surfacing a
//! terminal error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::{ExtractError, Result};
use crate::types::config::ScheduleConfig;

/// Counters owned exclusively by one scheduler instance.
///
/// Monotonically non-decreasing between explicit resets.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleMetrics {
    /// Successful executions
    pub total_executions: u64,

    /// Milliseconds spent waiting (pre-call spacing + backoff sleeps)
    pub total_wait_ms: u64,

    /// Throttling retries performed
    pub total_retries: u64,

    /// Terminal failures surfaced
    pub total_failures: u64,

    /// Timestamp of the most recent successful execution
    pub last_execution_at: Option<DateTime<Utc>>,
}

/// Enforces minimum call spacing and exponential-backoff retries.
///
/// A scheduler's mutable state (`last_call`, metrics) is owned
/// exclusively by that instance; it is not designed for concurrent
/// callers. The pipeline constructs one per run.
#[derive(Debug)]
pub struct CallScheduler {
    config: ScheduleConfig,
    last_call: Option<Instant>,
    metrics: ScheduleMetrics,
}

impl CallScheduler {
    /// Create a scheduler with the given config.
    pub fn new(config: ScheduleConfig) -> Self {
        Self {
            config,
            last_call: None,
            metrics: ScheduleMetrics::default(),
        }
    }

    /// Wait until the minimum interval since the last call has elapsed.
    ///
    /// Returns the duration actually waited (zero when the interval has
    /// already passed, or on the first call). Always stamps `last_call`
    /// with the post-wait instant. Never fails.
    pub async fn await_slot(&mut self) -> Duration {
        let min_interval = Duration::from_millis(self.config.min_interval_ms);

        let waited = match self.last_call {
            Some(last) => {
                let elapsed = last.elapsed();
                if elapsed < min_interval {
                    let remaining = min_interval - elapsed;
                    sleep(remaining).await;
                    self.metrics.total_wait_ms += remaining.as_millis() as u64;
                    remaining
                } else {
                    Duration::ZERO
                }
            }
            None => Duration::ZERO,
        };

        self.last_call = Some(Instant::now());
        waited
    }

    /// Run `operation` under the spacing and retry policy.
    ///
    /// Throttling failures (per
    /// [`ExtractError::is_throttling`]) are retried up to
    /// `max_retries` total attempts, sleeping `2^attempt x min_interval`
    /// between attempts. Any non-throttling failure aborts immediately
    /// with zero retries.
    pub async fn execute<T, F, Fut>(&mut self, mut operation: F, label: &str) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 1;

        loop {
            let waited = self.await_slot().await;
            debug!(
                label,
                attempt,
                waited_ms = waited.as_millis() as u64,
                "dispatching call"
            );

            match operation().await {
                Ok(value) => {
                    self.metrics.total_executions += 1;
                    self.metrics.last_execution_at = Some(Utc::now());
                    return Ok(value);
                }
                Err(err) if err.is_throttling() => {
                    // Backoff grows as 2^attempt, so attempt 1 already
                    // backs off twice the base interval.
                    let backoff_ms = self
                        .config
                        .min_interval_ms
                        .saturating_mul(1u64 << attempt.min(32));

                    if attempt < self.config.max_retries {
                        self.metrics.total_retries += 1;
                        warn!(label, attempt, backoff_ms, error = %err, "throttled, backing off");
                        sleep(Duration::from_millis(backoff_ms)).await;
                        self.metrics.total_wait_ms += backoff_ms;
                        attempt += 1;
                    } else {
                        self.metrics.total_failures += 1;
                        warn!(label, attempts = attempt, "throttling retries exhausted");
                        return Err(ExtractError::Throttled {
                            attempts: attempt,
                            retry_after_ms: backoff_ms,
                        });
                    }
                }
                Err(err) => {
                    self.metrics.total_failures += 1;
                    debug!(label, attempt, error = %err, "terminal failure, not retrying");
                    return Err(err);
                }
            }
        }
    }

    /// Defensive copy of the configuration.
    pub fn config(&self) -> ScheduleConfig {
        self.config
    }

    /// Defensive copy of the current metrics.
    pub fn metrics(&self) -> ScheduleMetrics {
        self.metrics.clone()
    }

    /// Zero all counters and clear the last execution timestamp.
    pub fn reset_metrics(&mut self) {
        self.metrics = ScheduleMetrics::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config() -> ScheduleConfig {
        ScheduleConfig::new(1000, 3)
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_executions_are_spaced() {
        let mut scheduler = CallScheduler::new(fast_config());

        let start = Instant::now();
        scheduler
            .execute(|| async { Ok::<_, ExtractError>(1) }, "first")
            .await
            .unwrap();
        scheduler
            .execute(|| async { Ok::<_, ExtractError>(2) }, "second")
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(1000),
            "calls spaced only {:?}",
            elapsed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_slot_zero_after_interval_elapsed() {
        let mut scheduler = CallScheduler::new(fast_config());

        scheduler.await_slot().await;
        tokio::time::advance(Duration::from_millis(1500)).await;

        let waited = scheduler.await_slot().await;
        assert_eq!(waited, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_wait_recorded_in_metrics() {
        let mut scheduler = CallScheduler::new(fast_config());

        scheduler.await_slot().await;
        tokio::time::advance(Duration::from_millis(400)).await;

        // 600ms of the 1000ms interval remain and must be waited out.
        let waited = scheduler.await_slot().await;
        assert_eq!(waited, Duration::from_millis(600));
        assert_eq!(scheduler.metrics().total_wait_ms, 600);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_call_does_not_wait() {
        let mut scheduler = CallScheduler::new(fast_config());
        let waited = scheduler.await_slot().await;
        assert_eq!(waited, Duration::ZERO);
        assert_eq!(scheduler.metrics().total_wait_ms, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttling_exhaustion_makes_exactly_max_attempts() {
        let mut scheduler = CallScheduler::new(fast_config());
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = attempts.clone();
        let result: Result<()> = scheduler
            .execute(
                move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err(ExtractError::Unknown("HTTP 429 from upstream".into()))
                    }
                },
                "always-throttled",
            )
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        match result {
            Err(ExtractError::Throttled {
                attempts: made, ..
            }) => assert_eq!(made, 3),
            other => panic!("expected Throttled, got {:?}", other.err()),
        }

        let metrics = scheduler.metrics();
        assert_eq!(metrics.total_retries, 2);
        assert_eq!(metrics.total_failures, 1);
        assert_eq!(metrics.total_executions, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles_per_attempt() {
        let mut scheduler = CallScheduler::new(ScheduleConfig::new(100, 3));

        let start = Instant::now();
        let _: Result<()> = scheduler
            .execute(
                || async { Err(ExtractError::Unknown("rate limit".into())) },
                "backoff",
            )
            .await;
        let elapsed = start.elapsed();

        // Backoffs: 2^1*100 + 2^2*100 = 600ms. Slot waits after each
        // backoff are zero since the backoff exceeds the interval.
        assert!(elapsed >= Duration::from_millis(600));
        assert!(elapsed < Duration::from_millis(700), "elapsed {:?}", elapsed);
        assert_eq!(scheduler.metrics().total_wait_ms, 600);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_throttling_failure_aborts_immediately() {
        let mut scheduler = CallScheduler::new(fast_config());
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = attempts.clone();
        let result: Result<()> = scheduler
            .execute(
                move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err(ExtractError::Unknown("connection reset".into()))
                    }
                },
                "terminal",
            )
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ExtractError::Unknown(_))));
        assert_eq!(scheduler.metrics().total_failures, 1);
        assert_eq!(scheduler.metrics().total_retries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_then_success() {
        let mut scheduler = CallScheduler::new(ScheduleConfig::new(50, 3));
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = attempts.clone();
        let result = scheduler
            .execute(
                move || {
                    let counter = counter.clone();
                    async move {
                        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                            Err(ExtractError::Unknown("quota exceeded".into()))
                        } else {
                            Ok(42)
                        }
                    }
                },
                "retry-once",
            )
            .await
            .unwrap();

        assert_eq!(result, 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        let metrics = scheduler.metrics();
        assert_eq!(metrics.total_executions, 1);
        assert_eq!(metrics.total_retries, 1);
        assert_eq!(metrics.total_failures, 0);
        assert!(metrics.last_execution_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_metrics_accumulate_and_reset() {
        let mut scheduler = CallScheduler::new(ScheduleConfig::new(10, 3));

        for i in 0..4 {
            scheduler
                .execute(move || async move { Ok::<_, ExtractError>(i) }, "batch")
                .await
                .unwrap();
        }

        let metrics = scheduler.metrics();
        assert_eq!(metrics.total_executions, 4);
        assert_eq!(metrics.total_failures, 0);

        scheduler.reset_metrics();
        let metrics = scheduler.metrics();
        assert_eq!(metrics.total_executions, 0);
        assert_eq!(metrics.total_wait_ms, 0);
        assert!(metrics.last_execution_at.is_none());
    }

    #[test]
    fn test_config_is_defensive_copy() {
        let scheduler = CallScheduler::new(fast_config());
        let mut copy = scheduler.config();
        copy.min_interval_ms = 1;
        assert_eq!(scheduler.config().min_interval_ms, 1000);
    }
}
