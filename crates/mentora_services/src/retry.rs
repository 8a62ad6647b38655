//! Bounded retry with exponential backoff.

use mentora_error::{Retryable, ServiceError};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_retry2::strategy::jitter;
use tracing::{debug, warn};

/// Backoff delays are capped so a large multiplier cannot stall a worker
/// for minutes between attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Retry schedule for one backend.
///
/// Attempt `i` (1-indexed, `i > 1`) is preceded by a delay of
/// `base_delay * backoff_multiplier^(i-2)`, optionally jittered.
///
/// # Examples
///
/// ```
/// use mentora_services::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(4, Duration::from_millis(500), 2.0).without_jitter();
/// let delays: Vec<_> = policy.backoff_delays().take(3).collect();
/// assert_eq!(delays[0], Duration::from_millis(500));
/// assert_eq!(delays[1], Duration::from_millis(1000));
/// assert_eq!(delays[2], Duration::from_millis(2000));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (≥ 1)
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Growth factor applied to each subsequent delay
    pub backoff_multiplier: f64,
    /// Whether delays are randomly jittered
    pub jitter: bool,
}

impl RetryPolicy {
    /// Create a jittered policy.
    pub fn new(max_attempts: u32, base_delay: Duration, backoff_multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            backoff_multiplier,
            jitter: true,
        }
    }

    /// Disable jitter; timing tests need exact delays.
    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// The deterministic (un-jittered) delay sequence.
    pub fn backoff_delays(&self) -> impl Iterator<Item = Duration> + '_ {
        let base = self.base_delay;
        let multiplier = self.backoff_multiplier;
        (0..).map(move |n: i32| {
            let max = MAX_BACKOFF.as_secs_f64();
            let secs = base.as_secs_f64() * multiplier.powi(n);
            // Clamp keeps a misconfigured multiplier from producing a
            // negative or non-finite sleep.
            let secs = if secs.is_finite() { secs.clamp(0.0, max) } else { max };
            Duration::from_secs_f64(secs)
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2), 2.0)
    }
}

/// Result of driving one logical call through the retry executor.
///
/// Exactly one variant is produced per call; the orchestrator maps the
/// failure variants onto fallback synthesis rather than letting them
/// escape to business code.
#[derive(Debug)]
pub enum CallOutcome<T> {
    /// An attempt succeeded
    Success {
        /// The decoded, validated reply
        result: T,
        /// Duration of the successful attempt
        latency: Duration,
    },
    /// Every attempt failed with a transient error; the budget is spent
    RetryableFailure {
        /// The final attempt's error
        error: ServiceError,
        /// Duration of the final attempt
        latency: Duration,
    },
    /// An attempt failed with an error retrying cannot fix
    FatalFailure {
        /// The fatal error
        error: ServiceError,
        /// Duration of the fatal attempt
        latency: Duration,
    },
}

impl<T> CallOutcome<T> {
    /// The error carried by a failure outcome.
    pub fn error(&self) -> Option<&ServiceError> {
        match self {
            CallOutcome::Success { .. } => None,
            CallOutcome::RetryableFailure { error, .. } => Some(error),
            CallOutcome::FatalFailure { error, .. } => Some(error),
        }
    }
}

/// Run `attempt` up to `policy.max_attempts` times.
///
/// Transient failures sleep out the policy's backoff delay and try
/// again; fatal failures and budget exhaustion return immediately. The
/// attempt closure receives the 1-indexed attempt number.
pub async fn execute<T, F, Fut>(policy: &RetryPolicy, mut attempt: F) -> CallOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delays = policy.backoff_delays();
    let mut attempt_no = 1;

    loop {
        let started = Instant::now();
        match attempt(attempt_no).await {
            Ok(result) => {
                let latency = started.elapsed();
                debug!(attempt = attempt_no, latency_ms = latency.as_millis() as u64, "Attempt succeeded");
                return CallOutcome::Success { result, latency };
            }
            Err(error) => {
                let latency = started.elapsed();
                if !error.is_retryable() {
                    warn!(attempt = attempt_no, error = %error, "Permanent failure, not retrying");
                    return CallOutcome::FatalFailure { error, latency };
                }
                if attempt_no >= max_attempts {
                    warn!(
                        attempts = attempt_no,
                        error = %error,
                        "Retry budget exhausted"
                    );
                    return CallOutcome::RetryableFailure { error, latency };
                }

                let mut delay = delays.next().unwrap_or(policy.base_delay);
                if policy.jitter {
                    delay = jitter(delay);
                }
                warn!(
                    attempt = attempt_no,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Transient failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt_no += 1;
            }
        }
    }
}
