use std::time::Duration;

use backon::ExponentialBuilder;
use http::StatusCode;

/// Default number of attempts, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Default delay before the first retry.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(100);

/// Default upper bound of the delay between two attempts.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Default growth factor of the delay between two attempts.
pub const DEFAULT_FACTOR: f32 = 2.0;

/// Transport-level retry policy.
///
/// Calls answered with `500`, `502`, `503` or `504`, and calls that fail to
/// connect, are retried with an exponential backoff. Other statuses and
/// in-body errors are returned immediately.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use gtp_service_sdk::RetryPolicy;
///
/// let policy = RetryPolicy::default()
///     .with_max_attempts(5)
///     .with_max_delay(Duration::from_secs(10))
///     .with_jitter(true);
/// assert_eq!(policy.max_attempts(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: usize,
    min_delay: Duration,
    max_delay: Duration,
    factor: f32,
    jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            factor: DEFAULT_FACTOR,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// A policy making a single attempt.
    pub fn no_retry() -> Self {
        Self::default().with_max_attempts(1)
    }

    /// Sets the total number of attempts, at least one.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the delay before the first retry.
    #[must_use]
    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self
    }

    /// Sets the upper bound of the delay between two attempts.
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Sets the growth factor of the delay.
    #[must_use]
    pub fn with_factor(mut self, factor: f32) -> Self {
        self.factor = factor;
        self
    }

    /// Adds random jitter to the delays.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Returns the total number of attempts.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub(crate) fn backoff(&self) -> ExponentialBuilder {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.factor)
            .with_max_times(self.max_attempts.saturating_sub(1));

        if self.jitter {
            backoff.with_jitter()
        } else {
            backoff
        }
    }
}

/// Returns `true` for the gateway statuses worth retrying.
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}
