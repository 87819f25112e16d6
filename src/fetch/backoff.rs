//! Retry policy for transient upstream failures.

use rand::Rng;
use reqwest::StatusCode;
use std::time::Duration;

/// Bounds and pacing for the retry loop.
///
/// Applied independently to each step of the two-step protocol: every step
/// gets its own attempt counter, capped at `max_retries` retries beyond the
/// first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the initial attempt.
    pub max_retries: u32,
    /// Unjittered delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Only rate limiting and server errors are worth retrying; everything
    /// else is terminal on the first response.
    pub fn is_retryable(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Exponential backoff for `attempt` (starting at 0), jittered uniformly
    /// into 80-120% of `base_delay * 2^attempt`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponential = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
        let jitter = rand::thread_rng().gen_range(0.8..=1.2);
        exponential.mul_f64(jitter)
    }

    /// Delay before the next attempt. A `Retry-After` hint from the server
    /// acts as a floor under the computed backoff.
    pub fn next_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.backoff_delay(attempt);
        match retry_after {
            Some(hint) => backoff.max(hint),
            None => backoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses_are_429_and_5xx() {
        assert!(RetryPolicy::is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(RetryPolicy::is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(RetryPolicy::is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!RetryPolicy::is_retryable(StatusCode::NOT_FOUND));
        assert!(!RetryPolicy::is_retryable(StatusCode::BAD_REQUEST));
        assert!(!RetryPolicy::is_retryable(StatusCode::UNAUTHORIZED));
        assert!(!RetryPolicy::is_retryable(StatusCode::OK));
    }

    #[test]
    fn backoff_jitter_stays_within_bounds() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        };
        for attempt in 0..4 {
            let unjittered = 500.0 * 2f64.powi(attempt as i32);
            for _ in 0..50 {
                let millis = policy.backoff_delay(attempt).as_secs_f64() * 1000.0;
                assert!(
                    millis >= unjittered * 0.8 - 1e-6 && millis <= unjittered * 1.2 + 1e-6,
                    "attempt {attempt}: {millis}ms outside jitter bounds of {unjittered}ms"
                );
            }
        }
    }

    /// The jitter bands of consecutive attempts do not overlap
    /// (1.2 * 2^n < 0.8 * 2^(n+1)), so delays grow monotonically.
    #[test]
    fn backoff_grows_across_attempts() {
        let policy = RetryPolicy::default();
        for attempt in 0..3 {
            let current = policy.backoff_delay(attempt);
            let next = policy.backoff_delay(attempt + 1);
            assert!(next > current);
        }
    }

    #[test]
    fn retry_after_hint_is_a_floor() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        };
        let hinted = policy.next_delay(0, Some(Duration::from_secs(30)));
        assert_eq!(hinted, Duration::from_secs(30));

        // A hint smaller than the backoff leaves the backoff in charge.
        let small_hint = policy.next_delay(3, Some(Duration::from_millis(1)));
        assert!(small_hint >= Duration::from_millis(640));
    }
}
