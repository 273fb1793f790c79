//! Transport-level retry with capped exponential backoff.

use std::{future::Future, time::Duration};

use tokio_retry::{strategy::ExponentialBackoff, Retry};

use crate::config::Settings;

/// Retry schedule applied around each whole request.
///
/// Delays start at `base` and double up to `max`; with the defaults that is
/// 4s, 8s, 10s, 10s. No jitter, so every delay stays inside the configured
/// bounds.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, first try included.
    pub attempts: usize,
    /// Delay before the first retry.
    pub base: Duration,
    /// Ceiling applied to every delay.
    pub max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            base: Duration::from_secs(4),
            max: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            attempts: settings.retry_attempts.max(1),
            base: settings.retry_base,
            max: settings.retry_max,
        }
    }

    // ExponentialBackoff multiplies its seed by itself each step, so feed
    // it a seed of 2 and fold the real base into the factor to get plain
    // doubling from `base`. The factor rounds up so an odd base never
    // produces a first delay below `base`.
    fn schedule(&self) -> impl Iterator<Item = Duration> {
        let base_ms = (self.base.as_millis() as u64).max(2);
        ExponentialBackoff::from_millis(2)
            .factor(base_ms.div_ceil(2))
            .max_delay(self.max)
            .take(self.attempts.saturating_sub(1))
    }
}

/// Run `op` under the policy. Every `Err` the operation returns is retried
/// until the schedule runs out; the last error is handed back. Callers keep
/// non-retryable conditions out of the error channel.
pub async fn with_retry<F, Fut, T, E>(policy: &RetryPolicy, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    Retry::spawn(policy.schedule(), op).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_doubles_up_to_the_cap() {
        let policy = RetryPolicy {
            attempts: 5,
            base: Duration::from_secs(4),
            max: Duration::from_secs(10),
        };
        let delays: Vec<_> = policy.schedule().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(10),
                Duration::from_secs(10),
            ]
        );
    }

    #[test]
    fn odd_base_never_delays_below_the_minimum() {
        let policy = RetryPolicy {
            attempts: 3,
            base: Duration::from_millis(4001),
            max: Duration::from_secs(10),
        };
        let delays: Vec<_> = policy.schedule().collect();
        assert_eq!(delays[0], Duration::from_millis(4002));
        assert!(delays.iter().all(|d| *d >= policy.base));
    }

    #[test]
    fn single_attempt_never_sleeps() {
        let policy = RetryPolicy {
            attempts: 1,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.schedule().count(), 0);
    }

    #[tokio::test]
    async fn with_retry_returns_the_last_error() {
        let policy = RetryPolicy {
            attempts: 3,
            base: Duration::from_millis(2),
            max: Duration::from_millis(4),
        };
        let mut calls = 0u32;
        let result: Result<(), u32> = with_retry(&policy, || {
            calls += 1;
            let attempt = calls;
            async move { Err(attempt) }
        })
        .await;
        assert_eq!(result, Err(3));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn with_retry_stops_on_first_success() {
        let policy = RetryPolicy {
            attempts: 5,
            base: Duration::from_millis(2),
            max: Duration::from_millis(4),
        };
        let mut calls = 0u32;
        let result: Result<u32, u32> = with_retry(&policy, || {
            calls += 1;
            let attempt = calls;
            async move {
                if attempt < 2 {
                    Err(attempt)
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls, 2);
    }
}
