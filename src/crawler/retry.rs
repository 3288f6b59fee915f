//! Bounded retries around one acquire-and-extract unit of work

use crate::config::{BackoffStrategy, RetryConfig};
use crate::model::{DealRecord, PageKind};
use crate::ScoutError;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Attempt bound and pause schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base: Duration,
    pub strategy: BackoffStrategy,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base: Duration::from_millis(config.backoff_ms),
            strategy: config.strategy,
        }
    }

    /// Pause after failed attempt number `attempt` (1-based)
    ///
    /// # Examples
    ///
    /// ```
    /// use brickscout::config::{BackoffStrategy, RetryConfig};
    /// use brickscout::crawler::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::from_config(&RetryConfig {
    ///     max_attempts: 3,
    ///     backoff_ms: 2000,
    ///     strategy: BackoffStrategy::Linear,
    /// });
    /// assert_eq!(policy.backoff_delay(2), Duration::from_millis(4000));
    /// ```
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let factor = match self.strategy {
            BackoffStrategy::Linear => attempt,
            BackoffStrategy::Exponential => 2u32.saturating_pow(attempt - 1),
        };
        self.base.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Position of the current attempt within its bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub number: u32,
    pub max: u32,
}

impl Attempt {
    pub fn first(max: u32) -> Self {
        Self { number: 1, max }
    }

    pub fn is_last(&self) -> bool {
        self.number >= self.max
    }

    pub fn next(self) -> Self {
        Self {
            number: self.number + 1,
            ..self
        }
    }
}

/// Result of a retried unit of work
#[derive(Debug)]
pub struct RetryOutcome {
    /// Records of the successful attempt, empty when every attempt failed
    pub records: Vec<DealRecord>,

    /// Attempts made, including the successful one
    pub attempts: u32,

    /// Failure of the last attempt, if it failed
    pub last_error: Option<ScoutError>,
}

impl RetryOutcome {
    pub fn succeeded(&self) -> bool {
        self.last_error.is_none()
    }
}

/// Runs `unit` until it succeeds or the policy is exhausted
///
/// A unit fails when it returns an error, or when a listing page yields no
/// records. An empty detail page is a success. Errors that cannot be cured by
/// retrying end the loop at once. This function never fails: exhaustion gives
/// an empty record list with the last error attached.
pub async fn run_with_retry<F, Fut>(
    policy: &RetryPolicy,
    kind: PageKind,
    url: &Url,
    mut unit: F,
) -> RetryOutcome
where
    F: FnMut(Attempt) -> Fut,
    Fut: Future<Output = Result<Vec<DealRecord>, ScoutError>>,
{
    let mut attempt = Attempt::first(policy.max_attempts);

    loop {
        tracing::debug!("Attempt {}/{} for {}", attempt.number, attempt.max, url);

        let result = unit(attempt).await.and_then(|records| {
            if records.is_empty() && kind == PageKind::Listing {
                Err(ScoutError::ZeroResults {
                    url: url.to_string(),
                })
            } else {
                Ok(records)
            }
        });

        let error = match result {
            Ok(records) => {
                return RetryOutcome {
                    records,
                    attempts: attempt.number,
                    last_error: None,
                }
            }
            Err(e) => e,
        };

        tracing::warn!(
            "Attempt {}/{} failed for {}: {}",
            attempt.number,
            attempt.max,
            url,
            error
        );

        if attempt.is_last() || !error.is_retryable() {
            if let ScoutError::ZeroResults { .. } = error {
                tracing::warn!(
                    "Giving up on {}: no deals found (empty results or outdated selectors)",
                    url
                );
            } else {
                tracing::warn!("Giving up on {} after {} attempts", url, attempt.number);
            }
            return RetryOutcome {
                records: Vec::new(),
                attempts: attempt.number,
                last_error: Some(error),
            };
        }

        tokio::time::sleep(policy.backoff_delay(attempt.number)).await;
        attempt = attempt.next();
    }
}
