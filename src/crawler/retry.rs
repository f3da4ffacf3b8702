//! Retry-with-backoff decorator for any `Transport`
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Status in the retriable set | Retry up to `max_retries`, exponential delay |
//! | Timeout / network error | Retry up to `max_retries`, exponential delay |
//! | Any other status / unreadable body | Immediate failure |

use crate::config::FetchConfig;
use crate::crawler::fetcher::{FetchError, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// When and how long to wait before re-issuing a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry; doubles for each one after
    pub base_delay: Duration,

    /// Status codes treated as transient
    pub retry_statuses: Vec<u16>,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.backoff_base(),
            retry_statuses: config.retry_statuses.clone(),
        }
    }

    /// Whether this failure is worth another attempt
    pub fn is_retriable(&self, error: &FetchError) -> bool {
        match error {
            FetchError::Timeout { .. } | FetchError::Network { .. } => true,
            FetchError::Status { status, .. } => self.retry_statuses.contains(status),
            FetchError::Body { .. } => false,
        }
    }

    /// Delay before retry number `attempt` (1-based): base * 2^(attempt-1)
    pub fn backoff(&self, attempt: u32) -> Duration {
        // Cap the exponent so the multiplier never overflows
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Transport that retries transient failures of an inner transport
///
/// Retries are invisible to callers: they see either the eventual body or
/// the error of the last attempt.
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryingTransport<T> {
    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        let mut attempt = 0;

        loop {
            match self.inner.get(url).await {
                Ok(body) => {
                    if attempt > 0 {
                        tracing::debug!("Fetched {} after {} retries", url, attempt);
                    }
                    return Ok(body);
                }
                Err(e) if attempt < self.policy.max_retries && self.policy.is_retriable(&e) => {
                    attempt += 1;
                    let delay = self.policy.backoff(attempt);
                    tracing::debug!(
                        "{}; retrying in {:?} (attempt {}/{})",
                        e,
                        delay,
                        attempt,
                        self.policy.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
