//! Retry execution.
//!
//! A [`RetryStrategy`] drives one [`Attempt`] until it produces a response
//! that should not be retried, the attempts run out, or the caller cancels.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use tokio_util::sync::CancellationToken;
use tr1d1um_config::GatewaySettings;

use crate::error::GatewayError;
use crate::response::{report_error, timeout_status, write_response, Tr1d1umResponse};
use crate::transport::TransportError;

/// One retryable unit of work.
///
/// `Ok` carries a normalized response, which may itself describe a failed
/// exchange. `Err` is an internal failure that no retry can fix.
#[async_trait]
pub trait Attempt: Send + Sync {
    /// Runs the attempt once.
    async fn run(&self) -> Result<Tr1d1umResponse, GatewayError>;
}

/// Decides how often and how long an [`Attempt`] is tried.
#[async_trait]
pub trait RetryStrategy: Send + Sync {
    /// Runs `attempt` until it settles and returns the final response.
    async fn execute(&self, attempt: &dyn Attempt, cancel: &CancellationToken) -> Tr1d1umResponse;
}

/// Retries on timeout-class responses.
pub fn should_retry_on_response(resp: &Tr1d1umResponse) -> bool {
    resp.code == timeout_status()
}

/// Status written when an attempt fails internally.
pub fn on_retry_internal_failure() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Fixed-interval retry.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tr1d1um::IntervalRetry;
///
/// let retry = IntervalRetry::new(2, Duration::from_secs(2));
/// assert_eq!(retry.max_attempts(), 3);
/// ```
#[derive(Clone)]
pub struct IntervalRetry {
    max_retries: u32,
    interval: Duration,
    should_retry: fn(&Tr1d1umResponse) -> bool,
    on_internal_failure: fn() -> StatusCode,
}

impl IntervalRetry {
    /// Create a strategy with the default predicates.
    pub fn new(max_retries: u32, interval: Duration) -> Self {
        Self {
            max_retries,
            interval,
            should_retry: should_retry_on_response,
            on_internal_failure: on_retry_internal_failure,
        }
    }

    /// Create a strategy from the gateway settings.
    pub fn from_config(settings: &GatewaySettings) -> Self {
        Self::new(settings.max_retries, settings.retry_interval)
    }

    /// Replace the retry predicate.
    pub fn with_should_retry(mut self, should_retry: fn(&Tr1d1umResponse) -> bool) -> Self {
        self.should_retry = should_retry;
        self
    }

    /// Replace the status used for internal failures.
    pub fn with_on_internal_failure(mut self, on_internal_failure: fn() -> StatusCode) -> Self {
        self.on_internal_failure = on_internal_failure;
        self
    }

    /// Total number of attempts, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Get the wait between attempts.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl fmt::Debug for IntervalRetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalRetry")
            .field("max_retries", &self.max_retries)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

fn canceled(attempt: u32) -> Tr1d1umResponse {
    tracing::info!(attempt, "request canceled");
    let mut resp = Tr1d1umResponse::new();
    report_error(Some(&TransportError::Canceled), &mut resp);
    resp
}

#[async_trait]
impl RetryStrategy for IntervalRetry {
    async fn execute(&self, attempt: &dyn Attempt, cancel: &CancellationToken) -> Tr1d1umResponse {
        let max_attempts = self.max_attempts();
        let mut resp = Tr1d1umResponse::new();

        for n in 1..=max_attempts {
            if n > 1 {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return canceled(n),
                    () = tokio::time::sleep(self.interval) => {}
                }
            }

            tracing::debug!(attempt = n, max_attempts, "running attempt");

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return canceled(n),
                result = attempt.run() => result,
            };

            resp = match result {
                Ok(resp) => resp,
                Err(error) => {
                    tracing::error!(
                        attempt = n,
                        %error,
                        error_code = error.error_code(),
                        "attempt failed internally, not retrying"
                    );
                    let mut resp = Tr1d1umResponse::new();
                    write_response("", (self.on_internal_failure)(), &mut resp);
                    return resp;
                }
            };

            if !(self.should_retry)(&resp) {
                return resp;
            }

            if n < max_attempts {
                tracing::warn!(
                    attempt = n,
                    http.status_code = resp.code.as_u16(),
                    interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
                    "retrying"
                );
            }
        }

        tracing::warn!(max_attempts, "giving up after retries");
        resp
    }
}
