//! Polling waits for browser conditions.
//!
//! Every suspension in a scenario (document ready, element visible, URL
//! change) is a condition polled at `poll_interval` until it holds or
//! `timeout` elapses. There is no retry after failure here: a condition that
//! never holds produces `WaitTimeout` and the caller decides what that means.

use crate::error::{BrowserError, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Default timeout for wait operations (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default poll interval for checking conditions (100ms).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for wait operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Maximum time to wait for the condition.
    pub timeout: Duration,

    /// How often to check if the condition is satisfied.
    pub poll_interval: Duration,
}

impl WaitConfig {
    /// Creates a new wait configuration.
    #[must_use]
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Waits for a condition that returns a `Result<bool>`.
///
/// The condition is always evaluated at least once, even with a zero timeout.
///
/// Errors from the condition are treated as "not yet": a page in the middle
/// of navigating rejects script evaluation until the new document exists.
///
/// # Errors
///
/// Returns `WaitTimeout` when the condition does not hold in time.
pub async fn wait_for_result<F, Fut>(
    condition: F,
    config: WaitConfig,
    description: &str,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    wait_for_value(
        || {
            let fut = condition();
            async move { fut.await.map(|ok| ok.then_some(())) }
        },
        config,
        description,
    )
    .await
}

/// Polls until the check yields `Some(value)` and returns that value.
///
/// # Errors
///
/// Returns `WaitTimeout` when the check never yields a value in time.
pub async fn wait_for_value<F, Fut, T>(check: F, config: WaitConfig, description: &str) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();

    loop {
        if let Ok(Some(value)) = check().await {
            return Ok(value);
        }

        if start.elapsed() >= config.timeout {
            return Err(BrowserError::WaitTimeout {
                condition: description.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval).await;
    }
}
