// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Backoff policy for GitHub requests.
///
/// Only failures reported as transient by [`Error::is_transient`] are
/// retried. A 404 or a credential rejection returns immediately.
use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;

/// Attempt budget and delay growth for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig
{
    /// Attempts including the first one. Zero behaves like one.
    pub max_attempts:     u32,
    /// Pause before the second attempt.
    pub initial_delay_ms: u64,
    /// Growth of the pause between consecutive attempts.
    pub backoff_factor:   f64,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            max_attempts: 3, initial_delay_ms: 1000, backoff_factor: 2.0,
        }
    }
}

impl RetryConfig
{
    /// Pause taken after the failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32,) -> Duration
    {
        let exponent = attempt.saturating_sub(1,).min(i32::MAX as u32,) as i32;
        let millis = self.initial_delay_ms as f64 * self.backoff_factor.powi(exponent,);
        Duration::from_millis(millis.min(u64::MAX as f64,) as u64,)
    }
}

/// Runs `request` until it succeeds, fails permanently, or the attempt
/// budget in `config` is spent.
///
/// # Errors
///
/// The first non-transient error, or the last transient one once every
/// attempt has been used.
///
/// # Example
///
/// ```no_run
/// use devscope::{Error, retry::{RetryConfig, retry_with_backoff}};
///
/// # async fn example() -> Result<(), Error> {
/// let login = retry_with_backoff(&RetryConfig::default(), "GET /users/octocat", || async {
///     Ok::<_, Error,>("octocat".to_owned(),)
/// },)
/// .await?;
/// assert_eq!(login, "octocat");
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<F, Fut, T,>(
    config: &RetryConfig,
    operation: &str,
    mut request: F,
) -> Result<T, Error,>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error,>,>,
{
    let budget = config.max_attempts.max(1,);
    let mut attempt = 1;

    loop {
        let error = match request().await {
            Ok(value,) => {
                if attempt > 1 {
                    debug!("{} recovered on attempt {}", operation, attempt);
                }
                return Ok(value,);
            }
            Err(error,) => error,
        };

        if !error.is_transient() || attempt == budget {
            if error.is_transient() {
                warn!("{} gave up after {} attempts: {}", operation, budget, error);
            }
            return Err(error,);
        }

        let delay = config.delay_after(attempt,);
        warn!("{} attempt {}/{} failed: {}; next try in {}ms", operation, attempt, budget, error, delay.as_millis());
        tokio::time::sleep(delay,).await;
        attempt += 1;
    }
}
