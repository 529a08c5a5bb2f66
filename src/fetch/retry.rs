// Bounded retry loop for fallible async operations.
// Client errors other than 429 end the loop immediately.

use std::future::Future;

use crate::config::RetryPolicy;
use crate::console::{Console, ConsoleMessage};
use crate::error::{ImgMetaError, Result};

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Fatal,
    Retry,
}

pub fn classify(error: &ImgMetaError) -> Decision {
    if error.is_fatal() {
        Decision::Fatal
    } else {
        Decision::Retry
    }
}

/// Run `operation` until it succeeds, fails fatally, or runs out of attempts.
///
/// The closure receives the 1-based attempt number. Each failure that will be
/// retried is reported to `console`. The returned error is the last failure.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    console: &dyn Console,
    label: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        let error = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if classify(&error) == Decision::Fatal || attempt >= max_attempts {
            return Err(error);
        }

        console.push(ConsoleMessage::warn(format!(
            "Attempt {} for {} failed: {}. {} retries left.",
            attempt,
            label,
            error,
            max_attempts - attempt
        )));

        let delay = policy.delay_for(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        attempt += 1;
    }
}
