//! Shared request plumbing for both clients.
//!
//! Centralizes the retry policy (bounded attempts, linear backoff, retry
//! only on connect/timeout) and status-code checks so endpoint modules stay
//! focused on request construction and response mapping.

use std::time::Duration;

use crate::error::ClientError;

/// Per-request socket timeout.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(25);

/// Total attempts per request, including the first.
const MAX_ATTEMPTS: u32 = 3;

/// Build the shared reqwest client.
///
/// # Panics
///
/// Panics if the underlying `reqwest::Client` fails to build.
pub(crate) fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("zephyrus/0.1")
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("reqwest client should build")
}

/// Linear backoff: 2 s after the first attempt, 4 s after the second.
pub(crate) const fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs((attempt as u64 + 1) * 2)
}

/// Send a request, retrying connect/timeout failures up to [`MAX_ATTEMPTS`].
///
/// Non-success responses map to [`ClientError::Api`] without retry; other
/// transport errors surface immediately.
pub(crate) async fn send_with_retry(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, ClientError> {
    for attempt in 0..MAX_ATTEMPTS - 1 {
        let Some(this_attempt) = request.try_clone() else {
            break;
        };
        match this_attempt.send().await {
            Ok(resp) => return check_response(resp).await,
            Err(error) if is_transient(&error) => {
                let delay = backoff_delay(attempt);
                tracing::warn!(
                    %error,
                    attempt = attempt + 1,
                    delay_secs = delay.as_secs(),
                    "transient transport failure, retrying",
                );
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error.into()),
        }
    }

    check_response(request.send().await?).await
}

fn is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

/// Check an HTTP response, mapping non-success statuses to
/// [`ClientError::Api`] with the body captured.
pub(crate) async fn check_response(
    resp: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    if !resp.status().is_success() {
        return Err(ClientError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}
