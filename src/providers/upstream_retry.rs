use backon::{ExponentialBuilder, Retryable};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{IsRetryable, TomeError};
use crate::utils::logging::response_preview;

pub(crate) fn retry_policy(max_times: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_millis(300))
        .with_max_times(max_times)
        .with_jitter()
}

/// GET with retries on transport errors, 5xx and 429 answers.
///
/// Any other status is returned as-is for the caller to judge. Only the URL path is logged
/// since some providers take credentials in the query string.
pub(crate) async fn get_with_retry(
    provider: &'static str,
    client: &reqwest::Client,
    url: &Url,
    bearer: Option<&str>,
    retry_policy: ExponentialBuilder,
) -> Result<reqwest::Response, TomeError> {
    (move || async move {
        let mut request = client.get(url.clone());
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        // reqwest errors print the full URL, which may carry an API key.
        let resp = request.send().await.map_err(reqwest::Error::without_url)?;

        let status = resp.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            let body_preview = response_preview(resp).await;

            debug!(
                provider,
                %status,
                path = %url.path(),
                body = %body_preview,
                "[{provider}] Retryable upstream status"
            );

            return Err(TomeError::UpstreamStatus(status));
        }

        Ok(resp)
    })
    .retry(retry_policy)
    .when(|err: &TomeError| err.is_retryable())
    .notify(|err: &TomeError, dur: Duration| {
        debug!(provider, error = %err, retry_in = ?dur, "[{provider}] Retrying upstream GET");
    })
    .await
}
