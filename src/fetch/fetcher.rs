//! The two-step fetch protocol against the AEMET OpenData API.
//!
//! Every dataset request is two HTTP calls: an authenticated metadata call
//! whose JSON body carries a transient `datos` URL, then an unauthenticated
//! call to that URL for the actual payload. Both steps run through the same
//! retry loop; the upstream rate-limits aggressively (429) and fails
//! transiently (5xx) often enough that naive clients fall over.

use crate::fetch::backoff::RetryPolicy;
use crate::fetch::error::FetchError;
use log::{debug, error, warn};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

/// Upper bound on the raw-body preview carried by decode errors.
const BODY_PREVIEW_CHARS: usize = 500;

/// Stateless executor of the two-step protocol. Holds only configuration
/// and a reusable HTTP client; every call is independent.
pub struct DataFetcher {
    http: Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl DataFetcher {
    pub fn new(
        api_key: String,
        base_url: String,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key,
            base_url,
            retry,
        })
    }

    /// Fetches the decoded JSON payload for an API endpoint path.
    pub async fn fetch_dataset(&self, endpoint: &str) -> Result<Value, FetchError> {
        let metadata_url = format!("{}{}", self.base_url, endpoint);

        // Step 1: authenticated metadata request carrying the data URL.
        let metadata_response = self.get_with_retry(&metadata_url, true).await?;
        let metadata_body = metadata_response
            .text()
            .await
            .map_err(|e| FetchError::NetworkRequest(metadata_url.clone(), e))?;
        // An unparseable metadata body degrades to Null, so it falls into
        // the same missing-data-URL failure as a body without `datos`.
        let metadata: Value = serde_json::from_str(&metadata_body).unwrap_or(Value::Null);

        let data_url = match metadata.get("datos").and_then(Value::as_str) {
            Some(url) => url.to_string(),
            None => {
                error!("metadata response for {} is missing 'datos'", metadata_url);
                return Err(FetchError::MissingDataUrl { url: metadata_url });
            }
        };

        // Step 2: unauthenticated payload request.
        let data_response = self.get_with_retry(&data_url, false).await?;
        let raw = data_response
            .bytes()
            .await
            .map_err(|e| FetchError::NetworkRequest(data_url.clone(), e))?;
        let text = decode_text(&raw);
        serde_json::from_str(&text).map_err(|e| decode_error(&data_url, &text, e))
    }

    /// Issues a GET, retrying 429/5xx with jittered exponential backoff.
    ///
    /// Retries are strictly sequential; the loop terminates on the first
    /// success, the first non-retryable status, or retry exhaustion.
    async fn get_with_retry(
        &self,
        url: &str,
        authenticated: bool,
    ) -> Result<Response, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            let mut request = self.http.get(url);
            if authenticated {
                request = request.header("api_key", &self.api_key);
            }
            let response = request
                .send()
                .await
                .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;
            let status = response.status();

            if status.is_success() {
                debug!("GET {} succeeded on attempt {}", url, attempt + 1);
                return Ok(response);
            }

            if !RetryPolicy::is_retryable(status) {
                error!("GET {} failed with status {}", url, status);
                return Err(FetchError::UpstreamStatus {
                    url: url.to_string(),
                    status,
                });
            }

            if attempt >= self.retry.max_retries {
                error!(
                    "GET {} failed after {} attempts, last status {}",
                    url,
                    attempt + 1,
                    status
                );
                return Err(FetchError::RetryExhausted {
                    url: url.to_string(),
                    status,
                    attempts: attempt + 1,
                });
            }

            let delay = self.retry.next_delay(attempt, retry_after_hint(&response));
            warn!(
                "transient upstream error for {}: status {}, attempt {}, backing off {}ms",
                url,
                status,
                attempt + 1,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// `Retry-After` in delta-seconds form. The date form is ignored, matching
/// upstream clients of this API.
fn retry_after_hint(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Decodes a response body to text. AEMET intermittently serves Latin-1;
/// every Latin-1 byte maps to the Unicode code point of the same value, so
/// the fallback is a direct byte-to-char conversion.
fn decode_text(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(text) => text.to_owned(),
        Err(_) => raw.iter().map(|&b| b as char).collect(),
    }
}

fn decode_error(url: &str, body: &str, source: serde_json::Error) -> FetchError {
    let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
    error!("failed to decode payload from {}: {}", url, source);
    FetchError::Decode {
        url: url.to_string(),
        preview,
        source,
    }
}
