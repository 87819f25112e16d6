use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("Upstream request failed for {url} with status {status}")]
    UpstreamStatus { url: String, status: StatusCode },

    #[error("Upstream request failed for {url} after {attempts} attempts, last status {status}")]
    RetryExhausted {
        url: String,
        status: StatusCode,
        attempts: u32,
    },

    #[error("Metadata response for {url} is missing the 'datos' data URL")]
    MissingDataUrl { url: String },

    #[error("Failed to decode payload from {url} (body preview: {preview:?})")]
    Decode {
        url: String,
        preview: String,
        #[source]
        source: serde_json::Error,
    },
}
