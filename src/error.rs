use crate::fetch::error::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AemetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("AEMET API key is not configured")]
    MissingApiKey,

    #[error("Failed to construct HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Unexpected payload shape from {endpoint}")]
    PayloadShape {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}
