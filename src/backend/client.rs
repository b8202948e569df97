use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::backend::models::SeriesResponse;
use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Something went wrong on api server! (HTTP {status})")]
    Http { status: u16 },

    #[error("Request failed: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

/// Where chart series come from.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Fetch the series at `path` (e.g. `/24/sensor1`).
    async fn fetch(&self, path: &str) -> Result<SeriesResponse, FetchError>;
}

pub struct BackendClient {
    http_client: Client,
    base_url: String,
}

impl BackendClient {
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the TLS backend cannot be initialized.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Self::with_timeout(
            &config.backend_base_url,
            Duration::from_secs(config.backend_timeout_seconds),
        )
    }

    /// # Errors
    ///
    /// Returns `reqwest::Error` if the TLS backend cannot be initialized.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SeriesSource for BackendClient {
    async fn fetch(&self, path: &str) -> Result<SeriesResponse, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        // Anything but 200 is a failure; the body is not inspected.
        if response.status() != reqwest::StatusCode::OK {
            return Err(FetchError::Http {
                status: response.status().as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to get response text: {e}")))?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::debug!(
                error = %e,
                body_preview = %text.chars().take(500).collect::<String>(),
                "Failed to parse series response"
            );
            FetchError::Decode(e.to_string())
        })
    }
}
