//! Base HTTP client for model providers.

use crate::{Error, Result};

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Result from a provider call.
#[derive(Debug, Clone)]
pub enum ProviderResult<T> {
    /// Successful result
    Success(T),
    /// Service unavailable, rate limited or unreachable (worth retrying)
    Unavailable(String),
    /// Error occurred
    Error(String),
}

impl<T> ProviderResult<T> {
    /// Check if the result is successful.
    pub fn is_success(&self) -> bool {
        matches!(self, ProviderResult::Success(_))
    }

    /// Convert into the crate result type, tagging failures with `service`.
    pub fn into_result(self, service: &str) -> Result<T> {
        match self {
            ProviderResult::Success(v) => Ok(v),
            ProviderResult::Unavailable(msg) => Err(Error::integration(
                service,
                format!("service unavailable: {}", msg),
            )),
            ProviderResult::Error(msg) => Err(Error::integration(service, msg)),
        }
    }
}

/// Base client for provider HTTP APIs.
pub struct ProviderClient {
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
    client: reqwest::Client,
}

impl ProviderClient {
    /// Create a new provider client.
    ///
    /// `headers` are sent with every request (authentication goes here).
    pub fn new(base_url: String, timeout: Duration, headers: HeaderMap) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("EcoSync/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            max_retries: 0,
            backoff: Duration::from_millis(500),
            client,
        })
    }

    /// Retry unavailable responses up to `max_retries` times.
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the initial backoff between retries (doubled per attempt).
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the timeout duration.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform a JSON POST, retrying unavailable responses.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ProviderResult<T> {
        let mut attempt = 0;
        loop {
            match self.post_once(path, body).await {
                ProviderResult::Unavailable(msg) if attempt < self.max_retries => {
                    let delay = self.backoff * 2u32.pow(attempt);
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Provider unavailable, retrying: {}",
                        msg
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    async fn post_once<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ProviderResult<T> {
        let url = format!("{}{}", self.base_url, path);

        match self.client.post(&url).json(body).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    match response.json::<T>().await {
                        Ok(data) => ProviderResult::Success(data),
                        Err(e) => ProviderResult::Error(format!("Failed to parse response: {}", e)),
                    }
                } else {
                    let detail = response.text().await.unwrap_or_default();
                    if is_retryable(status) {
                        ProviderResult::Unavailable(format!("HTTP {}: {}", status, detail))
                    } else {
                        ProviderResult::Error(format!("HTTP error {}: {}", status, detail))
                    }
                }
            }
            Err(e) => {
                if e.is_timeout() || e.is_connect() {
                    ProviderResult::Unavailable(format!("Request failed: {}", e))
                } else {
                    ProviderResult::Error(format!("Request failed: {}", e))
                }
            }
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
