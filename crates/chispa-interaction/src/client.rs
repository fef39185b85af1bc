//! JSON HTTP client with bounded timeout, retry, and typed errors.

use chispa_core::{ChispaError, Result};
use log::{error, warn};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::config::BackendConfig;

/// Thin wrapper over [`reqwest::Client`] that applies the backend's
/// timeout/retry policy and translates failures into [`ChispaError`].
///
/// Retries use exponential backoff starting at the configured base delay
/// (1 s, 2 s, 4 s, ...). 404 responses are definitive and never retried; an
/// elapsed timeout is likewise terminal. The wrapper mutates no shared
/// state — callers decide what a failure means.
pub struct ApiClient {
    client: reqwest::Client,
    config: BackendConfig,
}

impl ApiClient {
    /// Builds a client with the hard timeout applied at the reqwest level.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ChispaError::config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// POSTs `body` as JSON to `path` and decodes the JSON response.
    ///
    /// The token aborts the call at any point, including between retries; a
    /// cancelled call fails with [`ChispaError::Cancelled`] and the eventual
    /// resolution of the in-flight request is dropped with it.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url, path);
        let mut delay = self.config.retry_delay;

        for attempt in 0..=self.config.max_retries {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(ChispaError::Cancelled),
                outcome = self.post_once(&url, body) => outcome,
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt == self.config.max_retries || !err.is_retryable() {
                        error!("POST {url} failed after {} attempt(s): {err}", attempt + 1);
                        return Err(err);
                    }
                    warn!(
                        "POST {url} failed (attempt {}): {err}. retrying in {delay:?}",
                        attempt + 1
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(ChispaError::Cancelled),
                        _ = sleep(delay) => {}
                    }
                    delay *= 2;
                }
            }
        }

        Err(ChispaError::internal(format!(
            "retry loop for {url} exhausted unexpectedly"
        )))
    }

    /// GETs `path` and decodes the JSON response. One shot, no retry.
    pub async fn get_json<T>(&self, path: &str, cancel: &CancellationToken) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url, path);
        tokio::select! {
            _ = cancel.cancelled() => Err(ChispaError::Cancelled),
            outcome = async {
                let response = self.client.get(&url).send().await?;
                decode(response).await
            } => outcome,
        }
    }

    async fn post_once<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        return Err(map_http_error(status, message));
    }

    response
        .json::<T>()
        .await
        .map_err(|err| ChispaError::internal(format!("failed to decode response body: {err}")))
}

fn map_http_error(status: StatusCode, message: String) -> ChispaError {
    let message = if message.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        message
    };
    ChispaError::request_failed(Some(status.as_u16()), message)
}
