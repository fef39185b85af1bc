//! reqwest-backed implementation of [`TarotBackend`].

use async_trait::async_trait;
use chispa_core::{ChispaError, Result};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::backend::{CardTextRequest, CardTextResponse, ChatRequest, TarotBackend};
use crate::client::ApiClient;
use crate::config::BackendConfig;

const TEXT_PATH: &str = "/api/reading/text";
const IMAGE_PATH: &str = "/api/reading/image";
const CHAT_PATH: &str = "/api/chat";

#[derive(Debug, Serialize)]
struct CardImageRequest<'a> {
    card: &'a str,
}

/// The image endpoint may echo a card id alongside the URL; only the URL is
/// consumed — the text-derived id stays authoritative.
#[derive(Debug, Deserialize)]
struct CardImageResponse {
    #[serde(rename = "imageUrl")]
    image_url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: String,
}

/// Health payload reported by the backend root endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendHealth {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// [`TarotBackend`] over the backend's JSON HTTP API.
pub struct HttpTarotBackend {
    client: ApiClient,
}

impl HttpTarotBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
        })
    }

    /// Builds a backend from the `CHISPA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(BackendConfig::from_env())
    }

    /// One-shot health probe against the backend root.
    pub async fn health(&self, cancel: &CancellationToken) -> Result<BackendHealth> {
        self.client.get_json("/", cancel).await
    }
}

#[async_trait]
impl TarotBackend for HttpTarotBackend {
    async fn card_text(
        &self,
        request: &CardTextRequest,
        cancel: &CancellationToken,
    ) -> Result<CardTextResponse> {
        self.client
            .post_json(TEXT_PATH, request, cancel)
            .await
            .map_err(|err| classify(err, ChispaError::TextFetch))
    }

    async fn card_image(&self, card_id: &str, cancel: &CancellationToken) -> Result<String> {
        let response: CardImageResponse = self
            .client
            .post_json(IMAGE_PATH, &CardImageRequest { card: card_id }, cancel)
            .await
            .map_err(|err| classify(err, ChispaError::ImageFetch))?;
        Ok(response.image_url)
    }

    async fn chat_reply(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let response: ChatResponse = self
            .client
            .post_json(CHAT_PATH, request, cancel)
            .await
            .map_err(|err| classify(err, ChispaError::ChatFetch))?;
        Ok(response.response)
    }
}

/// Transport-level failures keep their taxonomy; anything else is folded
/// into the endpoint's fetch classification.
fn classify(err: ChispaError, wrap: fn(String) -> ChispaError) -> ChispaError {
    match err {
        ChispaError::Timeout | ChispaError::RequestFailed { .. } | ChispaError::Cancelled => err,
        other => wrap(other.to_string()),
    }
}
