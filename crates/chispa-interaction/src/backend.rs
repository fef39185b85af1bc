//! The seam between the controllers and the tarot backend.
//!
//! Controllers depend on the [`TarotBackend`] trait, never on a concrete
//! transport; tests script it in-process, production wires in
//! [`HttpTarotBackend`](crate::http_backend::HttpTarotBackend).

use async_trait::async_trait;
use chispa_core::Result;
use chispa_core::reading::MessageRole;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Request payload for the per-card text endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTextRequest {
    pub question: String,
    pub total_cards_in_spread: usize,
    /// 0-indexed position of the card within the spread.
    pub card_number_in_spread: usize,
}

/// Card identity and narrative returned by the text endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CardTextResponse {
    pub id: String,
    pub text: String,
}

/// One prior exchange forwarded to the chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
}

/// Request payload for the card chat endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub card_id: String,
    pub user_message: String,
    pub previous_messages: Vec<ChatTurn>,
}

/// Everything the reading and chat controllers need from the backend.
///
/// Implementations must honor the cancellation token: a cancelled call
/// returns [`ChispaError::Cancelled`](chispa_core::ChispaError::Cancelled)
/// promptly and leaves nothing for the caller to undo.
#[async_trait]
pub trait TarotBackend: Send + Sync {
    /// Fetches the narrative text for one card position in the spread.
    async fn card_text(
        &self,
        request: &CardTextRequest,
        cancel: &CancellationToken,
    ) -> Result<CardTextResponse>;

    /// Resolves the image URL for a card by its text-derived id.
    async fn card_image(&self, card_id: &str, cancel: &CancellationToken) -> Result<String>;

    /// Requests an assistant reply for a follow-up question about a card.
    async fn chat_reply(&self, request: &ChatRequest, cancel: &CancellationToken)
    -> Result<String>;
}
