//! Per-card chat: optimistic history appends and backend round-trips.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chispa_core::reading::{CardError, CardErrorKind, MessageRole, ReadingStore};
use chispa_core::{ChispaError, Result};
use chispa_interaction::backend::{ChatRequest, ChatTurn, TarotBackend};
use log::{debug, warn};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Follow-up chat controller for a single card slot.
///
/// The user message is appended optimistically and never rolled back; a
/// failed round-trip only surfaces through [`last_error`](Self::last_error).
/// At most one send is in flight at a time — a second call while one is
/// pending is dropped with a warning.
pub struct CardChat {
    store: Arc<ReadingStore>,
    backend: Arc<dyn TarotBackend>,
    card_index: usize,
    in_flight: AtomicBool,
    last_error: RwLock<Option<CardError>>,
    cancel: CancellationToken,
}

impl CardChat {
    pub fn new(store: Arc<ReadingStore>, backend: Arc<dyn TarotBackend>, card_index: usize) -> Self {
        Self {
            store,
            backend,
            card_index,
            in_flight: AtomicBool::new(false),
            last_error: RwLock::new(None),
            cancel: CancellationToken::new(),
        }
    }

    pub fn card_index(&self) -> usize {
        self.card_index
    }

    /// True while a send is awaiting the backend.
    pub fn is_sending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// The most recent failed attempt, if any.
    pub async fn last_error(&self) -> Option<CardError> {
        self.last_error.read().await.clone()
    }

    /// Stops the controller: no further store or local mutation. Call when
    /// the owning view unmounts.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Sends a follow-up question about this card.
    ///
    /// The user message lands in the history immediately; the assistant
    /// reply follows once the backend answers. Rejections (blank content,
    /// unresolved card, card not loaded yet) record a local error without
    /// touching the store.
    pub async fn send_message(&self, content: &str) -> Result<()> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            warn!(
                "chat send already in flight for card {}, dropping message",
                self.card_index
            );
            return Ok(());
        }

        let result = self.send_inner(content).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn send_inner(&self, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return self.reject("cannot send an empty message").await;
        }

        let Some(card) = self.store.card(self.card_index).await else {
            return self.reject("Invalid card index").await;
        };

        if card.id.is_empty() {
            return self.reject("card has not finished loading").await;
        }

        *self.last_error.write().await = None;

        // The backend sees the history as it stood before this send.
        let previous_messages = card
            .messages
            .iter()
            .map(|message| ChatTurn {
                role: message.role,
                content: message.content.clone(),
            })
            .collect();

        self.store
            .add_message(self.card_index, MessageRole::User, content)
            .await;

        let request = ChatRequest {
            card_id: card.id,
            user_message: content.to_string(),
            previous_messages,
        };

        match self.backend.chat_reply(&request, &self.cancel).await {
            Ok(reply) => {
                if self.cancel.is_cancelled() {
                    return Ok(());
                }
                debug!("chat reply received for card {}", self.card_index);
                self.store
                    .add_message(self.card_index, MessageRole::Assistant, reply)
                    .await;
                Ok(())
            }
            Err(ChispaError::Cancelled) => Ok(()),
            Err(err) => {
                if self.cancel.is_cancelled() {
                    return Ok(());
                }
                warn!(
                    "chat request failed for card {}: {err}",
                    self.card_index
                );
                *self.last_error.write().await =
                    Some(CardError::new(CardErrorKind::Chat, err.to_string()));
                Err(err)
            }
        }
    }

    async fn reject(&self, message: &str) -> Result<()> {
        warn!("chat send rejected for card {}: {message}", self.card_index);
        *self.last_error.write().await = Some(CardError::new(CardErrorKind::Chat, message));
        Err(ChispaError::invalid_input(message))
    }
}
