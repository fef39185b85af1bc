//! The reading store: an owned, observable view model for one reading.
//!
//! All reads and writes go through this type. Every mutation takes the write
//! lock once and never awaits while holding it, so readers always observe a
//! fully updated snapshot, never a partial one. Index-validating operations
//! record a descriptive `global_error` instead of panicking and leave the
//! slots untouched.

use log::{debug, error};
use tokio::sync::{RwLock, watch};

use super::card::{CardError, CardErrorKind, CardSlot};
use super::message::{ChatMessage, MessageRole};
use super::model::ReadingSession;
use super::spread::SpreadKind;

/// Partial card payload merged by [`ReadingStore::update_card_data`].
///
/// Only the fields that are `Some` are written. Setting `text` marks the
/// text as loaded and clears a `TextLoad` error; setting `image_url` marks
/// the image as loaded and clears an `ImageLoad` error.
#[derive(Debug, Clone, Default)]
pub struct CardDataPatch {
    pub id: Option<String>,
    pub text: Option<String>,
    pub image_url: Option<String>,
}

impl CardDataPatch {
    /// Patch recording a successful text response.
    pub fn text_loaded(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: Some(text.into()),
            image_url: None,
        }
    }

    /// Patch recording a successful image response. Carries no `id`: the
    /// text-derived identifier stays authoritative.
    pub fn image_loaded(image_url: impl Into<String>) -> Self {
        Self {
            id: None,
            text: None,
            image_url: Some(image_url.into()),
        }
    }
}

/// Partial status merged by [`ReadingStore::update_card_status`].
///
/// Error stamping and clearing have dedicated operations
/// ([`ReadingStore::set_card_error`], [`ReadingStore::clear_card_error`]),
/// so the patch carries only the load flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardStatusPatch {
    pub is_loading: Option<bool>,
    pub has_loaded_text: Option<bool>,
    pub has_loaded_image: Option<bool>,
}

/// The single source of truth for one reading.
///
/// Owns a [`ReadingSession`] behind an `RwLock` and publishes a revision
/// counter through a `watch` channel after every mutation; the rendering
/// layer subscribes and re-reads a snapshot whenever the revision moves.
/// Construction, reset, and disposal are explicit — the store is passed by
/// `Arc` to whichever component tree needs it.
pub struct ReadingStore {
    state: RwLock<ReadingSession>,
    revision: watch::Sender<u64>,
}

impl Default for ReadingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: RwLock::new(ReadingSession::new()),
            revision,
        }
    }

    /// Returns a receiver that observes a revision bump after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    // ============================================================================
    // Read access
    // ============================================================================

    /// Full copy of the current session state.
    pub async fn snapshot(&self) -> ReadingSession {
        self.state.read().await.clone()
    }

    /// The slot at `index`, if the spread has one.
    pub async fn card(&self, index: usize) -> Option<CardSlot> {
        self.state.read().await.cards.get(index).cloned()
    }

    /// True while any slot is still loading.
    pub async fn is_initializing(&self) -> bool {
        self.state.read().await.is_initializing
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    pub async fn set_question(&self, question: impl Into<String>) {
        self.state.write().await.question = question.into();
        self.bump();
    }

    pub async fn set_spread(&self, spread: SpreadKind) {
        self.state.write().await.spread = spread;
        self.bump();
    }

    pub async fn set_global_error(&self, message: Option<String>) {
        self.state.write().await.global_error = message;
        self.bump();
    }

    /// Replaces the card list with `count` fresh placeholder slots and marks
    /// the session as initializing.
    pub async fn initialize_spread(&self, count: usize) {
        {
            let mut state = self.state.write().await;
            debug!("store: dealing {count} placeholder slots");
            state.spread_size = count;
            state.cards = (0..count).map(CardSlot::placeholder).collect();
            state.active_card = 0;
            state.is_initializing = true;
            state.global_error = None;
        }
        self.bump();
    }

    /// Merges the set fields of `patch` into slot `index`.
    ///
    /// Recomputes the slot's `is_loading` and the session's
    /// `is_initializing` from the load flags.
    pub async fn update_card_data(&self, index: usize, patch: CardDataPatch) {
        {
            let mut state = self.state.write().await;
            match state.cards.get_mut(index) {
                Some(card) => {
                    debug!("store: updating card {index} with {patch:?}");
                    if let Some(id) = patch.id {
                        card.id = id;
                    }
                    if let Some(text) = patch.text {
                        card.text = text;
                        card.status.has_loaded_text = true;
                        if matches!(
                            card.status.error,
                            Some(CardError {
                                kind: CardErrorKind::TextLoad,
                                ..
                            })
                        ) {
                            card.status.error = None;
                        }
                    }
                    if let Some(image_url) = patch.image_url {
                        card.image_url = image_url;
                        card.status.has_loaded_image = true;
                        if matches!(
                            card.status.error,
                            Some(CardError {
                                kind: CardErrorKind::ImageLoad,
                                ..
                            })
                        ) {
                            card.status.error = None;
                        }
                    }
                    card.status.is_loading =
                        !(card.status.has_loaded_text && card.status.has_loaded_image);
                    state.is_initializing = state.cards.iter().any(|c| c.status.is_loading);
                    state.global_error = None;
                }
                None => flag_invalid_index(&mut state, "update card", index),
            }
        }
        self.bump();
    }

    /// Merges the set flags of `patch` into slot `index` and recomputes
    /// `is_initializing`.
    pub async fn update_card_status(&self, index: usize, patch: CardStatusPatch) {
        {
            let mut state = self.state.write().await;
            match state.cards.get_mut(index) {
                Some(card) => {
                    if let Some(is_loading) = patch.is_loading {
                        card.status.is_loading = is_loading;
                    }
                    if let Some(has_loaded_text) = patch.has_loaded_text {
                        card.status.has_loaded_text = has_loaded_text;
                    }
                    if let Some(has_loaded_image) = patch.has_loaded_image {
                        card.status.has_loaded_image = has_loaded_image;
                    }
                    state.is_initializing = state.cards.iter().any(|c| c.status.is_loading);
                    state.global_error = None;
                }
                None => flag_invalid_index(&mut state, "update card status", index),
            }
        }
        self.bump();
    }

    /// Stamps a fresh error on slot `index` and takes it out of the loading
    /// state — an errored card stops blocking global initialization.
    pub async fn set_card_error(&self, index: usize, kind: CardErrorKind, message: impl Into<String>) {
        {
            let mut state = self.state.write().await;
            match state.cards.get_mut(index) {
                Some(card) => {
                    let card_error = CardError::new(kind, message);
                    error!(
                        "store: card {index} errored ({:?}): {}",
                        card_error.kind, card_error.message
                    );
                    card.status.error = Some(card_error);
                    card.status.is_loading = false;
                    state.is_initializing = state.cards.iter().any(|c| c.status.is_loading);
                }
                None => flag_invalid_index(&mut state, "set error for card", index),
            }
        }
        self.bump();
    }

    pub async fn clear_card_error(&self, index: usize) {
        {
            let mut state = self.state.write().await;
            match state.cards.get_mut(index) {
                Some(card) => card.status.error = None,
                None => flag_invalid_index(&mut state, "clear error for card", index),
            }
        }
        self.bump();
    }

    /// Appends a message to slot `index`'s chat history with a generated
    /// timestamp. The history is append-only.
    pub async fn add_message(&self, index: usize, role: MessageRole, content: impl Into<String>) {
        {
            let mut state = self.state.write().await;
            match state.cards.get_mut(index) {
                Some(card) => {
                    card.messages.push(ChatMessage::new(role, content));
                    state.global_error = None;
                }
                None => flag_invalid_index(&mut state, "add message to card", index),
            }
        }
        self.bump();
    }

    /// Advances the active card to the next position, if any remains.
    /// Returns whether the active card moved.
    pub async fn reveal_next(&self) -> bool {
        let advanced = {
            let mut state = self.state.write().await;
            if state.active_card + 1 < state.spread_size {
                state.active_card += 1;
                true
            } else {
                false
            }
        };
        if advanced {
            self.bump();
        }
        advanced
    }

    /// Restores all fields to their initial empty values.
    pub async fn reset(&self) {
        debug!("store: resetting session");
        *self.state.write().await = ReadingSession::new();
        self.bump();
    }
}

fn flag_invalid_index(state: &mut ReadingSession, operation: &str, index: usize) {
    error!(
        "store: failed to {operation} {index}, invalid index (spread has {} cards)",
        state.cards.len()
    );
    state.global_error = Some(format!("Failed to {operation} {index}: Invalid index"));
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
