//! Card slot state: per-position data, load status, and errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::ChatMessage;

/// Classifies which phase of a card's lifecycle produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardErrorKind {
    /// The narrative text request failed.
    TextLoad,
    /// The image request failed; any loaded text is retained.
    ImageLoad,
    /// A chat exchange for this card failed.
    Chat,
}

/// An informational, clearable error attached to a card slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardError {
    pub kind: CardErrorKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl CardError {
    /// Creates an error stamped with the current time.
    pub fn new(kind: CardErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Load progress for a single card slot.
///
/// Invariant: `is_loading == false` implies the slot is terminal — either
/// both text and image have loaded, or `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStatus {
    pub is_loading: bool,
    pub has_loaded_text: bool,
    pub has_loaded_image: bool,
    pub error: Option<CardError>,
}

impl CardStatus {
    /// Status of a freshly dealt placeholder slot.
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            has_loaded_text: false,
            has_loaded_image: false,
            error: None,
        }
    }

    /// A slot is terminal when it requires no further network activity.
    pub fn is_terminal(&self) -> bool {
        !self.is_loading
    }
}

/// One card position within a spread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSlot {
    /// Position in the spread; stable, never reassigned.
    pub index: usize,
    /// Card identifier; authoritative once the text response arrives.
    pub id: String,
    /// Narrative content; empty until loaded.
    pub text: String,
    /// Resolved image URL; empty until loaded.
    pub image_url: String,
    pub status: CardStatus,
    /// Chat history scoped to this card, append-only.
    pub messages: Vec<ChatMessage>,
}

impl CardSlot {
    /// Creates the placeholder slot dealt by `initialize_spread`.
    pub fn placeholder(index: usize) -> Self {
        Self {
            index,
            id: String::new(),
            text: String::new(),
            image_url: String::new(),
            status: CardStatus::loading(),
            messages: Vec::new(),
        }
    }
}
