//! Reading session domain model.

use serde::{Deserialize, Serialize};

use super::card::CardSlot;
use super::spread::SpreadKind;

/// Snapshot of everything one reading owns: the question, the spread
/// configuration, the dealt card slots, and the derived global flags.
///
/// This is the "pure" model the controllers operate on; the
/// [`ReadingStore`](super::ReadingStore) owns the live copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingSession {
    /// The user's question; immutable once a reading starts.
    pub question: String,
    /// The selected spread layout.
    pub spread: SpreadKind,
    /// Number of slots dealt for the current reading.
    pub spread_size: usize,
    /// The dealt slots, `spread_size` long once initialized.
    pub cards: Vec<CardSlot>,
    /// Index of the card currently revealed to the user.
    pub active_card: usize,
    /// True until every slot has reached a terminal state.
    pub is_initializing: bool,
    /// Structural failures (e.g. an out-of-range slot index).
    pub global_error: Option<String>,
}

impl ReadingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once every slot is terminal (loaded or errored).
    pub fn all_terminal(&self) -> bool {
        self.cards.iter().all(|card| card.status.is_terminal())
    }
}
