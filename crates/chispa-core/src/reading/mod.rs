//! Reading domain module.
//!
//! This module contains all reading-related domain models and the
//! observable store that owns them.
//!
//! # Module Structure
//!
//! - `model`: Core session snapshot (`ReadingSession`)
//! - `message`: Chat message types (`MessageRole`, `ChatMessage`)
//! - `card`: Per-slot state (`CardSlot`, `CardStatus`, `CardError`)
//! - `spread`: Spread layouts and card counts (`SpreadKind`)
//! - `store`: The shared, observable view model (`ReadingStore`)

mod card;
mod message;
mod model;
mod spread;
mod store;

// Re-export public API
pub use card::{CardError, CardErrorKind, CardSlot, CardStatus};
pub use message::{ChatMessage, MessageRole};
pub use model::ReadingSession;
pub use spread::SpreadKind;
pub use store::{CardDataPatch, CardStatusPatch, ReadingStore};
