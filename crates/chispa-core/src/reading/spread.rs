//! Spread configurations.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// A named spread layout mapping to a fixed number of cards per reading.
///
/// The names round-trip through `Display`/`FromStr` so the presentation
/// layer can bind them directly to its spread selector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum SpreadKind {
    /// Past, present, future.
    #[default]
    Destiny,
    /// The cross.
    Cruz,
    /// Two-card relationship spread.
    Love,
}

impl SpreadKind {
    /// Number of cards dealt for this spread.
    pub fn card_count(self) -> usize {
        match self {
            SpreadKind::Destiny => 3,
            SpreadKind::Cruz => 4,
            SpreadKind::Love => 2,
        }
    }
}
