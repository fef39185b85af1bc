//! Use-case controllers driving the reading store.
//!
//! `ReadingAcquisition` orchestrates the per-card text/image fetches for a
//! spread; `CardChat` handles follow-up questions about a single card. Both
//! share the store by `Arc` and talk to the backend through the
//! [`TarotBackend`](chispa_interaction::TarotBackend) seam.

pub mod chat;
pub mod reading;

pub use chat::CardChat;
pub use reading::{AcquisitionReport, ReadingAcquisition};
