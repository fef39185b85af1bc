//! Reading acquisition: deals the spread and drives per-card fetches.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chispa_core::reading::{CardDataPatch, CardErrorKind, ReadingStore, SpreadKind};
use chispa_core::{ChispaError, Result};
use chispa_interaction::backend::{CardTextRequest, TarotBackend};
use log::{debug, error, warn};
use tokio_util::sync::CancellationToken;

/// Diagnostic summary of one acquisition run.
///
/// Per-card errors surface on each slot's status; this aggregate only feeds
/// logging and diagnostics, it is never the user-visible signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquisitionReport {
    /// Slots the run was asked to fill.
    pub requested: usize,
    /// Slots that finished with both text and image loaded.
    pub loaded: usize,
    /// Slots that ended in a text or image error.
    pub failed: usize,
}

enum CardOutcome {
    Loaded,
    Failed,
    Cancelled,
}

/// Drives the acquisition of one full spread: deals placeholder slots, then
/// fetches text and image per card, strictly in order, merging results into
/// the shared store as they arrive.
///
/// [`start`](Self::start) runs at most once per controller — the one-shot
/// latch absorbs repeated triggers from the rendering layer.
/// [`shutdown`](Self::shutdown) flips the liveness token: in-flight requests
/// resolve as cancelled and nothing is written to the store afterwards. A
/// later card's failure never blocks or rolls back an earlier card's data.
pub struct ReadingAcquisition {
    store: Arc<ReadingStore>,
    backend: Arc<dyn TarotBackend>,
    started: AtomicBool,
    cancel: CancellationToken,
}

impl ReadingAcquisition {
    pub fn new(store: Arc<ReadingStore>, backend: Arc<dyn TarotBackend>) -> Self {
        Self {
            store,
            backend,
            started: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    /// Token observed by every store write this controller performs.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// True once a reading has been triggered on this controller.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Stops the run: in-flight calls are cancelled and no further store
    /// writes happen. Call before resetting the store or unmounting the
    /// consuming view.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Starts the reading for `question` with the given spread.
    ///
    /// Returns the diagnostic report; a repeated trigger is absorbed by the
    /// latch and reports zero requested slots.
    pub async fn start(&self, question: &str, spread: SpreadKind) -> Result<AcquisitionReport> {
        if question.trim().is_empty() {
            return Err(ChispaError::invalid_input(
                "cannot start a reading with an empty question",
            ));
        }

        // One-shot latch: repeated render triggers must not re-deal the spread.
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("reading already started, ignoring repeated trigger");
            return Ok(AcquisitionReport::default());
        }

        let spread_size = spread.card_count();
        debug!("starting {spread} reading with {spread_size} cards");

        self.store.set_question(question).await;
        self.store.set_spread(spread).await;
        self.store.initialize_spread(spread_size).await;

        let mut report = AcquisitionReport {
            requested: spread_size,
            ..Default::default()
        };

        for index in 0..spread_size {
            if self.cancel.is_cancelled() {
                debug!("acquisition cancelled before card {index}");
                break;
            }
            match self.load_card(index, question, spread_size).await {
                CardOutcome::Loaded => report.loaded += 1,
                CardOutcome::Failed => report.failed += 1,
                CardOutcome::Cancelled => {
                    debug!("acquisition cancelled while loading card {index}");
                    break;
                }
            }
        }

        if report.failed > 0 {
            error!(
                "reading finished with {} of {} cards in error",
                report.failed, report.requested
            );
        }
        Ok(report)
    }

    /// Fetches text then image for one slot. Text is a prerequisite: a text
    /// failure records the error and skips the image request entirely.
    async fn load_card(&self, index: usize, question: &str, spread_size: usize) -> CardOutcome {
        let request = CardTextRequest {
            question: question.to_string(),
            total_cards_in_spread: spread_size,
            card_number_in_spread: index,
        };

        let text = match self.backend.card_text(&request, &self.cancel).await {
            Ok(text) => text,
            Err(ChispaError::Cancelled) => return CardOutcome::Cancelled,
            Err(err) => {
                if self.cancel.is_cancelled() {
                    return CardOutcome::Cancelled;
                }
                self.store
                    .set_card_error(index, CardErrorKind::TextLoad, err.to_string())
                    .await;
                return CardOutcome::Failed;
            }
        };

        if self.cancel.is_cancelled() {
            return CardOutcome::Cancelled;
        }
        let card_id = text.id.clone();
        self.store
            .update_card_data(index, CardDataPatch::text_loaded(text.id, text.text))
            .await;

        match self.backend.card_image(&card_id, &self.cancel).await {
            Ok(image_url) => {
                if self.cancel.is_cancelled() {
                    return CardOutcome::Cancelled;
                }
                // The image endpoint may echo its own id; the text-derived id
                // stays authoritative, so only the URL is merged.
                self.store
                    .update_card_data(index, CardDataPatch::image_loaded(image_url))
                    .await;
                CardOutcome::Loaded
            }
            Err(ChispaError::Cancelled) => CardOutcome::Cancelled,
            Err(err) => {
                if self.cancel.is_cancelled() {
                    return CardOutcome::Cancelled;
                }
                // A card with text but no image is a valid partial state.
                self.store
                    .set_card_error(index, CardErrorKind::ImageLoad, err.to_string())
                    .await;
                CardOutcome::Failed
            }
        }
    }
}
