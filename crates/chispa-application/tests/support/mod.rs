#![allow(dead_code)]

//! Scripted in-process backend for controller tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chispa_core::{ChispaError, Result};
use chispa_interaction::backend::{CardTextRequest, CardTextResponse, ChatRequest, TarotBackend};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Backend double with per-endpoint call counters and scriptable failures.
///
/// Unscripted cards answer with deterministic `card-{index}` identities so
/// tests can key image failures and assertions off the index.
pub struct ScriptedBackend {
    pub text_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub chat_calls: AtomicUsize,
    pub last_chat_request: Mutex<Option<ChatRequest>>,
    text_script: HashMap<usize, (String, String)>,
    image_script: HashMap<String, String>,
    fail_text_for: Vec<usize>,
    fail_image_for: Vec<String>,
    hang_text_for: Option<usize>,
    fail_chat: bool,
    chat_gate: Option<Arc<Notify>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            text_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            chat_calls: AtomicUsize::new(0),
            last_chat_request: Mutex::new(None),
            text_script: HashMap::new(),
            image_script: HashMap::new(),
            fail_text_for: Vec::new(),
            fail_image_for: Vec::new(),
            hang_text_for: None,
            fail_chat: false,
            chat_gate: None,
        }
    }

    /// Scripts the text response for one card position.
    pub fn with_text(mut self, index: usize, id: &str, text: &str) -> Self {
        self.text_script
            .insert(index, (id.to_string(), text.to_string()));
        self
    }

    /// Scripts the image URL for one card id.
    pub fn with_image(mut self, id: &str, image_url: &str) -> Self {
        self.image_script
            .insert(id.to_string(), image_url.to_string());
        self
    }

    /// Makes the text request for `index` fail.
    pub fn fail_text_for(mut self, index: usize) -> Self {
        self.fail_text_for.push(index);
        self
    }

    /// Makes the image request for `card_id` fail.
    pub fn fail_image_for(mut self, card_id: &str) -> Self {
        self.fail_image_for.push(card_id.to_string());
        self
    }

    /// Makes the text request for `index` block until its token cancels.
    pub fn hang_text_for(mut self, index: usize) -> Self {
        self.hang_text_for = Some(index);
        self
    }

    /// Makes every chat request fail.
    pub fn fail_chat(mut self) -> Self {
        self.fail_chat = true;
        self
    }

    /// Makes chat requests wait on `gate` (or their cancellation token)
    /// before answering.
    pub fn with_chat_gate(mut self, gate: Arc<Notify>) -> Self {
        self.chat_gate = Some(gate);
        self
    }
}

#[async_trait]
impl TarotBackend for ScriptedBackend {
    async fn card_text(
        &self,
        request: &CardTextRequest,
        cancel: &CancellationToken,
    ) -> Result<CardTextResponse> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        let index = request.card_number_in_spread;

        if self.hang_text_for == Some(index) {
            cancel.cancelled().await;
            return Err(ChispaError::Cancelled);
        }
        if self.fail_text_for.contains(&index) {
            return Err(ChispaError::TextFetch(format!("no text for card {index}")));
        }

        let (id, text) = self
            .text_script
            .get(&index)
            .cloned()
            .unwrap_or_else(|| (format!("card-{index}"), format!("Meaning of card {index}")));
        Ok(CardTextResponse { id, text })
    }

    async fn card_image(&self, card_id: &str, _cancel: &CancellationToken) -> Result<String> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_image_for.iter().any(|id| id == card_id) {
            return Err(ChispaError::ImageFetch(format!("no image for {card_id}")));
        }

        Ok(self
            .image_script
            .get(card_id)
            .cloned()
            .unwrap_or_else(|| format!("https://cards.test/{card_id}.jpg")))
    }

    async fn chat_reply(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_chat_request.lock().unwrap() = Some(request.clone());

        if let Some(gate) = &self.chat_gate {
            tokio::select! {
                _ = gate.notified() => {}
                _ = cancel.cancelled() => return Err(ChispaError::Cancelled),
            }
        }

        if self.fail_chat {
            return Err(ChispaError::ChatFetch("the spirits are silent".to_string()));
        }

        Ok(format!("The spirits answer: {}", request.user_message))
    }
}

/// Spins until `calls` reaches `expected` or the wait budget runs out.
pub async fn wait_for_calls(calls: &AtomicUsize, expected: usize) {
    for _ in 0..200 {
        if calls.load(Ordering::SeqCst) >= expected {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!(
        "expected {expected} calls, saw {}",
        calls.load(Ordering::SeqCst)
    );
}
