mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use chispa_application::CardChat;
use chispa_core::ChispaError;
use chispa_core::reading::{CardDataPatch, CardErrorKind, MessageRole, ReadingStore};
use tokio::sync::Notify;

use support::{ScriptedBackend, wait_for_calls};

/// Store with two dealt slots; slot 0 fully loaded as "the-fool".
async fn loaded_store() -> Arc<ReadingStore> {
    let store = Arc::new(ReadingStore::new());
    store.initialize_spread(2).await;
    store
        .update_card_data(0, CardDataPatch::text_loaded("the-fool", "New beginnings"))
        .await;
    store
        .update_card_data(0, CardDataPatch::image_loaded("https://x/fool.jpg"))
        .await;
    store
}

#[tokio::test]
async fn test_send_appends_user_then_assistant() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(ScriptedBackend::new().with_chat_gate(gate.clone()));
    let store = loaded_store().await;
    let chat = Arc::new(CardChat::new(store.clone(), backend.clone(), 0));

    let task = tokio::spawn({
        let chat = chat.clone();
        async move { chat.send_message("should I take the leap?").await }
    });

    // The user message is in the history before the backend answers.
    wait_for_calls(&backend.chat_calls, 1).await;
    let messages = store.card(0).await.unwrap().messages;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[0].content, "should I take the leap?");
    assert!(chat.is_sending());

    gate.notify_one();
    task.await.unwrap().unwrap();

    let messages = store.card(0).await.unwrap().messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert_eq!(
        messages[1].content,
        "The spirits answer: should I take the leap?"
    );
    assert!(!chat.is_sending());
    assert!(chat.last_error().await.is_none());
}

#[tokio::test]
async fn test_failed_send_keeps_the_user_message() {
    let backend = Arc::new(ScriptedBackend::new().fail_chat());
    let store = loaded_store().await;
    let chat = CardChat::new(store.clone(), backend.clone(), 0);

    let err = chat.send_message("hello?").await.unwrap_err();
    assert!(matches!(err, ChispaError::ChatFetch(_)));

    let messages = store.card(0).await.unwrap().messages;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::User);

    let last_error = chat.last_error().await.unwrap();
    assert_eq!(last_error.kind, CardErrorKind::Chat);
    assert!(!chat.is_sending());
}

#[tokio::test]
async fn test_blank_message_is_rejected_without_store_mutation() {
    let backend = Arc::new(ScriptedBackend::new());
    let store = loaded_store().await;
    let chat = CardChat::new(store.clone(), backend.clone(), 0);

    let err = chat.send_message("   ").await.unwrap_err();
    assert!(matches!(err, ChispaError::InvalidInput(_)));
    assert_eq!(backend.chat_calls.load(Ordering::SeqCst), 0);
    assert!(store.card(0).await.unwrap().messages.is_empty());
    assert!(chat.last_error().await.is_some());
}

#[tokio::test]
async fn test_unknown_card_is_rejected() {
    let backend = Arc::new(ScriptedBackend::new());
    let store = loaded_store().await;
    let chat = CardChat::new(store.clone(), backend.clone(), 99);

    let err = chat.send_message("anyone there?").await.unwrap_err();
    assert!(matches!(err, ChispaError::InvalidInput(_)));
    assert_eq!(backend.chat_calls.load(Ordering::SeqCst), 0);
    // Rejection is local: the session records no structural error.
    assert!(store.snapshot().await.global_error.is_none());
}

#[tokio::test]
async fn test_card_without_text_is_rejected() {
    let backend = Arc::new(ScriptedBackend::new());
    let store = loaded_store().await;
    // Slot 1 was dealt but its text never arrived.
    let chat = CardChat::new(store.clone(), backend.clone(), 1);

    let err = chat.send_message("too early?").await.unwrap_err();
    assert!(matches!(err, ChispaError::InvalidInput(_)));
    assert!(store.card(1).await.unwrap().messages.is_empty());
}

#[tokio::test]
async fn test_second_send_while_pending_is_dropped() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(ScriptedBackend::new().with_chat_gate(gate.clone()));
    let store = loaded_store().await;
    let chat = Arc::new(CardChat::new(store.clone(), backend.clone(), 0));

    let task = tokio::spawn({
        let chat = chat.clone();
        async move { chat.send_message("first question").await }
    });
    wait_for_calls(&backend.chat_calls, 1).await;

    // Dropped as a no-op: no request, no extra history entry.
    chat.send_message("impatient second question").await.unwrap();
    assert_eq!(backend.chat_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.card(0).await.unwrap().messages.len(), 1);

    gate.notify_one();
    task.await.unwrap().unwrap();
    assert_eq!(store.card(0).await.unwrap().messages.len(), 2);
}

#[tokio::test]
async fn test_history_sent_to_backend_excludes_current_send() {
    let backend = Arc::new(ScriptedBackend::new());
    let store = loaded_store().await;
    let chat = CardChat::new(store.clone(), backend.clone(), 0);

    chat.send_message("first question").await.unwrap();
    {
        let request = backend.last_chat_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.card_id, "the-fool");
        assert!(request.previous_messages.is_empty());
    }

    chat.send_message("second question").await.unwrap();
    let request = backend.last_chat_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.previous_messages.len(), 2);
    assert_eq!(request.previous_messages[0].content, "first question");
    assert_eq!(
        request.previous_messages[1].content,
        "The spirits answer: first question"
    );
}

#[tokio::test]
async fn test_shutdown_swallows_the_pending_reply() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(ScriptedBackend::new().with_chat_gate(gate.clone()));
    let store = loaded_store().await;
    let chat = Arc::new(CardChat::new(store.clone(), backend.clone(), 0));

    let task = tokio::spawn({
        let chat = chat.clone();
        async move { chat.send_message("are you still there?").await }
    });
    wait_for_calls(&backend.chat_calls, 1).await;

    chat.shutdown();
    task.await.unwrap().unwrap();

    // The optimistic user message stays; nothing else was written.
    let messages = store.card(0).await.unwrap().messages;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::User);
    assert!(chat.last_error().await.is_none());
    assert!(!chat.is_sending());
}
