//! Relay loop behavior: throttled edits, final flush, failure paths.


use std::time::Duration;

use mistral_client::ClientError;
use relay_core::relay::run_relay;
use relay_core::{ChatId, RelayError};
use session_store::{SessionStore, UserId};
use test_utils::{FakeProvider, MockTransport, ScriptItem, TransportCall};

const USER: UserId = UserId(10);
const CHAT: ChatId = ChatId(20);

async fn store_with_key() -> SessionStore {
    let store = SessionStore::new();
    store.set_api_key(USER, "test-key".to_string()).await;
    store
}

#[tokio::test(start_paused = true)]
async fn throttled_edit_scenario_matches_tick_boundaries() {
    let transport = MockTransport::new();
    let provider = FakeProvider::new(&[]);
    provider.push_stream(vec![
        ScriptItem::Fragment("Hi"),
        // The throttle interval elapses between fragment 1 and 2 only.
        ScriptItem::DelayedFragment(" there", Duration::from_millis(1100)),
        ScriptItem::Fragment("!"),
    ]);
    let store = store_with_key().await;

    run_relay(transport.as_ref(), provider.as_ref(), &store, USER, CHAT, "hello")
        .await
        .unwrap();

    // One mid-stream edit ("Hi there"), one final edit ("Hi there!").
    // "Hi" alone is never displayed.
    assert_eq!(
        transport.edit_texts(),
        vec![
            "Hi there\n\nUsing model: `mistral-tiny`",
            "Hi there!\n\nUsing model: `mistral-tiny`",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn placeholder_is_sent_before_any_fragment() {
    let transport = MockTransport::new();
    let provider = FakeProvider::new(&[]);
    provider.push_stream(vec![ScriptItem::Fragment("Hi")]);
    let store = store_with_key().await;

    run_relay(transport.as_ref(), provider.as_ref(), &store, USER, CHAT, "hello")
        .await
        .unwrap();

    let calls = transport.calls();
    assert_eq!(calls[0], TransportCall::Typing { chat: CHAT.0 });
    assert!(matches!(&calls[1], TransportCall::Send { text, .. } if text == "…"));
}

#[tokio::test(start_paused = true)]
async fn final_edit_shows_full_concatenation_of_fragments() {
    let transport = MockTransport::new();
    let provider = FakeProvider::new(&[]);
    provider.push_stream(vec![
        ScriptItem::Fragment("a"),
        ScriptItem::DelayedFragment("b", Duration::from_millis(1500)),
        ScriptItem::DelayedFragment("c", Duration::from_millis(1500)),
        ScriptItem::Fragment("d"),
    ]);
    let store = store_with_key().await;

    run_relay(transport.as_ref(), provider.as_ref(), &store, USER, CHAT, "go")
        .await
        .unwrap();

    let edits = transport.edit_texts();
    assert_eq!(
        edits.last().unwrap(),
        "abcd\n\nUsing model: `mistral-tiny`"
    );
    // Intermediate edits are prefixes of the final answer (buffer is
    // monotonically non-decreasing).
    for edit in &edits {
        let shown = edit.split("\n\nUsing model:").next().unwrap();
        assert!("abcd".starts_with(shown), "unexpected edit {edit:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn zero_fragment_stream_still_gets_one_final_edit() {
    let transport = MockTransport::new();
    let provider = FakeProvider::new(&[]);
    provider.push_stream(vec![]);
    let store = store_with_key().await;

    run_relay(transport.as_ref(), provider.as_ref(), &store, USER, CHAT, "hello")
        .await
        .unwrap();

    assert_eq!(
        transport.edit_texts(),
        vec!["(empty response)\n\nUsing model: `mistral-tiny`"]
    );
}

#[tokio::test(start_paused = true)]
async fn failed_live_edits_are_swallowed_and_retried() {
    let transport = MockTransport::new();
    let provider = FakeProvider::new(&[]);
    provider.push_stream(vec![
        ScriptItem::Fragment("a"),
        ScriptItem::DelayedFragment("b", Duration::from_millis(1100)),
        ScriptItem::DelayedFragment("c", Duration::from_millis(1100)),
    ]);
    let store = store_with_key().await;
    transport.fail_next_edits(1);

    run_relay(transport.as_ref(), provider.as_ref(), &store, USER, CHAT, "go")
        .await
        .unwrap();

    // The edit for "ab" fails silently; the next tick shows "abc" and the
    // final flush repeats it.
    assert_eq!(
        transport.edit_texts(),
        vec![
            "abc\n\nUsing model: `mistral-tiny`",
            "abc\n\nUsing model: `mistral-tiny`",
        ]
    );
}

#[tokio::test]
async fn missing_api_key_fails_before_any_transport_call() {
    let transport = MockTransport::new();
    let provider = FakeProvider::new(&[]);
    let store = SessionStore::new();

    let err = run_relay(transport.as_ref(), provider.as_ref(), &store, USER, CHAT, "hi")
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::MissingApiKey));
    assert!(transport.calls().is_empty());
    assert!(provider.chat_requests().is_empty());
}

#[tokio::test]
async fn request_failure_deletes_placeholder() {
    let transport = MockTransport::new();
    let provider = FakeProvider::new(&[]);
    provider.fail_next_chat(ClientError::Api("HTTP 500".to_string()));
    let store = store_with_key().await;

    let err = run_relay(transport.as_ref(), provider.as_ref(), &store, USER, CHAT, "hi")
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Provider(ClientError::Api(_))));
    assert_eq!(transport.deleted().len(), 1);
    assert!(transport.edit_texts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn mid_stream_error_with_empty_buffer_deletes_placeholder() {
    let transport = MockTransport::new();
    let provider = FakeProvider::new(&[]);
    provider.push_stream(vec![ScriptItem::Error("connection reset")]);
    let store = store_with_key().await;

    let err = run_relay(transport.as_ref(), provider.as_ref(), &store, USER, CHAT, "hi")
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Provider(ClientError::Stream(_))));
    assert_eq!(transport.deleted().len(), 1);
    assert!(transport.edit_texts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn mid_stream_error_flushes_partial_answer() {
    let transport = MockTransport::new();
    let provider = FakeProvider::new(&[]);
    provider.push_stream(vec![
        ScriptItem::Fragment("partial"),
        ScriptItem::Error("connection reset"),
    ]);
    let store = store_with_key().await;

    let err = run_relay(transport.as_ref(), provider.as_ref(), &store, USER, CHAT, "hi")
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Provider(_)));
    assert!(transport.deleted().is_empty());
    assert_eq!(
        transport.edit_texts(),
        vec!["partial\n\nUsing model: `mistral-tiny`"]
    );
}

#[tokio::test(start_paused = true)]
async fn relay_uses_selected_model_and_stored_prompt() {
    let transport = MockTransport::new();
    let provider = FakeProvider::new(&[]);
    provider.push_stream(vec![ScriptItem::Fragment("ok")]);
    let store = store_with_key().await;
    store
        .set_selected_model(USER, "mistral-medium".to_string())
        .await;
    store
        .set_prompt(USER, "mistral-medium", "be terse".to_string())
        .await;

    run_relay(transport.as_ref(), provider.as_ref(), &store, USER, CHAT, "question")
        .await
        .unwrap();

    let requests = provider.chat_requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.api_key, "test-key");
    assert_eq!(request.model, "mistral-medium");
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].content, "be terse");
    assert_eq!(request.messages[1].content, "question");
    assert_eq!(
        transport.edit_texts(),
        vec!["ok\n\nUsing model: `mistral-medium`"]
    );
}

#[tokio::test(start_paused = true)]
async fn empty_prompt_sends_no_system_message() {
    let transport = MockTransport::new();
    let provider = FakeProvider::new(&[]);
    provider.push_stream(vec![ScriptItem::Fragment("ok")]);
    let store = store_with_key().await;
    store.clear_prompt(USER, "mistral-tiny").await;

    run_relay(transport.as_ref(), provider.as_ref(), &store, USER, CHAT, "hello")
        .await
        .unwrap();

    let request = &provider.chat_requests()[0];
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.messages[0].content, "hello");
}
