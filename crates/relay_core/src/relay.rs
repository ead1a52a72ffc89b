//! Streaming inference relay: placeholder message, throttled live edits,
//! unconditional final flush.

use std::time::Duration;

use futures::StreamExt;
use mistral_client::{ChatMessage, FragmentStream, InferenceProvider};
use session_store::{SessionStore, UserId};
use tokio::time::Instant;

use crate::error::{RelayError, Result};
use crate::transport::{ChatId, ChatTransport, MessageHandle};

/// Minimum time between live edits of the placeholder. Bounds the edit
/// rate against the chat transport's limits.
pub const EDIT_INTERVAL: Duration = Duration::from_secs(1);

const PLACEHOLDER_TEXT: &str = "…";
const EMPTY_ANSWER_TEXT: &str = "(empty response)";

fn format_answer(text: &str, model: &str) -> String {
    format!("{text}\n\nUsing model: `{model}`")
}

/// Relay one user message to the inference endpoint and live-edit the
/// answer into place.
///
/// Stateless with respect to history: the request carries the optional
/// system prompt for the selected model and this one user message, nothing
/// else. A missing credential fails before anything is sent.
pub async fn run_relay(
    transport: &dyn ChatTransport,
    provider: &dyn InferenceProvider,
    store: &SessionStore,
    user: UserId,
    chat: ChatId,
    text: &str,
) -> Result<()> {
    let session = store.get(user).await;
    let Some(api_key) = session.api_key.clone() else {
        return Err(RelayError::MissingApiKey);
    };

    let model = session.selected_model.clone();
    let mut messages = Vec::with_capacity(2);
    let prompt = session.prompt_for(&model);
    if !prompt.is_empty() {
        messages.push(ChatMessage::system(prompt));
    }
    messages.push(ChatMessage::user(text));

    if let Err(error) = transport.send_typing(chat).await {
        log::debug!("typing indicator failed for chat {chat}: {error}");
    }

    // The user sees the request was received before any fragment arrives.
    let placeholder = transport.send_message(chat, PLACEHOLDER_TEXT, None).await?;

    let stream = match provider.chat_stream(&api_key, &model, &messages).await {
        Ok(stream) => stream,
        Err(error) => {
            // Nothing streamed yet; drop the placeholder so the failure
            // message sent by the caller stands alone.
            if let Err(delete_err) = transport.delete_message(&placeholder).await {
                log::debug!("failed to delete placeholder: {delete_err}");
            }
            return Err(error.into());
        }
    };

    log::info!("relaying message for user {user} via {model}");
    stream_to_edits(transport, stream, &placeholder, &model).await
}

/// Consume the fragment stream, accumulating the canonical answer buffer
/// and editing the placeholder at most once per [`EDIT_INTERVAL`]. The
/// final edit is unconditional so the last state shown always matches the
/// full answer.
async fn stream_to_edits(
    transport: &dyn ChatTransport,
    mut stream: FragmentStream,
    placeholder: &MessageHandle,
    model: &str,
) -> Result<()> {
    let mut buffer = String::new();
    let mut shown_len = 0usize;
    let mut last_edit = Instant::now();
    let mut stream_error = None;

    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => {
                buffer.push_str(&fragment);

                if last_edit.elapsed() >= EDIT_INTERVAL && buffer.len() > shown_len {
                    match transport
                        .edit_message(placeholder, &format_answer(&buffer, model), None)
                        .await
                    {
                        Ok(()) => {
                            last_edit = Instant::now();
                            shown_len = buffer.len();
                        }
                        // Swallowed; the next tick retries with a fresher buffer.
                        Err(error) => log::warn!("live edit failed, retrying next tick: {error}"),
                    }
                }
            }
            Err(error) => {
                stream_error = Some(error);
                break;
            }
        }
    }

    if let Some(error) = stream_error {
        log::error!("stream aborted after {} bytes: {error}", buffer.len());
        if buffer.is_empty() {
            if let Err(delete_err) = transport.delete_message(placeholder).await {
                log::debug!("failed to delete placeholder: {delete_err}");
            }
        } else {
            // Flush what arrived; the caller still reports the failure.
            transport
                .edit_message(placeholder, &format_answer(&buffer, model), None)
                .await?;
        }
        return Err(error.into());
    }

    let final_text = if buffer.is_empty() {
        // Zero fragments: the answer is defined as empty and shown once.
        format_answer(EMPTY_ANSWER_TEXT, model)
    } else {
        format_answer(&buffer, model)
    };
    transport.edit_message(placeholder, &final_text, None).await?;

    Ok(())
}
