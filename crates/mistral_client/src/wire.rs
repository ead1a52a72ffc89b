//! Request/response shapes for the Mistral HTTP surface, plus the SSE ->
//! fragment-stream adapter for streaming completions.

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::Response;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ClientError;
use crate::provider::FragmentStream;
use crate::types::ChatMessage;

/// Build a streaming chat completion request body.
pub fn build_chat_body(model: &str, messages: &[ChatMessage]) -> Value {
    json!({
        "model": model,
        "messages": messages,
        "stream": true,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelsResponse {
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelEntry {
    pub id: String,
}

// --- Streaming chunk parsing ---

#[derive(Debug, Deserialize)]
pub(crate) struct StreamChunk {
    #[allow(dead_code)]
    id: Option<String>,
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
    #[allow(dead_code)]
    role: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SseData {
    Fragment(String),
    Done,
    Skip,
}

/// Parse a single SSE `data:` payload, leniently.
///
/// - `"[DONE]"` -> `SseData::Done`
/// - a content delta -> `SseData::Fragment`
/// - malformed JSON, empty deltas, role-only chunks -> `SseData::Skip`
///   (a bad chunk never aborts the stream)
pub(crate) fn parse_sse_data(data: &str) -> SseData {
    if data.trim() == "[DONE]" {
        return SseData::Done;
    }

    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => match chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
            Some(content) if !content.is_empty() => SseData::Fragment(content),
            _ => SseData::Skip,
        },
        Err(_) => SseData::Skip,
    }
}

/// Convert an SSE HTTP [`Response`] into a [`FragmentStream`].
///
/// Each well-formed `data:` event contributes one text fragment; skipped
/// events are filtered out here so consumers only ever see fragments.
/// Transport-level SSE failures surface as `ClientError::Stream`.
pub(crate) fn fragment_stream_from_sse(response: Response) -> FragmentStream {
    let stream = response
        .bytes_stream()
        .eventsource()
        .filter_map(|event| async move {
            match event {
                Ok(event) => match parse_sse_data(&event.data) {
                    SseData::Fragment(text) => Some(Ok(text)),
                    SseData::Done | SseData::Skip => None,
                },
                Err(e) => Some(Err(ClientError::Stream(e.to_string()))),
            }
        });

    Box::pin(stream)
}
