use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::Result;
use crate::types::ChatMessage;

/// A lazy, finite, non-restartable sequence of assistant text fragments.
/// Fragments are additive deltas; the consumer owns accumulation.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Inference endpoint seam: model catalog plus streaming chat completions.
///
/// The credential is an explicit argument on every call; implementations
/// must not read it from shared state.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// List available model identifiers, in the order the provider returns them.
    async fn list_models(&self, api_key: &str) -> Result<Vec<String>>;

    /// Open a streaming chat completion for `model` over `messages`.
    async fn chat_stream(
        &self,
        api_key: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<FragmentStream>;
}
