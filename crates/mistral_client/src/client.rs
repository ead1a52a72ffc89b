use reqwest::{Client, StatusCode};

use crate::error::{ClientError, Result};
use crate::provider::{FragmentStream, InferenceProvider};
use crate::types::ChatMessage;
use crate::wire::{build_chat_body, fragment_stream_from_sse, ModelsResponse};

use async_trait::async_trait;

pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";

/// HTTP client for the Mistral API. Holds no credential: callers pass the
/// bearer key on every request.
pub struct MistralClient {
    client: Client,
    base_url: String,
}

impl MistralClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Map a non-success response to the error taxonomy: 401/403 are
    /// credential rejections, everything else an API failure.
    async fn error_for_status(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            ClientError::Auth(format!("HTTP {status}: {body}"))
        } else {
            ClientError::Api(format!("HTTP {status}: {body}"))
        }
    }
}

impl Default for MistralClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceProvider for MistralClient {
    async fn list_models(&self, api_key: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let body = response.text().await?;
        let models: ModelsResponse = serde_json::from_str(&body)
            .map_err(|e| ClientError::Protocol(format!("invalid models response: {e}")))?;

        let ids = models.data.into_iter().map(|m| m.id).collect::<Vec<_>>();
        log::debug!("catalog returned {} models", ids.len());
        Ok(ids)
    }

    async fn chat_stream(
        &self,
        api_key: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<FragmentStream> {
        let body = build_chat_body(model, messages);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        Ok(fragment_stream_from_sse(response))
    }
}
