//! mistral_client - Mistral API access: model catalog and streaming chat completions.

pub mod client;
pub mod error;
pub mod provider;
pub mod types;
pub mod wire;

pub use client::{MistralClient, DEFAULT_BASE_URL};
pub use error::{ClientError, Result};
pub use provider::{FragmentStream, InferenceProvider};
pub use types::{ChatMessage, Role};
