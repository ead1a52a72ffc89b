//! Session data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Model used until the user explicitly selects another one.
pub const DEFAULT_MODEL: &str = "mistral-tiny";

/// Telegram user identity, the session key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A one-shot expectation that the user's next free-text message satisfies
/// a specific purpose. Cleared as soon as it is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingInput {
    AwaitingApiKey,
    AwaitingPrompt { model: String },
}

/// Per-user session state - created lazily on first interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    /// Bearer credential for the inference provider; unset until supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Active model; mutated only by explicit selection.
    pub selected_model: String,

    /// Custom system prompt per model. Empty string means "no prompt".
    #[serde(default)]
    pub prompts: HashMap<String, String>,

    /// At most one pending free-text expectation at a time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_input: Option<PendingInput>,

    /// Last time the session was mutated.
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl Default for UserSession {
    fn default() -> Self {
        Self {
            api_key: None,
            selected_model: DEFAULT_MODEL.to_string(),
            prompts: HashMap::new(),
            pending_input: None,
            last_updated: Utc::now(),
        }
    }
}

impl UserSession {
    /// Stored prompt for `model`; absent and cleared prompts both read as "".
    pub fn prompt_for(&self, model: &str) -> &str {
        self.prompts.get(model).map(String::as_str).unwrap_or("")
    }
}
