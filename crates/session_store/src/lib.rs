//! session_store - per-user in-memory conversational state.
//!
//! One [`UserSession`] per Telegram user: stored credential, selected model,
//! per-model system prompts and the one-shot pending-input expectation.
//! Nothing is persisted; a restart loses all state.

pub mod masking;
pub mod store;
pub mod structs;

pub use masking::mask_api_key;
pub use store::SessionStore;
pub use structs::{PendingInput, UserId, UserSession, DEFAULT_MODEL};
