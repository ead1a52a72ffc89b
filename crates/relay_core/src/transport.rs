//! Chat transport capability surface consumed by the core.
//!
//! The core never talks to Telegram directly; it sends, edits and deletes
//! messages through this trait. The binary provides the Bot API adapter.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::action::MenuAction;
use session_store::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to one outgoing message, sufficient to edit or delete it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHandle {
    pub chat: ChatId,
    pub message_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: MenuAction,
}

impl Button {
    pub fn new(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Inline keyboard attached to a message; rows of typed action buttons.
/// The transport adapter encodes actions into callback payloads on the way
/// out and decodes them back on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageHandle, TransportError>;

    async fn edit_message(
        &self,
        handle: &MessageHandle,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), TransportError>;

    async fn send_typing(&self, chat: ChatId) -> Result<(), TransportError>;

    async fn delete_message(&self, handle: &MessageHandle) -> Result<(), TransportError>;
}

/// One classified inbound event, with the identities it arrived under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub user: UserId,
    pub chat: ChatId,
    pub event: InboundEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Slash command, name without the leading `/`.
    Command { name: String },
    /// Button press, decoded to a typed action; `message` is the menu
    /// message the button lives on, so menus can morph in place.
    ButtonPress {
        action: MenuAction,
        message: MessageHandle,
    },
    /// Ordinary free text.
    FreeText { text: String },
}
