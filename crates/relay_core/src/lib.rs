//! relay_core - the conversational relay itself.
//!
//! - [`transport`] - chat transport capability trait and inbound events
//! - [`action`] - typed menu actions and their payload encoding
//! - [`menu`] - menu state machine (models, prompts, settings)
//! - [`relay`] - streaming inference relay with throttled live edits
//! - [`dispatch`] - inbound event routing and the error boundary

pub mod action;
pub mod dispatch;
pub mod error;
pub mod menu;
pub mod relay;
pub mod templates;
pub mod transport;

pub use action::MenuAction;
pub use dispatch::Dispatcher;
pub use error::{RelayError, Result};
pub use transport::{Button, ChatId, ChatTransport, Inbound, InboundEvent, Keyboard, MessageHandle, TransportError};
