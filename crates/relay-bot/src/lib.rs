//! relay-bot - the Telegram-facing binary: Bot API transport adapter,
//! long-polling loop and CLI wiring.

pub mod logging;
pub mod run;
pub mod telegram;
