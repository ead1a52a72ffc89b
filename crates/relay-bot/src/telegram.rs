//! Telegram Bot API adapter: [`ChatTransport`] over plain HTTPS plus the
//! update -> [`Inbound`] classification.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use relay_core::{
    ChatId, ChatTransport, Inbound, InboundEvent, Keyboard, MenuAction, MessageHandle,
    TransportError,
};
use session_store::UserId;

pub const DEFAULT_API_ROOT: &str = "https://api.telegram.org";

/// Long-poll wait passed to getUpdates, in seconds.
const POLL_TIMEOUT_SECS: u64 = 50;

pub struct TelegramTransport {
    client: Client,
    base_url: String,
}

impl TelegramTransport {
    pub fn new(token: &str) -> Self {
        Self::with_api_root(DEFAULT_API_ROOT, token)
    }

    /// Alternate API root, for tests and self-hosted Bot API servers.
    pub fn with_api_root(root: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/bot{token}", root.trim_end_matches('/')),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(&params)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        // The Bot API wraps both success and failure in the same envelope;
        // a non-2xx status still carries a parseable description.
        let parsed: ApiResponse<T> = serde_json::from_str(&body)
            .map_err(|_| TransportError::Api(format!("HTTP {status}: {body}")))?;

        if parsed.ok {
            parsed
                .result
                .ok_or_else(|| TransportError::Api(format!("{method}: missing result")))
        } else {
            Err(TransportError::Api(
                parsed
                    .description
                    .unwrap_or_else(|| format!("HTTP {status}")),
            ))
        }
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            json!({ "offset": offset, "timeout": POLL_TIMEOUT_SECS }),
        )
        .await
    }

    pub async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                json!({ "callback_query_id": callback_id }),
            )
            .await?;
        Ok(())
    }
}

fn inline_keyboard_json(keyboard: &Keyboard) -> Value {
    let rows: Vec<Vec<Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| {
                    json!({
                        "text": button.label,
                        "callback_data": button.action.encode(),
                    })
                })
                .collect()
        })
        .collect();
    json!({ "inline_keyboard": rows })
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageHandle, TransportError> {
        let mut params = json!({
            "chat_id": chat.0,
            "text": text,
            "parse_mode": "Markdown",
        });
        if let Some(keyboard) = keyboard {
            params["reply_markup"] = inline_keyboard_json(&keyboard);
        }

        let message: SentMessage = self.call("sendMessage", params).await?;
        Ok(MessageHandle {
            chat,
            message_id: message.message_id,
        })
    }

    async fn edit_message(
        &self,
        handle: &MessageHandle,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), TransportError> {
        let mut params = json!({
            "chat_id": handle.chat.0,
            "message_id": handle.message_id,
            "text": text,
            "parse_mode": "Markdown",
        });
        if let Some(keyboard) = keyboard {
            params["reply_markup"] = inline_keyboard_json(&keyboard);
        }

        match self.call::<Value>("editMessageText", params).await {
            Ok(_) => Ok(()),
            // Editing to identical content is a no-op, not a failure.
            Err(TransportError::Api(description))
                if description.contains("message is not modified") =>
            {
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    async fn send_typing(&self, chat: ChatId) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "sendChatAction",
                json!({ "chat_id": chat.0, "action": "typing" }),
            )
            .await?;
        Ok(())
    }

    async fn delete_message(&self, handle: &MessageHandle) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "deleteMessage",
                json!({ "chat_id": handle.chat.0, "message_id": handle.message_id }),
            )
            .await?;
        Ok(())
    }
}

// --- Bot API wire types ---

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<TgUser>,
    pub chat: TgChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: TgUser,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
    #[serde(default)]
    pub data: Option<String>,
}

/// Classify one update into an [`Inbound`] event, or `None` when there is
/// nothing actionable (stickers, joins, stale callbacks, unknown payloads).
pub fn classify_update(update: &Update) -> Option<Inbound> {
    if let Some(query) = &update.callback_query {
        let message = query.message.as_ref()?;
        let payload = query.data.as_deref()?;
        let Some(action) = MenuAction::decode(payload) else {
            log::warn!("undecodable callback payload {payload:?}");
            return None;
        };
        let chat = ChatId(message.chat.id);
        return Some(Inbound {
            user: UserId(query.from.id),
            chat,
            event: InboundEvent::ButtonPress {
                action,
                message: MessageHandle {
                    chat,
                    message_id: message.message_id,
                },
            },
        });
    }

    let message = update.message.as_ref()?;
    let from = message.from.as_ref()?;
    let text = message.text.as_deref()?;

    let event = match text.strip_prefix('/') {
        Some(rest) => {
            // "/start@my_bot arg" -> "start"
            let name = rest
                .split_whitespace()
                .next()
                .unwrap_or("")
                .split('@')
                .next()
                .unwrap_or("");
            if name.is_empty() {
                return None;
            }
            InboundEvent::Command {
                name: name.to_string(),
            }
        }
        None => InboundEvent::FreeText {
            text: text.to_string(),
        },
    };

    Some(Inbound {
        user: UserId(from.id),
        chat: ChatId(message.chat.id),
        event,
    })
}
