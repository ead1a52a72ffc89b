//! Inbound event routing and the per-event error boundary.

use std::sync::Arc;

use mistral_client::{ClientError, InferenceProvider};
use session_store::{mask_api_key, PendingInput, SessionStore, UserId};

use crate::error::{RelayError, Result};
use crate::menu::{self, RenderTarget};
use crate::relay;
use crate::transport::{ChatId, ChatTransport, Inbound, InboundEvent};

pub struct Dispatcher {
    transport: Arc<dyn ChatTransport>,
    provider: Arc<dyn InferenceProvider>,
    store: SessionStore,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        provider: Arc<dyn InferenceProvider>,
        store: SessionStore,
    ) -> Self {
        Self {
            transport,
            provider,
            store,
        }
    }

    /// Handle one inbound event. Never returns an error: every failure is
    /// logged and converted into a user-visible chat message here.
    pub async fn handle(&self, inbound: Inbound) {
        let Inbound { user, chat, event } = inbound;

        let result = match event {
            InboundEvent::Command { name } => self.handle_command(user, chat, &name).await,
            InboundEvent::ButtonPress { action, message } => {
                menu::handle_action(
                    self.transport.as_ref(),
                    self.provider.as_ref(),
                    &self.store,
                    user,
                    action,
                    message,
                )
                .await
            }
            InboundEvent::FreeText { text } => self.handle_free_text(user, chat, &text).await,
        };

        if let Err(error) = result {
            log::error!("handler failed for user {user}: {error}");
            let text = user_facing_error(&error);
            if let Err(send_error) = self.transport.send_message(chat, text, None).await {
                log::error!("failed to report error to chat {chat}: {send_error}");
            }
        }
    }

    async fn handle_command(&self, user: UserId, chat: ChatId, name: &str) -> Result<()> {
        match name {
            "start" => {
                menu::handle_start(
                    self.transport.as_ref(),
                    self.provider.as_ref(),
                    &self.store,
                    user,
                    chat,
                )
                .await
            }
            "settings" => {
                menu::show_settings(self.transport.as_ref(), RenderTarget::Send(chat), None).await
            }
            other => {
                log::debug!("ignoring unknown command /{other} from user {user}");
                Ok(())
            }
        }
    }

    /// Free text goes to pending-input handling first; only unclaimed text
    /// reaches the relay.
    async fn handle_free_text(&self, user: UserId, chat: ChatId, text: &str) -> Result<()> {
        match self.store.take_pending_input(user).await {
            Some(PendingInput::AwaitingApiKey) => {
                self.store.set_api_key(user, text.to_string()).await;
                self.transport
                    .send_message(
                        chat,
                        &format!("API key saved: {}", mask_api_key(text)),
                        Some(menu::settings_keyboard()),
                    )
                    .await?;
                Ok(())
            }
            Some(PendingInput::AwaitingPrompt { model }) => {
                self.store.set_prompt(user, &model, text.to_string()).await;
                menu::show_model_detail(
                    self.transport.as_ref(),
                    &self.store,
                    user,
                    RenderTarget::Send(chat),
                    &model,
                )
                .await
            }
            None => {
                relay::run_relay(
                    self.transport.as_ref(),
                    self.provider.as_ref(),
                    &self.store,
                    user,
                    chat,
                    text,
                )
                .await
            }
        }
    }
}

fn user_facing_error(error: &RelayError) -> &'static str {
    match error {
        RelayError::MissingApiKey => {
            "No API key configured. Use /settings to set your Mistral API key first."
        }
        RelayError::Provider(ClientError::Auth(_)) => {
            "Your API key was rejected. Check your settings."
        }
        RelayError::Provider(_) => "The model provider could not be reached. Please try again later.",
        RelayError::Transport(_) => "Sending the reply failed. Please try again.",
    }
}
