//! Menu state machine: models list, per-model prompt menu, settings.
//!
//! Button-driven transitions edit the menu message in place; command- and
//! free-text-driven renders send a fresh message. The session store is the
//! only state; the "current screen" is whatever was rendered last.

use mistral_client::InferenceProvider;
use session_store::{mask_api_key, PendingInput, SessionStore, UserId};

use crate::action::MenuAction;
use crate::error::Result;
use crate::templates::{template_text, TEMPLATES};
use crate::transport::{Button, ChatId, ChatTransport, Keyboard, MessageHandle};

const WELCOME_TEXT: &str = "Welcome! Select a model:";
const MODEL_LIST_TEXT: &str = "Select a model:";
const SETTINGS_TEXT: &str = "Settings";
const CONFIGURE_FIRST_TEXT: &str =
    "No API key configured. Set your Mistral API key to get started.";
const API_KEY_PROMPT_TEXT: &str = "Send your Mistral API key as a message:";
const NO_KEY_TEXT: &str = "No key set";

/// Where a render goes: a fresh message, or an in-place edit of the menu
/// message a button press arrived on.
#[derive(Debug, Clone, Copy)]
pub enum RenderTarget {
    Send(ChatId),
    Edit(MessageHandle),
}

async fn render(
    transport: &dyn ChatTransport,
    target: RenderTarget,
    text: &str,
    keyboard: Option<Keyboard>,
) -> Result<()> {
    match target {
        RenderTarget::Send(chat) => {
            transport.send_message(chat, text, keyboard).await?;
        }
        RenderTarget::Edit(handle) => {
            transport.edit_message(&handle, text, keyboard).await?;
        }
    }
    Ok(())
}

/// Truncate a stored prompt for display: at most two content lines plus an
/// ellipsis line.
pub fn prompt_preview(prompt: &str) -> String {
    if prompt.is_empty() {
        return "No prompt set".to_string();
    }

    let lines: Vec<&str> = prompt.split('\n').collect();
    if lines.len() > 2 {
        format!("{}\n{}\n...", lines[0], lines[1])
    } else {
        prompt.to_string()
    }
}

/// Model buttons, two per row, generated from the catalog.
pub fn model_list_keyboard(models: &[String]) -> Keyboard {
    let mut rows: Vec<Vec<Button>> = models
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|m| Button::new(m.clone(), MenuAction::SelectModel(m.clone())))
                .collect()
        })
        .collect();
    rows.push(vec![Button::new("Settings", MenuAction::OpenSettings)]);
    Keyboard { rows }
}

pub fn model_detail_keyboard(model: &str) -> Keyboard {
    Keyboard {
        rows: vec![
            vec![Button::new(
                "Set New Prompt",
                MenuAction::SetPrompt(model.to_string()),
            )],
            TEMPLATES
                .iter()
                .map(|t| {
                    Button::new(
                        t.label,
                        MenuAction::ApplyTemplate {
                            template: t.name.to_string(),
                            model: model.to_string(),
                        },
                    )
                })
                .collect(),
            vec![Button::new(
                "Clear Prompt",
                MenuAction::ClearPrompt(model.to_string()),
            )],
            vec![Button::new("Back to Models", MenuAction::BackToModels)],
        ],
    }
}

pub fn settings_keyboard() -> Keyboard {
    Keyboard {
        rows: vec![
            vec![Button::new("Set API Key", MenuAction::SetApiKey)],
            vec![Button::new("Check API Key", MenuAction::CheckApiKey)],
            vec![Button::new("Back to Models", MenuAction::BackToModels)],
        ],
    }
}

/// Render the per-model prompt menu with the current prompt preview.
pub async fn show_model_detail(
    transport: &dyn ChatTransport,
    store: &SessionStore,
    user: UserId,
    target: RenderTarget,
    model: &str,
) -> Result<()> {
    let session = store.get(user).await;
    let preview = prompt_preview(session.prompt_for(model));
    let text = format!("Model: {model}\nCurrent prompt:\n{preview}");
    render(transport, target, &text, Some(model_detail_keyboard(model))).await
}

pub async fn show_settings(
    transport: &dyn ChatTransport,
    target: RenderTarget,
    notice: Option<&str>,
) -> Result<()> {
    let text = match notice {
        Some(notice) => format!("{SETTINGS_TEXT}\n\n{notice}"),
        None => SETTINGS_TEXT.to_string(),
    };
    render(transport, target, &text, Some(settings_keyboard())).await
}

async fn show_model_list(
    transport: &dyn ChatTransport,
    provider: &dyn InferenceProvider,
    api_key: &str,
    target: RenderTarget,
    text: &str,
) -> Result<()> {
    let models = provider.list_models(api_key).await?;
    render(transport, target, text, Some(model_list_keyboard(&models))).await
}

/// `/start`: without a credential the user lands in Settings and the
/// catalog is never fetched; with one, the model list is rendered.
pub async fn handle_start(
    transport: &dyn ChatTransport,
    provider: &dyn InferenceProvider,
    store: &SessionStore,
    user: UserId,
    chat: ChatId,
) -> Result<()> {
    let session = store.get(user).await;
    match session.api_key {
        None => show_settings(transport, RenderTarget::Send(chat), Some(CONFIGURE_FIRST_TEXT)).await,
        Some(key) => {
            show_model_list(transport, provider, &key, RenderTarget::Send(chat), WELCOME_TEXT).await
        }
    }
}

/// The transition table: one typed action in, session mutation plus render
/// out. `origin` is the menu message the press arrived on.
pub async fn handle_action(
    transport: &dyn ChatTransport,
    provider: &dyn InferenceProvider,
    store: &SessionStore,
    user: UserId,
    action: MenuAction,
    origin: MessageHandle,
) -> Result<()> {
    let edit = RenderTarget::Edit(origin);
    match action {
        MenuAction::SelectModel(model) => {
            store.set_selected_model(user, model.clone()).await;
            show_model_detail(transport, store, user, edit, &model).await
        }
        MenuAction::SetPrompt(model) => {
            store
                .set_pending_input(user, PendingInput::AwaitingPrompt {
                    model: model.clone(),
                })
                .await;
            render(
                transport,
                edit,
                &format!("Enter system prompt for {model}:"),
                None,
            )
            .await
        }
        MenuAction::ApplyTemplate { template, model } => {
            match template_text(&template) {
                Some(text) => store.set_prompt(user, &model, text.to_string()).await,
                None => log::warn!("user {user} pressed unknown template {template:?}"),
            }
            show_model_detail(transport, store, user, edit, &model).await
        }
        MenuAction::ClearPrompt(model) => {
            store.clear_prompt(user, &model).await;
            show_model_detail(transport, store, user, edit, &model).await
        }
        MenuAction::BackToModels => {
            let session = store.get(user).await;
            match session.api_key {
                None => show_settings(transport, edit, Some(CONFIGURE_FIRST_TEXT)).await,
                Some(key) => {
                    show_model_list(transport, provider, &key, edit, MODEL_LIST_TEXT).await
                }
            }
        }
        MenuAction::OpenSettings => show_settings(transport, edit, None).await,
        MenuAction::SetApiKey => {
            store.set_pending_input(user, PendingInput::AwaitingApiKey).await;
            render(transport, edit, API_KEY_PROMPT_TEXT, None).await
        }
        MenuAction::CheckApiKey => {
            let session = store.get(user).await;
            let text = match session.api_key.as_deref() {
                Some(key) => format!("API key: {}", mask_api_key(key)),
                None => NO_KEY_TEXT.to_string(),
            };
            render(transport, edit, &text, Some(settings_keyboard())).await
        }
    }
}
