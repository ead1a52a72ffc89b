//! Typed menu actions and their callback payload encoding.
//!
//! Payload strings cross the transport as opaque `callback_data`; each
//! variant owns a distinct prefix so decoding is unambiguous. Decode
//! happens once at the transport boundary, after which only typed values
//! circulate.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    SelectModel(String),
    SetPrompt(String),
    ClearPrompt(String),
    ApplyTemplate { template: String, model: String },
    BackToModels,
    OpenSettings,
    SetApiKey,
    CheckApiKey,
}

impl MenuAction {
    pub fn encode(&self) -> String {
        match self {
            MenuAction::SelectModel(model) => format!("model:{model}"),
            MenuAction::SetPrompt(model) => format!("prompt_set:{model}"),
            MenuAction::ClearPrompt(model) => format!("prompt_clear:{model}"),
            MenuAction::ApplyTemplate { template, model } => format!("tpl:{template}:{model}"),
            MenuAction::BackToModels => "back".to_string(),
            MenuAction::OpenSettings => "settings".to_string(),
            MenuAction::SetApiKey => "key_set".to_string(),
            MenuAction::CheckApiKey => "key_check".to_string(),
        }
    }

    /// Decode a callback payload. Unknown payloads yield `None` and are
    /// dropped by the adapter.
    pub fn decode(payload: &str) -> Option<Self> {
        if let Some(model) = payload.strip_prefix("model:") {
            return Some(MenuAction::SelectModel(model.to_string()));
        }
        if let Some(model) = payload.strip_prefix("prompt_set:") {
            return Some(MenuAction::SetPrompt(model.to_string()));
        }
        if let Some(model) = payload.strip_prefix("prompt_clear:") {
            return Some(MenuAction::ClearPrompt(model.to_string()));
        }
        if let Some(rest) = payload.strip_prefix("tpl:") {
            // Template names contain no ':'; everything after the second
            // separator is the model id.
            let (template, model) = rest.split_once(':')?;
            return Some(MenuAction::ApplyTemplate {
                template: template.to_string(),
                model: model.to_string(),
            });
        }

        match payload {
            "back" => Some(MenuAction::BackToModels),
            "settings" => Some(MenuAction::OpenSettings),
            "key_set" => Some(MenuAction::SetApiKey),
            "key_check" => Some(MenuAction::CheckApiKey),
            _ => None,
        }
    }
}
