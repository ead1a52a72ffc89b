//! Predefined system-prompt templates, selectable without free-text entry.

pub struct PromptTemplate {
    pub name: &'static str,
    pub label: &'static str,
    pub text: &'static str,
}

pub const TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        name: "themoji",
        label: "Emoji",
        text: "you have to talk in emoji only",
    },
    PromptTemplate {
        name: "pirate",
        label: "Pirate",
        text: "answer like a grumpy pirate captain",
    },
    PromptTemplate {
        name: "concise",
        label: "Concise",
        text: "answer in at most two short sentences",
    },
];

pub fn template_text(name: &str) -> Option<&'static str> {
    TEMPLATES.iter().find(|t| t.name == name).map(|t| t.text)
}
