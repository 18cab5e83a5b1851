// src/options/keys.rs
pub const DEFAULT_START_URL: &str = "https://chatkit.beepi.no/api/chatkit/start";
pub const DEFAULT_REFRESH_URL: &str = "https://chatkit.beepi.no/api/chatkit/refresh";
pub const DEFAULT_WORKFLOW_ID: &str = "";
pub const DEFAULT_GREETING: &str = "How can I help you today?";
pub const DEFAULT_PROMPT_LABEL: &str = "Get Started";
pub const DEFAULT_PROMPT_TEXT: &str = "Hi! How can you assist me today?";

/// How a settings field is cleaned on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    StartUrl,
    RefreshUrl,
    WorkflowId,
    StartScreenGreeting,
    StartScreenPromptLabel,
    StartScreenPromptText,
}

impl OptionKey {
    pub const ALL: [OptionKey; 6] = [
        OptionKey::StartUrl,
        OptionKey::RefreshUrl,
        OptionKey::WorkflowId,
        OptionKey::StartScreenGreeting,
        OptionKey::StartScreenPromptLabel,
        OptionKey::StartScreenPromptText,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OptionKey::StartUrl => "start_url",
            OptionKey::RefreshUrl => "refresh_url",
            OptionKey::WorkflowId => "workflow_id",
            OptionKey::StartScreenGreeting => "start_screen_greeting",
            OptionKey::StartScreenPromptLabel => "start_screen_prompt_label",
            OptionKey::StartScreenPromptText => "start_screen_prompt_text",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            OptionKey::StartUrl | OptionKey::RefreshUrl => FieldKind::Url,
            _ => FieldKind::Text,
        }
    }

    pub fn default_value(self) -> &'static str {
        match self {
            OptionKey::StartUrl => DEFAULT_START_URL,
            OptionKey::RefreshUrl => DEFAULT_REFRESH_URL,
            OptionKey::WorkflowId => DEFAULT_WORKFLOW_ID,
            OptionKey::StartScreenGreeting => DEFAULT_GREETING,
            OptionKey::StartScreenPromptLabel => DEFAULT_PROMPT_LABEL,
            OptionKey::StartScreenPromptText => DEFAULT_PROMPT_TEXT,
        }
    }
}
