use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One word the user has saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabEntry {
    /// Original-case surface form, unique case-insensitively
    pub word: String,
    pub translation: String,
    /// Paragraph the word was picked from
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub source_url: String,
    pub added_at: DateTime<Utc>,
}

impl VocabEntry {
    pub fn is_word(&self, word: &str) -> bool {
        same_word(&self.word, word)
    }
}

/// Case-insensitive comparison used for every vocabulary key
pub fn same_word(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// User settings written by the options page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub api_key: String,
    /// Empty means the configured default model
    pub model: String,
}

impl Settings {
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn model_override(&self) -> Option<&str> {
        let model = self.model.trim();
        (!model.is_empty()).then_some(model)
    }
}

/// Inbound requests from UI collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    TranslateWord {
        word: String,
        #[serde(default)]
        paragraph: String,
        #[serde(default)]
        source_url: String,
    },
    ScanPage,
    DeleteWord {
        word: String,
    },
    UpdateWord {
        word: String,
        translation: String,
    },
    /// Routed to the page-resident engine
    TriggerScan,
    /// Routed to the page-resident engine
    RemoveHighlight {
        word: String,
    },
    /// Parses `html` as the page the engine works on, replacing the attached one
    AttachPage {
        html: String,
        #[serde(default)]
        source_url: String,
    },
    /// Serialized body and marker count of the attached page
    GetPage,
    GetSettings,
    SaveSettings {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        model: String,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::TranslateWord { .. } => "TRANSLATE_WORD",
            Command::ScanPage => "SCAN_PAGE",
            Command::DeleteWord { .. } => "DELETE_WORD",
            Command::UpdateWord { .. } => "UPDATE_WORD",
            Command::TriggerScan => "TRIGGER_SCAN",
            Command::RemoveHighlight { .. } => "REMOVE_HIGHLIGHT",
            Command::AttachPage { .. } => "ATTACH_PAGE",
            Command::GetPage => "GET_PAGE",
            Command::GetSettings => "GET_SETTINGS",
            Command::SaveSettings { .. } => "SAVE_SETTINGS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Missing or rejected credential
    Auth,
    Upstream,
    EmptyResponse,
    Internal,
}

impl ErrorKind {
    /// Whether the popup should offer a retry control
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorKind::Auth)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    /// True when an existing entry was overwritten
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl TranslateResponse {
    pub fn saved(translation: String, updated: bool) -> Self {
        Self {
            success: true,
            translation: Some(translation),
            updated: Some(updated),
            ..Default::default()
        }
    }

    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            error_kind: Some(kind),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub success: bool,
    pub list: Vec<VocabEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default)]
    pub markers: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResponse {
    pub fn page(html: String, markers: usize) -> Self {
        Self {
            success: true,
            html: Some(html),
            markers,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Reply to a [`Command`], shaped per command on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Translate(TranslateResponse),
    Entries(Vec<VocabEntry>),
    List(ListResponse),
    Ack(AckResponse),
    Settings(Settings),
    Page(PageResponse),
}

impl Response {
    /// Generic failure reply for a command whose handler errored or panicked
    pub fn failure_for(command: &Command, message: impl Into<String>) -> Self {
        let message = message.into();
        match command {
            Command::TranslateWord { .. } => {
                Response::Translate(TranslateResponse::failed(ErrorKind::Internal, message))
            }
            Command::ScanPage => Response::Entries(Vec::new()),
            Command::DeleteWord { .. } | Command::UpdateWord { .. } => {
                Response::List(ListResponse {
                    success: false,
                    list: Vec::new(),
                    error: Some(message),
                })
            }
            Command::GetPage => Response::Page(PageResponse::failed(message)),
            Command::TriggerScan
            | Command::RemoveHighlight { .. }
            | Command::AttachPage { .. }
            | Command::GetSettings
            | Command::SaveSettings { .. } => Response::Ack(AckResponse::failed(message)),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Response::Translate(r) => r.success,
            Response::List(r) => r.success,
            Response::Ack(r) => r.success,
            Response::Page(r) => r.success,
            Response::Entries(_) | Response::Settings(_) => true,
        }
    }
}
