mod chat;
mod prompt;

pub use chat::ChatCompletionTranslator;
pub use prompt::build_prompt;

use lexi_types::ErrorKind;

/// Translation provider interface
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translate `word` as it is used inside `context`
    async fn translate(
        &self,
        credential: &str,
        word: &str,
        context: &str,
        model: Option<&str>,
    ) -> Result<Translation, TranslateError>;
}

#[derive(Debug, Clone)]
pub struct Translation {
    pub text: String,
    pub model: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("API key is not configured. Add your key in the extension settings.")]
    MissingCredential,

    #[error("API error (HTTP {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("The model returned an empty translation")]
    EmptyResponse,

    #[error("Failed to parse response: {0}")]
    InvalidResponse(String),
}

impl TranslateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslateError::MissingCredential => ErrorKind::Auth,
            TranslateError::Upstream { status, .. } if matches!(status, 401 | 403) => {
                ErrorKind::Auth
            }
            TranslateError::Upstream { .. } | TranslateError::Network(_) => ErrorKind::Upstream,
            TranslateError::EmptyResponse | TranslateError::InvalidResponse(_) => {
                ErrorKind::EmptyResponse
            }
        }
    }
}
