use lexi_types::{ListResponse, Response};

use crate::state::AppState;

pub async fn handle_delete_word(state: &AppState, word: String) -> anyhow::Result<Response> {
    let list = state.vocab.remove(word).await?;

    Ok(Response::List(ListResponse {
        success: true,
        list,
        error: None,
    }))
}

/// Replaces a translation; an unknown word answers with `success: false` and the current list
pub async fn handle_update_word(
    state: &AppState,
    word: String,
    translation: String,
) -> anyhow::Result<Response> {
    let translation = translation.trim().to_string();
    if translation.is_empty() {
        let list = state.vocab.list().await?;
        return Ok(Response::List(ListResponse {
            success: false,
            list,
            error: Some("Translation must not be empty".to_string()),
        }));
    }

    let outcome = state.vocab.update_translation(word.clone(), translation).await?;
    if !outcome.success {
        tracing::debug!("Update for unknown word '{}'", word);
    }

    Ok(Response::List(ListResponse {
        error: (!outcome.success).then(|| format!("'{word}' is not in the vocabulary")),
        success: outcome.success,
        list: outcome.list,
    }))
}
