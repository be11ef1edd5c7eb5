use lexi_translator::TranslateError;
use lexi_types::{ErrorKind, Response, TranslateResponse};

use crate::state::AppState;

/// Translates a word in its context and saves the result
///
/// The credential is checked before anything reaches the translator, so a missing key never
/// produces a request or an entry.
pub async fn handle_translate_word(
    state: &AppState,
    word: String,
    paragraph: String,
    source_url: String,
) -> anyhow::Result<Response> {
    let word = word.trim().to_string();
    if word.is_empty() {
        return Ok(Response::Translate(TranslateResponse::failed(
            ErrorKind::Internal,
            "No word to translate",
        )));
    }

    let settings = state.settings.load().await?;
    if !settings.has_credential() {
        let e = TranslateError::MissingCredential;
        tracing::warn!("Translation of '{}' refused: {}", word, e);
        return Ok(Response::Translate(TranslateResponse::failed(
            e.kind(),
            e.to_string(),
        )));
    }

    let translation = match state
        .translator
        .translate(
            &settings.api_key,
            &word,
            &paragraph,
            settings.model_override(),
        )
        .await
    {
        Ok(translation) => translation,
        Err(e) => {
            tracing::warn!("Translation of '{}' failed: {}", word, e);
            return Ok(Response::Translate(TranslateResponse::failed(
                e.kind(),
                e.to_string(),
            )));
        }
    };

    let outcome = state
        .vocab
        .upsert(
            word.clone(),
            translation.text.clone(),
            paragraph,
            source_url,
        )
        .await?;

    tracing::info!(
        "Saved '{}' -> '{}' via {} ({})",
        word,
        translation.text,
        translation.model,
        if outcome.updated { "updated" } else { "added" }
    );

    Ok(Response::Translate(TranslateResponse::saved(
        translation.text,
        outcome.updated,
    )))
}
