use lexi_types::{AckResponse, Response, Settings};

use crate::state::AppState;

pub async fn handle_get_settings(state: &AppState) -> anyhow::Result<Response> {
    Ok(Response::Settings(state.settings.load().await?))
}

pub async fn handle_save_settings(
    state: &AppState,
    api_key: String,
    model: String,
) -> anyhow::Result<Response> {
    let settings = Settings {
        api_key: api_key.trim().to_string(),
        model: model.trim().to_string(),
    };
    state.settings.save(settings).await?;
    tracing::info!("Settings saved");

    Ok(Response::Ack(AckResponse::ok()))
}
