use std::sync::Arc;

use lexi_app::controller::AppController;
use lexi_app::state::AppState;
use lexi_app::{io, profile};
use lexi_store::JsonFileStorage;
use lexi_translator::ChatCompletionTranslator;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = profile::load_config()?;
    let storage = Arc::new(JsonFileStorage::new(&config.store.data_path));
    let translator = Arc::new(ChatCompletionTranslator::new(&config.translator)?);
    tracing::info!(
        "Vocabulary stored in {}, translating with {}",
        storage.path().display(),
        config.translator.default_model
    );

    let request_capacity = config.request_capacity;
    let state = Arc::new(AppState::new(config, storage, translator));
    let controller = AppController::new(state, request_capacity);

    let mut tasks = controller.spawn_tasks();
    tasks.spawn(io::serve_stdio(controller.client(), controller.cancel_token()));

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::info!("Task finished, shutting down"),
                Ok(Err(e)) => tracing::error!("Task failed: {e:#}"),
                Err(e) => tracing::error!("Task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    while tasks.join_next().await.is_some() {}
    Ok(())
}

/// Logs go to stderr, stdout carries replies
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr));

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}
