use std::sync::Arc;

use kanal::AsyncReceiver;
use lexi_types::{Command, Response};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::page::PageLauncher;
use crate::state::AppState;

pub mod page_command;
pub mod scan_page;
pub mod settings;
pub mod translate_word;
pub mod vocab_edit;

use page_command::{handle_attach_page, handle_get_page, handle_page_command};
use scan_page::handle_scan_page;
use settings::{handle_get_settings, handle_save_settings};
use translate_word::handle_translate_word;
use vocab_edit::{handle_delete_word, handle_update_word};

/// One inbound command and the slot its reply goes to
#[derive(Debug)]
pub struct Request {
    pub id: Uuid,
    pub command: Command,
    pub reply: oneshot::Sender<Response>,
}

/// Background router: every request runs in its own task
pub async fn event_loop(
    state: Arc<AppState>,
    launcher: PageLauncher,
    requests: AsyncReceiver<Request>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    tracing::info!("[ROUTER] Waiting for requests");

    loop {
        let request = tokio::select! {
            _ = cancel.cancelled() => break,
            request = requests.recv() => match request {
                Ok(request) => request,
                Err(_) => {
                    tracing::warn!("[ROUTER] Request channel closed");
                    break;
                }
            },
        };

        tokio::spawn(dispatch(state.clone(), launcher.clone(), request));
    }

    tracing::info!("[ROUTER] Stopped");
    Ok(())
}

/// Runs one request to completion; errors and panics become failure replies
async fn dispatch(state: Arc<AppState>, launcher: PageLauncher, request: Request) {
    let Request { id, command, reply } = request;
    let name = command.name();
    tracing::debug!("[ROUTER] {} {}", id, name);

    let response = match tokio::spawn(handle_command(state, launcher, command.clone())).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::error!("[ROUTER] {} {} failed: {:#}", id, name, e);
            Response::failure_for(&command, e.to_string())
        }
        Err(e) => {
            tracing::error!("[ROUTER] {} {} panicked: {}", id, name, e);
            Response::failure_for(&command, format!("{name} failed unexpectedly"))
        }
    };

    if reply.send(response).is_err() {
        tracing::debug!("[ROUTER] {} requester went away before {} finished", id, name);
    }
}

pub async fn handle_command(
    state: Arc<AppState>,
    launcher: PageLauncher,
    command: Command,
) -> anyhow::Result<Response> {
    match command {
        Command::TranslateWord {
            word,
            paragraph,
            source_url,
        } => handle_translate_word(&state, word, paragraph, source_url).await,
        Command::ScanPage => handle_scan_page(&state).await,
        Command::DeleteWord { word } => handle_delete_word(&state, word).await,
        Command::UpdateWord { word, translation } => {
            handle_update_word(&state, word, translation).await
        }
        Command::TriggerScan | Command::RemoveHighlight { .. } => {
            handle_page_command(&state, command).await
        }
        Command::AttachPage { html, source_url } => {
            handle_attach_page(&state, &launcher, html, source_url).await
        }
        Command::GetPage => handle_get_page(&state).await,
        Command::GetSettings => handle_get_settings(&state).await,
        Command::SaveSettings { api_key, model } => {
            handle_save_settings(&state, api_key, model).await
        }
    }
}
