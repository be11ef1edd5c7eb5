use lexi_types::{AckResponse, Command, PageResponse, Response};

use crate::page::{PageCommand, PageLauncher};
use crate::state::AppState;

/// Forwards TRIGGER_SCAN and REMOVE_HIGHLIGHT to the attached page
pub async fn handle_page_command(state: &AppState, command: Command) -> anyhow::Result<Response> {
    let page_command = match command {
        Command::TriggerScan => PageCommand::Rescan,
        Command::RemoveHighlight { word } => PageCommand::RemoveHighlight { word },
        other => anyhow::bail!("{} is not a page command", other.name()),
    };

    let Some(page) = state.page().await else {
        tracing::debug!("No page attached for {:?}", page_command);
        return Ok(Response::Ack(AckResponse::failed("No page is attached")));
    };

    Ok(Response::Ack(page.command(page_command).await?))
}

/// Replaces the attached page; the reply carries the initial scan's outcome
pub async fn handle_attach_page(
    state: &AppState,
    launcher: &PageLauncher,
    html: String,
    source_url: String,
) -> anyhow::Result<Response> {
    tracing::debug!("Attaching {} ({} bytes)", source_url, html.len());
    launcher.attach(state, html, source_url, None).await?;
    Ok(Response::Ack(AckResponse::ok()))
}

pub async fn handle_get_page(state: &AppState) -> anyhow::Result<Response> {
    let Some(page) = state.page().await else {
        return Ok(Response::Page(PageResponse::failed("No page is attached")));
    };

    let snapshot = page.snapshot().await?;
    Ok(Response::Page(PageResponse::page(
        snapshot.html,
        snapshot.markers.len(),
    )))
}
