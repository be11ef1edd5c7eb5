use lexi_types::Response;

use crate::state::AppState;

pub async fn handle_scan_page(state: &AppState) -> anyhow::Result<Response> {
    let list = state.vocab.list().await?;
    tracing::debug!("Serving {} entries for a page scan", list.len());
    Ok(Response::Entries(list))
}
