use lexi_types::{Command, Response};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::client::BackendClient;

/// Serves the command surface over stdin/stdout until EOF or cancellation
pub async fn serve_stdio(client: BackendClient, cancel: CancellationToken) -> anyhow::Result<()> {
    tracing::info!("Reading commands from stdin");
    serve_lines(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), client, cancel).await
}

/// One JSON command per input line, one JSON reply per output line
pub async fn serve_lines<R, W>(
    reader: R,
    mut writer: W,
    client: BackendClient,
    cancel: CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            tracing::info!("Input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = handle_line(&client, &line).await?;
        let mut out = serde_json::to_string(&reply)?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}

async fn handle_line(client: &BackendClient, line: &str) -> anyhow::Result<Value> {
    let command: Command = match serde_json::from_str(line) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!("Rejected input line: {}", e);
            return Ok(json!({ "success": false, "error": format!("Invalid command: {e}") }));
        }
    };

    let response = match client.send(command.clone()).await {
        Ok(response) => response,
        Err(e) => Response::failure_for(&command, e.to_string()),
    };
    Ok(serde_json::to_value(response)?)
}
