//! Stdio transport: newline-delimited JSON-RPC on stdin/stdout.
//!
//! Stdout carries protocol messages only; all logging goes to stderr.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::protocol::McpEngine;

/// Serve one session over stdin/stdout until stdin closes.
pub async fn run(engine: McpEngine) -> std::io::Result<()> {
    info!("serving over stdio");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(response) = engine.handle_bytes(line.as_bytes()).await else {
            continue;
        };
        let mut framed = serde_json::to_vec(&response)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        framed.push(b'\n');
        stdout.write_all(&framed).await?;
        stdout.flush().await?;
    }
    info!("stdin closed, shutting down");
    Ok(())
}
