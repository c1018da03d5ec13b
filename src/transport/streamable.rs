//! Streamable-HTTP session transport.
//!
//! One endpoint, three verbs: POST delivers a client message and returns
//! the reply in the response body, GET opens the server-to-client event
//! stream, DELETE terminates the session. The session id travels in the
//! `mcp-session-id` header.

use std::convert::Infallible;
use std::sync::Mutex;

use axum::response::sse::Event;
use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::protocol::{JsonRpcResponse, McpEngine};

pub struct StreamableTransport {
    id: String,
    engine: McpEngine,
    /// Sender for the currently open GET stream, if any. Opening a new
    /// stream replaces the sender, which ends the previous stream.
    stream_tx: Mutex<Option<mpsc::UnboundedSender<Event>>>,
}

impl StreamableTransport {
    pub fn new(id: String, engine: McpEngine) -> Self {
        Self {
            id,
            engine,
            stream_tx: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Feed one inbound message to the engine. `None` means the message
    /// was a notification and the HTTP layer answers 202.
    pub async fn handle_message(&self, body: &[u8]) -> Option<JsonRpcResponse> {
        self.engine.handle_bytes(body).await
    }

    /// Open the server-to-client stream. At most one is live per session;
    /// a second GET supersedes the first.
    pub fn open_stream(&self) -> impl Stream<Item = Result<Event, Infallible>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let previous = self
            .stream_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(tx);
        if previous.is_some() {
            debug!(session_id = %self.id, "superseding open event stream");
        }
        UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>)
    }

    /// Drop the stream sender so any open GET stream ends.
    pub fn close(&self) {
        self.stream_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;
    use std::sync::Arc;

    fn transport() -> StreamableTransport {
        let engine = McpEngine::new(Arc::new(ToolRegistry::new()));
        StreamableTransport::new("s-1".to_string(), engine)
    }

    #[tokio::test]
    async fn test_post_roundtrip() {
        let t = transport();
        let response = t
            .handle_message(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
            .await
            .expect("ping answered");
        assert!(response.result.is_some());
    }

    #[tokio::test]
    async fn test_notification_yields_no_body() {
        let t = transport();
        let response = t
            .handle_message(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_close_ends_open_stream() {
        let t = transport();
        let mut stream = Box::pin(t.open_stream());
        t.close();
        assert!(futures::StreamExt::next(&mut stream).await.is_none());
    }
}
