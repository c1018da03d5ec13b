//! HTTP-facing request router.
//!
//! Routes each request by session header, registry state, and endpoint,
//! in this order: known id with matching kind is forwarded; known id with
//! the wrong kind is rejected as a transport mismatch; no id plus a valid
//! initialize body mints a new streamable session; everything else is
//! rejected. GET and DELETE on `/mcp` additionally require a registered
//! session and answer plain text when there is none.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::sse::Sse;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::GmapsError;
use crate::protocol::{is_initialize_request, JsonRpcResponse, McpEngine};
use crate::transport::session::SessionRegistry;
use crate::transport::sse::{event_stream, CloseOnDrop, SseTransport};
use crate::transport::streamable::StreamableTransport;
use crate::transport::SessionTransport;

/// Header carrying the session id on the streamable endpoint.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Plain-text rejection for GET/DELETE misuse on `/mcp`.
const INVALID_SESSION_TEXT: &str = "Invalid or missing session ID";

/// Request bodies larger than this are rejected before parsing.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared server state: the session registry, the protocol engine, and
/// the channel transports use to announce their teardown.
pub struct AppState {
    pub registry: SessionRegistry,
    pub engine: McpEngine,
    close_tx: mpsc::UnboundedSender<String>,
}

impl AppState {
    /// Build the state and spawn the reaper task that removes sessions
    /// whose transports announce close. Must run inside a tokio runtime.
    pub fn new(engine: McpEngine) -> Arc<Self> {
        let (close_tx, close_rx) = mpsc::unbounded_channel();
        let state = Arc::new(Self {
            registry: SessionRegistry::new(),
            engine,
            close_tx,
        });
        tokio::spawn(reap_closed_sessions(state.clone(), close_rx));
        state
    }

    pub fn close_handle(&self) -> mpsc::UnboundedSender<String> {
        self.close_tx.clone()
    }
}

/// Removes sessions reported on the close channel. Teardown failures are
/// logged per session and never block reaping the rest.
async fn reap_closed_sessions(state: Arc<AppState>, mut close_rx: mpsc::UnboundedReceiver<String>) {
    while let Some(id) = close_rx.recv().await {
        if let Some(transport) = state.registry.remove(&id) {
            transport.close();
            debug!(session_id = %id, "session reaped");
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/mcp", post(mcp_post).get(mcp_get).delete(mcp_delete))
        .route("/sse", get(sse_get))
        .route("/messages", post(messages_post))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Bind and serve one instance until ctrl-c, then close every remaining
/// session best-effort.
pub async fn serve(port: u16, state: Arc<AppState>) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    for (id, transport) in state.registry.drain() {
        transport.close();
        debug!(session_id = %id, "session closed at shutdown");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}

fn session_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// JSON-RPC error envelope rejection, HTTP 400, id null.
fn reject(error: GmapsError) -> Response {
    let body = JsonRpcResponse::error(None, error.to_jsonrpc_error());
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn reject_plain() -> Response {
    (StatusCode::BAD_REQUEST, INVALID_SESSION_TEXT).into_response()
}

/// POST reply: the JSON-RPC body with the session id echoed, or a bare
/// 202 when the message was a notification.
fn post_reply(response: Option<JsonRpcResponse>, id: &str) -> Response {
    let mut reply = match response {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    };
    if let Ok(value) = HeaderValue::from_str(id) {
        reply.headers_mut().insert(SESSION_HEADER, value);
    }
    reply
}

async fn mcp_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match session_header(&headers) {
        Some(id) => match state.registry.lookup(&id) {
            Some(transport) => match transport.as_ref() {
                SessionTransport::Streamable(t) => post_reply(t.handle_message(&body).await, &id),
                SessionTransport::Sse(_) => {
                    warn!(session_id = %id, "streamable request for sse session");
                    reject(GmapsError::TransportMismatch)
                }
            },
            None => reject(GmapsError::NoValidSession),
        },
        None if is_initialize_request(&body) => {
            let id = Uuid::new_v4().to_string();
            let transport = StreamableTransport::new(id.clone(), state.engine.clone());
            let response = transport.handle_message(&body).await;
            state
                .registry
                .register(id.clone(), Arc::new(SessionTransport::Streamable(transport)));
            info!(session_id = %id, "streamable session created");
            post_reply(response, &id)
        }
        None => reject(GmapsError::NoValidSession),
    }
}

async fn mcp_get(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(id) = session_header(&headers) else {
        return reject_plain();
    };
    match state.registry.lookup(&id) {
        Some(transport) => match transport.as_ref() {
            SessionTransport::Streamable(t) => Sse::new(t.open_stream()).into_response(),
            SessionTransport::Sse(_) => reject(GmapsError::TransportMismatch),
        },
        None => reject_plain(),
    }
}

async fn mcp_delete(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(id) = session_header(&headers) else {
        return reject_plain();
    };
    match state.registry.lookup(&id) {
        Some(transport) => match transport.as_ref() {
            SessionTransport::Streamable(_) => {
                // Remove before closing so a racing request sees an
                // unknown session, never a half-closed transport.
                if let Some(removed) = state.registry.remove(&id) {
                    removed.close();
                }
                info!(session_id = %id, "session terminated");
                StatusCode::OK.into_response()
            }
            SessionTransport::Sse(_) => reject(GmapsError::TransportMismatch),
        },
        None => reject_plain(),
    }
}

async fn sse_get(State(state): State<Arc<AppState>>) -> Response {
    let id = Uuid::new_v4().to_string();
    let (transport, rx) = SseTransport::new(id.clone(), state.engine.clone());
    let guard = CloseOnDrop::new(id.clone(), state.close_handle());
    let stream = event_stream(&transport, rx, guard);
    state
        .registry
        .register(id.clone(), Arc::new(SessionTransport::Sse(transport)));
    info!(session_id = %id, "sse session created");
    Sse::new(stream).into_response()
}

#[derive(Deserialize)]
struct MessagesQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

async fn messages_post(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MessagesQuery>,
    body: Bytes,
) -> Response {
    let Some(id) = query.session_id else {
        return reject(GmapsError::NoValidSession);
    };
    match state.registry.lookup(&id) {
        Some(transport) => match transport.as_ref() {
            SessionTransport::Sse(t) => match t.handle_message(&body).await {
                Ok(()) => (StatusCode::ACCEPTED, "Accepted").into_response(),
                Err(e) => {
                    error!(session_id = %id, error = %e, "failed to queue reply");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            },
            SessionTransport::Streamable(_) => {
                warn!(session_id = %id, "sse request for streamable session");
                reject(GmapsError::TransportMismatch)
            }
        },
        None => reject(GmapsError::NoValidSession),
    }
}
