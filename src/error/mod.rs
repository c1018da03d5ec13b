//! Error handling for the maps MCP server.
//!
//! Defines the protocol-level error type and its mapping onto JSON-RPC 2.0
//! error responses. Tool-handler failures deliberately do NOT live here:
//! a failed maps lookup becomes an in-band tool result with `isError: true`
//! (see `tools::ToolResult`), never a protocol error, so a bad upstream
//! call can never tear down a session.

pub mod jsonrpc;

use jsonrpc::JsonRpcError;
use thiserror::Error;

/// Protocol and transport errors surfaced to MCP clients.
///
/// Each variant maps to a JSON-RPC error code. The two session variants
/// share code `-32000` with fixed messages; clients distinguish them by
/// message text, matching the reference transport behavior.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GmapsError {
    /// Request body is not valid JSON.
    #[error("Invalid JSON: {details}")]
    ParseError {
        /// Description of the parse failure
        details: String,
    },

    /// Request is valid JSON but not a valid JSON-RPC 2.0 message.
    #[error("Invalid JSON-RPC request: {details}")]
    InvalidRequest {
        /// What makes the request invalid
        details: String,
    },

    /// The requested protocol method does not exist.
    #[error("Method '{method}' not found")]
    MethodNotFound {
        /// The unknown method name
        method: String,
    },

    /// Tool-call arguments failed validation against the declared schema.
    #[error("Invalid parameters: {details}")]
    InvalidParams {
        /// Description of the validation failure
        details: String,
    },

    /// No session id was provided, or the id is unknown, and the body is
    /// not a valid initialization request.
    #[error("Bad Request: No valid session ID provided")]
    NoValidSession,

    /// A session with this id exists but was created on the other
    /// transport generation. Sessions never migrate between kinds.
    #[error("Bad Request: Session exists but uses a different transport protocol")]
    TransportMismatch,

    /// Internal server error.
    #[error("Internal error: {details}")]
    Internal {
        /// Description for the log; also echoed to the client
        details: String,
    },
}

impl GmapsError {
    /// Maps the error to its JSON-RPC 2.0 error code.
    pub fn to_jsonrpc_code(&self) -> i32 {
        match self {
            Self::ParseError { .. } => -32700,
            Self::InvalidRequest { .. } => -32600,
            Self::MethodNotFound { .. } => -32601,
            Self::InvalidParams { .. } => -32602,
            Self::Internal { .. } => -32603,
            Self::NoValidSession | Self::TransportMismatch => -32000,
        }
    }

    /// Converts the error to a JSON-RPC error object.
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        JsonRpcError::new(self.to_jsonrpc_code(), self.to_string())
    }
}
