//! MCP protocol layer: JSON-RPC parsing and method dispatch.

pub mod engine;
pub mod jsonrpc;

pub use engine::McpEngine;
pub use jsonrpc::{is_initialize_request, parse_message, JsonRpcId, JsonRpcRequest, JsonRpcResponse};
