//! MCP method dispatch.
//!
//! `McpEngine` is transport-agnostic: every transport (streamable HTTP,
//! legacy SSE, stdio) feeds it raw message bytes and forwards whatever
//! response comes back. It owns no session state — sessions are a
//! transport concern.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::GmapsError;
use crate::protocol::jsonrpc::{parse_message, JsonRpcRequest, JsonRpcResponse};
use crate::tools::{ToolRegistry, ToolResult};

/// MCP protocol revision this server implements.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name advertised in the `initialize` result.
const SERVER_NAME: &str = env!("CARGO_PKG_NAME");
/// Server version advertised in the `initialize` result.
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol method dispatcher bound to a tool registry.
#[derive(Clone)]
pub struct McpEngine {
    tools: Arc<ToolRegistry>,
}

impl McpEngine {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    /// Parse raw bytes and dispatch. Returns `None` for notifications,
    /// which get no response.
    pub async fn handle_bytes(&self, bytes: &[u8]) -> Option<JsonRpcResponse> {
        match parse_message(bytes) {
            Ok(request) => self.handle_request(request).await,
            // Parse/structure errors respond with id null: the real id is
            // unknowable from a broken message.
            Err(e) => Some(JsonRpcResponse::error(None, e.to_jsonrpc_error())),
        }
    }

    /// Dispatch a validated JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "notification received");
            return None;
        }

        let id = request.id.clone();
        let result = match request.method.as_str() {
            "initialize" => Ok(self.initialize_result(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.tools_list()),
            "tools/call" => self.tools_call(request.params).await,
            method => {
                warn!(method = %method, "unknown method");
                Err(GmapsError::MethodNotFound {
                    method: method.to_string(),
                })
            }
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, e.to_jsonrpc_error()),
        })
    }

    fn initialize_result(&self, params: Option<&Value>) -> Value {
        if let Some(client) = params
            .and_then(|p| p.get("clientInfo"))
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
        {
            debug!(client = %client, "initialize");
        }
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            }
        })
    }

    fn tools_list(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .defs()
            .map(|def| {
                json!({
                    "name": def.name,
                    "description": def.description,
                    "inputSchema": def.input_schema
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    async fn tools_call(&self, params: Option<Value>) -> Result<Value, GmapsError> {
        let params = params.ok_or_else(|| GmapsError::InvalidParams {
            details: "tools/call requires params".to_string(),
        })?;
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| GmapsError::InvalidParams {
                details: "tools/call requires a string 'name'".to_string(),
            })?;
        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let handler = match self.tools.get(name) {
            Some(handler) => handler,
            None => {
                // Unknown tool is a tool-level failure, not a protocol
                // error: the session stays usable.
                warn!(tool = %name, "unknown tool requested");
                let result = ToolResult::error(format!("Unknown tool: {name}"));
                return serde_json::to_value(result).map_err(|e| GmapsError::Internal {
                    details: e.to_string(),
                });
            }
        };

        debug!(tool = %name, "dispatching tool call");
        let result = handler.call(arguments).await?;
        serde_json::to_value(result).map_err(|e| GmapsError::Internal {
            details: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::jsonrpc::JsonRpcId;
    use crate::tools::{ToolDef, ToolHandler};
    use async_trait::async_trait;

    struct EchoTool;

    #[async_trait]
    impl ToolHandler for EchoTool {
        fn def(&self) -> ToolDef {
            ToolDef {
                name: "echo",
                description: "Echoes its input back",
                input_schema: json!({
                    "type": "object",
                    "properties": { "text": { "type": "string" } },
                    "required": ["text"]
                }),
            }
        }

        async fn call(&self, args: Value) -> Result<ToolResult, GmapsError> {
            let text = args.get("text").and_then(Value::as_str).ok_or_else(|| {
                GmapsError::InvalidParams {
                    details: "missing 'text'".to_string(),
                }
            })?;
            Ok(ToolResult::text(text.to_string()))
        }
    }

    fn engine() -> McpEngine {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        McpEngine::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_initialize_result_shape() {
        let response = engine()
            .handle_bytes(br#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","clientInfo":{"name":"test","version":"0"}}}"#)
            .await
            .expect("initialize gets a response");
        assert_eq!(response.id, Some(JsonRpcId::Number(1)));
        let result = response.result.expect("success");
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert!(result["capabilities"]["tools"].is_object());
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let response = engine()
            .handle_bytes(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_ping() {
        let response = engine()
            .handle_bytes(br#"{"jsonrpc":"2.0","id":"p1","method":"ping"}"#)
            .await
            .expect("ping gets a response");
        assert_eq!(response.id, Some(JsonRpcId::String("p1".to_string())));
        assert_eq!(response.result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = engine()
            .handle_bytes(br#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .expect("tools/list gets a response");
        let result = response.result.expect("success");
        let tools = result["tools"].as_array().expect("tools array");
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "echo");
        assert!(tools[0]["inputSchema"]["properties"]["text"].is_object());
    }

    #[tokio::test]
    async fn test_tools_call_dispatches() {
        let response = engine()
            .handle_bytes(br#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"echo","arguments":{"text":"hi"}}}"#)
            .await
            .expect("tools/call gets a response");
        let result = response.result.expect("success");
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "hi");
        assert_eq!(result["isError"], false);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_in_band_error() {
        let response = engine()
            .handle_bytes(br#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"nope","arguments":{}}}"#)
            .await
            .expect("tools/call gets a response");
        // In-band tool error, not a JSON-RPC error.
        assert!(response.error.is_none());
        let result = response.result.expect("success envelope");
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().expect("text");
        assert!(text.contains("Unknown tool: nope"));
    }

    #[tokio::test]
    async fn test_tools_call_missing_name() {
        let response = engine()
            .handle_bytes(br#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"arguments":{}}}"#)
            .await
            .expect("response");
        let error = response.error.expect("error");
        assert_eq!(error.code, -32602);
    }

    #[tokio::test]
    async fn test_handler_invalid_params() {
        let response = engine()
            .handle_bytes(br#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"echo","arguments":{}}}"#)
            .await
            .expect("response");
        let error = response.error.expect("error");
        assert_eq!(error.code, -32602);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = engine()
            .handle_bytes(br#"{"jsonrpc":"2.0","id":7,"method":"tools/destroy"}"#)
            .await
            .expect("response");
        let error = response.error.expect("error");
        assert_eq!(error.code, -32601);
    }

    #[tokio::test]
    async fn test_parse_error_has_null_id() {
        let response = engine().handle_bytes(b"{broken").await.expect("response");
        assert_eq!(response.id, None);
        assert_eq!(response.error.expect("error").code, -32700);
    }
}
