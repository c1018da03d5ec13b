//! JSON-RPC 2.0 error response structures.
//!
//! The wire format for the `error` member of a JSON-RPC response. Every
//! rejection this server produces — protocol errors, transport-routing
//! errors — is serialized through these types.

use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 error object.
///
/// # Code Ranges
///
/// - `-32700` to `-32600`: standard JSON-RPC protocol errors
/// - `-32000`: transport/session routing errors (bad or mismatched session)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Optional structured details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    /// Create an error with no additional data.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_omitted_when_none() {
        let err = JsonRpcError::new(-32000, "Bad Request: No valid session ID provided");
        let serialized = serde_json::to_string(&err).expect("should serialize");
        assert!(!serialized.contains("\"data\""));
        assert!(serialized.contains("-32000"));
    }

    #[test]
    fn test_roundtrip() {
        let err = JsonRpcError {
            code: -32602,
            message: "Invalid parameters".to_string(),
            data: Some(serde_json::json!({"field": "radius"})),
        };
        let serialized = serde_json::to_string(&err).expect("should serialize");
        let parsed: JsonRpcError = serde_json::from_str(&serialized).expect("should parse");
        assert_eq!(parsed, err);
    }
}
