//! JSON-RPC 2.0 types and parsing.
//!
//! # JSON-RPC 2.0 Compliance
//!
//! - Requests have `id`, `method`, and optional `params`
//! - Notifications are requests without `id`
//! - `id` type (string or integer) MUST be preserved in responses
//!
//! Batch arrays are rejected: the MCP streamable-HTTP transport removed
//! batching and the stdio framing is one message per line.
//!
//! # Security Note
//!
//! This module parses untrusted input. Body size limits are enforced at the
//! HTTP layer before bytes reach `parse_message`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;

use crate::error::jsonrpc::JsonRpcError;
use crate::error::GmapsError;

/// JSON-RPC 2.0 version constant.
const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request ID.
///
/// The spec allows string or integer IDs. The exact type is preserved so
/// responses echo the same type the request used — never coerce `1` into
/// `"1"`.
///
/// `"id": null` is valid (though unusual) and distinct from a missing `id`
/// field, which marks a notification that gets no response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JsonRpcId {
    /// Integer ID (e.g., `"id": 1`)
    Number(i64),
    /// String ID (e.g., `"id": "abc-123"`)
    String(String),
    /// Explicit null ID
    Null,
}

impl Serialize for JsonRpcId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonRpcId::Number(n) => serializer.serialize_i64(*n),
            JsonRpcId::String(s) => serializer.serialize_str(s),
            JsonRpcId::Null => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for JsonRpcId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Number(n) => n.as_i64().map(JsonRpcId::Number).ok_or_else(|| {
                serde::de::Error::custom("JSON-RPC ID must be integer, not float")
            }),
            Value::String(s) => Ok(JsonRpcId::String(s)),
            Value::Null => Ok(JsonRpcId::Null),
            _ => Err(serde::de::Error::custom(
                "JSON-RPC ID must be string, integer, or null",
            )),
        }
    }
}

/// Wrapper to distinguish a missing field from an explicit null.
#[derive(Debug, Clone, Default)]
enum MaybeNull<T> {
    #[default]
    Absent,
    Null,
    Present(T),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for MaybeNull<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            Ok(MaybeNull::Null)
        } else {
            T::deserialize(value)
                .map(MaybeNull::Present)
                .map_err(serde::de::Error::custom)
        }
    }
}

/// Deserializer mapping `MaybeNull<JsonRpcId>` to `Option<JsonRpcId>` where
/// an explicit null becomes `Some(JsonRpcId::Null)`.
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<JsonRpcId>, D::Error>
where
    D: Deserializer<'de>,
{
    match MaybeNull::deserialize(deserializer)? {
        MaybeNull::Absent => Ok(None),
        MaybeNull::Null => Ok(Some(JsonRpcId::Null)),
        MaybeNull::Present(id) => Ok(Some(id)),
    }
}

/// Raw JSON-RPC 2.0 request as received off the wire.
///
/// All fields are optional so malformed requests produce precise errors
/// instead of opaque deserialization failures.
#[derive(Debug, Clone, Deserialize)]
struct RawJsonRpcRequest {
    /// Must be "2.0"
    jsonrpc: Option<String>,
    /// Request ID (absent for notifications, Some(Null) for explicit null)
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    id: Option<JsonRpcId>,
    /// Method name
    method: Option<String>,
    /// Method parameters
    params: Option<Value>,
}

/// Validated JSON-RPC 2.0 request.
#[derive(Debug, Clone)]
pub struct JsonRpcRequest {
    /// Request ID (None for notifications)
    pub id: Option<JsonRpcId>,
    /// Method name
    pub method: String,
    /// Method parameters
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Returns true if this is a notification (no ID).
    #[inline]
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Returns true if this is an `initialize` request — the only message
    /// allowed to establish a new session on the HTTP transports.
    #[inline]
    pub fn is_initialize(&self) -> bool {
        self.method == "initialize"
    }
}

/// JSON-RPC 2.0 response.
///
/// # ID Serialization
///
/// Per the JSON-RPC 2.0 spec the `id` member is required in responses and
/// serializes as `null` when the request id could not be determined (e.g.
/// a parse error). That differs from requests, where a missing `id` means
/// "notification" and the field is omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always "2.0"
    pub jsonrpc: Cow<'static, str>,
    /// Request ID — always serialized; `None` becomes `null`
    pub id: Option<JsonRpcId>,
    /// Result (mutually exclusive with error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error (mutually exclusive with result)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create a success response echoing the request id.
    pub fn success(id: Option<JsonRpcId>, result: Value) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(JSONRPC_VERSION),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response. Pass `None` as the id when the request id
    /// could not be determined; it serializes as `"id": null`.
    pub fn error(id: Option<JsonRpcId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(JSONRPC_VERSION),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Checks whether raw bytes hold a valid `initialize` request, without
/// reporting parse diagnostics. Used by the request router to decide
/// whether a session-less POST may mint a new session.
pub fn is_initialize_request(bytes: &[u8]) -> bool {
    matches!(parse_message(bytes), Ok(req) if req.is_initialize())
}

/// Parse JSON bytes into a single JSON-RPC 2.0 request.
///
/// # Errors
///
/// - `GmapsError::ParseError` (-32700) for malformed JSON
/// - `GmapsError::InvalidRequest` (-32600) for valid JSON that is not a
///   JSON-RPC 2.0 request object (including batch arrays)
pub fn parse_message(bytes: &[u8]) -> Result<JsonRpcRequest, GmapsError> {
    // Peek at the first non-whitespace byte so batch arrays get a precise
    // rejection instead of a generic type error.
    let first_byte = bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .ok_or_else(|| GmapsError::ParseError {
            details: "Invalid JSON: empty input".to_string(),
        })?;

    match first_byte {
        b'{' => {
            let raw: RawJsonRpcRequest = serde_json::from_slice(bytes).map_err(|e| {
                // Syntax errors (bad JSON) vs semantic errors (valid JSON
                // with invalid field values, e.g. a float id).
                if e.is_syntax() || e.is_eof() {
                    GmapsError::ParseError {
                        details: format!("Invalid JSON: {}", e),
                    }
                } else {
                    GmapsError::InvalidRequest {
                        details: format!("Invalid JSON-RPC structure: {}", e),
                    }
                }
            })?;
            validate_raw(raw)
        }
        b'[' => Err(GmapsError::InvalidRequest {
            details: "Batch requests are not supported".to_string(),
        }),
        _ => serde_json::from_slice::<Value>(bytes)
            .map_err(|e| GmapsError::ParseError {
                details: format!("Invalid JSON: {}", e),
            })
            .and_then(|_| {
                Err(GmapsError::InvalidRequest {
                    details: "Request must be a JSON object".to_string(),
                })
            }),
    }
}

/// Validate a raw request: version must be "2.0" and method present.
fn validate_raw(raw: RawJsonRpcRequest) -> Result<JsonRpcRequest, GmapsError> {
    match raw.jsonrpc.as_deref() {
        Some("2.0") => {}
        Some(v) => {
            return Err(GmapsError::InvalidRequest {
                details: format!("Invalid jsonrpc version: expected \"2.0\", got \"{}\"", v),
            });
        }
        None => {
            return Err(GmapsError::InvalidRequest {
                details: "Missing required field: jsonrpc".to_string(),
            });
        }
    }

    let method = raw.method.ok_or_else(|| GmapsError::InvalidRequest {
        details: "Missing required field: method".to_string(),
    })?;

    Ok(JsonRpcRequest {
        id: raw.id,
        method,
        params: raw.params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_request() {
        let json = br#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"maps_geocode"}}"#;
        let req = parse_message(json).expect("should parse");
        assert_eq!(req.id, Some(JsonRpcId::Number(1)));
        assert_eq!(req.method, "tools/call");
        assert!(!req.is_notification());
        assert!(req.params.is_some());
    }

    #[test]
    fn test_parse_notification() {
        let json = br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        let req = parse_message(json).expect("should parse");
        assert!(req.is_notification());
        assert_eq!(req.id, None);
    }

    #[test]
    fn test_parse_malformed_json() {
        let json = br#"{"invalid json"#;
        assert!(matches!(
            parse_message(json),
            Err(GmapsError::ParseError { .. })
        ));
    }

    #[test]
    fn test_parse_missing_jsonrpc_field() {
        let json = br#"{"id":1,"method":"test"}"#;
        let result = parse_message(json);
        assert!(matches!(result, Err(GmapsError::InvalidRequest { .. })));
        if let Err(GmapsError::InvalidRequest { details }) = result {
            assert!(details.contains("jsonrpc"));
        }
    }

    #[test]
    fn test_parse_wrong_version() {
        let json = br#"{"jsonrpc":"1.0","id":1,"method":"test"}"#;
        assert!(matches!(
            parse_message(json),
            Err(GmapsError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_parse_missing_method() {
        let json = br#"{"jsonrpc":"2.0","id":1}"#;
        let result = parse_message(json);
        assert!(matches!(result, Err(GmapsError::InvalidRequest { .. })));
        if let Err(GmapsError::InvalidRequest { details }) = result {
            assert!(details.contains("method"));
        }
    }

    #[test]
    fn test_batch_rejected() {
        let json = br#"[{"jsonrpc":"2.0","id":1,"method":"a"}]"#;
        let result = parse_message(json);
        assert!(matches!(result, Err(GmapsError::InvalidRequest { .. })));
        if let Err(GmapsError::InvalidRequest { details }) = result {
            assert!(details.contains("Batch"));
        }
    }

    #[test]
    fn test_float_id_rejected() {
        let json = br#"{"jsonrpc":"2.0","id":1.5,"method":"test"}"#;
        assert!(matches!(
            parse_message(json),
            Err(GmapsError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_null_id_preserved() {
        // `"id": null` is a real request, not a notification.
        let json = br#"{"jsonrpc":"2.0","id":null,"method":"test"}"#;
        let req = parse_message(json).expect("should parse");
        assert_eq!(req.id, Some(JsonRpcId::Null));
        assert!(!req.is_notification());
    }

    #[test]
    fn test_integer_id_preserved_in_response() {
        let response =
            JsonRpcResponse::success(Some(JsonRpcId::Number(42)), serde_json::json!({}));
        let serialized = serde_json::to_string(&response).expect("should serialize");
        assert!(serialized.contains("\"id\":42"));
        assert!(!serialized.contains("\"id\":\"42\""));
    }

    #[test]
    fn test_string_id_preserved_in_response() {
        let response = JsonRpcResponse::success(
            Some(JsonRpcId::String("abc-123".to_string())),
            serde_json::json!({}),
        );
        let serialized = serde_json::to_string(&response).expect("should serialize");
        assert!(serialized.contains("\"id\":\"abc-123\""));
    }

    #[test]
    fn test_error_response_unknown_id_serializes_null() {
        let response = JsonRpcResponse::error(None, JsonRpcError::new(-32700, "Parse error"));
        let serialized = serde_json::to_string(&response).expect("should serialize");
        assert!(serialized.contains("\"id\":null"));
        assert!(serialized.contains("-32700"));
        assert!(!serialized.contains("\"result\""));
    }

    #[test]
    fn test_is_initialize_request() {
        assert!(is_initialize_request(
            br#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#
        ));
        assert!(!is_initialize_request(
            br#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#
        ));
        assert!(!is_initialize_request(br#"not json"#));
        assert!(!is_initialize_request(br#"{"method":"initialize"}"#)); // missing jsonrpc
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            parse_message(b"   "),
            Err(GmapsError::ParseError { .. })
        ));
    }
}
