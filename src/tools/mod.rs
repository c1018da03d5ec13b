//! Tool registry and the uniform tool result envelope.
//!
//! Every tool exposes a static definition (name, description, JSON schema
//! for its input) and an async handler. Handlers return `ToolResult`, the
//! MCP content envelope: a list of content blocks plus an `isError` flag.
//! Provider failures, empty results, and bad inputs that pass schema-level
//! validation all surface as `isError: true` results so the session keeps
//! running; only malformed arguments escalate to JSON-RPC `-32602`.

mod directions;
mod distance_matrix;
mod elevation;
mod geocode;
mod place_details;
mod reverse_geocode;
mod search_nearby;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GmapsError;
use crate::maps;

pub use directions::DirectionsTool;
pub use distance_matrix::DistanceMatrixTool;
pub use elevation::ElevationTool;
pub use geocode::GeocodeTool;
pub use place_details::PlaceDetailsTool;
pub use reverse_geocode::ReverseGeocodeTool;
pub use search_nearby::SearchNearbyTool;

/// Static tool metadata advertised via `tools/list`.
#[derive(Debug, Clone)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema for the tool's `arguments` object.
    pub input_schema: Value,
}

/// One content block of a tool result. Only text blocks are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

/// MCP tool result envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    pub is_error: bool,
}

impl ToolResult {
    /// Successful result with a single text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Successful result holding a pretty-printed JSON payload.
    pub fn json(value: &impl Serialize) -> Result<Self, GmapsError> {
        let text = serde_json::to_string_pretty(value).map_err(|e| GmapsError::Internal {
            details: e.to_string(),
        })?;
        Ok(Self::text(text))
    }

    /// Tool-level failure. Stays in-band; never becomes a protocol error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

/// A callable tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The definition advertised via `tools/list`.
    fn def(&self) -> ToolDef;

    /// Execute with the raw `arguments` value from `tools/call`.
    ///
    /// # Errors
    ///
    /// `GmapsError::InvalidParams` when arguments fail schema validation;
    /// everything else is reported in-band via `ToolResult::error`.
    async fn call(&self, args: Value) -> Result<ToolResult, GmapsError>;
}

/// Ordered collection of tools. Order is preserved for `tools/list`.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the full maps tool surface.
    pub fn with_maps(client: Arc<maps::Client>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SearchNearbyTool::new(client.clone())));
        registry.register(Arc::new(PlaceDetailsTool::new(client.clone())));
        registry.register(Arc::new(GeocodeTool::new(client.clone())));
        registry.register(Arc::new(ReverseGeocodeTool::new(client.clone())));
        registry.register(Arc::new(DistanceMatrixTool::new(client.clone())));
        registry.register(Arc::new(DirectionsTool::new(client.clone())));
        registry.register(Arc::new(ElevationTool::new(client)));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn ToolHandler>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.tools.iter().find(|t| t.def().name == name)
    }

    pub fn defs(&self) -> impl Iterator<Item = ToolDef> + '_ {
        self.tools.iter().map(|t| t.def())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Deserialize a tool's `arguments` into its typed params struct, mapping
/// failures to `-32602`.
pub(crate) fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, GmapsError> {
    serde_json::from_value(args).map_err(|e| GmapsError::InvalidParams {
        details: e.to_string(),
    })
}
