//! Travel distance and duration matrix.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::GmapsError;
use crate::maps;
use crate::maps::types::{DistanceMatrixData, TextValue, TravelMode};
use crate::tools::{parse_args, ToolDef, ToolHandler, ToolResult};

pub struct DistanceMatrixTool {
    client: Arc<maps::Client>,
}

impl DistanceMatrixTool {
    pub fn new(client: Arc<maps::Client>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixParams {
    origins: Vec<String>,
    destinations: Vec<String>,
    #[serde(default)]
    mode: TravelMode,
}

/// Matrices are row-per-origin, column-per-destination; unreachable pairs
/// hold `null`.
#[derive(Debug, Serialize)]
struct MatrixSummary {
    distances: Vec<Vec<Option<TextValue>>>,
    durations: Vec<Vec<Option<TextValue>>>,
    origin_addresses: Vec<String>,
    destination_addresses: Vec<String>,
}

impl From<DistanceMatrixData> for MatrixSummary {
    fn from(data: DistanceMatrixData) -> Self {
        let mut distances = Vec::with_capacity(data.rows.len());
        let mut durations = Vec::with_capacity(data.rows.len());
        for row in data.rows {
            let mut distance_row = Vec::with_capacity(row.elements.len());
            let mut duration_row = Vec::with_capacity(row.elements.len());
            for element in row.elements {
                if element.status == "OK" {
                    distance_row.push(element.distance);
                    duration_row.push(element.duration);
                } else {
                    distance_row.push(None);
                    duration_row.push(None);
                }
            }
            distances.push(distance_row);
            durations.push(duration_row);
        }
        Self {
            distances,
            durations,
            origin_addresses: data.origin_addresses,
            destination_addresses: data.destination_addresses,
        }
    }
}

#[async_trait]
impl ToolHandler for DistanceMatrixTool {
    fn def(&self) -> ToolDef {
        ToolDef {
            name: "maps_distance_matrix",
            description: "Calculate travel distances and durations between multiple origins \
                          and destinations for different travel modes",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "origins": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "List of origin addresses or coordinates"
                    },
                    "destinations": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "List of destination addresses or coordinates"
                    },
                    "mode": {
                        "type": "string",
                        "enum": ["driving", "walking", "bicycling", "transit"],
                        "description": "Travel mode for calculation",
                        "default": "driving"
                    }
                },
                "required": ["origins", "destinations"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolResult, GmapsError> {
        let params: DistanceMatrixParams = parse_args(args)?;

        match self
            .client
            .distance_matrix(&params.origins, &params.destinations, params.mode)
            .await
        {
            Ok(data) => ToolResult::json(&MatrixSummary::from(data)),
            Err(e) => Ok(ToolResult::error(format!(
                "Error calculating distance matrix: {e}"
            ))),
        }
    }
}
