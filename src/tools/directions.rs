//! Turn-by-turn directions between two locations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::GmapsError;
use crate::maps;
use crate::maps::types::TravelMode;
use crate::maps::MapsError;
use crate::tools::{parse_args, ToolDef, ToolHandler, ToolResult};

pub struct DirectionsTool {
    client: Arc<maps::Client>,
}

impl DirectionsTool {
    pub fn new(client: Arc<maps::Client>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsParams {
    origin: String,
    destination: String,
    #[serde(default)]
    mode: TravelMode,
    departure_time: Option<String>,
    arrival_time: Option<String>,
}

fn parse_rfc3339(label: &str, input: &str) -> Result<i64, MapsError> {
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.timestamp())
        .map_err(|_| MapsError::InvalidTimestamp(format!("{label}: {input}")))
}

/// Pull the localized `text` out of a leg's arrival/departure time block.
fn time_text(leg: &Value, field: &str) -> String {
    leg.get(field)
        .and_then(|t| t.get("text"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

#[async_trait]
impl ToolHandler for DirectionsTool {
    fn def(&self) -> ToolDef {
        ToolDef {
            name: "maps_directions",
            description: "Get detailed turn-by-turn navigation directions between two \
                          locations with route information",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "origin": {
                        "type": "string",
                        "description": "Starting point address or coordinates"
                    },
                    "destination": {
                        "type": "string",
                        "description": "Destination address or coordinates"
                    },
                    "mode": {
                        "type": "string",
                        "enum": ["driving", "walking", "bicycling", "transit"],
                        "description": "Travel mode for directions",
                        "default": "driving"
                    },
                    "departure_time": {
                        "type": "string",
                        "description": "Departure time (ISO string format)"
                    },
                    "arrival_time": {
                        "type": "string",
                        "description": "Arrival time (ISO string format)"
                    }
                },
                "required": ["origin", "destination"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolResult, GmapsError> {
        let params: DirectionsParams = parse_args(args)?;

        let result = async {
            // Arrival time wins; otherwise depart at the given time or now.
            let arrival = params
                .arrival_time
                .as_deref()
                .map(|t| parse_rfc3339("arrival_time", t))
                .transpose()?;
            let departure = if arrival.is_none() {
                params
                    .departure_time
                    .as_deref()
                    .map(|t| parse_rfc3339("departure_time", t))
                    .transpose()?
            } else {
                None
            };

            self.client
                .directions(
                    &params.origin,
                    &params.destination,
                    params.mode,
                    departure,
                    arrival,
                )
                .await
        }
        .await;

        let data = match result {
            Ok(data) => data,
            Err(e) => return Ok(ToolResult::error(format!("Error getting directions: {e}"))),
        };

        // Client guarantees at least one route.
        let route = &data.routes[0];
        let leg = &route["legs"][0];
        let summary = json!({
            "routes": data.routes,
            "summary": route.get("summary").and_then(Value::as_str).unwrap_or(""),
            "total_distance": {
                "value": leg["distance"]["value"],
                "text": leg["distance"]["text"]
            },
            "total_duration": {
                "value": leg["duration"]["value"],
                "text": leg["duration"]["text"]
            },
            "arrival_time": time_text(leg, "arrival_time"),
            "departure_time": time_text(leg, "departure_time")
        });
        ToolResult::json(&summary)
    }
}
