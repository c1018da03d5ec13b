//! Elevation lookup for a list of coordinates.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::GmapsError;
use crate::maps;
use crate::maps::types::LatLng;
use crate::tools::{parse_args, ToolDef, ToolHandler, ToolResult};

pub struct ElevationTool {
    client: Arc<maps::Client>,
}

impl ElevationTool {
    pub fn new(client: Arc<maps::Client>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ElevationLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ElevationParams {
    locations: Vec<ElevationLocation>,
}

#[derive(Debug, Serialize)]
struct ElevationSummary {
    elevation: f64,
    location: LatLng,
}

#[async_trait]
impl ToolHandler for ElevationTool {
    fn def(&self) -> ToolDef {
        ToolDef {
            name: "maps_elevation",
            description: "Get elevation data (height above sea level) for specific \
                          geographic locations",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "locations": {
                        "type": "array",
                        "description": "List of locations to get elevation data for",
                        "items": {
                            "type": "object",
                            "properties": {
                                "latitude": {
                                    "type": "number",
                                    "description": "Latitude coordinate"
                                },
                                "longitude": {
                                    "type": "number",
                                    "description": "Longitude coordinate"
                                }
                            },
                            "required": ["latitude", "longitude"]
                        }
                    }
                },
                "required": ["locations"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolResult, GmapsError> {
        let params: ElevationParams = parse_args(args)?;
        let locations: Vec<LatLng> = params
            .locations
            .iter()
            .map(|loc| LatLng {
                lat: loc.latitude,
                lng: loc.longitude,
            })
            .collect();

        match self.client.elevation(&locations).await {
            Ok(points) => {
                // Results come back in request order.
                let summaries: Vec<ElevationSummary> = points
                    .into_iter()
                    .zip(locations)
                    .map(|(point, location)| ElevationSummary {
                        elevation: point.elevation,
                        location,
                    })
                    .collect();
                ToolResult::json(&summaries)
            }
            Err(e) => Ok(ToolResult::error(format!(
                "Error getting elevation data: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_shape() {
        let params: ElevationParams = serde_json::from_value(json!({
            "locations": [
                { "latitude": 23.47, "longitude": 120.957 },
                { "latitude": 25.03, "longitude": 121.56 }
            ]
        }))
        .expect("parse");
        assert_eq!(params.locations.len(), 2);
        assert_eq!(params.locations[0].latitude, 23.47);
    }

    #[test]
    fn test_summary_pairs_elevation_with_input_location() {
        let summary = ElevationSummary {
            elevation: 3952.0,
            location: LatLng {
                lat: 23.47,
                lng: 120.957,
            },
        };
        let value = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(value["elevation"], 3952.0);
        assert_eq!(value["location"]["lat"], 23.47);
    }
}
