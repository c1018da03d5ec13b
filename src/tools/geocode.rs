//! Forward geocoding: address to coordinates.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::GmapsError;
use crate::maps;
use crate::maps::types::LatLng;
use crate::tools::{parse_args, ToolDef, ToolHandler, ToolResult};

pub struct GeocodeTool {
    client: Arc<maps::Client>,
}

impl GeocodeTool {
    pub fn new(client: Arc<maps::Client>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeParams {
    address: String,
}

#[derive(Debug, Serialize)]
struct GeocodeSummary {
    location: LatLng,
    formatted_address: String,
    place_id: String,
}

#[async_trait]
impl ToolHandler for GeocodeTool {
    fn def(&self) -> ToolDef {
        ToolDef {
            name: "maps_geocode",
            description: "Convert addresses or place names to geographic coordinates \
                          (latitude and longitude)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "address": {
                        "type": "string",
                        "description": "Address or place name to convert to coordinates"
                    }
                },
                "required": ["address"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolResult, GmapsError> {
        let params: GeocodeParams = parse_args(args)?;

        match self.client.geocode(&params.address).await {
            Ok(entry) => ToolResult::json(&GeocodeSummary {
                location: entry.geometry.location,
                formatted_address: entry.formatted_address.unwrap_or_default(),
                place_id: entry.place_id.unwrap_or_default(),
            }),
            Err(e) => Ok(ToolResult::error(format!("Error geocoding address: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_shape() {
        let summary = GeocodeSummary {
            location: LatLng {
                lat: 25.033,
                lng: 121.5654,
            },
            formatted_address: "No. 7, Section 5, Xinyi Road".to_string(),
            place_id: "ChIJH56c2rarQjQRphD9gvC8BhI".to_string(),
        };
        let value = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(value["location"]["lat"], 25.033);
        assert!(value["formatted_address"].is_string());
        assert!(value["place_id"].is_string());
    }
}
