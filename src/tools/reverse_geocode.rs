//! Reverse geocoding: coordinates to address.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::GmapsError;
use crate::maps;
use crate::maps::types::LatLng;
use crate::tools::{parse_args, ToolDef, ToolHandler, ToolResult};

pub struct ReverseGeocodeTool {
    client: Arc<maps::Client>,
}

impl ReverseGeocodeTool {
    pub fn new(client: Arc<maps::Client>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeParams {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
struct ReverseGeocodeSummary {
    formatted_address: String,
    place_id: String,
    address_components: Value,
}

#[async_trait]
impl ToolHandler for ReverseGeocodeTool {
    fn def(&self) -> ToolDef {
        ToolDef {
            name: "maps_reverse_geocode",
            description: "Convert geographic coordinates (latitude and longitude) to a \
                          human-readable address",
            input_schema: json!({
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
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolResult, GmapsError> {
        let params: ReverseGeocodeParams = parse_args(args)?;
        let location = LatLng {
            lat: params.latitude,
            lng: params.longitude,
        };

        match self.client.reverse_geocode(location).await {
            Ok(entry) => ToolResult::json(&ReverseGeocodeSummary {
                formatted_address: entry.formatted_address.unwrap_or_default(),
                place_id: entry.place_id.unwrap_or_default(),
                address_components: entry.address_components,
            }),
            Err(e) => Ok(ToolResult::error(format!("Error reverse geocoding: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_require_both_coordinates() {
        assert!(serde_json::from_value::<ReverseGeocodeParams>(json!({"latitude": 25.0})).is_err());
        let params: ReverseGeocodeParams =
            serde_json::from_value(json!({"latitude": 25.0, "longitude": 121.5}))
                .expect("parse");
        assert_eq!(params.longitude, 121.5);
    }
}
