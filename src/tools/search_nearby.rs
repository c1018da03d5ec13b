//! Nearby place search.
//!
//! The center point is either a `"lat,lng"` pair parsed locally or an
//! address resolved through geocoding. The result text leads with the
//! resolved center so callers can tell what the search was anchored on.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::GmapsError;
use crate::maps;
use crate::maps::types::{LatLng, Place};
use crate::tools::{parse_args, ToolDef, ToolHandler, ToolResult};

pub struct SearchNearbyTool {
    client: Arc<maps::Client>,
}

impl SearchNearbyTool {
    pub fn new(client: Arc<maps::Client>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Center {
    value: String,
    #[serde(default)]
    is_coordinates: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNearbyParams {
    center: Center,
    keyword: Option<String>,
    #[serde(default = "default_radius")]
    radius: u32,
    #[serde(default)]
    open_now: bool,
    min_rating: Option<f64>,
}

fn default_radius() -> u32 {
    1000
}

/// Resolved search center, echoed in the result header.
#[derive(Debug, Serialize)]
struct ResolvedCenter {
    lat: f64,
    lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    formatted_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    place_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct PlaceSummary {
    name: String,
    place_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    location: LatLng,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_ratings: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    open_now: Option<bool>,
}

impl From<Place> for PlaceSummary {
    fn from(place: Place) -> Self {
        Self {
            name: place.name,
            place_id: place.place_id,
            address: place.formatted_address.or(place.vicinity),
            location: place.geometry.location,
            rating: place.rating,
            total_ratings: place.user_ratings_total,
            open_now: place.opening_hours.and_then(|h| h.open_now),
        }
    }
}

impl SearchNearbyTool {
    async fn resolve_center(&self, center: &Center) -> Result<ResolvedCenter, maps::MapsError> {
        if center.is_coordinates {
            let location = LatLng::parse(&center.value)?;
            return Ok(ResolvedCenter {
                lat: location.lat,
                lng: location.lng,
                formatted_address: None,
                place_id: None,
            });
        }
        let entry = self.client.geocode(&center.value).await?;
        Ok(ResolvedCenter {
            lat: entry.geometry.location.lat,
            lng: entry.geometry.location.lng,
            formatted_address: entry.formatted_address,
            place_id: entry.place_id,
        })
    }
}

#[async_trait]
impl ToolHandler for SearchNearbyTool {
    fn def(&self) -> ToolDef {
        ToolDef {
            name: "search_nearby",
            description: "Search for nearby places based on location, with optional filtering \
                          by keywords, distance, rating, and operating hours",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "center": {
                        "type": "object",
                        "description": "Search center point",
                        "properties": {
                            "value": {
                                "type": "string",
                                "description": "Address, landmark name, or coordinates (coordinate format: lat,lng)"
                            },
                            "isCoordinates": {
                                "type": "boolean",
                                "description": "Whether the value is coordinates",
                                "default": false
                            }
                        },
                        "required": ["value"]
                    },
                    "keyword": {
                        "type": "string",
                        "description": "Search keyword (e.g., restaurant, cafe, hotel)"
                    },
                    "radius": {
                        "type": "number",
                        "description": "Search radius in meters",
                        "default": 1000
                    },
                    "openNow": {
                        "type": "boolean",
                        "description": "Only show places that are currently open",
                        "default": false
                    },
                    "minRating": {
                        "type": "number",
                        "description": "Minimum rating requirement (0-5)",
                        "minimum": 0,
                        "maximum": 5
                    }
                },
                "required": ["center"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolResult, GmapsError> {
        let params: SearchNearbyParams = parse_args(args)?;

        let center = match self.resolve_center(&params.center).await {
            Ok(center) => center,
            Err(e) => return Ok(ToolResult::error(format!("Error searching nearby places: {e}"))),
        };
        let location = LatLng {
            lat: center.lat,
            lng: center.lng,
        };

        let places = match self
            .client
            .places_nearby(
                location,
                params.radius,
                params.keyword.as_deref(),
                params.open_now,
            )
            .await
        {
            Ok(places) => places,
            Err(e) => return Ok(ToolResult::error(format!("Error searching nearby places: {e}"))),
        };

        // A zero bound filters nothing, same as leaving it out.
        let summaries: Vec<PlaceSummary> = places
            .into_iter()
            .filter(|place| match params.min_rating {
                Some(min) if min > 0.0 => place.rating.unwrap_or(0.0) >= min,
                _ => true,
            })
            .map(PlaceSummary::from)
            .collect();

        let center_text =
            serde_json::to_string_pretty(&center).map_err(|e| GmapsError::Internal {
                details: e.to_string(),
            })?;
        let data_text =
            serde_json::to_string_pretty(&summaries).map_err(|e| GmapsError::Internal {
                details: e.to_string(),
            })?;
        Ok(ToolResult::text(format!(
            "location: {center_text}\n{data_text}"
        )))
    }
}
