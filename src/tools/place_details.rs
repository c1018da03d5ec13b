//! Place details lookup by place id.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::GmapsError;
use crate::maps;
use crate::maps::types::LatLng;
use crate::tools::{parse_args, ToolDef, ToolHandler, ToolResult};

pub struct PlaceDetailsTool {
    client: Arc<maps::Client>,
}

impl PlaceDetailsTool {
    pub fn new(client: Arc<maps::Client>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceDetailsParams {
    place_id: String,
}

#[derive(Debug, Serialize)]
struct ReviewSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct DetailsSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<LatLng>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_ratings: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    open_now: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price_level: Option<u8>,
    reviews: Vec<ReviewSummary>,
}

#[async_trait]
impl ToolHandler for PlaceDetailsTool {
    fn def(&self) -> ToolDef {
        ToolDef {
            name: "get_place_details",
            description: "Get detailed information about a specific place including contact \
                          details, reviews, ratings, and operating hours",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "placeId": {
                        "type": "string",
                        "description": "Google Maps place ID"
                    }
                },
                "required": ["placeId"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolResult, GmapsError> {
        let params: PlaceDetailsParams = parse_args(args)?;

        let details = match self.client.place_details(&params.place_id).await {
            Ok(details) => details,
            Err(e) => return Ok(ToolResult::error(format!("Error getting place details: {e}"))),
        };

        let summary = DetailsSummary {
            name: details.name,
            address: details.formatted_address,
            location: details.geometry.map(|g| g.location),
            rating: details.rating,
            total_ratings: details.user_ratings_total,
            open_now: details.opening_hours.and_then(|h| h.open_now),
            phone: details.formatted_phone_number,
            website: details.website,
            price_level: details.price_level,
            reviews: details
                .reviews
                .into_iter()
                .map(|review| ReviewSummary {
                    rating: review.rating,
                    text: review.text,
                    time: review.time,
                    author_name: review.author_name,
                })
                .collect(),
        };
        ToolResult::json(&summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_id_is_camel_case() {
        let params: PlaceDetailsParams =
            serde_json::from_value(json!({"placeId": "ChIJ123"})).expect("parse");
        assert_eq!(params.place_id, "ChIJ123");
    }

    #[test]
    fn test_missing_place_id_fails() {
        assert!(serde_json::from_value::<PlaceDetailsParams>(json!({})).is_err());
    }
}
