//! Wire types for the Google Maps Web Services JSON responses.
//!
//! Only the fields the tool surface re-emits are modeled; everything else
//! is dropped at deserialization. Directions routes are kept as raw JSON
//! because the tool forwards them verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::maps::MapsError;

/// Geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Parse a `"lat,lng"` string.
    pub fn parse(input: &str) -> Result<Self, MapsError> {
        let mut parts = input.split(',').map(str::trim);
        let lat = parts.next().and_then(|p| p.parse::<f64>().ok());
        let lng = parts.next().and_then(|p| p.parse::<f64>().ok());
        match (lat, lng, parts.next()) {
            (Some(lat), Some(lng), None) => Ok(Self { lat, lng }),
            _ => Err(MapsError::InvalidCoordinates),
        }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Travel mode accepted by directions and distance-matrix requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
}

/// One entry of a nearby-search result list.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub name: String,
    pub place_id: String,
    pub formatted_address: Option<String>,
    /// Nearby search returns `vicinity` instead of `formatted_address`.
    pub vicinity: Option<String>,
    pub geometry: Geometry,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u64>,
    pub opening_hours: Option<OpeningHours>,
}

/// Place-details payload for the fields this server requests.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDetails {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub geometry: Option<Geometry>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u64>,
    pub opening_hours: Option<OpeningHours>,
    pub formatted_phone_number: Option<String>,
    pub website: Option<String>,
    pub price_level: Option<u8>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub rating: Option<f64>,
    pub text: Option<String>,
    pub time: Option<i64>,
    pub author_name: Option<String>,
}

/// One geocoding result, shared by forward and reverse lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeEntry {
    pub formatted_address: Option<String>,
    pub place_id: Option<String>,
    pub geometry: Geometry,
    #[serde(default)]
    pub address_components: Value,
}

/// `{ text, value }` pair used for distances and durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatrixElement {
    pub status: String,
    pub distance: Option<TextValue>,
    pub duration: Option<TextValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatrixRow {
    pub elements: Vec<MatrixElement>,
}

/// Distance-matrix response body.
#[derive(Debug, Clone, Deserialize)]
pub struct DistanceMatrixData {
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
    #[serde(default)]
    pub origin_addresses: Vec<String>,
    #[serde(default)]
    pub destination_addresses: Vec<String>,
}

/// Directions response body. Routes are forwarded verbatim, so they stay
/// untyped JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsData {
    #[serde(default)]
    pub routes: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElevationPoint {
    pub elevation: f64,
}
