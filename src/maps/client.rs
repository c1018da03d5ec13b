//! HTTP client for the Google Maps Web Services endpoints.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::maps::types::{
    DirectionsData, DistanceMatrixData, ElevationPoint, GeocodeEntry, LatLng, Place, PlaceDetails,
    TravelMode,
};
use crate::maps::MapsError;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Responses come localized; the default matches the original deployment.
const DEFAULT_LANGUAGE: &str = "zh-TW";

/// Fields requested from the place-details endpoint.
const DETAILS_FIELDS: &str = "name,rating,user_ratings_total,formatted_address,opening_hours,\
                              reviews,geometry,formatted_phone_number,website,price_level,photos";

/// Statuses that mean "query worked, nothing matched".
const ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Google Maps Web Services client.
///
/// One instance is shared by all tools; `reqwest::Client` pools
/// connections internally. The base URL is injectable so tests can point
/// at a local mock.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    language: String,
}

/// Common response envelope: a status string plus endpoint-specific body.
#[derive(Deserialize)]
struct Wire<T> {
    status: String,
    error_message: Option<String>,
    #[serde(flatten)]
    body: T,
}

#[derive(Deserialize)]
struct ResultsBody<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Deserialize)]
struct DetailsBody {
    result: Option<PlaceDetails>,
}

impl Client {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Wire<T>, MapsError> {
        let url = format!("{}/{}/json", self.base_url, path);
        debug!(endpoint, "maps request");
        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        let wire: Wire<T> = response.json().await?;
        Ok(wire)
    }

    /// Checks the envelope status, tolerating `ZERO_RESULTS`.
    fn check_status<T>(endpoint: &'static str, wire: &Wire<T>) -> Result<(), MapsError> {
        if wire.status == "OK" || wire.status == ZERO_RESULTS {
            return Ok(());
        }
        warn!(
            endpoint,
            status = %wire.status,
            error = wire.error_message.as_deref().unwrap_or(""),
            "maps API error"
        );
        Err(MapsError::Api {
            endpoint,
            status: wire.status.clone(),
        })
    }

    /// Nearby place search around a coordinate.
    pub async fn places_nearby(
        &self,
        location: LatLng,
        radius: u32,
        keyword: Option<&str>,
        open_now: bool,
    ) -> Result<Vec<Place>, MapsError> {
        let mut query = vec![
            ("location", location.to_string()),
            ("radius", radius.to_string()),
            ("language", self.language.clone()),
        ];
        if let Some(keyword) = keyword {
            query.push(("keyword", keyword.to_string()));
        }
        // Sent only when requested; the parameter's presence is the filter.
        if open_now {
            query.push(("opennow", "true".to_string()));
        }
        let wire: Wire<ResultsBody<Place>> = self
            .get_json("nearbysearch", "place/nearbysearch", &query)
            .await?;
        Self::check_status("nearbysearch", &wire)?;
        Ok(wire.body.results)
    }

    /// Details for a single place id.
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, MapsError> {
        let query = vec![
            ("place_id", place_id.to_string()),
            ("fields", DETAILS_FIELDS.to_string()),
            ("language", self.language.clone()),
        ];
        let wire: Wire<DetailsBody> = self.get_json("details", "place/details", &query).await?;
        if wire.status != "OK" {
            warn!(status = %wire.status, "place details error");
            return Err(MapsError::Api {
                endpoint: "details",
                status: wire.status,
            });
        }
        wire.body.result.ok_or(MapsError::NoResults)
    }

    /// Forward geocode: first match for an address.
    pub async fn geocode(&self, address: &str) -> Result<GeocodeEntry, MapsError> {
        let query = vec![
            ("address", address.to_string()),
            ("language", self.language.clone()),
        ];
        let wire: Wire<ResultsBody<GeocodeEntry>> =
            self.get_json("geocode", "geocode", &query).await?;
        Self::check_status("geocode", &wire)?;
        wire.body.results.into_iter().next().ok_or(MapsError::NoResults)
    }

    /// Reverse geocode: first match for a coordinate.
    pub async fn reverse_geocode(&self, location: LatLng) -> Result<GeocodeEntry, MapsError> {
        let query = vec![
            ("latlng", location.to_string()),
            ("language", self.language.clone()),
        ];
        let wire: Wire<ResultsBody<GeocodeEntry>> =
            self.get_json("reverse_geocode", "geocode", &query).await?;
        Self::check_status("reverse_geocode", &wire)?;
        wire.body.results.into_iter().next().ok_or(MapsError::NoResults)
    }

    /// Travel distance and duration for every origin/destination pair.
    pub async fn distance_matrix(
        &self,
        origins: &[String],
        destinations: &[String],
        mode: TravelMode,
    ) -> Result<DistanceMatrixData, MapsError> {
        let query = vec![
            ("origins", origins.join("|")),
            ("destinations", destinations.join("|")),
            ("mode", mode.as_str().to_string()),
            ("language", self.language.clone()),
        ];
        let wire: Wire<DistanceMatrixData> = self
            .get_json("distancematrix", "distancematrix", &query)
            .await?;
        if wire.status != "OK" {
            return Err(MapsError::Api {
                endpoint: "distancematrix",
                status: wire.status,
            });
        }
        Ok(wire.body)
    }

    /// Route between two points.
    ///
    /// `arrival_time` wins over `departure_time`; with neither, the
    /// request departs now. Both are unix seconds.
    pub async fn directions(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
        departure_time: Option<i64>,
        arrival_time: Option<i64>,
    ) -> Result<DirectionsData, MapsError> {
        let mut query = vec![
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("mode", mode.as_str().to_string()),
            ("language", self.language.clone()),
        ];
        if let Some(arrival) = arrival_time {
            query.push(("arrival_time", arrival.to_string()));
        } else {
            match departure_time {
                Some(departure) => query.push(("departure_time", departure.to_string())),
                None => query.push(("departure_time", "now".to_string())),
            }
        }
        let wire: Wire<DirectionsData> = self.get_json("directions", "directions", &query).await?;
        if wire.status != "OK" {
            return Err(MapsError::Api {
                endpoint: "directions",
                status: wire.status,
            });
        }
        if wire.body.routes.is_empty() {
            return Err(MapsError::NoResults);
        }
        Ok(wire.body)
    }

    /// Elevation above sea level for each location, in request order.
    pub async fn elevation(&self, locations: &[LatLng]) -> Result<Vec<ElevationPoint>, MapsError> {
        let joined = locations
            .iter()
            .map(LatLng::to_string)
            .collect::<Vec<_>>()
            .join("|");
        let query = vec![("locations", joined)];
        let wire: Wire<ResultsBody<ElevationPoint>> =
            self.get_json("elevation", "elevation", &query).await?;
        if wire.status != "OK" {
            return Err(MapsError::Api {
                endpoint: "elevation",
                status: wire.status,
            });
        }
        Ok(wire.body.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_envelope_flattens_results() {
        let json = r#"{
            "status": "OK",
            "results": [
                { "elevation": 12.5 },
                { "elevation": 3960.0 }
            ]
        }"#;
        let wire: Wire<ResultsBody<ElevationPoint>> =
            serde_json::from_str(json).expect("parse");
        assert_eq!(wire.status, "OK");
        assert_eq!(wire.body.results.len(), 2);
        assert_eq!(wire.body.results[1].elevation, 3960.0);
    }

    #[test]
    fn test_check_status_tolerates_zero_results() {
        let wire = Wire {
            status: ZERO_RESULTS.to_string(),
            error_message: None,
            body: ResultsBody::<Place> { results: vec![] },
        };
        assert!(Client::check_status("nearbysearch", &wire).is_ok());
    }

    #[test]
    fn test_check_status_rejects_denied() {
        let wire = Wire {
            status: "REQUEST_DENIED".to_string(),
            error_message: Some("The provided API key is invalid.".to_string()),
            body: ResultsBody::<Place> { results: vec![] },
        };
        let err = Client::check_status("nearbysearch", &wire).err().expect("error");
        assert!(matches!(err, MapsError::Api { status, .. } if status == "REQUEST_DENIED"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = Client::with_base_url("key", "http://localhost:9999/");
        assert_eq!(client.base_url, "http://localhost:9999");
    }
}
