//! Google Maps Web Services client.
//!
//! Thin typed wrapper over the JSON web-service endpoints this server
//! needs: nearby search, place details, geocoding (both directions),
//! distance matrix, directions, elevation. Failures stay inside
//! `MapsError`; the tool layer turns them into in-band error envelopes.

mod client;
pub mod types;

pub use client::Client;

use thiserror::Error;

/// Failures talking to or interpreting the maps provider.
#[derive(Debug, Error)]
pub enum MapsError {
    /// Network or HTTP-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider responded but signalled a non-success status.
    #[error("{endpoint} failed with status {status}")]
    Api {
        endpoint: &'static str,
        status: String,
    },

    /// Query succeeded but matched nothing.
    #[error("no results found")]
    NoResults,

    /// A "lat,lng" string that does not parse as two numbers.
    #[error("invalid coordinate format, expected \"lat,lng\"")]
    InvalidCoordinates,

    /// A departure/arrival time that is not RFC 3339.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
