//! Address geocoding — an external collaborator behind a trait.
//!
//! The pipeline only ever talks to [`Geocoder`]; the production
//! implementation resolves free-text addresses through a Nominatim endpoint
//! over HTTP. The request carries an explicit timeout so a stalled network
//! call degrades into [`GeocodeError::Unavailable`] for that one photo
//! instead of hanging a batch worker.

use crate::types::Coordinate;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("no coordinates found for address {0:?}")]
    NotFound(String),
    #[error("geocoding service unavailable: {0}")]
    Unavailable(String),
}

/// Resolves a free-text address to a coordinate.
pub trait Geocoder: Send + Sync {
    fn coordinates(&self, address: &str) -> Result<Coordinate, GeocodeError>;
}

/// One entry of a Nominatim search response. The service returns
/// coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Nominatim-backed geocoder with a bounded request timeout.
pub struct NominatimGeocoder {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("photo-matte/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeocodeError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    fn coordinates(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let places: Vec<Place> = self
            .client
            .get(&self.endpoint)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .map_err(|e| GeocodeError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| GeocodeError::Unavailable(e.to_string()))?
            .json()
            .map_err(|e| GeocodeError::Unavailable(e.to_string()))?;

        let place = places
            .first()
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))?;

        let latitude: f64 = place
            .lat
            .parse()
            .map_err(|_| GeocodeError::Unavailable(format!("malformed latitude {:?}", place.lat)))?;
        let longitude: f64 = place
            .lon
            .parse()
            .map_err(|_| GeocodeError::Unavailable(format!("malformed longitude {:?}", place.lon)))?;

        Coordinate::new(latitude, longitude).ok_or_else(|| {
            GeocodeError::Unavailable(format!(
                "coordinates out of range: {latitude}, {longitude}"
            ))
        })
    }
}
