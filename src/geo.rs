//! Best-effort geocoding of free-text city names.
//!
//! One outbound lookup per submission against a Nominatim-style search
//! endpoint. There is no caching, no retrying and no rate limiting; callers
//! are expected to treat any failure as "no coordinates" and carry on.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// A client for a Nominatim-style place search endpoint.
#[derive(Debug)]
pub struct Geocoder {
    endpoint: String,
    client: reqwest::blocking::Client,
}

/// One place in a Nominatim search response.
///
/// Nominatim encodes coordinates as JSON strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl Geocoder {
    /// Creates a geocoder for the given endpoint.
    ///
    /// Public Nominatim instances require an identifying `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(endpoint: String, user_agent: &str) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { endpoint, client })
    }

    /// Creates a geocoder from the tool configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, GeocodeError> {
        Self::new(
            config.geocoder_endpoint().to_string(),
            config.geocoder_user_agent(),
        )
    }

    /// Looks up the best-guess coordinates for a free-text city name.
    ///
    /// Returns `Ok(None)` when the service finds no place for the query.
    /// Every call is a fresh network request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the service responds with an
    /// error status, or the response cannot be parsed.
    pub fn locate(&self, city: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let places: Vec<Place> = self
            .client
            .get(&self.endpoint)
            .query(&[("q", city), ("format", "json"), ("limit", "1")])
            .send()?
            .error_for_status()?
            .json()?;

        let Some(place) = places.into_iter().next() else {
            tracing::debug!("No geocoding result for '{city}'");
            return Ok(None);
        };

        Ok(Some(Coordinates {
            latitude: place.lat.parse()?,
            longitude: place.lon.parse()?,
        }))
    }
}

/// Errors looking up coordinates for a city.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// The HTTP request failed or returned an error status.
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a coordinate that is not a number.
    #[error("geocoder returned a malformed coordinate: {0}")]
    Coordinate(#[from] std::num::ParseFloatError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_parses_nominatim_response() {
        let places: Vec<Place> =
            serde_json::from_str(r#"[{"lat": "39.7990175", "lon": "-89.6439575"}]"#).unwrap();

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].lat, "39.7990175");
        assert_eq!(places[0].lon, "-89.6439575");
    }

    #[test]
    fn empty_response_parses_as_no_places() {
        let places: Vec<Place> = serde_json::from_str("[]").unwrap();
        assert!(places.is_empty());
    }

    #[test]
    fn unreachable_endpoint_is_an_error() {
        // Nothing listens on port 1; the request should fail, not panic.
        let geocoder = Geocoder::new("http://127.0.0.1:1/search".to_string(), "test").unwrap();
        assert!(matches!(
            geocoder.locate("Springfield"),
            Err(GeocodeError::Http(_))
        ));
    }
}
