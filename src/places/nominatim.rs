//! `OpenStreetMap` Nominatim geocoder

use super::types::Coordinates;
use super::{Geocoder, PlacesError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl NominatimGeocoder {
    pub fn new(client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place: &str) -> Result<Coordinates, PlacesError> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .header("User-Agent", self.user_agent.as_str())
            .send()
            .await
            .map_err(|e| PlacesError::from_reqwest(&e))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(PlacesError::rate_limit("Nominatim rate limit exceeded"));
        }
        if !status.is_success() {
            return Err(PlacesError::backend(format!("Nominatim returned HTTP {status}")));
        }

        let matches: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| PlacesError::backend(format!("Failed to parse Nominatim response: {e}")))?;

        matches
            .first()
            .and_then(NominatimPlace::coordinates)
            .ok_or_else(|| PlacesError::geocode(place))
    }
}

/// Nominatim encodes coordinates as strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimPlace {
    fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::new(self.lat.parse().ok()?, self.lon.parse().ok()?)
    }
}
