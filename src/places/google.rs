//! Google Maps Platform client: Geocoding and Places nearby search

use super::types::{Coordinates, NearbyQuery, RawPlace};
use super::{Geocoder, PlaceSearch, PlacesError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

pub struct GoogleMapsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleMapsClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, PlacesError> {
        let response = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| PlacesError::from_reqwest(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlacesError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(http_error(path, status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| PlacesError::backend(format!("Failed to parse {path} response: {e}")))
    }
}

/// Error for a non-success HTTP status. The body is logged, not returned,
/// since error messages reach API clients.
fn http_error(path: &str, status: reqwest::StatusCode, body: &str) -> PlacesError {
    tracing::warn!(path, %status, body = %body, "Places backend returned an error status");
    let message = format!("HTTP {status} from {path}");
    match status.as_u16() {
        401 | 403 => PlacesError::auth(message),
        429 => PlacesError::rate_limit(message),
        _ => PlacesError::backend(message),
    }
}

/// Map a Google API `status` field to success or a classified error.
///
/// `ZERO_RESULTS` is a success with an empty result list.
fn check_status(status: &str, error_message: Option<&str>) -> Result<(), PlacesError> {
    let detail = error_message.unwrap_or(status);
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "REQUEST_DENIED" => Err(PlacesError::auth(format!("Request denied: {detail}"))),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => {
            Err(PlacesError::rate_limit(format!("Quota exceeded: {detail}")))
        }
        _ => Err(PlacesError::backend(format!("{status}: {detail}"))),
    }
}

#[async_trait]
impl Geocoder for GoogleMapsClient {
    async fn geocode(&self, place: &str) -> Result<Coordinates, PlacesError> {
        let resp: GeocodeResponse = self
            .get_json("geocode/json", &[("address", place.to_string())])
            .await?;
        check_status(&resp.status, resp.error_message.as_deref())?;

        resp.results
            .first()
            .and_then(|r| Coordinates::new(r.geometry.location.lat, r.geometry.location.lng))
            .ok_or_else(|| PlacesError::geocode(place))
    }
}

#[async_trait]
impl PlaceSearch for GoogleMapsClient {
    async fn nearby(&self, query: &NearbyQuery) -> Result<Vec<RawPlace>, PlacesError> {
        let mut params = vec![
            ("location", query.coordinates.to_string()),
            ("radius", query.radius_m.to_string()),
            ("type", query.place_type.to_string()),
        ];
        if query.open_now {
            params.push(("opennow", "true".to_string()));
        }

        let resp: NearbySearchResponse = self.get_json("place/nearbysearch/json", &params).await?;
        check_status(&resp.status, resp.error_message.as_deref())?;
        Ok(resp.results)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<RawPlace>,
}
