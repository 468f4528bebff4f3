//! Restaurant lookup against external geocoding and places backends
//!
//! A location string is resolved to coordinates (unless it already is a
//! `lat,lng` pair), a nearby search runs around it, and the raw results are
//! normalized into [`Venue`] records filtered by minimum rating.

mod error;
mod finder;
mod google;
mod nominatim;
mod types;


pub use error::{PlacesError, PlacesErrorKind};
pub use finder::{filter_venues, RestaurantFinder};
pub use google::GoogleMapsClient;
pub use nominatim::NominatimGeocoder;
pub use types::*;

use async_trait::async_trait;

/// Resolves a place name to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, place: &str) -> Result<Coordinates, PlacesError>;
}

/// Searches for places around a point
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn nearby(&self, query: &NearbyQuery) -> Result<Vec<RawPlace>, PlacesError>;
}
