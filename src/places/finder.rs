//! Geocode-then-search restaurant lookup

use super::types::{Location, NearbyQuery, RawPlace, Venue, UNKNOWN_ADDRESS};
use super::{Geocoder, PlaceSearch, PlacesError};
use crate::config::SearchConfig;
use std::sync::Arc;

const RESTAURANT_TYPE: &str = "restaurant";

pub struct RestaurantFinder {
    geocoder: Arc<dyn Geocoder>,
    places: Arc<dyn PlaceSearch>,
    defaults: SearchConfig,
}

impl RestaurantFinder {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        places: Arc<dyn PlaceSearch>,
        defaults: SearchConfig,
    ) -> Self {
        Self {
            geocoder,
            places,
            defaults,
        }
    }

    pub fn defaults(&self) -> SearchConfig {
        self.defaults
    }

    /// Resolve `location`, search around it and keep rated venues at or
    /// above `params.min_rating`, in the backend's relevance order.
    pub async fn find_restaurants(
        &self,
        location: &Location,
        params: SearchConfig,
    ) -> Result<Vec<Venue>, PlacesError> {
        let coordinates = match location {
            Location::Coordinates(coords) => *coords,
            Location::Place(name) => self.geocoder.geocode(name).await?,
        };

        let query = NearbyQuery {
            coordinates,
            radius_m: params.radius_m,
            place_type: RESTAURANT_TYPE,
            open_now: params.open_now,
        };
        let raw = self.places.nearby(&query).await?;
        let found = raw.len();
        let venues = filter_venues(raw, params.min_rating);

        tracing::debug!(
            location = %location,
            %coordinates,
            found,
            kept = venues.len(),
            "Restaurant search completed"
        );
        Ok(venues)
    }
}

/// Drop unnamed or unrated places and those rated below `min_rating`.
pub fn filter_venues(raw: Vec<RawPlace>, min_rating: f64) -> Vec<Venue> {
    raw.into_iter()
        .filter_map(|place| {
            let name = place.name?;
            let rating = place.rating?;
            (rating >= min_rating).then(|| Venue {
                name,
                address: place
                    .vicinity
                    .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
                rating: Some(rating),
                total_ratings: place.user_ratings_total.unwrap_or(0),
                open_now: place.opening_hours.and_then(|h| h.open_now),
            })
        })
        .collect()
}
