//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the orchestrator with mock implementations.

use crate::places::{Location, PlacesError, RestaurantFinder, Venue};
use async_trait::async_trait;

/// Venue lookup around a user-supplied location
#[async_trait]
pub trait RestaurantSource: Send + Sync {
    /// Venues near `location` (a place name or `lat,lng`) using the
    /// deployment's default search parameters
    async fn find_restaurants(&self, location: &str) -> Result<Vec<Venue>, PlacesError>;
}

#[async_trait]
impl RestaurantSource for RestaurantFinder {
    async fn find_restaurants(&self, location: &str) -> Result<Vec<Venue>, PlacesError> {
        let location = Location::parse(location);
        RestaurantFinder::find_restaurants(self, &location, self.defaults()).await
    }
}
