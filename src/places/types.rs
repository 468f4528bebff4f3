//! Place search types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Address shown when the backend has no vicinity for a place
pub const UNKNOWN_ADDRESS: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Returns `None` when either value is out of range or not finite.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Where to search: a free-form place name or an explicit coordinate pair
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Place(String),
    Coordinates(Coordinates),
}

impl Location {
    /// `"42.36,-71.06"` becomes coordinates; anything else is a place name.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if let Some((lat, lng)) = trimmed.split_once(',') {
            if let (Ok(lat), Ok(lng)) = (lat.trim().parse(), lng.trim().parse()) {
                if let Some(coords) = Coordinates::new(lat, lng) {
                    return Self::Coordinates(coords);
                }
            }
        }
        Self::Place(trimmed.to_string())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Place(name) => f.write_str(name),
            Self::Coordinates(coords) => coords.fmt(f),
        }
    }
}

/// A nearby-search request against the places backend
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub coordinates: Coordinates,
    pub radius_m: u32,
    pub place_type: &'static str,
    pub open_now: bool,
}

/// A result as the places backend returns it; every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPlace {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
}

/// A normalized restaurant record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Venue {
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub total_ratings: u32,
    pub open_now: Option<bool>,
}

/// The name and address pair clients and prompts see
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueSummary {
    pub name: String,
    pub address: String,
}

impl From<&Venue> for VenueSummary {
    fn from(venue: &Venue) -> Self {
        Self {
            name: venue.name.clone(),
            address: venue.address.clone(),
        }
    }
}
