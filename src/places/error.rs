//! Places error types

use crate::error::ServiceError;

pub type PlacesError = ServiceError<PlacesErrorKind>;

impl PlacesError {
    pub fn geocode(location: &str) -> Self {
        Self::new(
            PlacesErrorKind::GeocodeFailure,
            format!("Unable to resolve coordinates for '{location}'"),
        )
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PlacesErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(PlacesErrorKind::Auth, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(PlacesErrorKind::RateLimit, message)
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(PlacesErrorKind::Backend, message)
    }

    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::network(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            Self::network(format!("Connection failed: {e}"))
        } else {
            Self::backend(format!("Request failed: {e}"))
        }
    }

    /// The caller supplied something we could not resolve, as opposed to a
    /// backend being unavailable.
    pub fn is_client_error(&self) -> bool {
        self.kind == PlacesErrorKind::GeocodeFailure
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacesErrorKind {
    /// Place name matched nothing
    GeocodeFailure,
    Network,
    Auth,
    RateLimit,
    /// Any other non-success status or unparseable payload
    Backend,
}
