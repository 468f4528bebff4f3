//! API request and response types

use crate::places::{Venue, VenueSummary};
use crate::shortlist::ShortlistEntry;
use serde::{Deserialize, Serialize};

pub const NO_RESTAURANTS_MESSAGE: &str = "No nearby restaurants found.";

/// `?user_id=`
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

/// `?user_id=&answer=`
#[derive(Debug, Deserialize)]
pub struct AnswerQuery {
    pub user_id: String,
    pub answer: String,
}

/// `?user_id=&locate=`
#[derive(Debug, Deserialize)]
pub struct RestaurantQuery {
    pub user_id: String,
    pub locate: String,
}

/// `?city=`
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub city: String,
}

#[derive(Debug, Serialize)]
pub struct StartConversationResponse {
    pub message: &'static str,
    pub question: String,
}

impl StartConversationResponse {
    pub fn new(question: String) -> Self {
        Self {
            message: "Conversation started",
            question,
        }
    }
}

/// Either the next question or, on the last answer, the recommendation
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnswerResponse {
    Question {
        message: &'static str,
        next_question: String,
    },
    Completed {
        message: &'static str,
        recommendation: String,
    },
}

impl AnswerResponse {
    pub fn question(next_question: String) -> Self {
        AnswerResponse::Question {
            message: "Question answered",
            next_question,
        }
    }

    pub fn completed(recommendation: String) -> Self {
        AnswerResponse::Completed {
            message: "Conversation completed",
            recommendation,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendation: String,
}

/// Parsed shortlist as sent to clients
#[derive(Debug, Serialize)]
pub struct ShortlistBody {
    pub restaurants: Vec<ShortlistEntry>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RestaurantRecommendationResponse {
    Success {
        recommendation: ShortlistBody,
        /// Model output exactly as returned
        origin_restaurant: String,
        restaurants: Vec<VenueSummary>,
    },
    Error {
        message: &'static str,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchResponse {
    Success { restaurants: Vec<VenueSummary> },
    Error { message: &'static str },
}

impl SearchResponse {
    pub fn from_venues(venues: &[Venue]) -> Self {
        if venues.is_empty() {
            SearchResponse::Error {
                message: NO_RESTAURANTS_MESSAGE,
            }
        } else {
            SearchResponse::Success {
                restaurants: venues.iter().map(VenueSummary::from).collect(),
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub conversations: usize,
}

/// Error body: `{"detail": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            detail: message.into(),
        }
    }
}
