//! HTTP request handlers

use super::types::{
    AnswerQuery, AnswerResponse, ErrorResponse, HealthResponse, MessageResponse,
    RecommendationResponse, RestaurantQuery, RestaurantRecommendationResponse, SearchQuery,
    SearchResponse, ShortlistBody, StartConversationResponse, UserQuery, NO_RESTAURANTS_MESSAGE,
};
use super::AppState;
use crate::places::{PlacesError, VenueSummary};
use crate::runtime::{AnswerOutcome, ConversationError, ConversationSnapshot, RestaurantOutcome};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let routes = [
        // Conversation flow
        ("/start_conversation", post(start_conversation)),
        ("/answer_question", post(answer_question)),
        ("/get_recommendation", get(get_recommendation)),
        (
            "/get_recommendation_restaurant",
            get(get_recommendation_restaurant),
        ),
        // Stateless search
        ("/search_restaurants", get(search_restaurants)),
        // Lifecycle
        ("/reset_conversation", post(reset_conversation)),
        ("/conversation", get(get_conversation)),
    ];

    routes
        .into_iter()
        .fold(Router::new(), with_trailing_slash)
        .route("/health", get(health))
        .route("/version", get(get_version))
        .with_state(state)
}

/// Existing clients call the conversation routes with a trailing slash
fn with_trailing_slash(
    router: Router<AppState>,
    (path, handler): (&'static str, MethodRouter<AppState>),
) -> Router<AppState> {
    router
        .route(path, handler.clone())
        .route(&format!("{path}/"), handler)
}

// ============================================================
// Conversation Flow
// ============================================================

async fn start_conversation(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<StartConversationResponse>, AppError> {
    let question = state.orchestrator.start(&query.user_id).await?;
    Ok(Json(StartConversationResponse::new(question)))
}

async fn answer_question(
    State(state): State<AppState>,
    Query(query): Query<AnswerQuery>,
) -> Result<Json<AnswerResponse>, AppError> {
    let outcome = state
        .orchestrator
        .answer(&query.user_id, &query.answer)
        .await?;

    Ok(Json(match outcome {
        AnswerOutcome::NextQuestion(question) => AnswerResponse::question(question),
        AnswerOutcome::Recommendation(recommendation) => AnswerResponse::completed(recommendation),
    }))
}

async fn get_recommendation(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let recommendation = state.orchestrator.get_recommendation(&query.user_id).await?;
    Ok(Json(RecommendationResponse { recommendation }))
}

async fn get_recommendation_restaurant(
    State(state): State<AppState>,
    Query(query): Query<RestaurantQuery>,
) -> Result<Json<RestaurantRecommendationResponse>, AppError> {
    let outcome = state
        .orchestrator
        .get_recommendation_restaurants(&query.user_id, &query.locate)
        .await?;

    Ok(Json(match outcome {
        RestaurantOutcome::NoVenues => RestaurantRecommendationResponse::Error {
            message: NO_RESTAURANTS_MESSAGE,
        },
        RestaurantOutcome::Found {
            shortlist,
            raw_output,
            venues,
        } => RestaurantRecommendationResponse::Success {
            recommendation: ShortlistBody {
                restaurants: shortlist,
            },
            origin_restaurant: raw_output,
            restaurants: venues.iter().map(VenueSummary::from).collect(),
        },
    }))
}

// ============================================================
// Stateless Search
// ============================================================

async fn search_restaurants(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let venues = state.orchestrator.search_restaurants(&query.city).await?;
    Ok(Json(SearchResponse::from_venues(&venues)))
}

// ============================================================
// Lifecycle
// ============================================================

async fn reset_conversation(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    state.orchestrator.reset(&query.user_id).await?;
    Ok(Json(MessageResponse {
        message: "Conversation reset",
    }))
}

async fn get_conversation(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ConversationSnapshot>, AppError> {
    Ok(Json(state.orchestrator.snapshot(&query.user_id).await?))
}

// ============================================================
// Health & Version
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        conversations: state.orchestrator.conversation_count().await,
    })
}

async fn get_version() -> &'static str {
    concat!("dine ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
pub(crate) enum AppError {
    BadRequest(String),
    NotFound(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl From<ConversationError> for AppError {
    fn from(e: ConversationError) -> Self {
        match e {
            ConversationError::NotFound => AppError::NotFound(e.to_string()),
            ConversationError::AlreadyExists
            | ConversationError::NotReady
            | ConversationError::AlreadyComplete => AppError::BadRequest(e.to_string()),
            ConversationError::Llm(ref inner) => {
                tracing::error!(error = %inner, kind = ?inner.kind, "Text generation unavailable");
                AppError::ServiceUnavailable(e.to_string())
            }
            ConversationError::Places(inner) => inner.into(),
            ConversationError::Transition(ref inner) => {
                tracing::error!(error = %inner, "State machine rejected a transition");
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<PlacesError> for AppError {
    fn from(e: PlacesError) -> Self {
        if e.is_client_error() {
            AppError::BadRequest(e.to_string())
        } else {
            tracing::error!(error = %e, kind = ?e.kind, "Restaurant lookup unavailable");
            AppError::ServiceUnavailable(format!("Restaurant lookup failed: {e}"))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
