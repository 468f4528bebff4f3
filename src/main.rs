//! Dine - conversational dinner recommendations
//!
//! Asks a short series of questions, turns the answers into a cuisine
//! recommendation and matches it against restaurants near the user.

mod api;
mod config;
mod error;
mod llm;
mod places;
mod prompts;
mod runtime;
mod shortlist;
mod state_machine;

use api::{create_router, AppState};
use config::{AppConfig, GeocoderKind, NOMINATIM_USER_AGENT};
use llm::{LlmService, LoggingService, OpenAIService};
use places::{Geocoder, GoogleMapsClient, NominatimGeocoder, RestaurantFinder};
use runtime::Orchestrator;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; real deployments set the environment directly
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dine=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env()?;

    // Text generation
    let openai: Arc<dyn LlmService> = Arc::new(OpenAIService::new(&config.llm, config.http_timeout)?);
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(openai));
    tracing::info!(model = %llm.model_id(), "Text generation configured");

    // Restaurant lookup
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;
    let google = Arc::new(GoogleMapsClient::new(
        http.clone(),
        config.places.google_api_key.clone(),
    ));
    let geocoder: Arc<dyn Geocoder> = match config.places.geocoder {
        GeocoderKind::Nominatim => Arc::new(NominatimGeocoder::new(http, NOMINATIM_USER_AGENT)),
        GeocoderKind::Google => google.clone(),
    };
    tracing::info!(
        geocoder = ?config.places.geocoder,
        radius_m = config.search.radius_m,
        min_rating = config.search.min_rating,
        open_now = config.search.open_now,
        "Restaurant search configured"
    );
    let finder = Arc::new(RestaurantFinder::new(geocoder, google, config.search));

    // Conversations
    let orchestrator = Arc::new(Orchestrator::new(llm, finder, config.conversation));
    if let Some(ttl) = config.conversation.idle_ttl {
        let interval = (ttl / 2).max(MIN_SWEEP_INTERVAL);
        orchestrator.spawn_eviction_task(interval);
        tracing::info!(ttl_secs = ttl.as_secs(), "Idle conversation eviction enabled");
    }

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new().gzip(true).br(true);

    let app = create_router(AppState::new(orchestrator))
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Dine server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
