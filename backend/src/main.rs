mod config;
mod error;
mod handlers;
mod responses;
mod routes;
mod state;

use anyhow::{anyhow, Context, Result};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transcripts::{TranscriptService, TranscriptsConfig};

use crate::config::AppConfig;
use crate::routes::api_routes;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install crypto provider"))?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transcripts=info,backend=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let transcripts_config = TranscriptsConfig::load_or_default(config.config_path.as_deref())
        .context("Failed to load transcript settings")?;

    tracing::info!("Starting meeting transcripts backend server");

    // Authorize against Google
    let session = transcripts::google::connect(&transcripts_config)
        .await
        .context("Failed to connect to Google")?;
    tracing::info!("Google session established");

    let service = TranscriptService::new(session, transcripts_config);

    // Build application
    let app = create_app(AppState::new(service));

    // Run server
    let addr = SocketAddr::new(config.bind_address, config.port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
