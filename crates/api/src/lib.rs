//! # MeetGrid API
//!
//! HTTP server for the MeetGrid availability poll: accounts and sessions,
//! meetings addressed by share link, availability submissions and the
//! aggregated availability grid.
//!
//! ## Architecture
//!
//! - **Routes**: API endpoints and URL structure
//! - **Handlers**: Request processing on top of the core crate's validation,
//!   access rules and aggregator
//! - **Middleware**: Session extraction and error mapping
//! - **Config**: Environment configuration
//!
//! Handlers reach storage only through the [`Store`] trait, so the router
//! can be exercised against `meetgrid_db::mock::MockStore`.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    BoxError, Json, Router,
};
use eyre::Result;
use meetgrid_db::store::Store;
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use meetgrid_api::{build_router, ApiState};
/// use meetgrid_db::store::PgStore;
///
/// # fn example(pool: meetgrid_db::DbPool) {
/// let state = Arc::new(ApiState {
///     store: Box::new(PgStore::new(pool)),
///     session_ttl: chrono::Duration::hours(720),
/// });
/// let app = build_router(state);
/// # }
/// ```
pub struct ApiState {
    /// Persistence for users, sessions, meetings and responses
    pub store: Box<dyn Store>,
    /// Lifetime of sessions issued at login
    pub session_ttl: chrono::Duration,
}

/// All routes with state attached, without transport layers.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::auth::routes())
        .merge(routes::meetings::routes())
        .with_state(state)
}

async fn handle_timeout_error(err: BoxError) -> impl IntoResponse {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out" })),
        )
    } else {
        tracing::error!("Unhandled middleware error: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error" })),
        )
    }
}

/// Starts the API server with the provided configuration and store
///
/// Installs the tracing subscriber, applies CORS, the request timeout and
/// request tracing, then serves until the listener fails.
pub async fn start_server(config: config::ApiConfig, store: Box<dyn Store>) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState {
        store,
        session_ttl: config.session_ttl(),
    });

    let app = build_router(state);

    let app = if let Some(origins) = &config.cors_origins {
        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
            ])
            .allow_origin(origins.clone())
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    let app = app
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .timeout(Duration::from_secs(config.request_timeout)),
        )
        .layer(TraceLayer::new_for_http());

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
