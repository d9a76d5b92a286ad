//! # TutorBook API
//!
//! The web server for TutorBook: a tutor publishes weekly availability,
//! parents book sessions from the tutor's public profile, and the tutor
//! manages sessions, students and payments.
//!
//! ## Architecture
//!
//! - **Routes**: API endpoints and URL structure
//! - **Handlers**: request extraction, validation and response shaping
//! - **Services**: slot lookup and race-free booking confirmation
//! - **Middleware**: bearer-token authentication and error mapping
//! - **Config**: environment configuration
//!
//! Handlers only see the [`SchedulingStore`] and [`Notifier`] traits through
//! [`ApiState`], so the same router runs against Postgres in production and an
//! in-memory store in tests.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

use std::{sync::Arc, time::Duration};

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, Method, StatusCode},
    Json, Router,
};
use eyre::Result;
use serde_json::json;
use tokio::net::TcpListener;
use tower::{BoxError, ServiceBuilder};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, level_filters::LevelFilter, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use tutorbook_db::SchedulingStore;
use tutorbook_mailer::Notifier;

/// Shared application state handed to every handler.
pub struct ApiState {
    pub store: Arc<dyn SchedulingStore>,
    pub notifier: Arc<dyn Notifier>,
    /// Days of bookable dates listed on a public profile.
    pub booking_horizon_days: u32,
}

/// Installs the global tracing subscriber. `RUST_LOG` directives, when set,
/// refine the configured level.
pub fn init_tracing(level: Level) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// All routes with state attached and request tracing applied.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::auth::routes())
        .merge(routes::tutor::routes())
        .merge(routes::availability::routes())
        .merge(routes::sessions::routes())
        .merge(routes::students::routes())
        .merge(routes::payments::routes())
        .merge(routes::booking::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<_> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

async fn handle_timeout(err: BoxError) -> (StatusCode, Json<serde_json::Value>) {
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

/// Serves the API until the process is stopped.
///
/// # Example
///
/// ```ignore
/// let config = ApiConfig::from_env()?;
/// let pool = tutorbook_db::create_pool(&config.database_url, config.database_max_connections).await?;
/// let state = Arc::new(ApiState {
///     store: Arc::new(PgStore::new(pool)),
///     notifier: Arc::new(MailDispatcher::disabled()),
///     booking_horizon_days: config.booking_horizon_days,
/// });
/// start_server(config, state).await?;
/// ```
pub async fn start_server(config: config::ApiConfig, state: Arc<ApiState>) -> Result<()> {
    let app = build_router(state);

    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
