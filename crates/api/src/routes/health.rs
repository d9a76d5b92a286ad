use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::ApiState;

#[derive(Debug, Serialize)]
struct ServiceStatus {
    service: &'static str,
    status: &'static str,
    version: &'static str,
}

const STATUS: ServiceStatus = ServiceStatus {
    service: env!("CARGO_PKG_NAME"),
    status: "ok",
    version: env!("CARGO_PKG_VERSION"),
};

async fn liveness() -> Json<ServiceStatus> {
    Json(STATUS)
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "version": STATUS.version }))
}

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/health", get(liveness))
        .route("/version", get(version))
}
