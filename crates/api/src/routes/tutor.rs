use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route(
        "/api/tutor/profile",
        get(handlers::tutor::get_profile).put(handlers::tutor::update_profile),
    )
}
