use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

/// Public, unauthenticated routes.
pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/book/:slug", get(handlers::booking::public_profile))
        .route("/api/book/:slug/confirm", post(handlers::booking::confirm_booking))
        .route("/api/slots/:tutor_id/:date", get(handlers::booking::get_slots))
}
