use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/sessions",
            get(handlers::sessions::list_sessions).post(handlers::sessions::create_session),
        )
        .route("/api/sessions/:id", get(handlers::sessions::get_session))
        .route("/api/sessions/:id/actions", post(handlers::sessions::apply_action))
}
