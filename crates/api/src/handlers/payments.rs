use axum::{extract::State, Json};
use std::sync::Arc;
use tutorbook_core::{models::session::SessionFilter, payments::PaymentsOverview};

use crate::{
    middleware::{auth::CurrentTutor, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler]
pub async fn payments_overview(
    State(state): State<Arc<ApiState>>,
    CurrentTutor(tutor): CurrentTutor,
) -> Result<Json<PaymentsOverview>, AppError> {
    let sessions = state.store.list_sessions(tutor.id, SessionFilter::All).await?;
    let students = state.store.list_active_students(tutor.id).await?;
    Ok(Json(PaymentsOverview::build(&sessions, &students)))
}
