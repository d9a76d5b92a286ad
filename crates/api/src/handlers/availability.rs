//! # Availability Handlers
//!
//! The tutor edits their weekly schedule as a whole: a PUT replaces every
//! window. Windows with an unknown weekday or an end not after their start
//! are dropped rather than failing the whole edit.

use axum::{extract::State, Json};
use std::sync::Arc;
use tutorbook_core::models::availability::{
    retain_valid, weekly_summary, Availability, AvailabilityResponse, ReplaceAvailabilityRequest,
};

use crate::{
    middleware::{auth::CurrentTutor, error_handling::AppError},
    ApiState,
};

fn response(windows: Vec<Availability>) -> AvailabilityResponse {
    let summary = weekly_summary(&windows);
    AvailabilityResponse { windows, summary }
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    CurrentTutor(tutor): CurrentTutor,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let windows = state.store.list_availability(tutor.id).await?;
    Ok(Json(response(windows)))
}

#[axum::debug_handler]
pub async fn replace_availability(
    State(state): State<Arc<ApiState>>,
    CurrentTutor(tutor): CurrentTutor,
    Json(payload): Json<ReplaceAvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let submitted = payload.windows.len();
    let windows = retain_valid(payload.windows);
    if windows.len() < submitted {
        tracing::debug!(
            "Dropped {} invalid availability windows for tutor {}",
            submitted - windows.len(),
            tutor.id
        );
    }

    let stored = state.store.replace_availability(tutor.id, windows).await?;
    Ok(Json(response(stored)))
}
