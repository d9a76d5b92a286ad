use axum::{extract::State, Json};
use chrono_tz::Tz;
use std::sync::Arc;
use tutorbook_core::{
    errors::TutorError,
    models::{
        booking::is_valid_duration,
        tutor::{Tutor, TutorProfileUpdate},
    },
};

use crate::{
    middleware::{auth::CurrentTutor, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_profile(CurrentTutor(tutor): CurrentTutor) -> Json<Tutor> {
    Json(tutor)
}

/// Applies the update to a copy and validates the result before storing it.
fn updated_profile(mut tutor: Tutor, update: TutorProfileUpdate) -> Result<Tutor, TutorError> {
    update.apply_to(&mut tutor);

    if tutor.full_name.is_empty() {
        return Err(TutorError::Validation("Full name is required".to_string()));
    }
    if !tutor.hourly_rate.is_finite() || tutor.hourly_rate < 0.0 {
        return Err(TutorError::Validation("Hourly rate cannot be negative".to_string()));
    }
    if tutor.timezone.parse::<Tz>().is_err() {
        return Err(TutorError::Validation(format!("Unknown timezone: {}", tutor.timezone)));
    }
    if tutor.session_durations.is_empty()
        || !tutor.session_durations.iter().all(|d| is_valid_duration(*d))
    {
        return Err(TutorError::Validation(
            "Session durations must be between 1 and 720 minutes".to_string(),
        ));
    }

    Ok(tutor)
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<ApiState>>,
    CurrentTutor(tutor): CurrentTutor,
    Json(payload): Json<TutorProfileUpdate>,
) -> Result<Json<Tutor>, AppError> {
    let updated = updated_profile(tutor, payload)?;
    let saved = state.store.update_tutor_profile(updated).await?;
    Ok(Json(saved))
}
