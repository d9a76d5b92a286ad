use axum::{extract::State, http::StatusCode, Json};
use chrono_tz::Tz;
use std::sync::Arc;
use tutorbook_core::{
    errors::TutorError,
    models::tutor::{
        LoginRequest, LoginResponse, NewTutor, RegisterTutorRequest, Tutor, DEFAULT_TIMEZONE,
    },
};

use crate::{
    middleware::{auth, error_handling::AppError},
    ApiState,
};

const MIN_PASSWORD_LENGTH: usize = 8;

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn validate_registration(payload: RegisterTutorRequest) -> Result<(NewTutor, String), TutorError> {
    let email = payload.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(TutorError::Validation("A valid email is required".to_string()));
    }
    if payload.password.len() < MIN_PASSWORD_LENGTH {
        return Err(TutorError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    let full_name = payload.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(TutorError::Validation("Full name is required".to_string()));
    }
    let profile_slug = payload.profile_slug.trim().to_lowercase();
    if !is_valid_slug(&profile_slug) {
        return Err(TutorError::Validation(
            "Profile slug may only contain lowercase letters, digits and dashes".to_string(),
        ));
    }
    if !payload.hourly_rate.is_finite() || payload.hourly_rate < 0.0 {
        return Err(TutorError::Validation("Hourly rate cannot be negative".to_string()));
    }
    let timezone = payload
        .timezone
        .map(|tz| tz.trim().to_string())
        .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
    if timezone.parse::<Tz>().is_err() {
        return Err(TutorError::Validation(format!("Unknown timezone: {}", timezone)));
    }

    Ok((
        NewTutor {
            email,
            full_name,
            profile_slug,
            hourly_rate: payload.hourly_rate,
            timezone,
        },
        payload.password,
    ))
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RegisterTutorRequest>,
) -> Result<(StatusCode, Json<Tutor>), AppError> {
    let (new_tutor, password) = validate_registration(payload)?;
    let password_hash = auth::hash_password(&password)?;

    let tutor = state
        .store
        .create_tutor(new_tutor, password_hash)
        .await?
        .ok_or_else(|| {
            TutorError::Validation("Email or profile slug is already registered".to_string())
        })?;

    tracing::info!("Registered tutor {} ({})", tutor.id, tutor.profile_slug);
    Ok((StatusCode::CREATED, Json(tutor)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let invalid = || TutorError::Authentication("Invalid email or password".to_string());

    let (tutor, password_hash) = state
        .store
        .tutor_credentials(payload.email.trim().to_string())
        .await?
        .ok_or_else(invalid)?;

    if !tutor.is_active || !auth::verify_password(&password_hash, &payload.password)? {
        return Err(invalid().into());
    }

    let token = auth::generate_api_token();
    state.store.set_api_token(tutor.id, token.clone()).await?;

    Ok(Json(LoginResponse { token, tutor }))
}
