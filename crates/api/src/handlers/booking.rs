//! # Public Booking Handlers
//!
//! Unauthenticated endpoints behind a tutor's public profile page: the
//! profile itself, the slot lookup for a date, and booking confirmation.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tutorbook_core::{
    errors::TutorError,
    models::{
        availability::weekly_summary,
        booking::{
            is_valid_duration, BookingConfirmation, BookingForm, SlotsQuery, SlotsResponse,
            DEFAULT_DURATION_MINUTES,
        },
        tutor::{PublicProfileResponse, Tutor},
    },
    time_format::{format_hhmm, parse_date, DATE_FORMAT},
};
use uuid::Uuid;

use crate::{
    middleware::error_handling::{AppError, BookingJson},
    services::{booking, clock, slots},
    ApiState,
};

async fn active_tutor_by_slug(state: &ApiState, slug: &str) -> Result<Tutor, AppError> {
    let tutor = state
        .store
        .tutor_by_slug(slug.to_string())
        .await?
        .ok_or_else(|| TutorError::NotFound(format!("Tutor profile '{}' not found", slug)))?;
    Ok(tutor)
}

#[axum::debug_handler]
pub async fn public_profile(
    State(state): State<Arc<ApiState>>,
    Path(slug): Path<String>,
) -> Result<Json<PublicProfileResponse>, AppError> {
    let tutor = active_tutor_by_slug(&state, &slug).await?;
    let windows = state.store.list_availability(tutor.id).await?;
    let today = clock::tutor_now(&tutor, Utc::now()).date();

    Ok(Json(PublicProfileResponse {
        id: tutor.id,
        full_name: tutor.full_name,
        bio: tutor.bio,
        subjects: tutor.subjects,
        hourly_rate: tutor.hourly_rate,
        currency: tutor.currency,
        session_durations: tutor.session_durations,
        availability: weekly_summary(&windows),
        dates: clock::upcoming_dates(today, state.booking_horizon_days),
    }))
}

#[axum::debug_handler]
pub async fn get_slots(
    State(state): State<Arc<ApiState>>,
    Path((tutor_id, date)): Path<(Uuid, String)>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    let parsed_date = parse_date(&date).ok_or_else(|| {
        TutorError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", date))
    })?;
    let duration = query.duration.unwrap_or(DEFAULT_DURATION_MINUTES);
    if !is_valid_duration(duration) {
        return Err(TutorError::Validation(format!("Invalid duration: {}", duration)).into());
    }

    let tutor = state
        .store
        .tutor_by_id(tutor_id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| TutorError::NotFound(format!("Tutor with ID {} not found", tutor_id)))?;

    let available = slots::available_slots(state.store.as_ref(), tutor.id, parsed_date, duration).await?;

    Ok(Json(SlotsResponse {
        date: parsed_date.format(DATE_FORMAT).to_string(),
        duration,
        slots: available.into_iter().map(format_hhmm).collect(),
    }))
}

#[axum::debug_handler]
pub async fn confirm_booking(
    State(state): State<Arc<ApiState>>,
    Path(slug): Path<String>,
    BookingJson(form): BookingJson<BookingForm>,
) -> Result<Json<BookingConfirmation>, AppError> {
    let tutor = active_tutor_by_slug(&state, &slug).await?;
    let confirmation =
        booking::confirm_booking(state.store.as_ref(), state.notifier.as_ref(), &tutor, form).await?;
    Ok(Json(confirmation))
}
