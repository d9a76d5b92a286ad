//! # Session Handlers
//!
//! Tutor-side session management. Sessions added here skip the slot check a
//! public booking goes through, but still cannot share a start time with a
//! live session.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tutorbook_core::{
    errors::{BookingRejection, TutorError},
    models::{
        booking::{is_valid_duration, DEFAULT_DURATION_MINUTES},
        session::{
            rate_for, Attendee, CreateSessionRequest, NewSession, Session, SessionAction,
            SessionFilter, SessionListQuery, SessionType,
        },
        tutor::Tutor,
    },
    time_format::{parse_date, parse_hhmm},
};
use tutorbook_db::InsertOutcome;
use uuid::Uuid;

use crate::{
    middleware::{auth::CurrentTutor, error_handling::AppError},
    services::clock,
    ApiState,
};

fn session_filter(view: Option<&str>, tutor: &Tutor) -> Result<SessionFilter, TutorError> {
    let now = clock::tutor_now(tutor, Utc::now());
    match view.unwrap_or("upcoming") {
        "upcoming" => Ok(SessionFilter::Upcoming { now }),
        "past" => Ok(SessionFilter::Past { now }),
        "all" => Ok(SessionFilter::All),
        other => Err(TutorError::Validation(format!(
            "Unknown view '{}', expected upcoming, past or all",
            other
        ))),
    }
}

#[axum::debug_handler]
pub async fn list_sessions(
    State(state): State<Arc<ApiState>>,
    CurrentTutor(tutor): CurrentTutor,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<Vec<Session>>, AppError> {
    let filter = session_filter(query.view.as_deref(), &tutor)?;
    let sessions = state.store.list_sessions(tutor.id, filter).await?;
    Ok(Json(sessions))
}

#[axum::debug_handler]
pub async fn create_session(
    State(state): State<Arc<ApiState>>,
    CurrentTutor(tutor): CurrentTutor,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let student_id = payload
        .student_id
        .ok_or_else(|| TutorError::Validation("A student is required".to_string()))?;
    let student = state
        .store
        .get_student(tutor.id, student_id)
        .await?
        .filter(|s| s.is_active)
        .ok_or_else(|| TutorError::NotFound(format!("Student with ID {} not found", student_id)))?;

    let date = parse_date(&payload.date)
        .ok_or_else(|| TutorError::Validation(format!("Invalid date '{}'", payload.date)))?;
    let time = parse_hhmm(&payload.time)
        .ok_or_else(|| TutorError::Validation(format!("Invalid time '{}'", payload.time)))?;
    let duration = payload.duration.unwrap_or(DEFAULT_DURATION_MINUTES);
    if !is_valid_duration(duration) {
        return Err(TutorError::Validation(format!("Invalid duration: {}", duration)).into());
    }

    let (meeting_link, location) = match payload.session_type {
        SessionType::Online if payload.meeting_link.trim().is_empty() => {
            (tutor.default_meeting_link.clone(), String::new())
        }
        SessionType::Online => (payload.meeting_link.trim().to_string(), String::new()),
        SessionType::InPerson if payload.location.trim().is_empty() => {
            (String::new(), tutor.address.clone())
        }
        SessionType::InPerson => (String::new(), payload.location.trim().to_string()),
    };

    let new_session = NewSession {
        tutor_id: tutor.id,
        attendee: Attendee::Student {
            student_id: student.id,
        },
        scheduled_at: date.and_time(time),
        duration_minutes: duration,
        session_type: payload.session_type,
        meeting_link,
        location,
        rate_charged: rate_for(tutor.hourly_rate, duration),
    };

    match state.store.create_session(new_session).await? {
        InsertOutcome::Created(session) => Ok((StatusCode::CREATED, Json(session))),
        InsertOutcome::SlotTaken => Err(BookingRejection::SlotUnavailable.into()),
    }
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<Arc<ApiState>>,
    CurrentTutor(tutor): CurrentTutor,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    let session = state
        .store
        .get_session(tutor.id, id)
        .await?
        .ok_or_else(|| TutorError::NotFound(format!("Session with ID {} not found", id)))?;
    Ok(Json(session))
}

#[axum::debug_handler]
pub async fn apply_action(
    State(state): State<Arc<ApiState>>,
    CurrentTutor(tutor): CurrentTutor,
    Path(id): Path<Uuid>,
    Json(action): Json<SessionAction>,
) -> Result<Json<Session>, AppError> {
    let not_found = || TutorError::NotFound(format!("Session with ID {} not found", id));

    let mut session = state
        .store
        .get_session(tutor.id, id)
        .await?
        .ok_or_else(not_found)?;

    session.apply(action, Utc::now())?;

    let saved = state
        .store
        .update_session(session)
        .await?
        .ok_or_else(not_found)?;

    tracing::debug!("Session {} is now {}", saved.id, saved.status);
    Ok(Json(saved))
}
