use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tutorbook_core::{
    errors::TutorError,
    models::student::{Student, StudentDetailResponse, StudentInput},
};
use uuid::Uuid;

use crate::{
    middleware::{auth::CurrentTutor, error_handling::AppError},
    ApiState,
};

fn not_found(id: Uuid) -> TutorError {
    TutorError::NotFound(format!("Student with ID {} not found", id))
}

#[axum::debug_handler]
pub async fn list_students(
    State(state): State<Arc<ApiState>>,
    CurrentTutor(tutor): CurrentTutor,
) -> Result<Json<Vec<Student>>, AppError> {
    Ok(Json(state.store.list_active_students(tutor.id).await?))
}

#[axum::debug_handler]
pub async fn create_student(
    State(state): State<Arc<ApiState>>,
    CurrentTutor(tutor): CurrentTutor,
    Json(payload): Json<StudentInput>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let input = payload.validated()?;
    let student = state.store.create_student(tutor.id, input).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

#[axum::debug_handler]
pub async fn get_student(
    State(state): State<Arc<ApiState>>,
    CurrentTutor(tutor): CurrentTutor,
    Path(id): Path<Uuid>,
) -> Result<Json<StudentDetailResponse>, AppError> {
    let student = state
        .store
        .get_student(tutor.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let sessions = state.store.sessions_for_student(tutor.id, id).await?;

    Ok(Json(StudentDetailResponse { student, sessions }))
}

#[axum::debug_handler]
pub async fn update_student(
    State(state): State<Arc<ApiState>>,
    CurrentTutor(tutor): CurrentTutor,
    Path(id): Path<Uuid>,
    Json(payload): Json<StudentInput>,
) -> Result<Json<Student>, AppError> {
    let input = payload.validated()?;
    let student = state
        .store
        .update_student(tutor.id, id, input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(student))
}

/// Soft delete: the student disappears from lists and booking matches, but
/// their past sessions keep the link.
#[axum::debug_handler]
pub async fn delete_student(
    State(state): State<Arc<ApiState>>,
    CurrentTutor(tutor): CurrentTutor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.deactivate_student(tutor.id, id).await? {
        return Err(not_found(id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
