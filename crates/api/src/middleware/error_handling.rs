//! # Error Handling Middleware
//!
//! Maps [`TutorError`] onto HTTP status codes and a JSON body of the form
//! `{"error": "...", "reason": "..."}`. `reason` is only present for booking
//! rejections so clients can branch on it.
//!
//! Store and internal failures are logged here and answered with a generic
//! message. [`BookingJson`] gives an unreadable booking body the same
//! treatment as any other rejected booking form.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tutorbook_core::errors::{BookingRejection, TutorError};

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```ignore
/// async fn handler(State(state): State<Arc<ApiState>>, Path(id): Path<Uuid>)
///     -> Result<Json<Tutor>, AppError>
/// {
///     let tutor = state.store.tutor_by_id(id).await?
///         .ok_or_else(|| TutorError::NotFound(format!("Tutor with ID {} not found", id)))?;
///     Ok(Json(tutor))
/// }
/// ```
#[derive(Debug)]
pub struct AppError(pub TutorError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TutorError::NotFound(_) => StatusCode::NOT_FOUND,
            TutorError::Validation(_) => StatusCode::BAD_REQUEST,
            TutorError::Authentication(_) => StatusCode::UNAUTHORIZED,
            TutorError::Booking(BookingRejection::SlotUnavailable) => StatusCode::CONFLICT,
            TutorError::Booking(_) => StatusCode::BAD_REQUEST,
            TutorError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TutorError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self.0 {
            TutorError::Booking(rejection) => json!({
                "error": rejection.message(),
                "reason": rejection.as_str(),
            }),
            TutorError::Database(err) => {
                tracing::error!("Store failure: {:#}", err);
                json!({ "error": "Internal server error" })
            }
            TutorError::Internal(err) => {
                tracing::error!("Internal failure: {}", err);
                json!({ "error": "Internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<TutorError> for AppError {
    fn from(err: TutorError) -> Self {
        AppError(err)
    }
}

impl From<BookingRejection> for AppError {
    fn from(rejection: BookingRejection) -> Self {
        AppError(TutorError::Booking(rejection))
    }
}

/// Store results surface as `eyre::Report`; treat them as database failures.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(TutorError::Database(err))
    }
}

/// JSON body extractor for the public booking form.
///
/// A body that is not JSON or does not fit the form is answered with a
/// `missing_fields` booking rejection rather than axum's plain-text 422.
#[derive(Debug, Clone)]
pub struct BookingJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for BookingJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(BookingJson(value)),
            Err(rejection) => {
                tracing::debug!("Unreadable booking form: {}", rejection.body_text());
                Err(BookingRejection::MissingFields.into())
            }
        }
    }
}

pub fn map_error(err: TutorError) -> Response {
    AppError(err).into_response()
}
