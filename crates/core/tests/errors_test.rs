use std::error::Error;
use tutorbook_core::errors::{BookingRejection, TutorError, TutorResult};

#[test]
fn test_tutor_error_display() {
    let not_found = TutorError::NotFound("Tutor not found".to_string());
    let validation = TutorError::Validation("Invalid input".to_string());
    let authentication = TutorError::Authentication("Invalid token".to_string());
    let database = TutorError::Database(eyre::eyre!("Database connection failed"));
    let internal = TutorError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )));

    assert_eq!(not_found.to_string(), "Resource not found: Tutor not found");
    assert_eq!(validation.to_string(), "Validation error: Invalid input");
    assert_eq!(
        authentication.to_string(),
        "Authentication error: Invalid token"
    );
    assert!(database.to_string().contains("Database error:"));
    assert!(internal.to_string().contains("Internal server error:"));
}

#[test]
fn test_booking_rejection_display() {
    let err: TutorError = BookingRejection::SlotUnavailable.into();
    assert_eq!(
        err.to_string(),
        "Booking rejected: Sorry, that time slot is no longer available. Please pick another."
    );
    assert_eq!(BookingRejection::MissingFields.to_string(), "missing_fields");
    assert_eq!(BookingRejection::InvalidDatetime.as_str(), "invalid_datetime");
}

#[test]
fn test_booking_rejection_serializes_as_reason_code() {
    let json = serde_json::to_string(&BookingRejection::SlotUnavailable).unwrap();
    assert_eq!(json, "\"slot_unavailable\"");
}

#[test]
fn test_error_source() {
    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "IO error");
    let tutor_error = TutorError::Internal(Box::new(io_error));

    assert!(tutor_error.source().is_some());
    assert!(tutor_error.to_string().contains("IO error"));
}

#[test]
fn test_tutor_result() {
    let result: TutorResult<i32> = Ok(42);
    assert_eq!(result.unwrap(), 42);

    let result: TutorResult<i32> = Err(TutorError::NotFound("Not found".to_string()));
    assert!(result.is_err());
}
