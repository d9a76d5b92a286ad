use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a public booking confirmation can be turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingRejection {
    MissingFields,
    InvalidDatetime,
    InvalidDuration,
    SlotUnavailable,
}

impl BookingRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingRejection::MissingFields => "missing_fields",
            BookingRejection::InvalidDatetime => "invalid_datetime",
            BookingRejection::InvalidDuration => "invalid_duration",
            BookingRejection::SlotUnavailable => "slot_unavailable",
        }
    }

    /// User-facing explanation shown next to the reason code.
    pub fn message(&self) -> &'static str {
        match self {
            BookingRejection::MissingFields => "Please fill in all required fields.",
            BookingRejection::InvalidDatetime => "Invalid date or time selected.",
            BookingRejection::InvalidDuration => "Invalid session duration.",
            BookingRejection::SlotUnavailable => {
                "Sorry, that time slot is no longer available. Please pick another."
            }
        }
    }
}

impl fmt::Display for BookingRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum TutorError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Booking rejected: {}", .0.message())]
    Booking(BookingRejection),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl From<BookingRejection> for TutorError {
    fn from(rejection: BookingRejection) -> Self {
        TutorError::Booking(rejection)
    }
}

pub type TutorResult<T> = Result<T, TutorError>;
