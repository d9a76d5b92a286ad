use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{TutorError, TutorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::NoShow => "no_show",
        }
    }

    /// Status only moves forward out of `scheduled`; every other status is terminal.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (
                SessionStatus::Scheduled,
                SessionStatus::Completed | SessionStatus::Cancelled | SessionStatus::NoShow
            )
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(SessionStatus::Scheduled),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            "no_show" => Ok(SessionStatus::NoShow),
            other => Err(TutorError::Validation(format!("Unknown session status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    #[default]
    Online,
    InPerson,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Online => "online",
            SessionType::InPerson => "in_person",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Online => "Online",
            SessionType::InPerson => "In-Person",
        }
    }
}

impl FromStr for SessionType {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(SessionType::Online),
            "in_person" => Ok(SessionType::InPerson),
            other => Err(TutorError::Validation(format!("Unknown session type: {other}"))),
        }
    }
}

/// Contact details carried on a session booked by someone who is not a known student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
}

/// Who a session is with: a student on file, or a guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attendee {
    Student { student_id: Uuid },
    Guest(GuestContact),
}

impl Attendee {
    pub fn student_id(&self) -> Option<Uuid> {
        match self {
            Attendee::Student { student_id } => Some(*student_id),
            Attendee::Guest(_) => None,
        }
    }

    pub fn guest(&self) -> Option<&GuestContact> {
        match self {
            Attendee::Student { .. } => None,
            Attendee::Guest(contact) => Some(contact),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub tutor_id: Uuid,
    pub attendee: Attendee,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub session_type: SessionType,
    pub meeting_link: String,
    pub location: String,
    pub rate_charged: f64,
    pub status: SessionStatus,
    pub notes: String,
    pub homework: String,
    pub progress_rating: Option<i16>,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn ends_at(&self) -> NaiveDateTime {
        self.scheduled_at + Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn date(&self) -> NaiveDate {
        self.scheduled_at.date()
    }

    /// Applies a tutor action, enforcing the status state machine.
    pub fn apply(&mut self, action: SessionAction, now: DateTime<Utc>) -> TutorResult<()> {
        match action {
            SessionAction::Complete { notes, homework, progress_rating } => {
                self.transition(SessionStatus::Completed)?;
                self.completed_at = Some(now);
                self.set_notes(notes, homework, progress_rating)?;
            }
            SessionAction::Cancel => self.transition(SessionStatus::Cancelled)?,
            SessionAction::NoShow => self.transition(SessionStatus::NoShow)?,
            SessionAction::UpdateNotes { notes, homework, progress_rating } => {
                self.set_notes(notes, homework, progress_rating)?;
            }
            SessionAction::MarkPaid => {
                if self.status == SessionStatus::Cancelled {
                    return Err(TutorError::Validation(
                        "Cancelled sessions cannot be marked as paid".to_string(),
                    ));
                }
                self.is_paid = true;
                self.paid_at = Some(now);
            }
            SessionAction::MarkUnpaid => {
                self.is_paid = false;
                self.paid_at = None;
            }
        }
        Ok(())
    }

    fn transition(&mut self, next: SessionStatus) -> TutorResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(TutorError::Validation(format!(
                "Cannot move a {} session to {}",
                self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    fn set_notes(
        &mut self,
        notes: Option<String>,
        homework: Option<String>,
        progress_rating: Option<i16>,
    ) -> TutorResult<()> {
        if let Some(rating) = progress_rating {
            if !(1..=5).contains(&rating) {
                return Err(TutorError::Validation(
                    "Progress rating must be between 1 and 5".to_string(),
                ));
            }
        }
        self.notes = notes.unwrap_or_default().trim().to_string();
        self.homework = homework.unwrap_or_default().trim().to_string();
        self.progress_rating = progress_rating;
        Ok(())
    }
}

/// Charge for a session, frozen at creation: hourly rate × duration / 60, in cents precision.
pub fn rate_for(hourly_rate: f64, duration_minutes: i32) -> f64 {
    let raw = hourly_rate * f64::from(duration_minutes) / 60.0;
    (raw * 100.0).round() / 100.0
}

/// A session about to be inserted; status starts at `scheduled`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub tutor_id: Uuid,
    pub attendee: Attendee,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub session_type: SessionType,
    pub meeting_link: String,
    pub location: String,
    pub rate_charged: f64,
}

impl NewSession {
    pub fn into_session(self, id: Uuid, created_at: DateTime<Utc>) -> Session {
        Session {
            id,
            tutor_id: self.tutor_id,
            attendee: self.attendee,
            scheduled_at: self.scheduled_at,
            duration_minutes: self.duration_minutes,
            session_type: self.session_type,
            meeting_link: self.meeting_link,
            location: self.location,
            rate_charged: self.rate_charged,
            status: SessionStatus::Scheduled,
            notes: String::new(),
            homework: String::new(),
            progress_rating: None,
            is_paid: false,
            paid_at: None,
            created_at,
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionAction {
    Complete {
        notes: Option<String>,
        homework: Option<String>,
        progress_rating: Option<i16>,
    },
    Cancel,
    NoShow,
    UpdateNotes {
        notes: Option<String>,
        homework: Option<String>,
        progress_rating: Option<i16>,
    },
    MarkPaid,
    MarkUnpaid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFilter {
    /// Not cancelled, starting at or after `now`, soonest first.
    Upcoming { now: NaiveDateTime },
    /// Started before `now`, most recent first, capped at [`PAST_SESSIONS_LIMIT`].
    Past { now: NaiveDateTime },
    All,
}

pub const PAST_SESSIONS_LIMIT: usize = 50;

/// Tutor-entered session. Unlike public bookings this is not checked against availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub student_id: Option<Uuid>,
    pub date: String,
    pub time: String,
    pub duration: Option<i32>,
    #[serde(default)]
    pub session_type: SessionType,
    #[serde(default)]
    pub meeting_link: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionListQuery {
    pub view: Option<String>,
}
