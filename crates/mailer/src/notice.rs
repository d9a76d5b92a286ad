use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tutorbook_core::models::session::SessionType;

/// Everything the booking e-mails need, captured once the session is committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingNotice {
    pub tutor_name: String,
    pub tutor_email: String,
    pub student_name: String,
    /// Empty when the booker left no address; the confirmation is then skipped.
    pub student_email: String,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub session_type: SessionType,
    pub subject: String,
    pub meeting_link: String,
}

/// Fire-and-forget sink for booking notices. Never blocks and never fails.
pub trait Notifier: Send + Sync {
    fn notify_booking(&self, notice: BookingNotice);
}
