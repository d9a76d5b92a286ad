use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorbook_core::models::{
    availability::Availability,
    session::{Attendee, GuestContact, Session},
    student::Student,
    tutor::Tutor,
};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTutor {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub bio: String,
    pub subjects: Vec<String>,
    pub hourly_rate: f64,
    pub currency: String,
    pub timezone: String,
    pub phone: String,
    pub address: String,
    pub profile_slug: String,
    pub session_durations: Vec<i32>,
    pub default_meeting_link: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbTutor> for Tutor {
    fn from(row: DbTutor) -> Self {
        Tutor {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            bio: row.bio,
            subjects: row.subjects,
            hourly_rate: row.hourly_rate,
            currency: row.currency,
            timezone: row.timezone,
            phone: row.phone,
            address: row.address,
            profile_slug: row.profile_slug,
            session_durations: row.session_durations,
            default_meeting_link: row.default_meeting_link,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStudent {
    pub id: Uuid,
    pub tutor_id: Uuid,
    pub name: String,
    pub parent_name: String,
    pub parent_email: String,
    pub parent_phone: String,
    pub grade_level: String,
    pub subject: String,
    pub notes: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbStudent> for Student {
    fn from(row: DbStudent) -> Self {
        Student {
            id: row.id,
            tutor_id: row.tutor_id,
            name: row.name,
            parent_name: row.parent_name,
            parent_email: row.parent_email,
            parent_phone: row.parent_phone,
            grade_level: row.grade_level,
            subject: row.subject,
            notes: row.notes,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAvailability {
    pub id: Uuid,
    pub tutor_id: Uuid,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
}

impl From<DbAvailability> for Availability {
    fn from(row: DbAvailability) -> Self {
        Availability {
            id: row.id,
            tutor_id: row.tutor_id,
            day_of_week: row.day_of_week,
            start_time: row.start_time,
            end_time: row.end_time,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub id: Uuid,
    pub tutor_id: Uuid,
    pub student_id: Option<Uuid>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_subject: Option<String>,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub session_type: String,
    pub meeting_link: String,
    pub location: String,
    pub rate_charged: f64,
    pub status: String,
    pub notes: String,
    pub homework: String,
    pub progress_rating: Option<i16>,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<DbSession> for Session {
    type Error = eyre::Report;

    fn try_from(row: DbSession) -> Result<Self> {
        let attendee = match row.student_id {
            Some(student_id) => Attendee::Student { student_id },
            None => Attendee::Guest(GuestContact {
                name: row.guest_name.unwrap_or_default(),
                email: row.guest_email.unwrap_or_default(),
                phone: row.guest_phone.unwrap_or_default(),
                subject: row.guest_subject.unwrap_or_default(),
            }),
        };

        Ok(Session {
            id: row.id,
            tutor_id: row.tutor_id,
            attendee,
            scheduled_at: row.scheduled_at,
            duration_minutes: row.duration_minutes,
            session_type: row.session_type.parse()?,
            meeting_link: row.meeting_link,
            location: row.location,
            rate_charged: row.rate_charged,
            status: row.status.parse()?,
            notes: row.notes,
            homework: row.homework,
            progress_rating: row.progress_rating,
            is_paid: row.is_paid,
            paid_at: row.paid_at,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

pub fn sessions_from_rows(rows: Vec<DbSession>) -> Result<Vec<Session>> {
    rows.into_iter().map(Session::try_from).collect()
}
