use crate::models::DbSession;
use chrono::{Duration, NaiveDate, Utc};
use eyre::Result;
use sqlx::PgExecutor;
use tutorbook_core::models::session::{
    NewSession, Session, SessionFilter, SessionStatus, PAST_SESSIONS_LIMIT,
};
use uuid::Uuid;

const SESSION_COLUMNS: &str = "id, tutor_id, student_id, guest_name, guest_email, guest_phone, \
     guest_subject, scheduled_at, duration_minutes, session_type, meeting_link, location, \
     rate_charged, status, notes, homework, progress_rating, is_paid, paid_at, created_at, \
     completed_at";

/// Inserts a `scheduled` session. A concurrent booking of the same start surfaces as a
/// unique violation on `uq_sessions_tutor_slot`.
pub async fn insert_session<'e, E: PgExecutor<'e>>(
    executor: E,
    session: &NewSession,
) -> Result<DbSession> {
    let id = Uuid::new_v4();
    let guest = session.attendee.guest();
    tracing::debug!(
        "Creating session: id={}, tutor_id={}, scheduled_at={}",
        id,
        session.tutor_id,
        session.scheduled_at
    );

    let row = sqlx::query_as::<_, DbSession>(&format!(
        r#"
        INSERT INTO sessions (id, tutor_id, student_id, guest_name, guest_email, guest_phone,
                              guest_subject, scheduled_at, duration_minutes, session_type,
                              meeting_link, location, rate_charged, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING {SESSION_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(session.tutor_id)
    .bind(session.attendee.student_id())
    .bind(guest.map(|g| g.name.as_str()))
    .bind(guest.map(|g| g.email.as_str()))
    .bind(guest.map(|g| g.phone.as_str()))
    .bind(guest.map(|g| g.subject.as_str()))
    .bind(session.scheduled_at)
    .bind(session.duration_minutes)
    .bind(session.session_type.as_str())
    .bind(&session.meeting_link)
    .bind(&session.location)
    .bind(session.rate_charged)
    .bind(SessionStatus::Scheduled.as_str())
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    Ok(row)
}

/// Non-cancelled sessions starting on `date`.
pub async fn sessions_on_date<'e, E: PgExecutor<'e>>(
    executor: E,
    tutor_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<DbSession>> {
    let day_start = date.and_time(chrono::NaiveTime::MIN);
    let day_end = day_start + Duration::days(1);

    let rows = sqlx::query_as::<_, DbSession>(&format!(
        r#"
        SELECT {SESSION_COLUMNS} FROM sessions
        WHERE tutor_id = $1 AND status <> 'cancelled'
          AND scheduled_at >= $2 AND scheduled_at < $3
        ORDER BY scheduled_at
        "#
    ))
    .bind(tutor_id)
    .bind(day_start)
    .bind(day_end)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

pub async fn get_session<'e, E: PgExecutor<'e>>(
    executor: E,
    tutor_id: Uuid,
    id: Uuid,
) -> Result<Option<DbSession>> {
    let row = sqlx::query_as::<_, DbSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1 AND tutor_id = $2"
    ))
    .bind(id)
    .bind(tutor_id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// Persists the mutable part of a session: status, notes and payment.
pub async fn update_session<'e, E: PgExecutor<'e>>(
    executor: E,
    session: &Session,
) -> Result<Option<DbSession>> {
    let row = sqlx::query_as::<_, DbSession>(&format!(
        r#"
        UPDATE sessions
        SET status = $3, notes = $4, homework = $5, progress_rating = $6,
            is_paid = $7, paid_at = $8, completed_at = $9
        WHERE id = $1 AND tutor_id = $2
        RETURNING {SESSION_COLUMNS}
        "#
    ))
    .bind(session.id)
    .bind(session.tutor_id)
    .bind(session.status.as_str())
    .bind(&session.notes)
    .bind(&session.homework)
    .bind(session.progress_rating)
    .bind(session.is_paid)
    .bind(session.paid_at)
    .bind(session.completed_at)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn list_sessions<'e, E: PgExecutor<'e>>(
    executor: E,
    tutor_id: Uuid,
    filter: SessionFilter,
) -> Result<Vec<DbSession>> {
    let (sql, now) = match filter {
        SessionFilter::Upcoming { now } => (
            format!(
                r#"
                SELECT {SESSION_COLUMNS} FROM sessions
                WHERE tutor_id = $1 AND status <> 'cancelled' AND scheduled_at >= $2
                ORDER BY scheduled_at
                "#
            ),
            Some(now),
        ),
        SessionFilter::Past { now } => (
            format!(
                r#"
                SELECT {SESSION_COLUMNS} FROM sessions
                WHERE tutor_id = $1 AND scheduled_at < $2
                ORDER BY scheduled_at DESC
                LIMIT {PAST_SESSIONS_LIMIT}
                "#
            ),
            Some(now),
        ),
        SessionFilter::All => (
            format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE tutor_id = $1 ORDER BY scheduled_at DESC"
            ),
            None,
        ),
    };

    let mut query = sqlx::query_as::<_, DbSession>(&sql).bind(tutor_id);
    if let Some(now) = now {
        query = query.bind(now);
    }

    Ok(query.fetch_all(executor).await?)
}

pub async fn sessions_for_student<'e, E: PgExecutor<'e>>(
    executor: E,
    tutor_id: Uuid,
    student_id: Uuid,
) -> Result<Vec<DbSession>> {
    let rows = sqlx::query_as::<_, DbSession>(&format!(
        r#"
        SELECT {SESSION_COLUMNS} FROM sessions
        WHERE tutor_id = $1 AND student_id = $2
        ORDER BY scheduled_at DESC
        "#
    ))
    .bind(tutor_id)
    .bind(student_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}
