use crate::models::DbTutor;
use chrono::Utc;
use eyre::Result;
use sqlx::PgExecutor;
use tutorbook_core::models::tutor::{NewTutor, Tutor, DEFAULT_CURRENCY};
use uuid::Uuid;

const TUTOR_COLUMNS: &str = "id, email, password_hash, full_name, bio, subjects, hourly_rate, \
     currency, timezone, phone, address, profile_slug, session_durations, \
     default_meeting_link, is_active, created_at";

pub async fn create_tutor<'e, E: PgExecutor<'e>>(
    executor: E,
    tutor: &NewTutor,
    password_hash: &str,
) -> Result<DbTutor> {
    let id = Uuid::new_v4();
    tracing::debug!("Creating tutor: id={}, slug={}", id, tutor.profile_slug);

    let row = sqlx::query_as::<_, DbTutor>(&format!(
        r#"
        INSERT INTO tutors (id, email, password_hash, full_name, profile_slug, hourly_rate,
                            currency, timezone, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {TUTOR_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&tutor.email)
    .bind(password_hash)
    .bind(&tutor.full_name)
    .bind(&tutor.profile_slug)
    .bind(tutor.hourly_rate)
    .bind(DEFAULT_CURRENCY)
    .bind(&tutor.timezone)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn get_tutor_by_id<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<DbTutor>> {
    let row = sqlx::query_as::<_, DbTutor>(&format!("SELECT {TUTOR_COLUMNS} FROM tutors WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row)
}

/// Public lookups only ever see active tutors.
pub async fn get_tutor_by_slug<'e, E: PgExecutor<'e>>(executor: E, slug: &str) -> Result<Option<DbTutor>> {
    let row = sqlx::query_as::<_, DbTutor>(&format!(
        "SELECT {TUTOR_COLUMNS} FROM tutors WHERE profile_slug = $1 AND is_active"
    ))
    .bind(slug)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn get_tutor_by_email<'e, E: PgExecutor<'e>>(executor: E, email: &str) -> Result<Option<DbTutor>> {
    let row = sqlx::query_as::<_, DbTutor>(&format!(
        "SELECT {TUTOR_COLUMNS} FROM tutors WHERE lower(email) = lower($1)"
    ))
    .bind(email)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn get_tutor_by_token<'e, E: PgExecutor<'e>>(executor: E, token: &str) -> Result<Option<DbTutor>> {
    let row = sqlx::query_as::<_, DbTutor>(&format!(
        "SELECT {TUTOR_COLUMNS} FROM tutors WHERE api_token = $1 AND is_active"
    ))
    .bind(token)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn set_api_token<'e, E: PgExecutor<'e>>(executor: E, id: Uuid, token: &str) -> Result<()> {
    sqlx::query("UPDATE tutors SET api_token = $2 WHERE id = $1")
        .bind(id)
        .bind(token)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn update_tutor_profile<'e, E: PgExecutor<'e>>(executor: E, tutor: &Tutor) -> Result<DbTutor> {
    tracing::debug!("Updating tutor profile: id={}", tutor.id);

    let row = sqlx::query_as::<_, DbTutor>(&format!(
        r#"
        UPDATE tutors
        SET full_name = $2, bio = $3, subjects = $4, hourly_rate = $5, currency = $6,
            timezone = $7, phone = $8, address = $9, session_durations = $10,
            default_meeting_link = $11
        WHERE id = $1
        RETURNING {TUTOR_COLUMNS}
        "#
    ))
    .bind(tutor.id)
    .bind(&tutor.full_name)
    .bind(&tutor.bio)
    .bind(&tutor.subjects)
    .bind(tutor.hourly_rate)
    .bind(&tutor.currency)
    .bind(&tutor.timezone)
    .bind(&tutor.phone)
    .bind(&tutor.address)
    .bind(&tutor.session_durations)
    .bind(&tutor.default_meeting_link)
    .fetch_one(executor)
    .await?;

    Ok(row)
}
