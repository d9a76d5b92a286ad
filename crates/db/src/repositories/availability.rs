use crate::models::DbAvailability;
use eyre::Result;
use sqlx::{PgExecutor, Pool, Postgres};
use tutorbook_core::models::availability::AvailabilityInput;
use uuid::Uuid;

const AVAILABILITY_COLUMNS: &str = "id, tutor_id, day_of_week, start_time, end_time, is_active";

/// Swaps the tutor's whole weekly schedule in one transaction.
pub async fn replace_availability(
    pool: &Pool<Postgres>,
    tutor_id: Uuid,
    windows: &[AvailabilityInput],
) -> Result<Vec<DbAvailability>> {
    tracing::debug!(
        "Replacing availability: tutor_id={}, windows={}",
        tutor_id,
        windows.len()
    );

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM availabilities WHERE tutor_id = $1")
        .bind(tutor_id)
        .execute(&mut *tx)
        .await?;

    let mut rows = Vec::with_capacity(windows.len());
    for window in windows {
        let row = sqlx::query_as::<_, DbAvailability>(&format!(
            r#"
            INSERT INTO availabilities (id, tutor_id, day_of_week, start_time, end_time, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING {AVAILABILITY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(tutor_id)
        .bind(window.day_of_week)
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&mut *tx)
        .await?;
        rows.push(row);
    }

    tx.commit().await?;
    Ok(rows)
}

pub async fn list_availability<'e, E: PgExecutor<'e>>(
    executor: E,
    tutor_id: Uuid,
) -> Result<Vec<DbAvailability>> {
    let rows = sqlx::query_as::<_, DbAvailability>(&format!(
        r#"
        SELECT {AVAILABILITY_COLUMNS} FROM availabilities
        WHERE tutor_id = $1
        ORDER BY day_of_week, start_time
        "#
    ))
    .bind(tutor_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

pub async fn active_windows<'e, E: PgExecutor<'e>>(
    executor: E,
    tutor_id: Uuid,
    day_of_week: i16,
) -> Result<Vec<DbAvailability>> {
    let rows = sqlx::query_as::<_, DbAvailability>(&format!(
        r#"
        SELECT {AVAILABILITY_COLUMNS} FROM availabilities
        WHERE tutor_id = $1 AND day_of_week = $2 AND is_active
        ORDER BY start_time
        "#
    ))
    .bind(tutor_id)
    .bind(day_of_week)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}
