use crate::models::DbStudent;
use chrono::Utc;
use eyre::Result;
use sqlx::PgExecutor;
use tutorbook_core::models::student::StudentInput;
use uuid::Uuid;

const STUDENT_COLUMNS: &str = "id, tutor_id, name, parent_name, parent_email, parent_phone, \
     grade_level, subject, notes, is_active, created_at";

pub async fn create_student<'e, E: PgExecutor<'e>>(
    executor: E,
    tutor_id: Uuid,
    input: &StudentInput,
) -> Result<DbStudent> {
    let id = Uuid::new_v4();
    tracing::debug!("Creating student: id={}, tutor_id={}", id, tutor_id);

    let row = sqlx::query_as::<_, DbStudent>(&format!(
        r#"
        INSERT INTO students (id, tutor_id, name, parent_name, parent_email, parent_phone,
                              grade_level, subject, notes, is_active, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10)
        RETURNING {STUDENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(tutor_id)
    .bind(&input.name)
    .bind(&input.parent_name)
    .bind(&input.parent_email)
    .bind(&input.parent_phone)
    .bind(&input.grade_level)
    .bind(&input.subject)
    .bind(&input.notes)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    Ok(row)
}

/// Scoped to the owning tutor; another tutor's student reads as absent.
pub async fn get_student<'e, E: PgExecutor<'e>>(
    executor: E,
    tutor_id: Uuid,
    id: Uuid,
) -> Result<Option<DbStudent>> {
    let row = sqlx::query_as::<_, DbStudent>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1 AND tutor_id = $2"
    ))
    .bind(id)
    .bind(tutor_id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn list_active_students<'e, E: PgExecutor<'e>>(
    executor: E,
    tutor_id: Uuid,
) -> Result<Vec<DbStudent>> {
    let rows = sqlx::query_as::<_, DbStudent>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE tutor_id = $1 AND is_active ORDER BY name"
    ))
    .bind(tutor_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// First active student of this tutor whose parent email matches, ignoring case.
pub async fn find_active_student_by_email<'e, E: PgExecutor<'e>>(
    executor: E,
    tutor_id: Uuid,
    email: &str,
) -> Result<Option<DbStudent>> {
    let row = sqlx::query_as::<_, DbStudent>(&format!(
        r#"
        SELECT {STUDENT_COLUMNS} FROM students
        WHERE tutor_id = $1 AND is_active AND lower(parent_email) = lower($2)
        ORDER BY created_at
        LIMIT 1
        "#
    ))
    .bind(tutor_id)
    .bind(email)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn update_student<'e, E: PgExecutor<'e>>(
    executor: E,
    tutor_id: Uuid,
    id: Uuid,
    input: &StudentInput,
) -> Result<Option<DbStudent>> {
    let row = sqlx::query_as::<_, DbStudent>(&format!(
        r#"
        UPDATE students
        SET name = $3, parent_name = $4, parent_email = $5, parent_phone = $6,
            grade_level = $7, subject = $8, notes = $9
        WHERE id = $1 AND tutor_id = $2
        RETURNING {STUDENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(tutor_id)
    .bind(&input.name)
    .bind(&input.parent_name)
    .bind(&input.parent_email)
    .bind(&input.parent_phone)
    .bind(&input.grade_level)
    .bind(&input.subject)
    .bind(&input.notes)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// Soft delete: the row stays so past sessions keep their student.
pub async fn deactivate_student<'e, E: PgExecutor<'e>>(
    executor: E,
    tutor_id: Uuid,
    id: Uuid,
) -> Result<bool> {
    let result = sqlx::query("UPDATE students SET is_active = FALSE WHERE id = $1 AND tutor_id = $2")
        .bind(id)
        .bind(tutor_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
