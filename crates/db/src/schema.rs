use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create tutors table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tutors (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email VARCHAR(120) NOT NULL UNIQUE,
            password_hash VARCHAR(256) NOT NULL,
            full_name VARCHAR(120) NOT NULL,
            bio TEXT NOT NULL DEFAULT '',
            subjects TEXT[] NOT NULL DEFAULT '{}',
            hourly_rate DOUBLE PRECISION NOT NULL DEFAULT 0,
            currency VARCHAR(3) NOT NULL DEFAULT 'USD',
            timezone VARCHAR(50) NOT NULL DEFAULT 'America/New_York',
            phone VARCHAR(30) NOT NULL DEFAULT '',
            address VARCHAR(250) NOT NULL DEFAULT '',
            profile_slug VARCHAR(80) NOT NULL UNIQUE,
            session_durations INTEGER[] NOT NULL DEFAULT '{60}',
            default_meeting_link VARCHAR(500) NOT NULL DEFAULT '',
            api_token VARCHAR(64) NULL UNIQUE,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create students table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            tutor_id UUID NOT NULL REFERENCES tutors(id),
            name VARCHAR(120) NOT NULL,
            parent_name VARCHAR(120) NOT NULL DEFAULT '',
            parent_email VARCHAR(120) NOT NULL DEFAULT '',
            parent_phone VARCHAR(30) NOT NULL DEFAULT '',
            grade_level VARCHAR(30) NOT NULL DEFAULT '',
            subject VARCHAR(120) NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create availabilities table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS availabilities (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            tutor_id UUID NOT NULL REFERENCES tutors(id),
            day_of_week SMALLINT NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            CONSTRAINT valid_day_of_week CHECK (day_of_week BETWEEN 0 AND 6),
            CONSTRAINT valid_time_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create sessions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            tutor_id UUID NOT NULL REFERENCES tutors(id),
            student_id UUID NULL REFERENCES students(id),
            guest_name VARCHAR(120) NULL,
            guest_email VARCHAR(120) NULL,
            guest_phone VARCHAR(30) NULL,
            guest_subject VARCHAR(120) NULL,
            scheduled_at TIMESTAMP NOT NULL,
            duration_minutes INTEGER NOT NULL,
            session_type VARCHAR(20) NOT NULL DEFAULT 'online',
            meeting_link VARCHAR(500) NOT NULL DEFAULT '',
            location VARCHAR(250) NOT NULL DEFAULT '',
            rate_charged DOUBLE PRECISION NOT NULL DEFAULT 0,
            status VARCHAR(20) NOT NULL DEFAULT 'scheduled',
            notes TEXT NOT NULL DEFAULT '',
            homework TEXT NOT NULL DEFAULT '',
            progress_rating SMALLINT NULL,
            is_paid BOOLEAN NOT NULL DEFAULT FALSE,
            paid_at TIMESTAMP WITH TIME ZONE NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            completed_at TIMESTAMP WITH TIME ZONE NULL,
            CONSTRAINT positive_duration CHECK (duration_minutes > 0),
            CONSTRAINT valid_session_type CHECK (session_type IN ('online', 'in_person')),
            CONSTRAINT valid_status CHECK (status IN ('scheduled', 'completed', 'cancelled', 'no_show')),
            CONSTRAINT valid_rating CHECK (progress_rating IS NULL OR progress_rating BETWEEN 1 AND 5),
            CONSTRAINT student_xor_guest CHECK ((student_id IS NULL) <> (guest_name IS NULL))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes, one statement per query
    const INDEXES: [&str; 6] = [
        "CREATE INDEX IF NOT EXISTS idx_students_tutor_id ON students(tutor_id)",
        "CREATE INDEX IF NOT EXISTS idx_students_parent_email ON students(tutor_id, lower(parent_email))",
        "CREATE INDEX IF NOT EXISTS idx_availabilities_tutor_day ON availabilities(tutor_id, day_of_week)",
        "CREATE INDEX IF NOT EXISTS idx_sessions_tutor_scheduled_at ON sessions(tutor_id, scheduled_at)",
        "CREATE INDEX IF NOT EXISTS idx_sessions_student_id ON sessions(student_id)",
        // Last line of defence against double-booking; the day lock is the first.
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_sessions_tutor_slot \
         ON sessions(tutor_id, scheduled_at) WHERE status <> 'cancelled'",
    ];
    for statement in INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
