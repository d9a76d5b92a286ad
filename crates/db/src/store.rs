//! The persistence seam the API talks to.
//!
//! [`SchedulingStore`] covers every read and write the handlers need, scoped to
//! a tutor wherever a row belongs to one. Public booking goes through a
//! [`DayTransaction`]: while one is open for a `(tutor, date)` no other booking
//! for that tutor and date can read or write, so check-then-insert is atomic.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use eyre::Result;
use mockall::automock;
use sqlx::{Pool, Postgres, Transaction};
use thiserror::Error;
use tutorbook_core::{
    models::{
        availability::{day_of_week, retain_valid, Availability, AvailabilityInput},
        session::{NewSession, Session, SessionFilter},
        student::{Student, StudentInput},
        tutor::{NewTutor, Tutor},
    },
    slots::Interval,
};
use uuid::Uuid;

use crate::{
    is_unique_violation,
    models::{sessions_from_rows, DbSession},
    repositories::{availability, session, student, tutor},
};

#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Created(Session),
    /// Another live session already starts at this time for this tutor.
    SlotTaken,
}

/// A staged session lost its start time to another writer before commit.
#[derive(Debug, Error)]
#[error("slot {0} was taken before commit")]
pub struct SlotConflict(pub NaiveDateTime);

/// A serialized unit of work over one tutor's bookings on one date.
///
/// Dropping it without calling [`DayTransaction::commit`] discards every staged insert.
#[async_trait]
pub trait DayTransaction: Send {
    /// Active windows for the transaction's weekday.
    async fn active_windows(&mut self) -> Result<Vec<Availability>>;

    /// Occupied intervals of non-cancelled sessions on the date.
    async fn find_overlapping(&mut self) -> Result<Vec<Interval>>;

    async fn find_active_student_by_email(&mut self, email: &str) -> Result<Option<Student>>;

    async fn insert_session(&mut self, session: NewSession) -> Result<InsertOutcome>;

    /// Fails with an error that [`is_unique_violation`] recognises when a
    /// staged start time was taken in the meantime.
    async fn commit(self: Box<Self>) -> Result<()>;
}

#[automock]
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    /// `None` when the email or profile slug is already registered.
    async fn create_tutor(&self, tutor: NewTutor, password_hash: String) -> Result<Option<Tutor>>;
    async fn tutor_by_id(&self, id: Uuid) -> Result<Option<Tutor>>;
    async fn tutor_by_slug(&self, slug: String) -> Result<Option<Tutor>>;
    /// The tutor and their stored password hash.
    async fn tutor_credentials(&self, email: String) -> Result<Option<(Tutor, String)>>;
    async fn set_api_token(&self, tutor_id: Uuid, token: String) -> Result<()>;
    async fn tutor_by_token(&self, token: String) -> Result<Option<Tutor>>;
    async fn update_tutor_profile(&self, tutor: Tutor) -> Result<Tutor>;

    /// Windows outside `0..=6` or with `end <= start` are dropped, not stored.
    async fn replace_availability(
        &self,
        tutor_id: Uuid,
        windows: Vec<AvailabilityInput>,
    ) -> Result<Vec<Availability>>;
    async fn list_availability(&self, tutor_id: Uuid) -> Result<Vec<Availability>>;
    async fn active_windows(&self, tutor_id: Uuid, day_of_week: i16) -> Result<Vec<Availability>>;

    async fn find_overlapping(&self, tutor_id: Uuid, date: NaiveDate) -> Result<Vec<Interval>>;
    async fn create_session(&self, session: NewSession) -> Result<InsertOutcome>;
    async fn get_session(&self, tutor_id: Uuid, id: Uuid) -> Result<Option<Session>>;
    async fn update_session(&self, session: Session) -> Result<Option<Session>>;
    async fn list_sessions(&self, tutor_id: Uuid, filter: SessionFilter) -> Result<Vec<Session>>;
    async fn sessions_for_student(&self, tutor_id: Uuid, student_id: Uuid) -> Result<Vec<Session>>;

    async fn create_student(&self, tutor_id: Uuid, input: StudentInput) -> Result<Student>;
    async fn get_student(&self, tutor_id: Uuid, id: Uuid) -> Result<Option<Student>>;
    async fn list_active_students(&self, tutor_id: Uuid) -> Result<Vec<Student>>;
    async fn update_student(
        &self,
        tutor_id: Uuid,
        id: Uuid,
        input: StudentInput,
    ) -> Result<Option<Student>>;
    /// `false` when no such student belongs to the tutor.
    async fn deactivate_student(&self, tutor_id: Uuid, id: Uuid) -> Result<bool>;

    /// Opens the serialized booking transaction for `(tutor_id, date)`, waiting
    /// for any other holder to finish.
    async fn begin_day(&self, tutor_id: Uuid, date: NaiveDate) -> Result<Box<dyn DayTransaction>>;
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn created(row: DbSession) -> Result<InsertOutcome> {
    Ok(InsertOutcome::Created(Session::try_from(row)?))
}

#[async_trait]
impl SchedulingStore for PgStore {
    async fn create_tutor(&self, new_tutor: NewTutor, password_hash: String) -> Result<Option<Tutor>> {
        match tutor::create_tutor(&self.pool, &new_tutor, &password_hash).await {
            Ok(row) => Ok(Some(row.into())),
            Err(err) if is_unique_violation(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn tutor_by_id(&self, id: Uuid) -> Result<Option<Tutor>> {
        Ok(tutor::get_tutor_by_id(&self.pool, id).await?.map(Into::into))
    }

    async fn tutor_by_slug(&self, slug: String) -> Result<Option<Tutor>> {
        Ok(tutor::get_tutor_by_slug(&self.pool, &slug).await?.map(Into::into))
    }

    async fn tutor_credentials(&self, email: String) -> Result<Option<(Tutor, String)>> {
        Ok(tutor::get_tutor_by_email(&self.pool, &email).await?.map(|row| {
            let hash = row.password_hash.clone();
            (row.into(), hash)
        }))
    }

    async fn set_api_token(&self, tutor_id: Uuid, token: String) -> Result<()> {
        tutor::set_api_token(&self.pool, tutor_id, &token).await
    }

    async fn tutor_by_token(&self, token: String) -> Result<Option<Tutor>> {
        Ok(tutor::get_tutor_by_token(&self.pool, &token).await?.map(Into::into))
    }

    async fn update_tutor_profile(&self, updated: Tutor) -> Result<Tutor> {
        Ok(tutor::update_tutor_profile(&self.pool, &updated).await?.into())
    }

    async fn replace_availability(
        &self,
        tutor_id: Uuid,
        windows: Vec<AvailabilityInput>,
    ) -> Result<Vec<Availability>> {
        let windows = retain_valid(windows);
        let rows = availability::replace_availability(&self.pool, tutor_id, &windows).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_availability(&self, tutor_id: Uuid) -> Result<Vec<Availability>> {
        let rows = availability::list_availability(&self.pool, tutor_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn active_windows(&self, tutor_id: Uuid, day_of_week: i16) -> Result<Vec<Availability>> {
        let rows = availability::active_windows(&self.pool, tutor_id, day_of_week).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_overlapping(&self, tutor_id: Uuid, date: NaiveDate) -> Result<Vec<Interval>> {
        let rows = session::sessions_on_date(&self.pool, tutor_id, date).await?;
        Ok(sessions_from_rows(rows)?.iter().map(Interval::from).collect())
    }

    async fn create_session(&self, new_session: NewSession) -> Result<InsertOutcome> {
        match session::insert_session(&self.pool, &new_session).await {
            Ok(row) => created(row),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::SlotTaken),
            Err(err) => Err(err),
        }
    }

    async fn get_session(&self, tutor_id: Uuid, id: Uuid) -> Result<Option<Session>> {
        session::get_session(&self.pool, tutor_id, id)
            .await?
            .map(Session::try_from)
            .transpose()
    }

    async fn update_session(&self, updated: Session) -> Result<Option<Session>> {
        session::update_session(&self.pool, &updated)
            .await?
            .map(Session::try_from)
            .transpose()
    }

    async fn list_sessions(&self, tutor_id: Uuid, filter: SessionFilter) -> Result<Vec<Session>> {
        sessions_from_rows(session::list_sessions(&self.pool, tutor_id, filter).await?)
    }

    async fn sessions_for_student(&self, tutor_id: Uuid, student_id: Uuid) -> Result<Vec<Session>> {
        sessions_from_rows(session::sessions_for_student(&self.pool, tutor_id, student_id).await?)
    }

    async fn create_student(&self, tutor_id: Uuid, input: StudentInput) -> Result<Student> {
        Ok(student::create_student(&self.pool, tutor_id, &input).await?.into())
    }

    async fn get_student(&self, tutor_id: Uuid, id: Uuid) -> Result<Option<Student>> {
        Ok(student::get_student(&self.pool, tutor_id, id).await?.map(Into::into))
    }

    async fn list_active_students(&self, tutor_id: Uuid) -> Result<Vec<Student>> {
        let rows = student::list_active_students(&self.pool, tutor_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_student(
        &self,
        tutor_id: Uuid,
        id: Uuid,
        input: StudentInput,
    ) -> Result<Option<Student>> {
        Ok(student::update_student(&self.pool, tutor_id, id, &input)
            .await?
            .map(Into::into))
    }

    async fn deactivate_student(&self, tutor_id: Uuid, id: Uuid) -> Result<bool> {
        student::deactivate_student(&self.pool, tutor_id, id).await
    }

    async fn begin_day(&self, tutor_id: Uuid, date: NaiveDate) -> Result<Box<dyn DayTransaction>> {
        let mut tx = self.pool.begin().await?;

        // Held until commit or rollback; every booking for this tutor and date queues here.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(day_lock_key(tutor_id, date))
            .execute(&mut *tx)
            .await?;

        tracing::debug!("Acquired day lock: tutor_id={}, date={}", tutor_id, date);
        Ok(Box::new(PgDayTransaction { tx, tutor_id, date }))
    }
}

fn day_lock_key(tutor_id: Uuid, date: NaiveDate) -> String {
    format!("{tutor_id}:{date}")
}

struct PgDayTransaction {
    tx: Transaction<'static, Postgres>,
    tutor_id: Uuid,
    date: NaiveDate,
}

#[async_trait]
impl DayTransaction for PgDayTransaction {
    async fn active_windows(&mut self) -> Result<Vec<Availability>> {
        let rows =
            availability::active_windows(&mut *self.tx, self.tutor_id, day_of_week(self.date)).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_overlapping(&mut self) -> Result<Vec<Interval>> {
        let rows = session::sessions_on_date(&mut *self.tx, self.tutor_id, self.date).await?;
        Ok(sessions_from_rows(rows)?.iter().map(Interval::from).collect())
    }

    async fn find_active_student_by_email(&mut self, email: &str) -> Result<Option<Student>> {
        Ok(student::find_active_student_by_email(&mut *self.tx, self.tutor_id, email)
            .await?
            .map(Into::into))
    }

    async fn insert_session(&mut self, new_session: NewSession) -> Result<InsertOutcome> {
        debug_assert_eq!(new_session.scheduled_at.date(), self.date);

        match session::insert_session(&mut *self.tx, &new_session).await {
            Ok(row) => created(row),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::SlotTaken),
            Err(err) => Err(err),
        }
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
