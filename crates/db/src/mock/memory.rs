use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use eyre::{eyre, Result};
use tokio::sync::OwnedMutexGuard;
use tutorbook_core::{
    models::{
        availability::{day_of_week, retain_valid, Availability, AvailabilityInput},
        session::{NewSession, Session, SessionFilter, SessionStatus, PAST_SESSIONS_LIMIT},
        student::{Student, StudentInput},
        tutor::{NewTutor, Tutor, DEFAULT_CURRENCY},
    },
    slots::{exclusion_intervals, Interval},
};
use uuid::Uuid;

use crate::store::{DayTransaction, InsertOutcome, SchedulingStore, SlotConflict};

#[derive(Debug, Clone)]
struct StoredTutor {
    tutor: Tutor,
    password_hash: String,
    api_token: Option<String>,
}

#[derive(Debug, Default)]
struct Data {
    tutors: Vec<StoredTutor>,
    students: Vec<Student>,
    availability: Vec<Availability>,
    sessions: Vec<Session>,
}

impl Data {
    fn slot_taken(&self, tutor_id: Uuid, scheduled_at: NaiveDateTime, staged: &[Session]) -> bool {
        self.sessions.iter().chain(staged).any(|s| {
            s.tutor_id == tutor_id
                && s.scheduled_at == scheduled_at
                && s.status != SessionStatus::Cancelled
        })
    }

    fn active_student_by_email(&self, tutor_id: Uuid, email: &str) -> Option<Student> {
        self.students
            .iter()
            .filter(|s| s.tutor_id == tutor_id && s.is_active)
            .filter(|s| s.parent_email.eq_ignore_ascii_case(email))
            .min_by_key(|s| s.created_at)
            .cloned()
    }
}

type DayLocks = HashMap<(Uuid, NaiveDate), Arc<tokio::sync::Mutex<()>>>;

/// A [`SchedulingStore`] held entirely in memory.
///
/// Mirrors the Postgres guarantees that matter for booking: one open
/// [`DayTransaction`] per tutor and date, and a unique start time per tutor
/// among non-cancelled sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Data>>,
    day_locks: Arc<Mutex<DayLocks>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> Result<MutexGuard<'_, Data>> {
        self.data.lock().map_err(|_| eyre!("memory store lock poisoned"))
    }

    fn day_locks(&self) -> Result<MutexGuard<'_, DayLocks>> {
        self.day_locks
            .lock()
            .map_err(|_| eyre!("memory store lock poisoned"))
    }

    fn day_lock(&self, tutor_id: Uuid, date: NaiveDate) -> Result<Arc<tokio::sync::Mutex<()>>> {
        Ok(self.day_locks()?.entry((tutor_id, date)).or_default().clone())
    }

    /// Number of `(tutor, date)` locks currently held or awaited.
    pub fn open_day_locks(&self) -> usize {
        self.day_locks().map(|locks| locks.len()).unwrap_or_default()
    }

    /// Every session ever stored, across tutors.
    pub fn all_sessions(&self) -> Result<Vec<Session>> {
        Ok(self.data()?.sessions.clone())
    }
}

#[async_trait]
impl SchedulingStore for MemoryStore {
    async fn create_tutor(&self, new_tutor: NewTutor, password_hash: String) -> Result<Option<Tutor>> {
        let mut data = self.data()?;
        let taken = data.tutors.iter().any(|t| {
            t.tutor.email.eq_ignore_ascii_case(&new_tutor.email)
                || t.tutor.profile_slug == new_tutor.profile_slug
        });
        if taken {
            return Ok(None);
        }

        let tutor = Tutor {
            id: Uuid::new_v4(),
            email: new_tutor.email,
            full_name: new_tutor.full_name,
            bio: String::new(),
            subjects: Vec::new(),
            hourly_rate: new_tutor.hourly_rate,
            currency: DEFAULT_CURRENCY.to_string(),
            timezone: new_tutor.timezone,
            phone: String::new(),
            address: String::new(),
            profile_slug: new_tutor.profile_slug,
            session_durations: vec![60],
            default_meeting_link: String::new(),
            is_active: true,
            created_at: Utc::now(),
        };
        data.tutors.push(StoredTutor {
            tutor: tutor.clone(),
            password_hash,
            api_token: None,
        });
        Ok(Some(tutor))
    }

    async fn tutor_by_id(&self, id: Uuid) -> Result<Option<Tutor>> {
        let data = self.data()?;
        Ok(data.tutors.iter().find(|t| t.tutor.id == id).map(|t| t.tutor.clone()))
    }

    async fn tutor_by_slug(&self, slug: String) -> Result<Option<Tutor>> {
        let data = self.data()?;
        Ok(data
            .tutors
            .iter()
            .find(|t| t.tutor.profile_slug == slug && t.tutor.is_active)
            .map(|t| t.tutor.clone()))
    }

    async fn tutor_credentials(&self, email: String) -> Result<Option<(Tutor, String)>> {
        let data = self.data()?;
        Ok(data
            .tutors
            .iter()
            .find(|t| t.tutor.email.eq_ignore_ascii_case(&email))
            .map(|t| (t.tutor.clone(), t.password_hash.clone())))
    }

    async fn set_api_token(&self, tutor_id: Uuid, token: String) -> Result<()> {
        let mut data = self.data()?;
        if let Some(stored) = data.tutors.iter_mut().find(|t| t.tutor.id == tutor_id) {
            stored.api_token = Some(token);
        }
        Ok(())
    }

    async fn tutor_by_token(&self, token: String) -> Result<Option<Tutor>> {
        let data = self.data()?;
        Ok(data
            .tutors
            .iter()
            .find(|t| t.api_token.as_deref() == Some(token.as_str()) && t.tutor.is_active)
            .map(|t| t.tutor.clone()))
    }

    async fn update_tutor_profile(&self, updated: Tutor) -> Result<Tutor> {
        let mut data = self.data()?;
        let stored = data
            .tutors
            .iter_mut()
            .find(|t| t.tutor.id == updated.id)
            .ok_or_else(|| eyre!("tutor {} does not exist", updated.id))?;
        stored.tutor = updated.clone();
        Ok(updated)
    }

    async fn replace_availability(
        &self,
        tutor_id: Uuid,
        windows: Vec<AvailabilityInput>,
    ) -> Result<Vec<Availability>> {
        let mut data = self.data()?;
        data.availability.retain(|a| a.tutor_id != tutor_id);
        let rows: Vec<Availability> = retain_valid(windows)
            .into_iter()
            .map(|w| Availability {
                id: Uuid::new_v4(),
                tutor_id,
                day_of_week: w.day_of_week,
                start_time: w.start,
                end_time: w.end,
                is_active: true,
            })
            .collect();
        data.availability.extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn list_availability(&self, tutor_id: Uuid) -> Result<Vec<Availability>> {
        let data = self.data()?;
        let mut rows: Vec<Availability> = data
            .availability
            .iter()
            .filter(|a| a.tutor_id == tutor_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| (a.day_of_week, a.start_time));
        Ok(rows)
    }

    async fn active_windows(&self, tutor_id: Uuid, day: i16) -> Result<Vec<Availability>> {
        let data = self.data()?;
        let mut rows: Vec<Availability> = data
            .availability
            .iter()
            .filter(|a| a.tutor_id == tutor_id && a.day_of_week == day && a.is_active)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.start_time);
        Ok(rows)
    }

    async fn find_overlapping(&self, tutor_id: Uuid, date: NaiveDate) -> Result<Vec<Interval>> {
        let data = self.data()?;
        Ok(exclusion_intervals(
            data.sessions.iter().filter(|s| s.tutor_id == tutor_id),
            date,
        ))
    }

    async fn create_session(&self, new_session: NewSession) -> Result<InsertOutcome> {
        let mut data = self.data()?;
        if data.slot_taken(new_session.tutor_id, new_session.scheduled_at, &[]) {
            return Ok(InsertOutcome::SlotTaken);
        }
        let session = new_session.into_session(Uuid::new_v4(), Utc::now());
        data.sessions.push(session.clone());
        Ok(InsertOutcome::Created(session))
    }

    async fn get_session(&self, tutor_id: Uuid, id: Uuid) -> Result<Option<Session>> {
        let data = self.data()?;
        Ok(data
            .sessions
            .iter()
            .find(|s| s.id == id && s.tutor_id == tutor_id)
            .cloned())
    }

    async fn update_session(&self, updated: Session) -> Result<Option<Session>> {
        let mut data = self.data()?;
        let Some(stored) = data
            .sessions
            .iter_mut()
            .find(|s| s.id == updated.id && s.tutor_id == updated.tutor_id)
        else {
            return Ok(None);
        };
        stored.status = updated.status;
        stored.notes = updated.notes;
        stored.homework = updated.homework;
        stored.progress_rating = updated.progress_rating;
        stored.is_paid = updated.is_paid;
        stored.paid_at = updated.paid_at;
        stored.completed_at = updated.completed_at;
        Ok(Some(stored.clone()))
    }

    async fn list_sessions(&self, tutor_id: Uuid, filter: SessionFilter) -> Result<Vec<Session>> {
        let data = self.data()?;
        let mine = data.sessions.iter().filter(|s| s.tutor_id == tutor_id).cloned();
        let sessions = match filter {
            SessionFilter::Upcoming { now } => {
                let mut rows: Vec<Session> = mine
                    .filter(|s| s.status != SessionStatus::Cancelled && s.scheduled_at >= now)
                    .collect();
                rows.sort_by_key(|s| s.scheduled_at);
                rows
            }
            SessionFilter::Past { now } => {
                let mut rows: Vec<Session> = mine.filter(|s| s.scheduled_at < now).collect();
                rows.sort_by_key(|s| std::cmp::Reverse(s.scheduled_at));
                rows.truncate(PAST_SESSIONS_LIMIT);
                rows
            }
            SessionFilter::All => {
                let mut rows: Vec<Session> = mine.collect();
                rows.sort_by_key(|s| std::cmp::Reverse(s.scheduled_at));
                rows
            }
        };
        Ok(sessions)
    }

    async fn sessions_for_student(&self, tutor_id: Uuid, student_id: Uuid) -> Result<Vec<Session>> {
        let data = self.data()?;
        let mut rows: Vec<Session> = data
            .sessions
            .iter()
            .filter(|s| s.tutor_id == tutor_id && s.attendee.student_id() == Some(student_id))
            .cloned()
            .collect();
        rows.sort_by_key(|s| std::cmp::Reverse(s.scheduled_at));
        Ok(rows)
    }

    async fn create_student(&self, tutor_id: Uuid, input: StudentInput) -> Result<Student> {
        let student = Student {
            id: Uuid::new_v4(),
            tutor_id,
            name: input.name,
            parent_name: input.parent_name,
            parent_email: input.parent_email,
            parent_phone: input.parent_phone,
            grade_level: input.grade_level,
            subject: input.subject,
            notes: input.notes,
            is_active: true,
            created_at: Utc::now(),
        };
        self.data()?.students.push(student.clone());
        Ok(student)
    }

    async fn get_student(&self, tutor_id: Uuid, id: Uuid) -> Result<Option<Student>> {
        let data = self.data()?;
        Ok(data
            .students
            .iter()
            .find(|s| s.id == id && s.tutor_id == tutor_id)
            .cloned())
    }

    async fn list_active_students(&self, tutor_id: Uuid) -> Result<Vec<Student>> {
        let data = self.data()?;
        let mut rows: Vec<Student> = data
            .students
            .iter()
            .filter(|s| s.tutor_id == tutor_id && s.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn update_student(
        &self,
        tutor_id: Uuid,
        id: Uuid,
        input: StudentInput,
    ) -> Result<Option<Student>> {
        let mut data = self.data()?;
        let Some(stored) = data
            .students
            .iter_mut()
            .find(|s| s.id == id && s.tutor_id == tutor_id)
        else {
            return Ok(None);
        };
        stored.name = input.name;
        stored.parent_name = input.parent_name;
        stored.parent_email = input.parent_email;
        stored.parent_phone = input.parent_phone;
        stored.grade_level = input.grade_level;
        stored.subject = input.subject;
        stored.notes = input.notes;
        Ok(Some(stored.clone()))
    }

    async fn deactivate_student(&self, tutor_id: Uuid, id: Uuid) -> Result<bool> {
        let mut data = self.data()?;
        match data
            .students
            .iter_mut()
            .find(|s| s.id == id && s.tutor_id == tutor_id)
        {
            Some(stored) => {
                stored.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn begin_day(&self, tutor_id: Uuid, date: NaiveDate) -> Result<Box<dyn DayTransaction>> {
        let guard = self.day_lock(tutor_id, date)?.lock_owned().await;
        Ok(Box::new(MemoryDayTransaction {
            store: self.clone(),
            tutor_id,
            date,
            staged: Vec::new(),
            _guard: guard,
        }))
    }
}

struct MemoryDayTransaction {
    store: MemoryStore,
    tutor_id: Uuid,
    date: NaiveDate,
    staged: Vec<Session>,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl DayTransaction for MemoryDayTransaction {
    async fn active_windows(&mut self) -> Result<Vec<Availability>> {
        self.store
            .active_windows(self.tutor_id, day_of_week(self.date))
            .await
    }

    async fn find_overlapping(&mut self) -> Result<Vec<Interval>> {
        let data = self.store.data()?;
        let mine = data
            .sessions
            .iter()
            .chain(&self.staged)
            .filter(|s| s.tutor_id == self.tutor_id);
        Ok(exclusion_intervals(mine, self.date))
    }

    async fn find_active_student_by_email(&mut self, email: &str) -> Result<Option<Student>> {
        Ok(self.store.data()?.active_student_by_email(self.tutor_id, email))
    }

    async fn insert_session(&mut self, new_session: NewSession) -> Result<InsertOutcome> {
        let taken = self.store.data()?.slot_taken(
            new_session.tutor_id,
            new_session.scheduled_at,
            &self.staged,
        );
        if taken {
            return Ok(InsertOutcome::SlotTaken);
        }
        let session = new_session.into_session(Uuid::new_v4(), Utc::now());
        self.staged.push(session.clone());
        Ok(InsertOutcome::Created(session))
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut data = self.store.data()?;
        for session in &self.staged {
            if data.slot_taken(session.tutor_id, session.scheduled_at, &[]) {
                return Err(SlotConflict(session.scheduled_at).into());
            }
        }
        data.sessions.extend(self.staged.iter().cloned());
        Ok(())
    }
}

impl Drop for MemoryDayTransaction {
    fn drop(&mut self) {
        // The map and this guard's mutex hold one reference each; anything more
        // is a waiter that still needs the entry.
        if let Ok(mut locks) = self.store.day_locks.lock() {
            let key = (self.tutor_id, self.date);
            if locks.get(&key).is_some_and(|lock| Arc::strong_count(lock) <= 2) {
                locks.remove(&key);
            }
        }
    }
}
