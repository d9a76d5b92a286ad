//! # Slot Resolution
//!
//! Turns a tutor's weekly availability windows and the sessions already booked
//! on a date into the list of start times a parent may still book.
//!
//! 1. Only active windows for the date's weekday take part.
//! 2. Every non-cancelled session on the date becomes an exclusion interval
//!    `[start, start + its own duration)`.
//! 3. Each window is walked from its start in fixed 30-minute steps. A
//!    candidate fits while `candidate + duration <= window end`, and survives
//!    when it does not overlap any exclusion interval. Overlap is open-interval:
//!    touching endpoints are not a conflict, so back-to-back sessions are fine.
//! 4. Results are sorted and de-duplicated by value, so overlapping windows on
//!    the same day never offer the same start twice.
//!
//! All arithmetic runs on full date-times. A window ending at 23:59 never
//! wraps into the next morning.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{
    availability::{Availability, day_of_week},
    session::{Session, SessionStatus},
};

/// Cadence of candidate start times inside a window.
pub const SLOT_INCREMENT_MINUTES: i64 = 30;

/// Half-open occupied range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }
}

impl From<&Session> for Interval {
    fn from(session: &Session) -> Self {
        Interval::new(session.scheduled_at, session.ends_at())
    }
}

/// Exclusion set for a date: every non-cancelled session starting on it.
pub fn exclusion_intervals<'a>(
    sessions: impl IntoIterator<Item = &'a Session>,
    date: NaiveDate,
) -> Vec<Interval> {
    sessions
        .into_iter()
        .filter(|s| s.status != SessionStatus::Cancelled && s.date() == date)
        .map(Interval::from)
        .collect()
}

/// Bookable start times on `date` for a session of `duration_minutes`.
///
/// Never fails: no availability, a non-positive duration, or full occupancy
/// all simply produce an empty list.
pub fn resolve_slots(
    date: NaiveDate,
    windows: &[Availability],
    exclusions: &[Interval],
    duration_minutes: i32,
) -> Vec<NaiveTime> {
    if duration_minutes <= 0 {
        return Vec::new();
    }

    let weekday = day_of_week(date);
    let duration = Duration::minutes(i64::from(duration_minutes));
    let step = Duration::minutes(SLOT_INCREMENT_MINUTES);

    let mut slots = Vec::new();
    for window in windows
        .iter()
        .filter(|w| w.is_active && w.day_of_week == weekday)
    {
        let window_end = date.and_time(window.end_time);
        let mut candidate = date.and_time(window.start_time);

        while candidate + duration <= window_end {
            let slot = Interval::new(candidate, candidate + duration);
            if !exclusions.iter().any(|occupied| slot.overlaps(occupied)) {
                slots.push(candidate.time());
            }
            candidate += step;
        }
    }

    slots.sort_unstable();
    slots.dedup();
    slots
}
