use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tutorbook_core::models::tutor::Tutor;

/// The tutor's configured timezone, or UTC when it does not parse.
pub fn tutor_timezone(tutor: &Tutor) -> Tz {
    tutor.timezone.parse().unwrap_or_else(|_| {
        tracing::warn!(
            "Tutor {} has unknown timezone {:?}; falling back to UTC",
            tutor.id,
            tutor.timezone
        );
        Tz::UTC
    })
}

/// Wall-clock time at the tutor's location. Sessions are stored in this frame.
pub fn tutor_now(tutor: &Tutor, now: DateTime<Utc>) -> NaiveDateTime {
    now.with_timezone(&tutor_timezone(tutor)).naive_local()
}

/// `days` consecutive dates starting at `today`.
pub fn upcoming_dates(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..i64::from(days)).map(|offset| today + Duration::days(offset)).collect()
}
