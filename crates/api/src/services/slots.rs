use chrono::{NaiveDate, NaiveTime};
use eyre::Result;
use tutorbook_core::{models::availability::day_of_week, slots::resolve_slots};
use tutorbook_db::SchedulingStore;
use uuid::Uuid;

/// Bookable start times for `tutor_id` on `date`. Reads outside any day lock,
/// so the answer is advisory; confirmation checks again.
pub async fn available_slots(
    store: &dyn SchedulingStore,
    tutor_id: Uuid,
    date: NaiveDate,
    duration_minutes: i32,
) -> Result<Vec<NaiveTime>> {
    let windows = store.active_windows(tutor_id, day_of_week(date)).await?;
    if windows.is_empty() {
        return Ok(Vec::new());
    }

    let exclusions = store.find_overlapping(tutor_id, date).await?;
    Ok(resolve_slots(date, &windows, &exclusions, duration_minutes))
}
