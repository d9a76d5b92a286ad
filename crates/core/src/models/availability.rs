use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time_format::hhmm;

pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Monday = 0 .. Sunday = 6.
pub fn day_of_week(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_monday() as i16
}

/// A weekly recurring window during which a tutor accepts bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub id: Uuid,
    pub tutor_id: Uuid,
    pub day_of_week: i16,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityInput {
    pub day_of_week: i16,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl AvailabilityInput {
    pub fn is_valid(&self) -> bool {
        (0..=6).contains(&self.day_of_week) && self.end > self.start
    }
}

/// Drops windows that cannot be stored instead of failing the whole edit.
pub fn retain_valid(windows: Vec<AvailabilityInput>) -> Vec<AvailabilityInput> {
    windows.into_iter().filter(AvailabilityInput::is_valid).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceAvailabilityRequest {
    pub windows: Vec<AvailabilityInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub windows: Vec<Availability>,
    pub summary: Vec<String>,
}

/// Renders active windows as `"Monday: 09:00 AM - 12:00 PM, 02:00 PM - 04:00 PM"`,
/// one line per day in week order.
pub fn weekly_summary(windows: &[Availability]) -> Vec<String> {
    let mut by_day: [Vec<&Availability>; 7] = Default::default();
    for window in windows.iter().filter(|w| w.is_active) {
        if let Some(slot) = by_day.get_mut(window.day_of_week as usize) {
            slot.push(window);
        }
    }

    by_day
        .iter_mut()
        .enumerate()
        .filter(|(_, day)| !day.is_empty())
        .map(|(index, day)| {
            day.sort_by_key(|w| w.start_time);
            let times = day
                .iter()
                .map(|w| {
                    format!(
                        "{} - {}",
                        w.start_time.format("%I:%M %p"),
                        w.end_time.format("%I:%M %p")
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: {}", DAY_NAMES[index], times)
        })
        .collect()
}
