use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::BookingRejection,
    models::session::{GuestContact, Session, SessionType},
    time_format::{parse_date, parse_hhmm},
};

pub const DEFAULT_DURATION_MINUTES: i32 = 60;
pub const MAX_DURATION_MINUTES: i32 = 12 * 60;

pub fn is_valid_duration(minutes: i32) -> bool {
    (1..=MAX_DURATION_MINUTES).contains(&minutes)
}

/// A form value posted either as a JSON number or as the text an HTML form sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(i64),
    Text(String),
}

impl NumberOrText {
    fn is_blank(&self) -> bool {
        matches!(self, NumberOrText::Text(text) if text.trim().is_empty())
    }

    fn to_i32(&self) -> Option<i32> {
        match self {
            NumberOrText::Number(n) => i32::try_from(*n).ok(),
            NumberOrText::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Raw booking form as posted by the public booking page.
///
/// Fields are kept loose so a badly typed value reaches validation and is
/// turned down with a rejection reason instead of a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub parent_email: String,
    #[serde(default)]
    pub parent_phone: String,
    #[serde(default)]
    pub subject: String,
    /// `online` or `in_person`; blank means online.
    #[serde(default)]
    pub session_type: String,
    #[serde(default)]
    pub duration: Option<NumberOrText>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

/// A booking form that passed boundary validation.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub contact: GuestContact,
    pub session_type: SessionType,
    pub duration_minutes: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl BookingRequest {
    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

impl TryFrom<BookingForm> for BookingRequest {
    type Error = BookingRejection;

    fn try_from(form: BookingForm) -> Result<Self, Self::Error> {
        let student_name = form.student_name.trim();
        let date = form.date.trim();
        let time = form.time.trim();
        if student_name.is_empty() || date.is_empty() || time.is_empty() {
            return Err(BookingRejection::MissingFields);
        }

        let session_type = match form.session_type.trim() {
            "" => SessionType::default(),
            other => other
                .parse::<SessionType>()
                .map_err(|_| BookingRejection::MissingFields)?,
        };

        let duration_minutes = match &form.duration {
            None => DEFAULT_DURATION_MINUTES,
            Some(value) if value.is_blank() => DEFAULT_DURATION_MINUTES,
            Some(value) => value.to_i32().ok_or(BookingRejection::InvalidDuration)?,
        };
        if !is_valid_duration(duration_minutes) {
            return Err(BookingRejection::InvalidDuration);
        }

        let date = parse_date(date).ok_or(BookingRejection::InvalidDatetime)?;
        let time = parse_hhmm(time).ok_or(BookingRejection::InvalidDatetime)?;

        Ok(BookingRequest {
            contact: GuestContact {
                name: student_name.to_string(),
                email: form.parent_email.trim().to_string(),
                phone: form.parent_phone.trim().to_string(),
                subject: form.subject.trim().to_string(),
            },
            session_type,
            duration_minutes,
            date,
            time,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorSummary {
    pub id: Uuid,
    pub full_name: String,
    pub profile_slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub tutor: TutorSummary,
    pub session: Session,
    pub student_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotsQuery {
    pub duration: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotsResponse {
    pub date: String,
    pub duration: i32,
    pub slots: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn form() -> BookingForm {
        BookingForm {
            student_name: "Sam".into(),
            parent_email: " Parent@Example.com ".into(),
            date: "2024-01-01".into(),
            time: "10:00".into(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_to_an_hour_online() {
        let request = BookingRequest::try_from(form()).unwrap();
        assert_eq!(request.duration_minutes, 60);
        assert_eq!(request.session_type, SessionType::Online);
        assert_eq!(request.contact.email, "Parent@Example.com");
        assert_eq!(
            request.scheduled_at(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(10, 0, 0).unwrap()
        );
    }

    #[rstest]
    #[case::no_name(BookingForm { student_name: " ".into(), ..form() }, BookingRejection::MissingFields)]
    #[case::no_date(BookingForm { date: "".into(), ..form() }, BookingRejection::MissingFields)]
    #[case::no_time(BookingForm { time: "".into(), ..form() }, BookingRejection::MissingFields)]
    #[case::bad_date(BookingForm { date: "2024-13-01".into(), ..form() }, BookingRejection::InvalidDatetime)]
    #[case::bad_time(BookingForm { time: "10am".into(), ..form() }, BookingRejection::InvalidDatetime)]
    #[case::zero_duration(BookingForm { duration: Some(NumberOrText::Number(0)), ..form() }, BookingRejection::InvalidDuration)]
    #[case::huge_duration(BookingForm { duration: Some(NumberOrText::Number(24 * 60)), ..form() }, BookingRejection::InvalidDuration)]
    #[case::overflowing_duration(BookingForm { duration: Some(NumberOrText::Number(i64::MAX)), ..form() }, BookingRejection::InvalidDuration)]
    #[case::wordy_duration(BookingForm { duration: Some(NumberOrText::Text("an hour".into())), ..form() }, BookingRejection::InvalidDuration)]
    #[case::unknown_session_type(BookingForm { session_type: "hybrid".into(), ..form() }, BookingRejection::MissingFields)]
    fn rejects_bad_forms(#[case] form: BookingForm, #[case] expected: BookingRejection) {
        assert_eq!(BookingRequest::try_from(form).unwrap_err(), expected);
    }

    #[test]
    fn accepts_form_encoded_values() {
        let posted: BookingForm = serde_json::from_str(
            r#"{"student_name":"Sam","date":"2024-01-01","time":"10:00","duration":" 90 ","session_type":"in_person"}"#,
        )
        .unwrap();
        let request = BookingRequest::try_from(posted).unwrap();
        assert_eq!(request.duration_minutes, 90);
        assert_eq!(request.session_type, SessionType::InPerson);

        let blank = BookingForm {
            duration: Some(NumberOrText::Text("".into())),
            session_type: " ".into(),
            ..form()
        };
        let request = BookingRequest::try_from(blank).unwrap();
        assert_eq!(request.duration_minutes, DEFAULT_DURATION_MINUTES);
        assert_eq!(request.session_type, SessionType::Online);
    }
}
