use chrono::{NaiveDate, NaiveTime, Utc};
use pretty_assertions::assert_eq;
use serde_json::{from_value, json, to_value};
use tutorbook_core::{
    models::{
        availability::{Availability, ReplaceAvailabilityRequest},
        booking::{BookingForm, BookingRequest},
        session::{Attendee, GuestContact, NewSession, Session, SessionStatus, SessionType},
    },
    slots::{exclusion_intervals, resolve_slots},
};
use uuid::Uuid;

fn guest_session() -> Session {
    NewSession {
        tutor_id: Uuid::new_v4(),
        attendee: Attendee::Guest(GuestContact {
            name: "Sam".into(),
            email: "parent@example.com".into(),
            phone: String::new(),
            subject: "Algebra".into(),
        }),
        scheduled_at: NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap(),
        duration_minutes: 60,
        session_type: SessionType::InPerson,
        meeting_link: String::new(),
        location: "12 High St".into(),
        rate_charged: 45.0,
    }
    .into_session(Uuid::new_v4(), Utc::now())
}

#[test]
fn test_session_wire_shape() {
    let session = guest_session();
    let value = to_value(&session).expect("Failed to serialize session");

    assert_eq!(value["status"], "scheduled");
    assert_eq!(value["session_type"], "in_person");
    assert_eq!(value["attendee"]["kind"], "guest");
    assert_eq!(value["attendee"]["name"], "Sam");
    assert_eq!(value["scheduled_at"], "2024-01-01T10:00:00");

    let back: Session = from_value(value).expect("Failed to deserialize session");
    assert_eq!(back, session);
}

#[test]
fn test_linked_attendee_has_no_guest_fields() {
    let student_id = Uuid::new_v4();
    let value = to_value(Attendee::Student { student_id }).unwrap();
    assert_eq!(value, json!({ "kind": "student", "student_id": student_id }));
    assert_eq!(Attendee::Student { student_id }.guest(), None);
}

#[test]
fn test_replace_availability_request_accepts_hhmm() {
    let request: ReplaceAvailabilityRequest = from_value(json!({
        "windows": [
            { "day_of_week": 0, "start": "09:00", "end": "12:00" },
            { "day_of_week": 2, "start": "14:30", "end": "16:00" }
        ]
    }))
    .expect("Failed to parse availability request");

    assert_eq!(request.windows.len(), 2);
    assert_eq!(request.windows[1].start, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
}

#[test]
fn test_booking_form_to_slot_lookup() {
    // Scenario: Monday 09:00-12:00, one hour booked at 10:00; a form asking for
    // 10:30 must not match any resolved slot, while 11:00 does.
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let windows = vec![Availability {
        id: Uuid::new_v4(),
        tutor_id: Uuid::nil(),
        day_of_week: 0,
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        is_active: true,
    }];
    let sessions = vec![guest_session()];
    let slots = resolve_slots(date, &windows, &exclusion_intervals(&sessions, date), 60);

    let taken: BookingRequest = BookingForm {
        student_name: "Kim".into(),
        date: "2024-01-01".into(),
        time: "10:30".into(),
        ..Default::default()
    }
    .try_into()
    .unwrap();
    let free: BookingRequest = BookingForm {
        student_name: "Kim".into(),
        date: "2024-01-01".into(),
        time: "11:00:00".into(),
        ..Default::default()
    }
    .try_into()
    .unwrap();

    assert!(!slots.contains(&taken.time));
    assert!(slots.contains(&free.time));
    assert_eq!(guest_session().status, SessionStatus::Scheduled);
}
