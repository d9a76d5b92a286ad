mod common;

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use common::{TestContext, TutorHandle};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tutorbook_core::models::{
    session::{Attendee, Session, SessionStatus, SessionType},
    student::Student,
};

async fn create_session(
    server: &TestServer,
    tutor: &TutorHandle,
    student: &Student,
    date: &str,
    time: &str,
) -> Session {
    let response = tutor
        .auth(server.post("/api/sessions"))
        .json(&json!({
            "student_id": student.id,
            "date": date,
            "time": time,
            "duration": 45,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn act(
    server: &TestServer,
    tutor: &TutorHandle,
    session: &Session,
    action: Value,
) -> TestResponse {
    tutor
        .auth(server.post(&format!("/api/sessions/{}/actions", session.id)))
        .json(&action)
        .await
}

async fn session_ids(server: &TestServer, tutor: &TutorHandle, view: &str) -> Vec<uuid::Uuid> {
    tutor
        .auth(server.get("/api/sessions"))
        .add_query_param("view", view)
        .await
        .json::<Vec<Session>>()
        .into_iter()
        .map(|s| s.id)
        .collect()
}

#[tokio::test]
async fn test_manual_session_links_student_and_freezes_rate() {
    let ctx = TestContext::new();
    let tutor = ctx.tutor("ada").await;
    let student = tutor.add_student(&ctx.server, "Sam", "sam@example.com").await;

    let session = create_session(&ctx.server, &tutor, &student, "2030-03-04", "16:00").await;

    assert_eq!(session.attendee, Attendee::Student { student_id: student.id });
    assert_eq!(session.session_type, SessionType::Online);
    assert_eq!(session.duration_minutes, 45);
    assert_eq!(session.rate_charged, 30.0);
    assert_eq!(session.status, SessionStatus::Scheduled);
}

#[tokio::test]
async fn test_manual_session_requires_known_student() {
    let ctx = TestContext::new();
    let tutor = ctx.tutor("ada").await;

    let missing = tutor
        .auth(ctx.server.post("/api/sessions"))
        .json(&json!({ "date": "2030-03-04", "time": "16:00" }))
        .await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);

    let unknown = tutor
        .auth(ctx.server.post("/api/sessions"))
        .json(&json!({
            "student_id": uuid::Uuid::new_v4(),
            "date": "2030-03-04",
            "time": "16:00",
        }))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manual_session_cannot_share_a_start() {
    let ctx = TestContext::new();
    let tutor = ctx.tutor("ada").await;
    let student = tutor.add_student(&ctx.server, "Sam", "").await;
    create_session(&ctx.server, &tutor, &student, "2030-03-04", "16:00").await;

    let response = tutor
        .auth(ctx.server.post("/api/sessions"))
        .json(&json!({ "student_id": student.id, "date": "2030-03-04", "time": "16:00" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["reason"], "slot_unavailable");
}

#[tokio::test]
async fn test_views_split_upcoming_and_past() {
    let ctx = TestContext::new();
    let tutor = ctx.tutor("ada").await;
    let student = tutor.add_student(&ctx.server, "Sam", "").await;
    let past = create_session(&ctx.server, &tutor, &student, "2020-01-06", "10:00").await;
    let later = create_session(&ctx.server, &tutor, &student, "2030-03-05", "10:00").await;
    let sooner = create_session(&ctx.server, &tutor, &student, "2030-03-04", "10:00").await;

    assert_eq!(session_ids(&ctx.server, &tutor, "upcoming").await, vec![sooner.id, later.id]);
    assert_eq!(session_ids(&ctx.server, &tutor, "past").await, vec![past.id]);
    assert_eq!(session_ids(&ctx.server, &tutor, "all").await.len(), 3);

    let default_view: Vec<Session> = tutor.auth(ctx.server.get("/api/sessions")).await.json();
    assert_eq!(default_view.len(), 2);

    let bogus = tutor
        .auth(ctx.server.get("/api/sessions"))
        .add_query_param("view", "someday")
        .await;
    assert_eq!(bogus.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancelled_sessions_leave_upcoming() {
    let ctx = TestContext::new();
    let tutor = ctx.tutor("ada").await;
    let student = tutor.add_student(&ctx.server, "Sam", "").await;
    let session = create_session(&ctx.server, &tutor, &student, "2030-03-04", "10:00").await;

    act(&ctx.server, &tutor, &session, json!({ "action": "cancel" }))
        .await
        .assert_status_ok();

    let upcoming: Vec<Session> = tutor.auth(ctx.server.get("/api/sessions")).await.json();
    assert!(upcoming.is_empty());
}

#[tokio::test]
async fn test_complete_records_notes_and_is_terminal() {
    let ctx = TestContext::new();
    let tutor = ctx.tutor("ada").await;
    let student = tutor.add_student(&ctx.server, "Sam", "").await;
    let session = create_session(&ctx.server, &tutor, &student, "2030-03-04", "10:00").await;

    let response = act(
        &ctx.server,
        &tutor,
        &session,
        json!({
            "action": "complete",
            "notes": " Fractions went well ",
            "homework": "Worksheet 3",
            "progress_rating": 4,
        }),
    )
    .await;
    response.assert_status_ok();

    let completed: Session = response.json();
    assert_eq!(completed.status, SessionStatus::Completed);
    assert_eq!(completed.notes, "Fractions went well");
    assert_eq!(completed.homework, "Worksheet 3");
    assert_eq!(completed.progress_rating, Some(4));
    assert!(completed.completed_at.is_some());

    let again = act(&ctx.server, &tutor, &session, json!({ "action": "cancel" })).await;
    assert_eq!(again.status_code(), StatusCode::BAD_REQUEST);

    let stored: Session = tutor
        .auth(ctx.server.get(&format!("/api/sessions/{}", session.id)))
        .await
        .json();
    assert_eq!(stored.status, SessionStatus::Completed);
}

#[tokio::test]
async fn test_rating_out_of_range_is_rejected() {
    let ctx = TestContext::new();
    let tutor = ctx.tutor("ada").await;
    let student = tutor.add_student(&ctx.server, "Sam", "").await;
    let session = create_session(&ctx.server, &tutor, &student, "2030-03-04", "10:00").await;

    let response = act(
        &ctx.server,
        &tutor,
        &session,
        json!({ "action": "update_notes", "progress_rating": 9 }),
    )
    .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_flags() {
    let ctx = TestContext::new();
    let tutor = ctx.tutor("ada").await;
    let student = tutor.add_student(&ctx.server, "Sam", "").await;
    let session = create_session(&ctx.server, &tutor, &student, "2030-03-04", "10:00").await;

    let paid: Session = act(&ctx.server, &tutor, &session, json!({ "action": "mark_paid" }))
        .await
        .json();
    assert!(paid.is_paid);
    assert!(paid.paid_at.is_some());

    let unpaid: Session = act(&ctx.server, &tutor, &session, json!({ "action": "mark_unpaid" }))
        .await
        .json();
    assert!(!unpaid.is_paid);
    assert_eq!(unpaid.paid_at, None);

    act(&ctx.server, &tutor, &session, json!({ "action": "cancel" }))
        .await
        .assert_status_ok();
    let response = act(&ctx.server, &tutor, &session, json!({ "action": "mark_paid" })).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sessions_are_scoped_to_their_tutor() {
    let ctx = TestContext::new();
    let ada = ctx.tutor("ada").await;
    let grace = ctx.tutor("grace").await;
    let student = ada.add_student(&ctx.server, "Sam", "").await;
    let session = create_session(&ctx.server, &ada, &student, "2030-03-04", "10:00").await;

    let read = grace
        .auth(ctx.server.get(&format!("/api/sessions/{}", session.id)))
        .await;
    assert_eq!(read.status_code(), StatusCode::NOT_FOUND);

    let cancel = act(&ctx.server, &grace, &session, json!({ "action": "cancel" })).await;
    assert_eq!(cancel.status_code(), StatusCode::NOT_FOUND);

    let listed: Vec<Session> = grace.auth(ctx.server.get("/api/sessions")).await.json();
    assert!(listed.is_empty());

    let booked_for_other = grace
        .auth(ctx.server.post("/api/sessions"))
        .json(&json!({ "student_id": student.id, "date": "2030-03-04", "time": "12:00" }))
        .await;
    assert_eq!(booked_for_other.status_code(), StatusCode::NOT_FOUND);
}
