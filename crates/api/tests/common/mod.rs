#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::http::{header::AUTHORIZATION, HeaderValue};
use axum_test::{TestRequest, TestServer};
use chrono::NaiveDate;
use fake::{
    faker::{internet::en::SafeEmail, name::en::Name},
    Fake,
};
use serde_json::{json, Value};
use tutorbook_api::{build_router, config::DEFAULT_BOOKING_HORIZON_DAYS, ApiState};
use tutorbook_core::models::{student::Student, tutor::LoginResponse};
use tutorbook_db::{mock::MemoryStore, SchedulingStore};
use tutorbook_mailer::{BookingNotice, Notifier};

pub const PASSWORD: &str = "correct horse";

/// 2030-01-07 is a Monday.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
}

pub fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 8).unwrap()
}

/// Keeps every notice instead of sending mail.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<BookingNotice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<BookingNotice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_booking(&self, notice: BookingNotice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub fn server_with(store: Arc<dyn SchedulingStore>, notifier: Arc<dyn Notifier>) -> TestServer {
    let state = Arc::new(ApiState {
        store,
        notifier,
        booking_horizon_days: DEFAULT_BOOKING_HORIZON_DAYS,
    });
    TestServer::new(build_router(state)).unwrap()
}

/// A router over a fresh [`MemoryStore`], with the store kept for inspection.
pub struct TestContext {
    pub server: TestServer,
    pub store: MemoryStore,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let server = server_with(Arc::new(store.clone()), notifier.clone());

        Self {
            server,
            store,
            notifier,
        }
    }

    /// Registers a tutor under `slug` and logs them in.
    pub async fn tutor(&self, slug: &str) -> TutorHandle {
        let email: String = SafeEmail().fake();
        let name: String = Name().fake();

        self.server
            .post("/api/auth/register")
            .json(&json!({
                "email": email,
                "password": PASSWORD,
                "full_name": name,
                "profile_slug": slug,
                "hourly_rate": 40.0,
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let login: LoginResponse = self
            .server
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .await
            .json();

        TutorHandle {
            id: login.tutor.id,
            slug: slug.to_string(),
            email,
            token: login.token,
        }
    }
}

pub struct TutorHandle {
    pub id: uuid::Uuid,
    pub slug: String,
    pub email: String,
    pub token: String,
}

impl TutorHandle {
    pub fn auth(&self, request: TestRequest) -> TestRequest {
        request.add_header(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token)).unwrap(),
        )
    }

    /// Replaces the weekly schedule with the given `(day, start, end)` windows.
    pub async fn set_availability(&self, server: &TestServer, windows: &[(i16, &str, &str)]) {
        let windows: Vec<Value> = windows
            .iter()
            .map(|(day, start, end)| json!({ "day_of_week": day, "start": start, "end": end }))
            .collect();

        self.auth(server.put("/api/availability"))
            .json(&json!({ "windows": windows }))
            .await
            .assert_status_ok();
    }

    pub async fn add_student(&self, server: &TestServer, name: &str, parent_email: &str) -> Student {
        let response = self
            .auth(server.post("/api/students"))
            .json(&json!({ "name": name, "parent_email": parent_email }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }
}

pub fn booking_form(date: NaiveDate, time: &str) -> Value {
    json!({
        "student_name": "Sam Carter",
        "parent_email": "parent@example.com",
        "parent_phone": "555-0100",
        "subject": "Algebra",
        "session_type": "online",
        "duration": 60,
        "date": date.format("%Y-%m-%d").to_string(),
        "time": time,
    })
}
