mod common;

use axum::http::StatusCode;
use common::TestContext;
use pretty_assertions::assert_eq;
use serde_json::json;
use tutorbook_core::models::{
    availability::AvailabilityResponse,
    booking::SlotsResponse,
    tutor::Tutor,
};

#[tokio::test]
async fn test_replace_drops_invalid_windows() {
    let ctx = TestContext::new();
    let tutor = ctx.tutor("ada").await;

    let response = tutor
        .auth(ctx.server.put("/api/availability"))
        .json(&json!({
            "windows": [
                { "day_of_week": 0, "start": "09:00", "end": "12:00" },
                { "day_of_week": 7, "start": "09:00", "end": "12:00" },
                { "day_of_week": 2, "start": "15:00", "end": "14:00" },
                { "day_of_week": 2, "start": "14:00", "end": "16:00" },
            ]
        }))
        .await;
    response.assert_status_ok();

    let body: AvailabilityResponse = response.json();
    assert_eq!(body.windows.len(), 2);
    assert!(body.windows.iter().all(|w| w.tutor_id == tutor.id && w.is_active));
    assert_eq!(
        body.summary,
        vec![
            "Monday: 09:00 AM - 12:00 PM".to_string(),
            "Wednesday: 02:00 PM - 04:00 PM".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_replace_overwrites_previous_schedule() {
    let ctx = TestContext::new();
    let tutor = ctx.tutor("ada").await;
    tutor.set_availability(&ctx.server, &[(0, "09:00", "12:00")]).await;
    tutor.set_availability(&ctx.server, &[(4, "13:00", "15:00")]).await;

    let body: AvailabilityResponse = tutor
        .auth(ctx.server.get("/api/availability"))
        .await
        .json();

    assert_eq!(body.summary, vec!["Friday: 01:00 PM - 03:00 PM".to_string()]);

    let monday: SlotsResponse = ctx
        .server
        .get(&format!("/api/slots/{}/2030-01-07", tutor.id))
        .await
        .json();
    assert!(monday.slots.is_empty());
}

#[tokio::test]
async fn test_empty_schedule_clears_availability() {
    let ctx = TestContext::new();
    let tutor = ctx.tutor("ada").await;
    tutor.set_availability(&ctx.server, &[(0, "09:00", "12:00")]).await;
    tutor.set_availability(&ctx.server, &[]).await;

    let body: AvailabilityResponse = tutor
        .auth(ctx.server.get("/api/availability"))
        .await
        .json();

    assert!(body.windows.is_empty());
    assert!(body.summary.is_empty());
}

#[tokio::test]
async fn test_split_day_offers_slots_in_both_windows() {
    let ctx = TestContext::new();
    let tutor = ctx.tutor("ada").await;
    tutor
        .set_availability(&ctx.server, &[(0, "14:00", "15:00"), (0, "09:00", "10:00")])
        .await;

    let body: SlotsResponse = ctx
        .server
        .get(&format!("/api/slots/{}/2030-01-07", tutor.id))
        .add_query_param("duration", 30)
        .await
        .json();

    assert_eq!(body.slots, vec!["09:00", "09:30", "14:00", "14:30"]);
}

#[tokio::test]
async fn test_profile_update_is_validated() {
    let ctx = TestContext::new();
    let tutor = ctx.tutor("ada").await;

    let updated: Tutor = tutor
        .auth(ctx.server.put("/api/tutor/profile"))
        .json(&json!({
            "bio": "Maths and physics",
            "hourly_rate": 55.0,
            "session_durations": [90, 30, 60, 30],
            "timezone": "Europe/London",
        }))
        .await
        .json();
    assert_eq!(updated.bio, "Maths and physics");
    assert_eq!(updated.hourly_rate, 55.0);
    assert_eq!(updated.session_durations, vec![30, 60, 90]);

    let profile: Tutor = tutor
        .auth(ctx.server.get("/api/tutor/profile"))
        .await
        .json();
    assert_eq!(profile, updated);

    for bad in [
        json!({ "hourly_rate": -5.0 }),
        json!({ "timezone": "Mars/Olympus" }),
        json!({ "full_name": "   " }),
        json!({ "session_durations": [] }),
    ] {
        let response = tutor
            .auth(ctx.server.put("/api/tutor/profile"))
            .json(&bad)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", bad);
    }
}
