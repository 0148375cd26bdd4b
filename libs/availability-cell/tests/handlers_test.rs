use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use availability_cell::router::availability_routes;
use availability_cell::services::time::date_seed;
use shared_models::RecordId;
use shared_utils::test_utils::{fixed_today, MockStoreResponses, TestConfig};

fn create_app() -> Router {
    availability_routes(Arc::new(TestConfig::default().to_app_config()))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

// ==============================================================================
// SUGGESTIONS
// ==============================================================================

#[tokio::test]
async fn test_suggestions_for_open_day() {
    let date = fixed_today().succ_opt().unwrap();
    let mut request = MockStoreResponses::suggestion_request(date);
    request["existing_appointments"] = json!([
        MockStoreResponses::booking("09:00", "10:00", "confirmed"),
        MockStoreResponses::booking("15:00", "16:00", "cancelled")
    ]);

    let (status, json) = post_json(create_app(), "/suggestions", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["date"], "2025-06-17");
    assert_eq!(json["has_availability"], true);
    assert_eq!(json["next_date"], "2025-06-18");

    let morning = &json["morning"];
    assert_eq!(morning["date"], "2025-06-17");
    assert!(morning["time"].as_str().unwrap() < "12:00");
    assert!(morning["reasons"].as_array().unwrap().contains(&json!("Same Day")));
    assert!(json["afternoon"]["time"].as_str().unwrap() >= "12:00");
    assert!(json["alternative_slots"].as_array().unwrap().len() <= 5);
}

#[tokio::test]
async fn test_evening_slot_wins_afternoon_with_default_rubric() {
    let date = fixed_today() + chrono::Duration::days(10);
    let request = MockStoreResponses::suggestion_request(date);

    let (status, json) = post_json(create_app(), "/suggestions", request).await;

    assert_eq!(status, StatusCode::OK);
    let seed = date_seed(&date.to_string()) as usize;

    // Every slot starting 17:00-18:00 shares the Prime Time bonus.
    let evening = ["17:00", "17:30", "18:00"];
    assert_eq!(json["afternoon"]["time"], evening[seed % evening.len()]);
    assert_eq!(json["afternoon"]["reasons"], json!(["Prime Time"]));

    let early = ["08:00", "08:30"];
    assert_eq!(json["morning"]["time"], early[seed % early.len()]);
    assert_eq!(json["morning"]["reasons"], json!(["Early Bird"]));
}

#[tokio::test]
async fn test_weights_can_be_overridden_per_call() {
    let date = fixed_today() + chrono::Duration::days(10);
    let mut request = MockStoreResponses::suggestion_request(date);
    request["weights"] = json!({ "early_bird": -50, "prime_time": 0 });
    request["max_alternatives"] = json!(1);

    let (status, json) = post_json(create_app(), "/suggestions", request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["morning"]["time"].as_str().unwrap() >= "09:00");
    assert_eq!(json["alternative_slots"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_no_availability_is_not_an_error() {
    let date = fixed_today() + chrono::Duration::days(1);
    let mut request = MockStoreResponses::suggestion_request(date);
    request["professional"] = MockStoreResponses::professional(true, 5);

    let (status, json) = post_json(create_app(), "/suggestions", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["has_availability"], false);
    assert!(json["morning"].is_null());
    assert!(json["afternoon"].is_null());
    assert_eq!(json["alternative_slots"], json!([]));
    assert_eq!(json["next_date"], "2025-06-18");
}

#[tokio::test]
async fn test_malformed_time_is_rejected() {
    let mut request = MockStoreResponses::suggestion_request(fixed_today());
    request["working_blocks"] = json!([MockStoreResponses::working_block("9am", "12:00")]);

    let (status, json) = post_json(create_app(), "/suggestions", request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("9am"));
}

#[tokio::test]
async fn test_inverted_working_block_is_rejected() {
    let mut request = MockStoreResponses::suggestion_request(fixed_today());
    request["working_blocks"] = json!([MockStoreResponses::working_block("12:00", "09:00")]);

    let (status, _) = post_json(create_app(), "/suggestions", request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_zero_duration_service_is_rejected() {
    let mut request = MockStoreResponses::suggestion_request(fixed_today());
    request["service"] = MockStoreResponses::service(0, "consultation");

    let (status, json) = post_json(create_app(), "/suggestions", request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("duration"));
}

// ==============================================================================
// OPEN SLOTS
// ==============================================================================

#[tokio::test]
async fn test_open_slots_are_listed_in_time_order() {
    let date = fixed_today() + chrono::Duration::days(2);
    let mut request = MockStoreResponses::suggestion_request(date);
    request["working_blocks"] = json!([MockStoreResponses::working_block("09:00", "12:00")]);
    request["existing_appointments"] = json!([MockStoreResponses::booking("10:00", "11:00", "confirmed")]);

    let (status, json) = post_json(create_app(), "/slots", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    let times: Vec<&str> = json["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["time"].as_str().unwrap())
        .collect();
    assert_eq!(times, vec!["09:00", "11:00"]);
    assert_eq!(json["slots"][0]["end_time"], "10:00");
    assert_eq!(json["slots"][0]["available"], true);
}

#[tokio::test]
async fn test_oversized_slot_interval_offers_block_starts_only() {
    let date = fixed_today() + chrono::Duration::days(2);
    let mut request = MockStoreResponses::suggestion_request(date);
    request["professional"]["slot_interval_minutes"] = json!(u32::MAX);

    let (status, json) = post_json(create_app(), "/slots", request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    assert_eq!(json["slots"][0]["time"], "08:00");
    assert_eq!(json["slots"][1]["time"], "13:00");
}

#[tokio::test]
async fn test_slots_are_annotated_with_locations() {
    let date = fixed_today() + chrono::Duration::days(2);
    let gym = RecordId::slug("gym-floor");
    let mut request = MockStoreResponses::suggestion_request(date);
    request["service"] = MockStoreResponses::service(60, "attendance");
    request["working_blocks"] = json!([MockStoreResponses::working_block("10:00", "12:00")]);
    request["locations"] = json!([
        MockStoreResponses::location("gym-floor", 1, "shared"),
        MockStoreResponses::location("office-a", 1, "private")
    ]);
    request["location_bookings"] = json!([MockStoreResponses::booking_at("10:00", "11:00", &gym)]);

    let (status, json) = post_json(create_app(), "/slots", request).await;

    assert_eq!(status, StatusCode::OK);
    let slots = json["slots"].as_array().unwrap();
    assert_eq!(slots[0]["time"], "10:00");
    assert_eq!(slots[0]["location_id"], json!(RecordId::slug("office-a")));
    assert_eq!(slots.last().unwrap()["location_id"], json!(gym));
}

// ==============================================================================
// LOCATION ASSIGNMENT
// ==============================================================================

#[tokio::test]
async fn test_assign_location_falls_back_when_shared_space_is_full() {
    let gym = RecordId::slug("gym-floor");
    let body = json!({
        "category": "attendance",
        "start": "10:00",
        "end": "11:00",
        "locations": [
            MockStoreResponses::location("gym-floor", 2, "shared"),
            MockStoreResponses::location("office-a", 1, "private"),
            MockStoreResponses::location("office-b", 1, "private")
        ],
        "bookings": [
            MockStoreResponses::booking_at("10:00", "11:00", &gym),
            MockStoreResponses::booking_at("10:30", "11:30", &gym),
            MockStoreResponses::booking_at("09:30", "10:30", &RecordId::slug("office-a"))
        ]
    });

    let (status, json) = post_json(create_app(), "/locations/assign", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["location_id"], json!({ "kind": "legacy_slug", "value": "office-b" }));
}

#[tokio::test]
async fn test_assign_location_returns_null_when_everything_is_full() {
    let office = RecordId::slug("office-a");
    let body = json!({
        "category": "consultation",
        "start": "14:00",
        "end": "15:00",
        "locations": [MockStoreResponses::location("office-a", 1, "private")],
        "bookings": [MockStoreResponses::booking_at("14:30", "15:30", &office)]
    });

    let (status, json) = post_json(create_app(), "/locations/assign", body).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["location_id"].is_null());
}

#[tokio::test]
async fn test_assign_location_rejects_empty_interval() {
    let body = json!({
        "category": "consultation",
        "start": "14:00",
        "end": "14:00",
        "locations": [MockStoreResponses::location("office-a", 1, "private")]
    });

    let (status, _) = post_json(create_app(), "/locations/assign", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_zero_capacity_location_is_rejected() {
    let body = json!({
        "category": "consultation",
        "start": "14:00",
        "end": "15:00",
        "locations": [MockStoreResponses::location("office-a", 0, "private")]
    });

    let (status, _) = post_json(create_app(), "/locations/assign", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
