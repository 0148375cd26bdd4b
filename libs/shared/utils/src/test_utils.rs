use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, ScoringWeights};
use shared_models::RecordId;

pub struct TestConfig {
    pub clinic_timezone: Tz,
    pub default_slot_interval_minutes: u32,
    pub average_daily_bookings: u32,
    pub max_alternatives: usize,
    pub scoring_weights: ScoringWeights,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            clinic_timezone: chrono_tz::America::Sao_Paulo,
            default_slot_interval_minutes: 30,
            average_daily_bookings: 8,
            max_alternatives: 5,
            scoring_weights: ScoringWeights::default(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            clinic_timezone: self.clinic_timezone,
            default_slot_interval_minutes: self.default_slot_interval_minutes,
            average_daily_bookings: self.average_daily_bookings,
            max_alternatives: self.max_alternatives,
            scoring_weights: self.scoring_weights,
            server_port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Fixed calendar date used as "today" throughout the fixtures.
pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
}

pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn service_id() -> RecordId {
        RecordId::slug("physio-session")
    }

    pub fn professional(online_booking_enabled: bool, min_advance_booking_days: u32) -> Value {
        json!({
            "id": RecordId::from(Uuid::new_v4()),
            "online_booking_enabled": online_booking_enabled,
            "slot_interval_minutes": 30,
            "min_advance_booking_days": min_advance_booking_days,
            "service_ids": [Self::service_id()]
        })
    }

    pub fn service(duration_minutes: u32, category: &str) -> Value {
        json!({
            "id": Self::service_id(),
            "duration_minutes": duration_minutes,
            "category": category
        })
    }

    pub fn working_block(start: &str, end: &str) -> Value {
        json!({ "start": start, "end": end })
    }

    pub fn booking(start: &str, end: &str, status: &str) -> Value {
        json!({ "start": start, "end": end, "status": status })
    }

    pub fn booking_at(start: &str, end: &str, location: &RecordId) -> Value {
        json!({ "start": start, "end": end, "status": "confirmed", "location_id": location })
    }

    pub fn location(slug: &str, capacity: u32, kind: &str) -> Value {
        json!({
            "id": RecordId::slug(slug),
            "name": slug.replace('-', " "),
            "capacity": capacity,
            "kind": kind
        })
    }

    pub fn patient_visit(date: &str, time: &str) -> Value {
        json!({ "date": date, "time": time })
    }

    /// A suggestion request body with one morning-to-evening block and no bookings.
    pub fn suggestion_request(date: NaiveDate) -> Value {
        json!({
            "professional": Self::professional(true, 0),
            "service": Self::service(60, "consultation"),
            "date": date,
            "working_blocks": [
                Self::working_block("08:00", "12:00"),
                Self::working_block("13:00", "19:00")
            ],
            "existing_appointments": [],
            "today": fixed_today()
        })
    }
}
