use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AvailabilityError, Booking, ClockTime, Location, ScoringWeights, ServiceCategory,
    SuggestionContext,
};
use crate::services::{engine::SmartSuggestionService, location::LocationAssigner};

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    #[serde(flatten)]
    pub context: SuggestionContext,
    /// Overrides the clinic's current date, mainly for previews.
    pub today: Option<NaiveDate>,
    pub max_alternatives: Option<usize>,
    pub weights: Option<ScoringWeights>,
}

#[derive(Debug, Deserialize)]
pub struct AssignLocationRequest {
    pub category: ServiceCategory,
    pub start: ClockTime,
    pub end: ClockTime,
    pub locations: Vec<Location>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

fn parse_body<T: DeserializeOwned>(payload: Value) -> Result<T, AppError> {
    serde_json::from_value(payload).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn build_service(state: &AppConfig, weights: Option<ScoringWeights>) -> SmartSuggestionService {
    let service = SmartSuggestionService::new(state);
    match weights {
        Some(weights) => service.with_weights(weights, state.average_daily_bookings),
        None => service,
    }
}

// ==============================================================================
// HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn suggest_slots(
    State(state): State<Arc<AppConfig>>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let request: SuggestionRequest = parse_body(payload)?;
    let today = request.today.unwrap_or_else(|| state.today());
    let service = build_service(&state, request.weights);

    let suggestion = service.suggest(&request.context, today, request.max_alternatives)?;
    let has_availability = !suggestion.is_empty();
    let next_date = request.context.date.succ_opt();

    let mut body = serde_json::to_value(&suggestion)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if let Value::Object(fields) = &mut body {
        fields.insert("has_availability".to_string(), json!(has_availability));
        fields.insert("next_date".to_string(), json!(next_date));
    }

    Ok(Json(body))
}

#[axum::debug_handler]
pub async fn list_open_slots(
    State(state): State<Arc<AppConfig>>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let request: SuggestionRequest = parse_body(payload)?;
    let today = request.today.unwrap_or_else(|| state.today());
    let service = build_service(&state, request.weights);

    let slots = service.open_slots(&request.context, today)?;
    debug!("Returning {} open slots for {}", slots.len(), request.context.date);

    Ok(Json(json!({
        "date": request.context.date,
        "professional_id": request.context.professional_id(),
        "slots": slots,
        "total": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn assign_location(
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let request: AssignLocationRequest = parse_body(payload)?;
    if request.start >= request.end {
        return Err(AppError::ValidationError(format!(
            "Interval must start before it ends: {}-{}",
            request.start, request.end
        )));
    }

    let assigner = LocationAssigner::new(&request.locations, &request.bookings);
    let location_id = assigner
        .assign(request.category, request.start, request.end)
        .map(|location| location.id.clone());

    Ok(Json(json!({
        "location_id": location_id
    })))
}
