use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/suggestions", post(handlers::suggest_slots))
        .route("/slots", post(handlers::list_open_slots))
        .route("/locations/assign", post(handlers::assign_location))
        .with_state(state)
}
