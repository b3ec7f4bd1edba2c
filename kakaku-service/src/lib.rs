//! Kakaku Prediction Service
//!
//! Synchronous HTTP service exposing the trained property price model.
//!
//! Endpoints:
//! - POST /predict - Score one property record
//! - GET /health - Health check
//! - GET /ready - Readiness check (artifact versions, uptime)
//!
//! Both artifacts are loaded once at startup and shared read-only by every
//! request; the service keeps no state between requests.

pub mod config;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{health_handler, predict_handler, ready_handler};
use crate::state::AppState;

/// Raw input field names, fixed by the request contract.
pub const FIELD_ADDRESS: &str = "address";
pub const FIELD_AREA: &str = "area";
pub const FIELD_BUILDING_YEAR: &str = "building_year";

/// The server-injected temporal field.
pub const FIELD_TRADE_DATE: &str = "trade_date";

/// Build the service router over loaded application state.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
