//! Request handlers and the centralized failure mapping.
//!
//! Every per-request fault is caught here and converted to the fixed
//! two-field error body; nothing propagates past the handler boundary and
//! internal detail is only ever logged, never returned.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use kakaku_core::{FeatureValue, Record};

use crate::state::AppState;
use crate::{FIELD_ADDRESS, FIELD_AREA, FIELD_BUILDING_YEAR, FIELD_TRADE_DATE};

/// Fixed message for client-caused failures.
const CLIENT_ERROR_MESSAGE: &str = "Invalid Parameters";

/// Fixed message for model/artifact failures.
const SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

/// Raw input record as supplied by the client. Unknown extra fields in the
/// body are tolerated and ignored; this is a deliberate leniency.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub address: String,
    pub area: f64,
    pub building_year: f64,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub status: &'static str,
    pub predicted: f64,
}

/// The two externally visible failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed body, missing required field, or a value a transform stage
    /// cannot coerce. Always client-caused.
    BadRequest,

    /// Model or artifact failure while scoring. Fatal to the request, not
    /// to the process.
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest => (StatusCode::BAD_REQUEST, CLIENT_ERROR_MESSAGE),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE),
        };
        (status, Json(json!({ "status": "Error", "message": message }))).into_response()
    }
}

/// Handle one prediction request to completion.
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Rejected unparseable request body");
        ApiError::BadRequest
    })?;

    if request.address.trim().is_empty() {
        warn!("Rejected request with empty address");
        return Err(ApiError::BadRequest);
    }

    // The only wall-clock read on the request path; one self-consistent
    // timestamp flows through the rest of this request's pipeline run.
    let trade_date = Utc::now();
    let record = augment(&request, trade_date);

    let vector = state.pipeline.transform(record).map_err(|e| {
        warn!(error = %e, "Transform pipeline rejected request");
        ApiError::BadRequest
    })?;

    let predicted = state.model.predict(&vector).map_err(|e| {
        error!(error = %e, "Model failed to score feature vector");
        ApiError::Internal
    })?;

    Ok(Json(PredictResponse {
        status: "OK",
        predicted,
    }))
}

/// Build the augmented record: the three raw fields plus the server-injected
/// trade date.
fn augment(request: &PredictRequest, trade_date: DateTime<Utc>) -> Record {
    let mut record = Record::new();
    record.insert(FIELD_ADDRESS, FeatureValue::Text(request.address.clone()));
    record.insert(FIELD_AREA, FeatureValue::Number(request.area));
    record.insert(
        FIELD_BUILDING_YEAR,
        FeatureValue::Number(request.building_year),
    );
    record.insert(FIELD_TRADE_DATE, FeatureValue::Timestamp(trade_date));
    record
}

/// Health check
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Readiness check. Artifacts load before the listener binds, so a
/// reachable readiness endpoint implies a loaded model.
pub async fn ready_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "instance_id": state.instance_id,
        "pipeline_version": state.pipeline.version(),
        "model_version": state.model.version(),
        "uptime_secs": state.uptime_secs(),
    }))
}
